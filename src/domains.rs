//! Domain set composition
//!
//! Works out every hostname a website must answer to: its primary domain, any
//! explicitly configured alternates, and a `www.` variant of each of those that
//! does not already have one.

use std::collections::HashSet;

use crate::config::WebsiteSpec;
use crate::error::ConfigError;

const WWW_PREFIX: &str = "www.";

/// Compute the alternative names for a website
///
/// The result contains the explicit alternates in input order followed by the
/// derived `www.` variants. The primary domain itself is never part of it, even
/// when the caller lists it among the alternates.
///
/// # Examples
/// ```
/// use sitefleet::domains::compute_alternate_domains;
/// assert_eq!(
///     compute_alternate_domains("example.org", &["example.com".to_string()]),
///     vec!["example.com", "www.example.org", "www.example.com"],
/// );
/// ```
pub fn compute_alternate_domains(primary: &str, explicit_alternates: &[String]) -> Vec<String> {
    // Snapshot of the entries present before any derivation
    let initial: Vec<&str> = std::iter::once(primary)
        .chain(explicit_alternates.iter().map(String::as_str))
        .collect();

    let mut seen: HashSet<String> = initial.iter().map(|d| (*d).to_string()).collect();
    let mut derived = Vec::new();

    for domain in &initial {
        if domain.starts_with(WWW_PREFIX) {
            continue;
        }
        let www = format!("{WWW_PREFIX}{domain}");
        if seen.insert(www.clone()) {
            derived.push(www);
        }
    }

    explicit_alternates
        .iter()
        .filter(|d| d.as_str() != primary)
        .cloned()
        .chain(derived)
        .collect()
}

/// Full set of hostnames served by one website
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainSet {
    primary: String,
    alternates: Vec<String>,
}

impl DomainSet {
    pub fn new(primary: &str, explicit_alternates: &[String]) -> Self {
        Self {
            primary: primary.to_string(),
            alternates: compute_alternate_domains(primary, explicit_alternates),
        }
    }

    pub fn for_site(site: &WebsiteSpec) -> Self {
        Self::new(&site.primary_domain, &site.alternate_domains)
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    /// Names for certificate SANs and distribution aliases, primary excluded
    pub fn alternates(&self) -> &[String] {
        &self.alternates
    }

    /// Primary first, then the alternates
    pub fn all(&self) -> impl Iterator<Item = &str> + '_ {
        std::iter::once(self.primary.as_str()).chain(self.alternates.iter().map(String::as_str))
    }

    /// Check whether a `Host` header value belongs to this site
    pub fn contains(&self, host: &str) -> bool {
        let host = strip_port(host);
        self.all().any(|d| d.eq_ignore_ascii_case(host))
    }
}

/// Strip an optional `:port` suffix from a host header value
fn strip_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// Reject anything that is not a plain DNS hostname
pub fn validate_domain(domain: &str) -> Result<(), ConfigError> {
    let malformed = |reason| ConfigError::MalformedDomain {
        domain: domain.to_string(),
        reason,
    };

    if domain.is_empty() {
        return Err(malformed("empty"));
    }
    if domain.len() > 253 {
        return Err(malformed("longer than 253 characters"));
    }

    for label in domain.split('.') {
        if label.is_empty() {
            return Err(malformed("empty label"));
        }
        if label.len() > 63 {
            return Err(malformed("label longer than 63 characters"));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(malformed("label starts or ends with '-'"));
        }
        if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err(malformed("invalid character"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alts(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_bare_primary_gains_www() {
        assert_eq!(
            compute_alternate_domains("example.org", &[]),
            vec!["www.example.org"]
        );
        assert_eq!(compute_alternate_domains("a.io", &[]), vec!["www.a.io"]);
    }

    #[test]
    fn test_www_primary_yields_nothing() {
        assert!(compute_alternate_domains("www.example.org", &[]).is_empty());
    }

    #[test]
    fn test_alternates_before_derived_entries() {
        assert_eq!(
            compute_alternate_domains("example.org", &alts(&["example.com"])),
            vec!["example.com", "www.example.org", "www.example.com"]
        );
    }

    #[test]
    fn test_explicit_www_is_not_duplicated() {
        let result = compute_alternate_domains("example.org", &alts(&["www.example.org"]));
        assert_eq!(result, vec!["www.example.org"]);
    }

    #[test]
    fn test_explicit_www_later_in_list_is_not_duplicated() {
        let result = compute_alternate_domains(
            "example.org",
            &alts(&["example.com", "www.example.com", "www.example.org"]),
        );
        assert_eq!(
            result,
            vec!["example.com", "www.example.com", "www.example.org"]
        );
    }

    #[test]
    fn test_never_contains_primary() {
        for primary in ["example.org", "www.example.org", "blog.example.org"] {
            let result = compute_alternate_domains(primary, &alts(&["example.net"]));
            assert!(!result.iter().any(|d| d == primary), "{primary} in {result:?}");
        }
    }

    #[test]
    fn test_primary_listed_as_alternate_is_dropped() {
        let result = compute_alternate_domains("example.org", &alts(&["example.org", "example.com"]));
        assert_eq!(result, vec!["example.com", "www.example.org", "www.example.com"]);
    }

    #[test]
    fn test_input_duplicates_are_kept_but_derive_once() {
        let result =
            compute_alternate_domains("example.org", &alts(&["example.com", "example.com"]));
        assert_eq!(
            result,
            vec![
                "example.com",
                "example.com",
                "www.example.org",
                "www.example.com"
            ]
        );
    }

    #[test]
    fn test_composition_is_deterministic() {
        let input = alts(&["example.com", "shop.example.org"]);
        assert_eq!(
            compute_alternate_domains("example.org", &input),
            compute_alternate_domains("example.org", &input)
        );
    }

    #[test]
    fn test_domain_set_contains_host() {
        let set = DomainSet::new("example.org", &alts(&["example.com"]));
        assert!(set.contains("example.org"));
        assert!(set.contains("WWW.Example.COM"));
        assert!(set.contains("www.example.org:8080"));
        assert!(!set.contains("other.org"));
        assert_eq!(set.all().count(), 4);
        assert_eq!(set.all().next(), Some("example.org"));
    }

    #[test]
    fn test_validate_domain() {
        assert!(validate_domain("example.org").is_ok());
        assert!(validate_domain("my-site.example.co.uk").is_ok());
        assert!(validate_domain("").is_err());
        assert!(validate_domain("example..org").is_err());
        assert!(validate_domain("-bad.org").is_err());
        assert!(validate_domain("bad-.org").is_err());
        assert!(validate_domain("exa mple.org").is_err());
        assert!(validate_domain("example.org/").is_err());
        assert!(validate_domain(&format!("{}.org", "a".repeat(64))).is_err());
    }
}
