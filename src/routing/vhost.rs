//! Virtual host matching module
//!
//! Every website answers to the names in its domain set and nothing else.
//! There are no wildcards and no catch-all; an unknown host gets a 404.

use crate::config::WebsiteSpec;
use crate::domains::DomainSet;

/// A website together with its resolved domain set
#[derive(Debug, Clone)]
pub struct Site {
    pub spec: WebsiteSpec,
    pub domains: DomainSet,
}

impl Site {
    pub fn new(spec: WebsiteSpec) -> Self {
        let domains = DomainSet::for_site(&spec);
        Self { spec, domains }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Object prefix in the shared bucket
    pub fn primary_domain(&self) -> &str {
        self.domains.primary()
    }
}

/// Resolve the website serving a given Host header
///
/// Matching is exact and case-insensitive; an optional port is ignored.
/// Loaded configurations never give one hostname to two sites.
pub fn resolve_site<'a>(host: &str, sites: &'a [Site]) -> Option<&'a Site> {
    sites.iter().find(|site| site.domains.contains(host))
}
