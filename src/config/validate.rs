// Configuration validation
// Runs once after loading; any error aborts before a single resource is touched

use std::collections::{HashMap, HashSet};

use super::types::Config;
use crate::domains::{validate_domain, DomainSet};
use crate::error::ConfigError;

/// Edge functions and their certificates must live in this region
pub const REQUIRED_REGION: &str = "us-east-1";

/// Validate the website list
///
/// Names and primary domains must be unique, every domain well-formed, and no
/// hostname may belong to the domain sets of two websites.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.websites.is_empty() {
        return Err(ConfigError::NoWebsites);
    }

    let mut names: HashSet<&str> = HashSet::new();
    let mut primaries: HashMap<&str, &str> = HashMap::new();
    let mut hostnames: HashMap<String, &str> = HashMap::new();

    for site in &config.websites {
        if !names.insert(site.name.as_str()) {
            return Err(ConfigError::DuplicateName(site.name.clone()));
        }

        validate_domain(&site.primary_domain)?;
        for alternate in &site.alternate_domains {
            validate_domain(alternate)?;
        }

        if let Some(first) = primaries.insert(site.primary_domain.as_str(), site.name.as_str()) {
            return Err(ConfigError::DuplicatePrimaryDomain {
                domain: site.primary_domain.clone(),
                first: first.to_string(),
                second: site.name.clone(),
            });
        }

        // A site may repeat its own names; only other sites count as a clash
        let domains = DomainSet::for_site(site);
        for host in domains.all().map(str::to_ascii_lowercase) {
            match hostnames.get(&host) {
                Some(&owner) if owner != site.name => {
                    return Err(ConfigError::DomainClaimedTwice {
                        domain: host,
                        first: owner.to_string(),
                        second: site.name.clone(),
                    });
                }
                Some(_) => {}
                None => {
                    hostnames.insert(host, site.name.as_str());
                }
            }
        }
    }

    Ok(())
}

pub fn validate_region(region: &str) -> Result<(), ConfigError> {
    if region == REQUIRED_REGION {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedRegion {
            found: region.to_string(),
            required: REQUIRED_REGION,
        })
    }
}
