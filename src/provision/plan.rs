//! Deployment plan
//!
//! Declarative description of everything one `deploy` run asks the provider
//! for. Built from configuration alone; the only outside check is that every
//! asset directory to upload exists, so a missing one fails before any provider
//! call.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{validate_region, Config, WebsiteSpec};
use crate::domains::DomainSet;
use crate::error::ConfigError;

/// Name of the edge function attached to every distribution
pub const EDGE_FUNCTION: &str = "path-normalizer";
/// Distribution event the edge function runs on
pub const EDGE_EVENT: &str = "viewer-request";
const DEFAULT_ROOT_OBJECT: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentPlan {
    pub region: String,
    pub bucket: String,
    pub sites: Vec<SitePlan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePlan {
    pub name: String,
    /// Object prefix in the shared bucket
    pub origin_prefix: String,
    pub certificate: CertificateRequest,
    pub distribution: DistributionPlan,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<AssetSync>,
}

/// One certificate per website covering its whole domain set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub domain_name: String,
    pub subject_alternative_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionPlan {
    pub aliases: Vec<String>,
    pub default_root_object: String,
    pub edge_function: String,
    pub edge_event: String,
    pub error_responses: Vec<ErrorResponse>,
}

/// Origin status replaced by a fallback object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error_code: u16,
    pub response_code: u16,
    pub response_page_path: String,
}

/// Local asset directory copied under the site prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSync {
    pub source: PathBuf,
    pub destination_prefix: String,
}

impl DeploymentPlan {
    /// Build the plan for every configured website
    ///
    /// Fails without side effects when the region cannot host edge functions
    /// or a site's asset directory is missing.
    pub fn build(config: &Config) -> Result<Self, ConfigError> {
        validate_region(&config.region)?;

        let assets_root = Path::new(&config.paths.assets_root);
        let error_responses: Vec<ErrorResponse> = config
            .edge
            .error_statuses
            .iter()
            .map(|&code| ErrorResponse {
                error_code: code,
                response_code: 200,
                response_page_path: config.edge.fallback_path.clone(),
            })
            .collect();

        let sites = config
            .websites
            .iter()
            .map(|site| SitePlan::build(site, assets_root, &error_responses))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            region: config.region.clone(),
            bucket: config.bucket.clone(),
            sites,
        })
    }
}

impl SitePlan {
    fn build(
        site: &WebsiteSpec,
        assets_root: &Path,
        error_responses: &[ErrorResponse],
    ) -> Result<Self, ConfigError> {
        let domains = DomainSet::for_site(site);
        let alternates = domains.alternates().to_vec();

        let assets = if site.deploy_assets {
            let source = assets_root.join(&site.primary_domain);
            if !source.is_dir() {
                return Err(ConfigError::MissingAssets {
                    site: site.name.clone(),
                    path: source.display().to_string(),
                });
            }
            Some(AssetSync {
                source,
                destination_prefix: site.primary_domain.clone(),
            })
        } else {
            None
        };

        Ok(Self {
            name: site.name.clone(),
            origin_prefix: site.primary_domain.clone(),
            certificate: CertificateRequest {
                domain_name: site.primary_domain.clone(),
                subject_alternative_names: alternates,
            },
            distribution: DistributionPlan {
                aliases: domains.all().map(ToString::to_string).collect(),
                default_root_object: DEFAULT_ROOT_OBJECT.to_string(),
                edge_function: EDGE_FUNCTION.to_string(),
                edge_event: EDGE_EVENT.to_string(),
                error_responses: error_responses.to_vec(),
            },
            assets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
        bucket = "fleet"

        [paths]
        assets_root = "sites"
        bucket_root = "bucket"

        [[websites]]
        name = "example"
        primary_domain = "example.org"
        deploy_assets = true
        alternate_domains = ["example.com"]

        [[websites]]
        name = "landing"
        primary_domain = "www.landing.io"
    "#;

    /// Config from `SOURCE` with an asset tree for `example.org`
    fn config_with_assets() -> (Config, tempfile::TempDir) {
        let assets = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(assets.path().join("example.org")).unwrap();
        let mut config = Config::from_toml_str(SOURCE).unwrap();
        config.paths.assets_root = assets.path().display().to_string();
        (config, assets)
    }

    #[test]
    fn test_plan_per_site() {
        let (config, assets) = config_with_assets();
        let plan = DeploymentPlan::build(&config).unwrap();
        assert_eq!(plan.bucket, "fleet");
        assert_eq!(plan.sites.len(), 2);

        let example = &plan.sites[0];
        assert_eq!(example.origin_prefix, "example.org");
        assert_eq!(example.certificate.domain_name, "example.org");
        assert_eq!(
            example.certificate.subject_alternative_names,
            vec!["example.com", "www.example.org", "www.example.com"]
        );
        assert_eq!(
            example.distribution.aliases,
            vec!["example.org", "example.com", "www.example.org", "www.example.com"]
        );
        assert_eq!(example.distribution.edge_function, EDGE_FUNCTION);
        assert_eq!(
            example.assets.as_ref().unwrap().source,
            assets.path().join("example.org")
        );

        let landing = &plan.sites[1];
        assert!(landing.certificate.subject_alternative_names.is_empty());
        assert_eq!(landing.distribution.aliases, vec!["www.landing.io"]);
        assert!(landing.assets.is_none());
    }

    #[test]
    fn test_error_responses_follow_edge_config() {
        let (config, _assets) = config_with_assets();
        let plan = DeploymentPlan::build(&config).unwrap();
        let codes: Vec<u16> = plan.sites[0]
            .distribution
            .error_responses
            .iter()
            .map(|r| r.error_code)
            .collect();
        assert_eq!(codes, vec![403, 404]);
        assert!(plan.sites[0]
            .distribution
            .error_responses
            .iter()
            .all(|r| r.response_code == 200 && r.response_page_path == "/index.html"));
    }

    #[test]
    fn test_wrong_region_is_rejected() {
        let mut config = Config::from_toml_str(SOURCE).unwrap();
        config.region = "eu-central-1".to_string();
        assert!(matches!(
            DeploymentPlan::build(&config),
            Err(ConfigError::UnsupportedRegion { .. })
        ));
    }

    #[test]
    fn test_missing_asset_directory_is_a_config_error() {
        let empty = tempfile::tempdir().unwrap();
        let mut config = Config::from_toml_str(SOURCE).unwrap();
        config.paths.assets_root = empty.path().display().to_string();

        match DeploymentPlan::build(&config) {
            Err(ConfigError::MissingAssets { site, path }) => {
                assert_eq!(site, "example");
                assert!(path.ends_with("example.org"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
