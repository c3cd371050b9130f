//! Provisioning
//!
//! `deploy` turns the validated configuration into a [`DeploymentPlan`] and
//! hands it to a [`Provider`]. The plan is built completely before the first
//! provider call, so a configuration error never leaves a partial deployment.

mod plan;
mod provider;

pub use plan::{
    AssetSync, CertificateRequest, DeploymentPlan, DistributionPlan, ErrorResponse, SitePlan,
    EDGE_EVENT, EDGE_FUNCTION,
};
pub use provider::{DeploymentRecord, LocalProvider, Provider, RECORD_DIR};

use crate::config::Config;
use crate::error::ProvisionError;

/// Outcome of a deploy run
#[derive(Debug, Default, PartialEq, Eq)]
pub struct DeploySummary {
    pub sites: usize,
    pub certificates: usize,
    pub objects_uploaded: usize,
}

/// Build the plan and apply it with `provider`
pub fn deploy<P: Provider>(config: &Config, provider: &mut P) -> Result<DeploySummary, ProvisionError> {
    let plan = DeploymentPlan::build(config)?;
    apply(&plan, provider)
}

/// Apply an already built plan, site by site
pub fn apply<P: Provider>(
    plan: &DeploymentPlan,
    provider: &mut P,
) -> Result<DeploySummary, ProvisionError> {
    let mut summary = DeploySummary::default();

    provider.ensure_bucket(&plan.bucket, &plan.region)?;

    for site in &plan.sites {
        provider.request_certificate(&site.name, &site.certificate)?;
        summary.certificates += 1;

        provider.create_distribution(site)?;
        summary.sites += 1;

        if let Some(assets) = &site.assets {
            summary.objects_uploaded += provider.sync_assets(assets)?;
        }
    }

    provider.finish(plan)?;
    tracing::info!(
        sites = summary.sites,
        objects = summary.objects_uploaded,
        "deployment applied"
    );
    Ok(summary)
}

impl DeploymentPlan {
    /// Pretty JSON, as printed by `deploy --dry-run`
    pub fn to_json(&self) -> Result<String, ProvisionError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    /// Records every call instead of touching anything
    #[derive(Default)]
    struct RecordingProvider {
        calls: Vec<String>,
    }

    impl Provider for RecordingProvider {
        fn ensure_bucket(&mut self, bucket: &str, _region: &str) -> Result<(), ProvisionError> {
            self.calls.push(format!("bucket:{bucket}"));
            Ok(())
        }

        fn request_certificate(
            &mut self,
            site: &str,
            certificate: &CertificateRequest,
        ) -> Result<(), ProvisionError> {
            self.calls.push(format!(
                "cert:{site}:{}",
                certificate.subject_alternative_names.join(",")
            ));
            Ok(())
        }

        fn create_distribution(&mut self, site: &SitePlan) -> Result<(), ProvisionError> {
            self.calls.push(format!("dist:{}", site.name));
            Ok(())
        }

        fn sync_assets(&mut self, assets: &AssetSync) -> Result<usize, ProvisionError> {
            self.calls.push(format!("sync:{}", assets.destination_prefix));
            Ok(3)
        }

        fn finish(&mut self, _plan: &DeploymentPlan) -> Result<(), ProvisionError> {
            self.calls.push("finish".to_string());
            Ok(())
        }
    }

    const SOURCE: &str = r#"
        [[websites]]
        name = "example"
        primary_domain = "example.org"
        deploy_assets = true

        [[websites]]
        name = "docs"
        primary_domain = "docs.example.net"
        alternate_domains = ["manual.example.net"]
    "#;

    fn config_with_assets() -> (Config, tempfile::TempDir) {
        let assets = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(assets.path().join("example.org")).unwrap();
        let mut config = Config::from_toml_str(SOURCE).unwrap();
        config.paths.assets_root = assets.path().display().to_string();
        (config, assets)
    }

    #[test]
    fn test_deploy_applies_every_site_in_order() {
        let (config, _assets) = config_with_assets();
        let mut provider = RecordingProvider::default();
        let summary = deploy(&config, &mut provider).unwrap();

        assert_eq!(
            provider.calls,
            vec![
                "bucket:sitefleet-websites",
                "cert:example:www.example.org",
                "dist:example",
                "sync:example.org",
                "cert:docs:manual.example.net,www.docs.example.net,www.manual.example.net",
                "dist:docs",
                "finish",
            ]
        );
        assert_eq!(
            summary,
            DeploySummary {
                sites: 2,
                certificates: 2,
                objects_uploaded: 3
            }
        );
    }

    #[test]
    fn test_config_error_applies_nothing() {
        let mut config = Config::from_toml_str(SOURCE).unwrap();
        config.region = "ap-south-1".to_string();
        let mut provider = RecordingProvider::default();

        let result = deploy(&config, &mut provider);
        assert!(matches!(
            result,
            Err(ProvisionError::Config(ConfigError::UnsupportedRegion { .. }))
        ));
        assert!(provider.calls.is_empty());
    }

    #[test]
    fn test_missing_assets_apply_nothing() {
        let source = r#"
            [[websites]]
            name = "first"
            primary_domain = "first.org"

            [[websites]]
            name = "second"
            primary_domain = "second.org"
            deploy_assets = true
        "#;
        let assets = tempfile::tempdir().unwrap();
        let bucket = tempfile::tempdir().unwrap();
        let mut config = Config::from_toml_str(source).unwrap();
        config.paths.assets_root = assets.path().display().to_string();

        let mut recording = RecordingProvider::default();
        assert!(matches!(
            deploy(&config, &mut recording),
            Err(ProvisionError::Config(ConfigError::MissingAssets { .. }))
        ));
        assert!(recording.calls.is_empty());

        let mut local = LocalProvider::new(bucket.path().join("root"));
        assert!(deploy(&config, &mut local).is_err());
        assert!(!bucket.path().join("root").exists());
    }

    #[test]
    fn test_local_deploy_populates_bucket() {
        let assets = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(assets.path().join("example.org/blog")).unwrap();
        std::fs::write(assets.path().join("example.org/index.html"), "home").unwrap();
        std::fs::write(assets.path().join("example.org/blog/index.html"), "blog").unwrap();
        let bucket = tempfile::tempdir().unwrap();

        let mut config = Config::from_toml_str(SOURCE).unwrap();
        config.paths.assets_root = assets.path().display().to_string();
        config.paths.bucket_root = bucket.path().display().to_string();

        let mut provider = LocalProvider::new(bucket.path());
        let summary = deploy(&config, &mut provider).unwrap();

        assert_eq!(summary.objects_uploaded, 2);
        assert!(bucket.path().join("example.org/blog/index.html").is_file());
        assert!(bucket.path().join("docs.example.net").is_dir());
        let record = provider.last_deployment().unwrap().unwrap();
        assert_eq!(record.plan.sites.len(), 2);
    }

    #[test]
    fn test_plan_json_lists_aliases() {
        let (config, _assets) = config_with_assets();
        let json = DeploymentPlan::build(&config).unwrap().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["sites"][1]["distribution"]["aliases"][0], "docs.example.net");
        assert!(value["sites"][1].get("assets").is_none());
    }
}
