//! Provider collaborator
//!
//! The cloud side of a deployment (bucket, certificates, distributions, asset
//! upload) sits behind [`Provider`]. `LocalProvider` applies a plan to a local
//! directory that stands in for the shared bucket, which is what `serve` reads.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use super::plan::{AssetSync, CertificateRequest, DeploymentPlan, SitePlan};
use crate::error::ProvisionError;

/// Directory under the bucket root holding deployment records
pub const RECORD_DIR: &str = ".sitefleet";
const RECORD_FILE: &str = "deployment.toml";

/// Operations a deployment needs from the hosting platform
pub trait Provider {
    fn ensure_bucket(&mut self, bucket: &str, region: &str) -> Result<(), ProvisionError>;

    fn request_certificate(
        &mut self,
        site: &str,
        certificate: &CertificateRequest,
    ) -> Result<(), ProvisionError>;

    fn create_distribution(&mut self, site: &SitePlan) -> Result<(), ProvisionError>;

    /// Upload a site's assets; returns the number of objects written
    fn sync_assets(&mut self, assets: &AssetSync) -> Result<usize, ProvisionError>;

    /// Called once after every site has been applied
    fn finish(&mut self, plan: &DeploymentPlan) -> Result<(), ProvisionError>;
}

/// What gets written to `<bucket_root>/.sitefleet/deployment.toml`
#[derive(Debug, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub deployed_at: String,
    pub plan: DeploymentPlan,
}

/// Applies plans to a directory on the local filesystem
pub struct LocalProvider {
    bucket_root: PathBuf,
}

impl LocalProvider {
    pub fn new(bucket_root: impl Into<PathBuf>) -> Self {
        Self {
            bucket_root: bucket_root.into(),
        }
    }

    pub fn record_path(&self) -> PathBuf {
        self.bucket_root.join(RECORD_DIR).join(RECORD_FILE)
    }

    /// Read back the last applied deployment, if any
    pub fn last_deployment(&self) -> Result<Option<DeploymentRecord>, ProvisionError> {
        let path = self.record_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| ProvisionError::io(&path, e))?;
        Ok(Some(toml::from_str(&content)?))
    }
}

impl Provider for LocalProvider {
    fn ensure_bucket(&mut self, bucket: &str, region: &str) -> Result<(), ProvisionError> {
        fs::create_dir_all(&self.bucket_root)
            .map_err(|e| ProvisionError::io(&self.bucket_root, e))?;
        tracing::info!(bucket, region, root = %self.bucket_root.display(), "bucket ready");
        Ok(())
    }

    fn request_certificate(
        &mut self,
        site: &str,
        certificate: &CertificateRequest,
    ) -> Result<(), ProvisionError> {
        // Validation happens on the platform; locally there is nothing to issue
        tracing::info!(
            site,
            domain = %certificate.domain_name,
            sans = ?certificate.subject_alternative_names,
            "certificate requested"
        );
        Ok(())
    }

    fn create_distribution(&mut self, site: &SitePlan) -> Result<(), ProvisionError> {
        let prefix = self.bucket_root.join(&site.origin_prefix);
        fs::create_dir_all(&prefix).map_err(|e| ProvisionError::io(&prefix, e))?;
        tracing::info!(
            site = %site.name,
            aliases = ?site.distribution.aliases,
            "distribution configured"
        );
        Ok(())
    }

    fn sync_assets(&mut self, assets: &AssetSync) -> Result<usize, ProvisionError> {
        let destination = self.bucket_root.join(&assets.destination_prefix);
        let copied = copy_tree(&assets.source, &destination)?;
        tracing::info!(
            source = %assets.source.display(),
            prefix = %assets.destination_prefix,
            objects = copied,
            "assets synced"
        );
        Ok(copied)
    }

    fn finish(&mut self, plan: &DeploymentPlan) -> Result<(), ProvisionError> {
        let record = DeploymentRecord {
            deployed_at: Local::now().to_rfc3339(),
            plan: plan.clone(),
        };
        let path = self.record_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ProvisionError::io(parent, e))?;
        }
        let content = toml::to_string_pretty(&record)?;
        fs::write(&path, content).map_err(|e| ProvisionError::io(&path, e))?;
        Ok(())
    }
}

/// Recursively copy `source` into `destination`; returns the number of files
fn copy_tree(source: &Path, destination: &Path) -> Result<usize, ProvisionError> {
    fs::create_dir_all(destination).map_err(|e| ProvisionError::io(destination, e))?;

    let mut copied = 0;
    let entries = fs::read_dir(source).map_err(|e| ProvisionError::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| ProvisionError::io(source, e))?;
        let from = entry.path();
        let to = destination.join(entry.file_name());
        let file_type = entry.file_type().map_err(|e| ProvisionError::io(&from, e))?;

        if file_type.is_dir() {
            copied += copy_tree(&from, &to)?;
        } else if file_type.is_file() {
            fs::copy(&from, &to).map_err(|e| ProvisionError::io(&from, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}
