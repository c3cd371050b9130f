//! Bucket object serving module
//!
//! Reads objects from the local bucket root (`<bucket_root>/<primary_domain>/<key>`)
//! and applies the error-response override: a 403/404 from origin is replaced by
//! the fallback object with a 200, so client-side routes resolve on deep links.

use std::io;
use std::path::{Component, Path, PathBuf};

use hyper::body::Bytes;
use tokio::fs;

use crate::config::EdgeConfig;
use crate::edge::EdgeRequest;
use crate::http::mime;
use crate::logger;

/// Why an object could not be read from origin
#[derive(Debug)]
pub enum OriginError {
    /// No such object (404)
    NotFound,
    /// Key escapes the site prefix (403)
    Forbidden,
    /// Unexpected storage failure (500)
    Io(io::Error),
}

impl OriginError {
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound => 404,
            Self::Forbidden => 403,
            Self::Io(_) => 500,
        }
    }
}

/// An object read from origin
#[derive(Debug)]
pub struct Object {
    /// Path the object was served from, relative to the site prefix
    pub path: String,
    pub data: Bytes,
    pub content_type: &'static str,
    /// Set when the fallback object replaced an origin error
    pub fallback: bool,
}

/// Load the object a normalized request points at
pub async fn load_object(
    bucket_root: &Path,
    primary_domain: &str,
    request: &EdgeRequest,
) -> Result<Object, OriginError> {
    let file_path = resolve_key(bucket_root, &request.origin_key(primary_domain))?;

    match fs::metadata(&file_path).await {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => return Err(OriginError::NotFound),
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(OriginError::NotFound),
        Err(e) => return Err(OriginError::Io(e)),
    }

    let data = fs::read(&file_path).await.map_err(|e| {
        logger::log_error(&format!(
            "Failed to read object '{}': {e}",
            file_path.display()
        ));
        OriginError::Io(e)
    })?;

    Ok(Object {
        path: request.path().to_string(),
        data: Bytes::from(data),
        content_type: mime::content_type_for(&file_path),
        fallback: false,
    })
}

/// Load an object, substituting the fallback object for mapped origin errors
pub async fn load_with_fallback(
    bucket_root: &Path,
    primary_domain: &str,
    request: &EdgeRequest,
    edge: &EdgeConfig,
) -> Result<Object, OriginError> {
    match load_object(bucket_root, primary_domain, request).await {
        Err(err) if edge.maps_to_fallback(err.status()) => {
            let fallback = EdgeRequest::new(edge.fallback_path.as_str(), None);
            let mut object = load_object(bucket_root, primary_domain, &fallback)
                .await
                .map_err(|fallback_err| {
                    logger::log_warning(&format!(
                        "Fallback object '{}' unavailable for {primary_domain}",
                        edge.fallback_path
                    ));
                    fallback_err
                })?;
            object.fallback = true;
            Ok(object)
        }
        other => other,
    }
}

/// Map an origin key (`<primary>/<path>`) to a file under the bucket root
///
/// Any `..`, root or prefix component makes the key forbidden.
fn resolve_key(bucket_root: &Path, key: &str) -> Result<PathBuf, OriginError> {
    let relative = Path::new(key);

    if relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {key}"));
        return Err(OriginError::Forbidden);
    }

    Ok(bucket_root.join(relative))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge_config(statuses: &[u16]) -> EdgeConfig {
        EdgeConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            workers: None,
            read_timeout: 5,
            fallback_path: "/index.html".to_string(),
            error_statuses: statuses.to_vec(),
        }
    }

    fn req(path: &str) -> EdgeRequest {
        EdgeRequest::new(path, None)
    }

    fn bucket() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("example.org");
        std::fs::create_dir_all(site.join("blog")).unwrap();
        std::fs::write(site.join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(site.join("blog/index.html"), "<h1>blog</h1>").unwrap();
        std::fs::write(site.join("styles.css"), "body{}").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_load_existing_object() {
        let dir = bucket();
        let object = load_object(dir.path(), "example.org", &req("/blog/index.html"))
            .await
            .unwrap();
        assert_eq!(object.data, Bytes::from("<h1>blog</h1>"));
        assert_eq!(object.content_type, "text/html; charset=utf-8");
        assert!(!object.fallback);
    }

    #[tokio::test]
    async fn test_missing_object_and_directory_are_not_found() {
        let dir = bucket();
        let missing = load_object(dir.path(), "example.org", &req("/nope.css")).await;
        assert!(matches!(missing, Err(OriginError::NotFound)));

        let directory = load_object(dir.path(), "example.org", &req("/blog")).await;
        assert!(matches!(directory, Err(OriginError::NotFound)));
    }

    #[tokio::test]
    async fn test_traversal_is_forbidden() {
        let dir = bucket();
        let result = load_object(dir.path(), "example.org", &req("/../example.org/index.html")).await;
        assert!(matches!(result, Err(OriginError::Forbidden)));
    }

    #[tokio::test]
    async fn test_fallback_replaces_not_found() {
        let dir = bucket();
        let object = load_with_fallback(
            dir.path(),
            "example.org",
            &req("/app/settings/index.html"),
            &edge_config(&[403, 404]),
        )
        .await
        .unwrap();
        assert!(object.fallback);
        assert_eq!(object.path, "/index.html");
        assert_eq!(object.data, Bytes::from("<h1>home</h1>"));
    }

    #[tokio::test]
    async fn test_unmapped_status_is_returned() {
        let dir = bucket();
        let result = load_with_fallback(
            dir.path(),
            "example.org",
            &req("/missing.png"),
            &edge_config(&[403]),
        )
        .await;
        assert!(matches!(result, Err(OriginError::NotFound)));
    }

    #[tokio::test]
    async fn test_sites_are_isolated_by_prefix() {
        let dir = bucket();
        let result = load_object(dir.path(), "other.org", &req("/index.html")).await;
        assert!(matches!(result, Err(OriginError::NotFound)));
    }

    #[tokio::test]
    async fn test_object_is_read_from_origin_key() {
        let dir = bucket();
        let request = EdgeRequest::new("/blog", Some("page=2".to_string())).normalize();
        assert_eq!(request.origin_key("example.org"), "example.org/blog/index.html");

        let object = load_object(dir.path(), "example.org", &request).await.unwrap();
        assert_eq!(object.path, "/blog/index.html");
        assert_eq!(object.data, Bytes::from("<h1>blog</h1>"));
    }
}
