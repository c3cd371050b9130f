//! Path canonicalization
//!
//! Directory-style and extension-less request paths are rewritten so that they
//! point at an `index.html` object:
//!
//! | Request          | Forwarded to origin |
//! |------------------|---------------------|
//! | `/`              | `/index.html`       |
//! | `/blog/`         | `/blog/index.html`  |
//! | `/blog`          | `/blog/index.html`  |
//! | `/styles.css`    | `/styles.css`       |

use hyper::Uri;

use crate::logger;

const INDEX_FILE: &str = "index.html";

/// Rewrite a request path so that directory-style URLs resolve to `index.html`
///
/// Never fails. Any `.` in the whole value marks it as a file request, so a
/// directory such as `/v1.2` is passed through untouched.
///
/// # Examples
/// ```
/// use sitefleet::edge::normalize;
/// assert_eq!(normalize("/"), "/index.html");
/// assert_eq!(normalize("/blog"), "/blog/index.html");
/// assert_eq!(normalize("/styles.css"), "/styles.css");
/// ```
pub fn normalize(uri: &str) -> String {
    let normalized = if uri.ends_with('/') {
        format!("{uri}{INDEX_FILE}")
    } else if !uri.contains('.') {
        format!("{uri}/{INDEX_FILE}")
    } else {
        return uri.to_string();
    };

    logger::log_rewrite(uri, &normalized);
    normalized
}

/// A request as seen by the edge, before it is forwarded to storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRequest {
    path: String,
    query: Option<String>,
}

impl EdgeRequest {
    pub fn new(path: impl Into<String>, query: Option<String>) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    pub fn from_uri(uri: &Uri) -> Self {
        Self::new(uri.path(), uri.query().map(ToString::to_string))
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Apply path canonicalization; the query string is left as is
    #[must_use]
    pub fn normalize(self) -> Self {
        Self {
            path: normalize(&self.path),
            query: self.query,
        }
    }

    /// Key of the object in the shared bucket, e.g. `example.org/blog/index.html`
    pub fn origin_key(&self, primary_domain: &str) -> String {
        let path = self.path.trim_start_matches('/');
        format!("{primary_domain}/{path}")
    }

    /// Path and query in request-line form
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }
}
