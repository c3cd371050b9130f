//! Edge request dispatch module
//!
//! Entry point for every request hitting the edge: method check, site
//! resolution by `Host`, path canonicalization, origin read and access log.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HOST, IF_NONE_MATCH, USER_AGENT};
use hyper::{Method, Request, Response, Uri};

use crate::config::EdgeState;
use crate::edge::EdgeRequest;
use crate::handler::static_files::{self, OriginError};
use crate::http::{self, cache, cache::CachePolicy};
use crate::logger::{self, AccessLogEntry};
use crate::routing;

/// Request context encapsulating information needed for request processing
pub struct RequestContext {
    pub method: Method,
    pub uri: Uri,
    pub host: String,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<EdgeState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext {
        method: req.method().clone(),
        uri: req.uri().clone(),
        host: request_host(&req).unwrap_or_default(),
        if_none_match: header_value(&req, IF_NONE_MATCH),
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        ctx.method.to_string(),
        ctx.host.clone(),
        ctx.uri.path().to_string(),
    );
    let edge_req = EdgeRequest::from_uri(&ctx.uri);
    entry.query = edge_req.query().map(ToString::to_string);
    entry.user_agent = header_value(&req, USER_AGENT);
    drop(req);

    let response = dispatch(&ctx, edge_req, &state, &mut entry).await;

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch(
    ctx: &RequestContext,
    edge_req: EdgeRequest,
    state: &EdgeState,
    entry: &mut AccessLogEntry,
) -> Response<Full<Bytes>> {
    // 1. Only reads reach origin
    let is_head = match ctx.method {
        Method::GET => false,
        Method::HEAD => true,
        Method::OPTIONS => return http::build_options_response(),
        _ => {
            logger::log_warning(&format!("Method not allowed: {}", ctx.method));
            return http::build_405_response();
        }
    };

    // 2. Resolve website by Host
    let Some(site) = routing::resolve_site(&ctx.host, &state.sites) else {
        return http::build_404_response();
    };
    entry.site = Some(site.name().to_string());

    // 3. Canonicalize path, once
    let edge_req = edge_req.normalize();

    // 4. Read from origin with error-response override
    let result = static_files::load_with_fallback(
        &state.bucket_root,
        site.primary_domain(),
        &edge_req,
        &state.config.edge,
    )
    .await;

    let object = match result {
        Ok(object) => object,
        Err(OriginError::Io(_)) => return http::build_500_response(),
        Err(OriginError::NotFound | OriginError::Forbidden) => {
            entry.origin_path = Some(edge_req.path_and_query());
            return http::build_404_response();
        }
    };

    entry.origin_path = Some(if object.fallback {
        object.path.clone()
    } else {
        edge_req.path_and_query()
    });
    entry.fallback = object.fallback;
    entry.body_bytes = if is_head { 0 } else { object.data.len() };

    // 5. Conditional request
    let policy = CachePolicy::for_object(object.content_type, object.fallback);
    let etag = cache::generate_etag(&object.data);
    if cache::check_etag_match(ctx.if_none_match.as_deref(), &etag) {
        entry.body_bytes = 0;
        return http::build_304_response(&etag, policy);
    }

    http::build_object_response(object.data, object.content_type, &etag, policy, is_head)
}

/// Host from the `Host` header, or the authority of an absolute-form URI
fn request_host<B>(req: &Request<B>) -> Option<String> {
    header_value(req, HOST).or_else(|| req.uri().host().map(ToString::to_string))
}

fn header_value<B>(req: &Request<B>, name: hyper::header::HeaderName) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
