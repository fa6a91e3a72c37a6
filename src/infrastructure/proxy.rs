use crate::core::models::ProxyRule;
use crate::utils::{InstallerError, Logger, Result};
use axum::body::{Body, HttpBody};
use axum::http::{HeaderMap, Request, Response};

/// Headers that describe a single hop and are never forwarded
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Forwards requests matching a path prefix to another origin, keeping
/// method, path, query, headers and body.
#[derive(Clone)]
pub struct DevProxy {
    rules: Vec<ProxyRule>,
    client: reqwest::Client,
}

impl DevProxy {
    pub fn new(rules: Vec<ProxyRule>) -> Result<Self> {
        // Redirects are relayed to the browser, not followed
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { rules, client })
    }

    /// First rule whose prefix starts the request path
    pub fn match_rule(&self, path: &str) -> Option<&ProxyRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    pub fn target_url(rule: &ProxyRule, path_and_query: &str) -> String {
        format!("{}{}", rule.target.trim_end_matches('/'), path_and_query)
    }

    pub async fn forward(&self, rule: &ProxyRule, request: Request<Body>) -> Result<Response<Body>> {
        let (parts, body) = request.into_parts();
        let path_and_query = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), |pq| pq.as_str().to_string());
        let url = Self::target_url(rule, &path_and_query);

        Logger::proxied(parts.method.as_str(), &path_and_query, &rule.target);

        let mut outgoing = self
            .client
            .request(parts.method, &url)
            .headers(Self::strip_hop_by_hop(parts.headers));
        if body.size_hint().exact() != Some(0) {
            outgoing = outgoing.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }

        let upstream = outgoing
            .send()
            .await
            .map_err(|e| InstallerError::Proxy(format!("{} {}: {}", rule.target, path_and_query, e)))?;

        let status = upstream.status();
        let headers = Self::strip_hop_by_hop(upstream.headers().clone());

        let mut response = Response::builder().status(status);
        if let Some(response_headers) = response.headers_mut() {
            response_headers.extend(headers);
        }

        // Bodies are relayed chunk by chunk in both directions
        response
            .body(Body::from_stream(upstream.bytes_stream()))
            .map_err(|e| InstallerError::Proxy(e.to_string()))
    }

    fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
        for name in HOP_BY_HOP {
            headers.remove(*name);
        }
        headers
    }
}
