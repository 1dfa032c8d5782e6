use std::collections::BTreeMap;

use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};

/// Body served when a static asset is neither cached nor reachable.
pub const ASSET_OFFLINE_BODY: &str = "Asset offline";

/// Status for responses synthesized while offline.
pub const OFFLINE_STATUS: u16 = 503;

const OFFLINE_PAGE: &str = "<!DOCTYPE html>\n\
<html lang=\"id\">\n\
<head><meta charset=\"utf-8\"><title>Offline - Smart Neighborhood</title></head>\n\
<body>\n\
<h1>Anda sedang offline</h1>\n\
<p>Halaman ini belum tersimpan. Sambungkan kembali ke internet lalu muat ulang.</p>\n\
</body>\n\
</html>\n";

/// Caching policy a request falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Build output, stylesheets, scripts and fonts: cache-first
    StaticAsset,
    /// Everything else: network-first
    Document,
}

const ASSET_EXTENSIONS: [&str; 4] = [".css", ".js", ".woff", ".woff2"];

/// Classify a URL path.
pub fn classify(path: &str) -> RequestKind {
    if path.contains("/_next/") || ASSET_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        RequestKind::StaticAsset
    } else {
        RequestKind::Document
    }
}

/// Cache lookup key for a URL. Fragments never reach the server, so they
/// are dropped.
pub fn cache_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// An intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub url: Url,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    pub fn kind(&self) -> RequestKind {
        classify(self.url.path())
    }

    pub fn cache_key(&self) -> String {
        cache_key(&self.url)
    }
}

/// A response as stored in and served from the offline cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            url: url.into(),
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Only exact 200 responses are stored.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Synthetic 503 for an unreachable, uncached static asset.
    pub fn asset_offline(url: &Url) -> Self {
        Self::new(url.as_str(), OFFLINE_STATUS, ASSET_OFFLINE_BODY)
            .with_header("content-type", "text/plain; charset=utf-8")
    }

    /// Synthetic 503 page served when a document has no cached fallback.
    pub fn offline_page(url: &Url) -> Self {
        Self::new(url.as_str(), OFFLINE_STATUS, OFFLINE_PAGE)
            .with_header("content-type", "text/html; charset=utf-8")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_static_assets() {
        assert_eq!(classify("/_next/static/chunks/main.js"), RequestKind::StaticAsset);
        assert_eq!(classify("/_next/image"), RequestKind::StaticAsset);
        assert_eq!(classify("/styles/app.css"), RequestKind::StaticAsset);
        assert_eq!(classify("/sw.js"), RequestKind::StaticAsset);
        assert_eq!(classify("/fonts/inter.woff"), RequestKind::StaticAsset);
        assert_eq!(classify("/fonts/inter.woff2"), RequestKind::StaticAsset);
    }

    #[test]
    fn test_classify_documents() {
        assert_eq!(classify("/"), RequestKind::Document);
        assert_eq!(classify("/dashboard"), RequestKind::Document);
        assert_eq!(classify("/manifest.json"), RequestKind::Document);
        assert_eq!(classify("/icon.svg"), RequestKind::Document);
        assert_eq!(classify("/script.jsx"), RequestKind::Document);
        assert_eq!(classify("/next/page"), RequestKind::Document);
    }

    #[test]
    fn test_cache_key_drops_fragment() {
        let url = Url::parse("http://localhost:3000/dashboard#stats").unwrap();
        assert_eq!(cache_key(&url), "http://localhost:3000/dashboard");
    }

    #[test]
    fn test_offline_responses() {
        let url = Url::parse("http://localhost:3000/_next/app.js").unwrap();
        let asset = Response::asset_offline(&url);
        assert_eq!(asset.status, 503);
        assert_eq!(asset.text(), "Asset offline");
        assert!(!asset.is_cacheable());

        let page = Response::offline_page(&url);
        assert_eq!(page.status, 503);
        assert_eq!(page.header("Content-Type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_response_serialization() {
        let response = Response::new("http://localhost:3000/", 200, "<html></html>")
            .with_header("Content-Type", "text/html");
        let json = serde_json::to_string(&response).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, response);
        assert_eq!(parsed.header("content-type"), Some("text/html"));
    }
}
