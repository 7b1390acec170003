//! Header decoration module
//!
//! Maps a request path to the extra response headers a WebGL build needs:
//! CORS, `Content-Encoding` for precompressed `.gz`/`.br` artifacts, the
//! content type of the *uncompressed* payload, and PWA overrides.
//!
//! The rules are a flat table evaluated top to bottom. Within the encoding
//! table the first matching row wins; the PWA rules run afterwards and may
//! override the content type chosen by the table.

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_ENCODING,
    CONTENT_TYPE,
};

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// CORS headers sent on every response
pub fn cors_headers() -> [(HeaderName, &'static str); 3] {
    [
        (ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN),
        (ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
        (ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
    ]
}

const WASM: &str = "application/wasm";
const JAVASCRIPT: &str = "application/javascript";
const OCTET_STREAM: &str = "application/octet-stream";
const JSON: &str = "application/json";
const GZIP: &str = "application/gzip";

const MANIFEST: &str = "application/manifest+json";
const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// One row of the encoding/content-type table.
///
/// A row matches when the path ends with `suffix` and, if set, also contains
/// `marker` (e.g. `.wasm.gz` inside a path ending in `.gz`).
struct EncodingRule {
    suffix: &'static str,
    marker: Option<&'static str>,
    encoding: Option<&'static str>,
    content_type: Option<&'static str>,
}

impl EncodingRule {
    const fn new(
        suffix: &'static str,
        marker: Option<&'static str>,
        encoding: Option<&'static str>,
        content_type: Option<&'static str>,
    ) -> Self {
        Self {
            suffix,
            marker,
            encoding,
            content_type,
        }
    }

    fn matches(&self, path: &str) -> bool {
        path.ends_with(self.suffix) && self.marker.map_or(true, |m| path.contains(m))
    }
}

const ENCODING_RULES: &[EncodingRule] = &[
    // gzip
    EncodingRule::new(".gz", Some(".wasm.gz"), Some("gzip"), Some(WASM)),
    EncodingRule::new(".gz", Some(".js.gz"), Some("gzip"), Some(JAVASCRIPT)),
    EncodingRule::new(".gz", Some(".data.gz"), Some("gzip"), Some(OCTET_STREAM)),
    EncodingRule::new(".gz", Some(".symbols.json.gz"), Some("gzip"), Some(JSON)),
    EncodingRule::new(".gz", None, Some("gzip"), Some(GZIP)),
    // brotli
    EncodingRule::new(".br", Some(".wasm.br"), Some("br"), Some(WASM)),
    EncodingRule::new(".br", Some(".js.br"), Some("br"), Some(JAVASCRIPT)),
    EncodingRule::new(".br", Some(".data.br"), Some("br"), Some(OCTET_STREAM)),
    EncodingRule::new(".br", None, Some("br"), None),
    // uncompressed
    EncodingRule::new(".wasm", None, None, Some(WASM)),
    EncodingRule::new(".js", None, None, Some(JAVASCRIPT)),
    EncodingRule::new(".json", None, None, Some(JSON)),
];

/// Headers decided for one request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderDecoration {
    pub content_encoding: Option<&'static str>,
    /// `None` leaves the MIME guesser's choice in place
    pub content_type: Option<&'static str>,
    pub cache_control: Option<&'static str>,
}

impl HeaderDecoration {
    /// Ordered header list: CORS first, then encoding, type and cache control.
    pub fn headers(&self) -> Vec<(HeaderName, &'static str)> {
        let mut headers: Vec<(HeaderName, &'static str)> = cors_headers().into();
        if let Some(encoding) = self.content_encoding {
            headers.push((CONTENT_ENCODING, encoding));
        }
        if let Some(content_type) = self.content_type {
            headers.push((CONTENT_TYPE, content_type));
        }
        if let Some(cache_control) = self.cache_control {
            headers.push((CACHE_CONTROL, cache_control));
        }
        headers
    }

    /// Write the decoration into a response, replacing baseline values.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.headers() {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
}

/// Decide the decoration for a request path.
///
/// Matching runs on the whole lowercased path, so a directory component
/// such as `/x.gz/` participates in the same way a file name does.
pub fn headers_for(path: &str) -> HeaderDecoration {
    let path = path.to_ascii_lowercase();
    let mut decoration = HeaderDecoration::default();

    if let Some(rule) = ENCODING_RULES.iter().find(|r| r.matches(&path)) {
        decoration.content_encoding = rule.encoding;
        decoration.content_type = rule.content_type;
    }

    if path.contains("service-worker.js") {
        decoration.cache_control = Some(NO_CACHE);
    } else if path.contains("manifest.json") {
        decoration.content_type = Some(MANIFEST);
    }

    decoration
}

/// Add only the CORS headers (used for error and redirect responses)
pub fn apply_cors(headers: &mut HeaderMap) {
    for (name, value) in cors_headers() {
        headers.insert(name, HeaderValue::from_static(value));
    }
}
