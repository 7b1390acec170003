//! Request dispatch module
//!
//! Entry point for HTTP request processing: CORS preflight short-circuit,
//! method validation, static file resolution, header decoration and the
//! access log.

use crate::config::AppState;
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URI path
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub is_head: bool,
    pub if_none_match: Option<String>,
    pub if_modified_since: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let response = dispatch(&req, &state).await;

    if state.access_log_enabled() {
        let entry = build_access_entry(&req, &response, peer_addr, started);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn dispatch<B>(req: &Request<B>, state: &AppState) -> Response<Full<Bytes>> {
    let method = req.method();

    // Preflight never touches the filesystem
    if method == Method::OPTIONS {
        return http::build_options_response();
    }

    if method != Method::GET && method != Method::HEAD {
        logger::log_warning(&format!("Method not allowed: {method}"));
        let mut response = http::build_405_response();
        http::apply_cors(response.headers_mut());
        return response;
    }

    let uri = req.uri();
    let ctx = RequestContext {
        path: uri.path(),
        query: uri.query(),
        is_head: method == Method::HEAD,
        if_none_match: header_string(req, "if-none-match"),
        if_modified_since: header_string(req, "if-modified-since"),
    };

    let decoration = http::headers_for(ctx.path);
    let mut response = static_files::serve(&ctx, &state.root, &state.config.files).await;

    let status = response.status();
    if status.is_success() || status == StatusCode::NOT_MODIFIED {
        decoration.apply(response.headers_mut());
    } else {
        // Errors and redirects carry CORS only: a missing `.wasm.gz` is
        // never labelled `Content-Encoding: gzip`
        http::apply_cors(response.headers_mut());
    }

    response
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn build_access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
    entry.referer = header_string(req, "referer");
    entry.user_agent = header_string(req, "user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::cli::Cli;
    use clap::Parser;
    use std::path::Path;

    fn state_for(root: &Path) -> Arc<AppState> {
        let cli = Cli::try_parse_from(["webgl-devserver"]).unwrap();
        let mut config = Config::load(&cli).unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::new(config, root.to_path_buf()))
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> Response<Full<Bytes>> {
        let peer: SocketAddr = "127.0.0.1:40000".parse().unwrap();
        handle_request(req, peer, Arc::clone(state)).await.unwrap()
    }

    async fn body_bytes(resp: Response<Full<Bytes>>) -> Bytes {
        use http_body_util::BodyExt;
        resp.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_options_skips_filesystem() {
        let state = state_for(Path::new("/definitely/not/a/real/root"));
        let resp = send(&state, request(Method::OPTIONS, "/Build/game.wasm.gz")).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().len(), 3);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["access-control-allow-methods"], "GET, POST, OPTIONS");
        assert_eq!(resp.headers()["access-control-allow-headers"], "Content-Type");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());
        let resp = send(&state, request(Method::GET, "/missing-file.txt")).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(resp.headers()["content-type"], "text/plain");
    }

    #[tokio::test]
    async fn test_missing_compressed_file_not_labelled() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());
        let resp = send(&state, request(Method::GET, "/Build/game.wasm.gz")).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(resp.headers().get("content-encoding").is_none());
    }

    #[tokio::test]
    async fn test_gzip_wasm_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Build")).unwrap();
        std::fs::write(dir.path().join("Build/game.wasm.gz"), b"\x1f\x8bfake").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/Build/game.wasm.gz")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-encoding"], "gzip");
        assert_eq!(resp.headers()["content-type"], "application/wasm");
        assert_eq!(resp.headers()["content-length"], "6");
        assert!(resp.headers().contains_key("etag"));
        assert!(resp.headers().contains_key("last-modified"));
        assert_eq!(resp.headers().get_all("content-type").iter().count(), 1);
        assert_eq!(body_bytes(resp).await.as_ref(), b"\x1f\x8bfake");
    }

    #[tokio::test]
    async fn test_brotli_js_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.framework.js.br"), b"br").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/game.framework.js.br")).await;
        assert_eq!(resp.headers()["content-encoding"], "br");
        assert_eq!(resp.headers()["content-type"], "application/javascript");
    }

    #[tokio::test]
    async fn test_pwa_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("service-worker.js"), b"self;").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/manifest.json")).await;
        assert_eq!(resp.headers()["content-type"], "application/manifest+json");

        let resp = send(&state, request(Method::GET, "/service-worker.js")).await;
        assert_eq!(
            resp.headers()["cache-control"],
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(resp.headers()["content-type"], "application/javascript");
    }

    #[tokio::test]
    async fn test_fallback_mime_guess() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("style.css"), b"body{}").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/style.css")).await;
        assert_eq!(resp.headers()["content-type"], "text/css");
        assert!(resp.headers().get("content-encoding").is_none());
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.wasm"), b"\0asm").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::HEAD, "/game.wasm")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-length"], "4");
        assert_eq!(resp.headers()["content-type"], "application/wasm");
        assert!(body_bytes(resp).await.is_empty());
    }

    #[tokio::test]
    async fn test_head_and_get_share_validators() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.data"), vec![7u8; 4096]).unwrap();
        let state = state_for(dir.path());

        let head = send(&state, request(Method::HEAD, "/game.data")).await;
        let get = send(&state, request(Method::GET, "/game.data")).await;
        assert_eq!(head.headers()["etag"], get.headers()["etag"]);
        assert_eq!(head.headers()["last-modified"], get.headers()["last-modified"]);
        assert_eq!(head.headers()["content-length"], "4096");
        assert_eq!(body_bytes(get).await.len(), 4096);
    }

    #[tokio::test]
    async fn test_index_file_and_redirect() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("game")).unwrap();
        std::fs::write(dir.path().join("game/index.html"), b"<html></html>").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/game?lang=en")).await;
        assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(resp.headers()["location"], "/game/?lang=en");

        let resp = send(&state, request(Method::GET, "/game/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(body_bytes(resp).await.as_ref(), b"<html></html>");
    }

    #[tokio::test]
    async fn test_redirect_never_leaves_host() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        for uri in ["//evil.example/..", "//evil.example/%2e%2e", "///evil.example/.."] {
            let resp = send(&state, request(Method::GET, uri)).await;
            assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY, "{uri}");
            let location = resp.headers()["location"].to_str().unwrap();
            assert!(location.starts_with('/'), "{uri} -> {location}");
            assert!(!location.starts_with("//"), "{uri} -> {location}");
        }
    }

    #[tokio::test]
    async fn test_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Build")).unwrap();
        std::fs::write(dir.path().join("Build/game.data"), b"data").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/Build/")).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let html = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
        assert!(html.contains("Directory listing for /Build/"));
        assert!(html.contains("href=\"game.data\""));
    }

    #[tokio::test]
    async fn test_listing_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from(["webgl-devserver"]).unwrap();
        let mut config = Config::load(&cli).unwrap();
        config.logging.access_log = false;
        config.files.directory_listing = false;
        let state = Arc::new(AppState::new(config, dir.path().to_path_buf()));

        let resp = send(&state, request(Method::GET, "/")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_404() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.js"), b"1").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/game.js/")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_traversal_stays_inside_root() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("site");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
        let state = state_for(&root);

        let resp = send(&state, request(Method::GET, "/../secret.txt")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let resp = send(&state, request(Method::GET, "/%2e%2e/secret.txt")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_escape_blocked() {
        let outer = tempfile::tempdir().unwrap();
        let root = outer.path().join("site");
        std::fs::create_dir(&root).unwrap();
        std::fs::write(outer.path().join("secret.txt"), b"secret").unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("link.txt")).unwrap();
        let state = state_for(&root);

        let resp = send(&state, request(Method::GET, "/link.txt")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_conditional_get() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("game.data"), b"payload").unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::GET, "/game.data")).await;
        let etag = resp.headers()["etag"].to_str().unwrap().to_string();
        let last_modified = resp.headers()["last-modified"].to_str().unwrap().to_string();

        let req = Request::builder()
            .uri("/game.data")
            .header("If-None-Match", &etag)
            .body(())
            .unwrap();
        let resp = send(&state, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");

        let req = Request::builder()
            .uri("/game.data")
            .header("If-Modified-Since", &last_modified)
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::NOT_MODIFIED);

        let req = Request::builder()
            .uri("/game.data")
            .header("If-None-Match", "\"stale\"")
            .body(())
            .unwrap();
        assert_eq!(send(&state, req).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_other_methods_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_for(dir.path());

        let resp = send(&state, request(Method::POST, "/")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "GET, HEAD, OPTIONS");
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
