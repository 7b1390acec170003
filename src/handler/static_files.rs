//! Static file serving module
//!
//! Maps request paths onto the served directory, handles index files and
//! directory listings, and builds file responses with validators.

use crate::config::FilesConfig;
use crate::handler::listing::{self, ListingEntry};
use crate::handler::router::RequestContext;
use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use percent_encoding::percent_decode_str;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Translate a URL path into a path relative to the served directory.
///
/// The path is percent-decoded, empty and `.` segments are dropped and `..`
/// removes the previous segment without ever climbing above the root.
pub fn translate_path(request_path: &str) -> PathBuf {
    let decoded = percent_decode_str(request_path).decode_utf8_lossy();
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    segments.iter().collect()
}

/// Serve a GET/HEAD request from `root`
pub async fn serve(
    ctx: &RequestContext<'_>,
    root: &Path,
    files: &FilesConfig,
) -> Response<Full<Bytes>> {
    let root_canonical = match fs::canonicalize(root).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Static directory not found or inaccessible '{}': {e}",
                root.display()
            ));
            return http::build_404_response();
        }
    };

    let target = root_canonical.join(translate_path(ctx.path));

    // Missing files are common (404), no need to log them
    let Ok(metadata) = fs::metadata(&target).await else {
        return http::build_404_response();
    };

    if metadata.is_dir() {
        if !ctx.path.ends_with('/') {
            return http::build_moved_permanently(&directory_location(ctx.path, ctx.query));
        }

        for index_file in &files.index_files {
            let index_path = target.join(index_file);
            if fs::metadata(&index_path).await.is_ok_and(|m| m.is_file()) {
                return serve_file(ctx, &root_canonical, &index_path).await;
            }
        }

        if files.directory_listing {
            return list_directory(ctx, &root_canonical, &target).await;
        }
        return http::build_404_response();
    }

    // A file addressed like a directory does not exist
    if ctx.path.ends_with('/') {
        return http::build_404_response();
    }

    serve_file(ctx, &root_canonical, &target).await
}

/// `Location` for a directory requested without its trailing slash.
///
/// Leading slashes and backslashes collapse to one `/`, so the target is
/// always a path on this server and never `//host/...`.
fn directory_location(request_path: &str, query: Option<&str>) -> String {
    let mut location = format!("/{}", request_path.trim_start_matches(['/', '\\']));
    if !location.ends_with('/') {
        location.push('/');
    }
    if let Some(q) = query {
        location.push('?');
        location.push_str(q);
    }
    location
}

/// Resolve symlinks and make sure the result stays inside the root
async fn contained_path(root_canonical: &Path, path: &Path, request_path: &str) -> Option<PathBuf> {
    let canonical = fs::canonicalize(path).await.ok()?;
    if canonical.starts_with(root_canonical) {
        Some(canonical)
    } else {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            canonical.display()
        ));
        None
    }
}

async fn serve_file(
    ctx: &RequestContext<'_>,
    root_canonical: &Path,
    file_path: &Path,
) -> Response<Full<Bytes>> {
    let Some(canonical) = contained_path(root_canonical, file_path, ctx.path).await else {
        return http::build_404_response();
    };

    let metadata = match fs::metadata(&canonical).await {
        Ok(m) => m,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to stat file '{}': {e}",
                canonical.display()
            ));
            return http::build_404_response();
        }
    };

    let modified = metadata.modified().ok();
    let last_modified = modified.map(cache::format_http_date);
    let etag = cache::generate_etag(metadata.len(), modified);

    if cache::is_not_modified(
        ctx.if_none_match.as_deref(),
        ctx.if_modified_since.as_deref(),
        &etag,
        modified,
    ) {
        return http::build_304_response(&etag, last_modified.as_deref());
    }

    // Guess from the name the client asked for (or the index file chosen)
    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));

    // HEAD answers from metadata alone
    let body = if ctx.is_head {
        Bytes::new()
    } else {
        match fs::read(&canonical).await {
            Ok(c) => Bytes::from(c),
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to read file '{}': {e}",
                    canonical.display()
                ));
                return http::build_404_response();
            }
        }
    };
    let content_length = if ctx.is_head {
        metadata.len()
    } else {
        body.len() as u64
    };

    http::build_file_response(
        body,
        content_length,
        content_type,
        &etag,
        last_modified.as_deref(),
    )
}

async fn list_directory(
    ctx: &RequestContext<'_>,
    root_canonical: &Path,
    dir: &Path,
) -> Response<Full<Bytes>> {
    let Some(canonical) = contained_path(root_canonical, dir, ctx.path).await else {
        return http::build_404_response();
    };

    let mut read_dir = match fs::read_dir(&canonical).await {
        Ok(r) => r,
        Err(e) => {
            logger::log_warning(&format!(
                "No permission to list directory '{}': {e}",
                canonical.display()
            ));
            return http::build_404_response();
        }
    };

    let mut entries = Vec::new();
    while let Ok(Some(entry)) = read_dir.next_entry().await {
        let is_symlink = entry.file_type().await.is_ok_and(|t| t.is_symlink());
        // Follows symlinks, so a link to a directory is listed as one
        let is_dir = fs::metadata(entry.path()).await.is_ok_and(|m| m.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }

    let display_path = percent_decode_str(ctx.path).decode_utf8_lossy();
    let html = listing::render_listing(&display_path, entries);
    http::build_html_response(html, ctx.is_head)
}
