//! Development server.
//!
//! A lightweight HTTP server over the output root, built on `tiny_http`:
//!
//! - Static file serving from the output directory
//! - Automatic `index.html` resolution for directories
//! - Optional regeneration on source changes (via the `watch` module)
//! - Graceful shutdown on Ctrl+C
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │   Main Thread   │     │  Watcher Thread  │
//! │  (HTTP Server)  │     │  (File Monitor)  │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//!          ▼                       ▼
//!    Handle requests         Detect changes
//!    Serve files             Regenerate site
//! └─────────────────────────────────────────────┘
//!                    │
//!                    ▼
//!               config.output
//! ```

use crate::{config::SiteConfig, log, watch::watch_for_changes_blocking};
use anyhow::{Context, Result, anyhow};
use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Serve the output root until Ctrl+C, optionally regenerating on change.
pub fn serve_site(config: Arc<SiteConfig>, watch: bool) -> Result<()> {
    let interface: IpAddr = config
        .server
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.server.interface))?;

    let (server, addr) = try_bind_port(interface, config.server.port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    log!("serve"; "http://{}", addr);

    if watch {
        let watched = Arc::clone(&config);
        thread::spawn(move || {
            if let Err(err) = watch_for_changes_blocking(&watched) {
                log!("error"; "watch stopped: {:#}", err);
            }
        });
    }

    // Blocks until Ctrl+C unblocks the server
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &config.output) {
            log!("error"; "request failed: {:#}", err);
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(interface: IpAddr, base_port: u16, max_retries: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            Err(err) => last_error = Some(err),
        }
    }

    Err(anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map_or_else(|| "no attempt made".to_owned(), |err| err.to_string())
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Map a request URL to a file under `root`.
///
/// Resolution order: exact file, then `index.html` inside a directory.
/// Paths escaping the root are never resolved.
fn resolve_path(root: &Path, url: &str) -> Option<PathBuf> {
    let decoded = urlencoding::decode(url).map(std::borrow::Cow::into_owned).ok()?;

    // Strip query string before resolving path
    let path = decoded.split(['?', '#']).next().unwrap_or_default();
    let request_path = path.trim_matches('/');
    if request_path.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local_path = root.join(request_path);
    if local_path.is_file() {
        return Some(local_path);
    }

    let index = local_path.join("index.html");
    index.is_file().then_some(index)
}

/// Handle a single HTTP request.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    let url = request.url().to_owned();

    match resolve_path(root, &url) {
        Some(path) => {
            log!("serve"; "{} {} -> 200", request.method(), url);
            serve_file(request, &path)
        }
        None => {
            log!("serve"; "{} {} -> 404", request.method(), url);
            serve_not_found(request)
        }
    }
}

// ============================================================================
// Response Helpers
// ============================================================================

fn content_type_header(value: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", value).map_err(|()| anyhow!("Invalid header value `{value}`"))
}

/// Serve a file with appropriate content type.
fn serve_file(request: Request, path: &Path) -> Result<()> {
    let content = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let response =
        Response::from_data(content).with_header(content_type_header(guess_content_type(path))?);

    request.respond(response)?;
    Ok(())
}

/// Serve 404 Not Found response.
fn serve_not_found(request: Request) -> Result<()> {
    let response = Response::from_string("404 Not Found")
        .with_status_code(StatusCode(404))
        .with_header(content_type_header("text/plain; charset=utf-8")?);

    request.respond(response)?;
    Ok(())
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `application/octet-stream` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        // Web content
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "application/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("xml") => "application/xml; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",

        Some("txt") => "text/plain; charset=utf-8",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn output() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("blog/2024")).unwrap();
        fs::write(dir.path().join("index.html"), "home").unwrap();
        fs::write(dir.path().join("blog/2024/index.html"), "archive").unwrap();
        fs::write(dir.path().join("my post.html"), "spaced").unwrap();
        dir
    }

    #[test]
    fn test_resolve_file_and_index() {
        let dir = output();
        let root = dir.path();

        assert_eq!(resolve_path(root, "/"), Some(root.join("index.html")));
        assert_eq!(resolve_path(root, "/index.html"), Some(root.join("index.html")));
        assert_eq!(
            resolve_path(root, "/blog/2024/"),
            Some(root.join("blog/2024").join("index.html"))
        );
    }

    #[test]
    fn test_resolve_decodes_and_strips_query() {
        let dir = output();
        let root = dir.path();

        assert_eq!(resolve_path(root, "/my%20post.html?t=1"), Some(root.join("my post.html")));
    }

    #[test]
    fn test_resolve_missing_and_escaping() {
        let dir = output();
        let root = dir.path();

        assert_eq!(resolve_path(root, "/blog"), None);
        assert_eq!(resolve_path(root, "/nope.html"), None);
        assert_eq!(resolve_path(root, "/../secret"), None);
    }

    #[test]
    fn test_guess_content_type() {
        assert_eq!(guess_content_type(Path::new("a.html")), "text/html; charset=utf-8");
        assert_eq!(guess_content_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(guess_content_type(Path::new("a.bin")), "application/octet-stream");
    }

    #[test]
    fn test_bind_retries_next_port() {
        let (first, addr) = try_bind_port("127.0.0.1".parse().unwrap(), 0, 1).unwrap();
        let port = first.server_addr().to_ip().unwrap().port();
        assert_eq!(addr.port(), 0);

        let (_second, addr) = try_bind_port("127.0.0.1".parse().unwrap(), port, 5).unwrap();
        assert_ne!(addr.port(), port);
    }
}
