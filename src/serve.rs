use std::io;
use std::net::TcpListener;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use tokio::io::AsyncReadExt;
use tokio::signal;
use tokio_util::io::ReaderStream;
use tower_http::compression::CompressionLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::{DocumentKind, DocumentSet};
use crate::embed::EmbedError;
use crate::error::{AppError, Result};
use crate::navigation::{NavigationController, SectionId};
use crate::profile::{ProfileContent, ProfileSource};
use crate::sections::{self, RenderContext};
use crate::web_assets;

/// Maximum number of consecutive ports to try before giving up.
const MAX_PORT_ATTEMPTS: u16 = 100;

/// Shared, immutable application state passed to all request handlers via
/// `Arc<AppState>`. Navigation state is not here: it belongs to each
/// session's cookie.
pub struct AppState {
    pub profile: ProfileContent,
    pub documents: DocumentSet,
}

impl AppState {
    pub fn render_context(&self) -> RenderContext<'_> {
        RenderContext {
            profile: &self.profile,
            documents: &self.documents,
        }
    }
}

/// Attempt to bind a TCP listener on `bind_addr` starting at `start_port`.
///
/// On `EADDRINUSE` the port is incremented by one and the attempt is retried up
/// to `MAX_PORT_ATTEMPTS` times.  Any other OS error causes an immediate failure
/// without further retries.
pub fn bind_with_retry(bind_addr: &str, start_port: u16) -> Result<(TcpListener, u16)> {
    let mut port = start_port;
    tracing::debug!(port, "trying port");
    for _ in 0..MAX_PORT_ATTEMPTS {
        let addr = format!("{}:{}", bind_addr, port);
        match TcpListener::bind(&addr) {
            Ok(listener) => {
                tracing::debug!(port, "bound");
                return Ok((listener, port));
            }
            Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                let next = port.wrapping_add(1);
                tracing::debug!(port, next, "address in use");
                port = next;
            }
            Err(e) => {
                return Err(AppError::Bind(format!(
                    "bind {}:{} failed: {}",
                    bind_addr, port, e
                )));
            }
        }
    }
    Err(AppError::Bind(format!(
        "exhausted {} port candidates starting at {}; all ports in use",
        MAX_PORT_ATTEMPTS, start_port,
    )))
}

// ---------------------------------------------------------------------------
// Conditional GET helpers
// ---------------------------------------------------------------------------

/// Weak validator built from file size and modification time.
fn weak_etag(size: u64, modified: Option<SystemTime>) -> String {
    let secs = modified
        .and_then(|m| m.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("W/\"{:x}-{:x}\"", size, secs)
}

fn strip_weak(tag: &str) -> &str {
    tag.trim().trim_start_matches("W/")
}

/// Decide whether a `304 Not Modified` applies.
///
/// `If-None-Match` takes precedence; `If-Modified-Since` is only consulted
/// when it is absent.
fn is_not_modified(headers: &HeaderMap, etag: &str, modified: Option<SystemTime>) -> bool {
    if let Some(inm) = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
    {
        return inm
            .split(',')
            .any(|candidate| candidate.trim() == "*" || strip_weak(candidate) == strip_weak(etag));
    }

    let (Some(since), Some(modified)) = (
        headers
            .get(header::IF_MODIFIED_SINCE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| httpdate::parse_http_date(v).ok()),
        modified,
    ) else {
        return false;
    };
    // HTTP dates have one-second resolution.
    let modified_secs = modified
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let since_secs = since
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    modified_secs <= since_secs
}

/// Build a `Content-Disposition` value that is always a valid header.
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c == ' ' || c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn not_found_response() -> Response {
    text_response(StatusCode::NOT_FOUND, "Not Found".to_owned())
}

fn not_available_response(kind: DocumentKind) -> Response {
    text_response(
        StatusCode::NOT_FOUND,
        format!("{} is not available", kind.label()),
    )
}

fn internal_error_response(message: String) -> Response {
    text_response(StatusCode::INTERNAL_SERVER_ERROR, message)
}

fn text_response(status: StatusCode, body: String) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .body(Body::from(body))
        .expect("text response builder is infallible")
}

fn asset_response(content_type: &'static str, body: &'static str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .expect("asset response builder is infallible")
}

// ---------------------------------------------------------------------------
// Axum request handlers
// ---------------------------------------------------------------------------

/// Render the page for the session's current section.
///
/// The section is read once from the cookie; the render pass itself runs on
/// the blocking pool because it reads document files synchronously.
async fn page_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let section = NavigationController::from_headers(&headers).current_section();
    let render_state = Arc::clone(&state);
    let rendered = tokio::task::spawn_blocking(move || {
        sections::render_page(render_state.render_context(), section)
    })
    .await;

    match rendered {
        Ok(page) => {
            tracing::info!(section = section.slug(), bytes = page.len(), "rendered page");
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
                .header(header::CACHE_CONTROL, "no-store")
                .body(Body::from(page))
                .expect("page response builder is infallible")
        }
        Err(e) => {
            tracing::error!(section = section.slug(), error = %e, "render pass failed");
            internal_error_response("render failed".to_owned())
        }
    }
}

/// Select a section for this session and send the browser back to `/`.
async fn select_handler(Path(slug): Path<String>, headers: HeaderMap) -> Response {
    let Some(section) = SectionId::from_slug(&slug) else {
        tracing::debug!(slug = %slug, "select: unknown section");
        return not_found_response();
    };
    let mut nav = NavigationController::from_headers(&headers);
    nav.select(section);
    tracing::debug!(section = section.slug(), "select");

    Response::builder()
        .status(StatusCode::SEE_OTHER)
        .header(header::LOCATION, "/")
        .header(header::SET_COOKIE, nav.set_cookie_header())
        .header(header::CACHE_CONTROL, "no-store")
        .body(Body::empty())
        .expect("select response builder is infallible")
}

/// Stream a configured document as a download.
///
/// Works whether or not inline embedding of the same document succeeds, and
/// has no size cap: the body is read from the opened handle in chunks.
async fn document_handler(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(kind) = DocumentKind::from_slug(&slug) else {
        return not_found_response();
    };
    let Some(reference) = state.documents.get(kind) else {
        tracing::debug!(document = kind.slug(), reason = "unconfigured", "download denied");
        return not_available_response(kind);
    };
    let path = reference.path();

    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) => return open_failure_response(kind, EmbedError::from_io(path, e)),
    };
    let meta = match file.metadata().await {
        Ok(m) if m.is_file() => m,
        Ok(_) => {
            tracing::warn!(document = kind.slug(), path = %path.display(), reason = "not-a-file", "download denied");
            return internal_error_response(format!("{} could not be read", kind.label()));
        }
        Err(e) => return open_failure_response(kind, EmbedError::from_io(path, e)),
    };

    let size = meta.len();
    let modified = meta.modified().ok();
    let etag = weak_etag(size, modified);
    let last_modified = modified.map(httpdate::fmt_http_date);

    if is_not_modified(&headers, &etag, modified) {
        tracing::debug!(document = kind.slug(), "not modified");
        let mut builder = Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, &etag);
        if let Some(lm) = &last_modified {
            builder = builder.header(header::LAST_MODIFIED, lm);
        }
        return builder
            .body(Body::empty())
            .expect("304 response builder is infallible");
    }

    tracing::info!(document = kind.slug(), size, "download");
    // Bounded by the stat-ed size so the body matches the validators.
    let body = Body::from_stream(ReaderStream::new(file.take(size)));
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, reference.mime())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(reference.download_name()),
        )
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::ETAG, &etag);
    if let Some(lm) = &last_modified {
        builder = builder.header(header::LAST_MODIFIED, lm);
    }
    builder
        .body(body)
        .expect("download response builder is infallible")
}

fn open_failure_response(kind: DocumentKind, err: EmbedError) -> Response {
    if err.is_missing() {
        tracing::debug!(document = kind.slug(), error = %err, "download denied");
        not_available_response(kind)
    } else {
        tracing::warn!(document = kind.slug(), error = %err, "download denied");
        internal_error_response(format!("{} could not be read", kind.label()))
    }
}

async fn css_handler() -> Response {
    asset_response("text/css; charset=utf-8", web_assets::CSS)
}

async fn js_handler() -> Response {
    asset_response("text/javascript; charset=utf-8", web_assets::JS)
}

async fn fallback_handler() -> Response {
    not_found_response()
}

/// Assemble the router. Every response carries `X-Content-Type-Options: nosniff`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(page_handler))
        .route("/select/{section}", post(select_handler))
        .route("/documents/{kind}", get(document_handler))
        .route("/assets/folio.css", get(css_handler))
        .route("/assets/folio.js", get(js_handler))
        .fallback(fallback_handler)
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the HTTP server.
///
/// Binds to `bind_addr` starting at `start_port`, retrying on `EADDRINUSE` up
/// to 100 times.  The server shuts down cleanly when SIGINT (Ctrl+C) is
/// received.
pub async fn run_serve(
    state: AppState,
    source: ProfileSource,
    bind_addr: String,
    start_port: u16,
) -> Result<()> {
    let (std_listener, bound_port) = bind_with_retry(&bind_addr, start_port)?;
    std_listener.set_nonblocking(true)?;
    let listener = tokio::net::TcpListener::from_std(std_listener)?;

    println!("folio serve");
    println!("profile: {source}");
    for kind in DocumentKind::ALL {
        match state.documents.get(kind) {
            Some(r) => println!("{}: {}", kind.slug(), r.path().display()),
            None => println!("{}: (none)", kind.slug()),
        }
    }
    println!("url: http://{}:{}/", bind_addr, bound_port);

    let app = router(Arc::new(state));
    tracing::info!(bind = %bind_addr, port = bound_port, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to install SIGINT handler");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown requested");
        })
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
