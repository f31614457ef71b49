//! Embedded static assets for the portfolio site.
//!
//! All files are compiled into the binary via `include_str!` so the binary
//! is fully self-contained; only the two documents live on disk.

/// Stylesheet for the portfolio page.
///
/// Loaded from `src/assets/folio.css` at compile time.
pub const CSS: &str = include_str!("assets/folio.css");

/// Keeps the page scroll position across navigation-form submissions.
pub const JS: &str = include_str!("assets/folio.js");

/// Profile used when `--profile` is not given.
pub const DEFAULT_PROFILE: &str = include_str!("assets/profile.yml");
