//! HTML building blocks for the portfolio page.
//!
//! The page shell (navigation bar, contact bar, footer) is assembled here;
//! section bodies come from [`crate::sections`]. Markdown profile text is
//! rendered with comrak with raw HTML disabled.

use comrak::{markdown_to_html, Options};

use crate::config::DocumentKind;
use crate::navigation::SectionId;
use crate::profile::Contacts;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Everything the shell needs besides the section body.
pub struct PageShellContext<'a> {
    /// Owner name, used in the `<title>`.
    pub name: &'a str,
    /// Section whose body is being shown.
    pub active: SectionId,
    pub contacts: &'a Contacts,
    /// Whether the resume file exists right now. Controls the resume link.
    pub resume_available: bool,
    pub footer: &'a str,
}

/// Severity of an inline notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
}

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

/// Build comrak render options with GFM extensions and secure defaults.
///
/// Raw HTML from profile text is stripped and replaced with
/// `<!-- raw HTML omitted -->`.
fn make_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.strikethrough = true;
    options.extension.table = true;
    options.extension.autolink = true;
    options.render.unsafe_ = false;
    options
}

/// Render a markdown fragment from the profile to HTML.
pub fn render_markdown(source: &str) -> String {
    markdown_to_html(source, &make_options())
}

// ---------------------------------------------------------------------------
// Escaping
// ---------------------------------------------------------------------------

/// Minimal HTML entity escaping for text content and attribute values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// Navigation bar with one POST form per section.
///
/// Identical for every section; the active one is marked on `<body>` only.
pub fn nav_bar_html() -> String {
    let mut html = String::from("<nav class=\"nav-bar\" aria-label=\"Sections\">\n");
    for section in SectionId::ALL {
        html.push_str(&format!(
            "<form class=\"nav-item\" method=\"post\" action=\"/select/{slug}\">\
<button type=\"submit\" data-target=\"{slug}\">{label}</button></form>\n",
            slug = section.slug(),
            label = html_escape(section.label()),
        ));
    }
    html.push_str("</nav>\n");
    html
}

/// Floating contact bar. Blank contacts produce no link at all.
pub fn contact_bar_html(contacts: &Contacts, resume_available: bool) -> String {
    let mut links = String::new();
    for (kind, value) in contacts.entries() {
        let target = if kind.opens_new_tab() {
            " target=\"_blank\" rel=\"noopener\""
        } else {
            ""
        };
        links.push_str(&format!(
            "<a class=\"contact-link\" data-kind=\"{label}\" href=\"{href}\"{target}>{label}</a>\n",
            label = kind.label(),
            href = html_escape(&kind.href(value)),
        ));
    }
    if resume_available {
        links.push_str(&format!(
            "<a class=\"resume-link\" href=\"{}\">resume</a>\n",
            DocumentKind::Resume.url_path()
        ));
    }
    if links.is_empty() {
        return String::new();
    }
    format!("<div class=\"contact-bar\">\n{links}</div>\n")
}

pub fn footer_html(text: &str) -> String {
    format!("<footer>\n<p>{}</p>\n</footer>\n", html_escape(text))
}

pub fn notice_html(level: NoticeLevel, message: &str) -> String {
    let class = match level {
        NoticeLevel::Info => "notice notice-info",
        NoticeLevel::Warning => "notice notice-warning",
    };
    format!(
        "<div class=\"{class}\" role=\"status\">{}</div>\n",
        html_escape(message)
    )
}

/// Standalone download button that streams the original file.
pub fn download_button_html(kind: DocumentKind, download_name: &str) -> String {
    format!(
        "<a class=\"download-button\" href=\"{href}\" download=\"{name}\">Download {label}</a>\n",
        href = kind.url_path(),
        name = html_escape(download_name),
        label = kind.label(),
    )
}

// ---------------------------------------------------------------------------
// Page shell
// ---------------------------------------------------------------------------

/// Wrap a rendered section body in the full HTML document.
pub fn build_page_shell(section_html: &str, ctx: &PageShellContext) -> String {
    let title = html_escape(ctx.name);
    let active = ctx.active.slug();
    let nav_html = nav_bar_html();
    let contact_html = contact_bar_html(ctx.contacts, ctx.resume_available);
    let footer = footer_html(ctx.footer);

    format!(
        "<!DOCTYPE html>\n\
<html lang=\"en\">\n\
<head>\n\
<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title} · Portfolio</title>\n\
<link rel=\"stylesheet\" href=\"/assets/folio.css\">\n\
</head>\n\
<body data-active=\"{active}\">\n\
{nav_html}\
<main class=\"content\">\n\
{section_html}\
</main>\n\
{contact_html}\
{footer}\
<script src=\"/assets/folio.js\"></script>\n\
</body>\n\
</html>\n"
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
