//! Section renderers and the render pass.
//!
//! [`render_section`] maps each [`SectionId`] to exactly one renderer via an
//! exhaustive match. Every body is wrapped in a single
//! `<section class="section-body" data-section="...">` element.

use crate::config::{DocumentKind, DocumentSet};
use crate::embed::{self, EmbedError};
use crate::html::{self, html_escape, NoticeLevel, PageShellContext};
use crate::navigation::SectionId;
use crate::profile::{Certification, ProfileContent, TimelineEntry};

/// Read-only inputs for a render pass.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub profile: &'a ProfileContent,
    pub documents: &'a DocumentSet,
}

/// Render the complete page for `section`.
///
/// Runs to completion synchronously; document files are read here, once
/// each, with no retries.
pub fn render_page(ctx: RenderContext<'_>, section: SectionId) -> String {
    let body = render_section(ctx, section);
    let resume_available = ctx
        .documents
        .get(DocumentKind::Resume)
        .is_some_and(|r| embed::probe(r).is_ok());
    let shell = PageShellContext {
        name: &ctx.profile.name,
        active: section,
        contacts: &ctx.profile.contacts,
        resume_available,
        footer: &ctx.profile.footer,
    };
    html::build_page_shell(&body, &shell)
}

/// Render the body of one section.
pub fn render_section(ctx: RenderContext<'_>, section: SectionId) -> String {
    let inner = match section {
        SectionId::Home => render_home(ctx),
        SectionId::Journey => render_journey(ctx),
        SectionId::Skills => render_skills(ctx),
        SectionId::Projects => render_projects(ctx),
        SectionId::Experience => render_timeline("Experience", &ctx.profile.experience),
        SectionId::Education => render_timeline("Education", &ctx.profile.education),
        SectionId::CodePractice => render_code_practice(ctx),
        SectionId::Certifications => render_certifications(&ctx.profile.certifications),
    };
    format!(
        "<section class=\"section-body\" data-section=\"{}\">\n{inner}</section>\n",
        section.slug()
    )
}

fn render_home(ctx: RenderContext<'_>) -> String {
    let p = ctx.profile;
    let mut html = format!(
        "<div class=\"hero\">\n<h1>{}</h1>\n<p class=\"hero-title\">{}</p>\n</div>\n",
        html_escape(&p.name),
        html_escape(&p.title)
    );
    if !p.tagline.trim().is_empty() {
        html.push_str(&format!(
            "<blockquote class=\"tagline\">“{}”</blockquote>\n",
            html_escape(p.tagline.trim())
        ));
    }
    if !p.summary.trim().is_empty() {
        html.push_str(&format!(
            "<div class=\"summary\">\n{}</div>\n",
            html::render_markdown(&p.summary)
        ));
    }
    // The resume is optional on the home page: nothing is said when unset.
    if ctx.documents.get(DocumentKind::Resume).is_some() {
        html.push_str("<h2>Resume</h2>\n");
        html.push_str(&document_block(ctx.documents, DocumentKind::Resume));
    }
    html
}

fn render_journey(ctx: RenderContext<'_>) -> String {
    format!(
        "<h2>My Journey</h2>\n<div class=\"story\">\n{}</div>\n<hr>\n",
        html::render_markdown(&ctx.profile.journey)
    )
}

fn render_skills(ctx: RenderContext<'_>) -> String {
    let skills = &ctx.profile.skills;
    let (left, right) = skills.split_at(skills.len().div_ceil(2));
    let column = |items: &[String]| {
        let mut col = String::from("<div class=\"column\">\n");
        for skill in items {
            col.push_str(&format!("<span class=\"badge\">{}</span>\n", html_escape(skill)));
        }
        col.push_str("</div>\n");
        col
    };
    format!(
        "<h2>Skills</h2>\n<div class=\"columns\">\n{}{}</div>\n",
        column(left),
        column(right)
    )
}

fn render_projects(ctx: RenderContext<'_>) -> String {
    let mut html = String::from("<h2>Projects</h2>\n");
    for project in &ctx.profile.projects {
        html.push_str(&format!(
            "<article class=\"project\">\n<h3>{}</h3>\n",
            html_escape(&project.title)
        ));
        if let Some(url) = ctx.profile.project_url(project) {
            let url = html_escape(&url);
            html.push_str(&format!(
                "<p><a href=\"{url}\" target=\"_blank\" rel=\"noopener\">{url}</a></p>\n"
            ));
        }
        html.push_str("</article>\n<hr>\n");
    }
    html
}

fn render_timeline(heading: &str, entries: &[TimelineEntry]) -> String {
    let mut html = format!("<h2>{heading}</h2>\n");
    for entry in entries {
        html.push_str(&format!(
            "<article class=\"timeline-entry\">\n<p><strong>{}</strong> — {}</p>\n<p>{}</p>\n</article>\n<hr>\n",
            html_escape(&entry.title),
            html_escape(&entry.period),
            html_escape(&entry.description)
        ));
    }
    html
}

fn render_code_practice(ctx: RenderContext<'_>) -> String {
    let mut html = String::from(
        "<h2>Code Practice — Practice Reports &amp; Solutions</h2>\n\
<p>Below is the Code Practice PDF showcasing problem-solving skills and coding exercises.</p>\n",
    );
    html.push_str(&document_block(ctx.documents, DocumentKind::CodePractice));
    html
}

fn render_certifications(certs: &[Certification]) -> String {
    // First two certificates in the left column, the rest on the right.
    let (left, right) = certs.split_at(certs.len().min(2));
    let column = |items: &[Certification]| {
        let mut col = String::from("<div class=\"column\">\n");
        for cert in items {
            col.push_str(&certification_card(cert));
        }
        col.push_str("</div>\n");
        col
    };
    format!(
        "<h2>Certifications</h2>\n<h3>Verified Certificates &amp; Job Simulations</h3>\n<hr>\n\
<div class=\"columns\">\n{}{}</div>\n",
        column(left),
        column(right)
    )
}

fn certification_card(cert: &Certification) -> String {
    let image = match cert.image.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(src) => format!(
            "<img src=\"{}\" alt=\"{}\">\n",
            html_escape(src),
            html_escape(&cert.title)
        ),
        None => String::new(),
    };
    let link = if cert.credential_url.trim().is_empty() {
        String::new()
    } else {
        format!(
            "<a class=\"credential-link\" href=\"{}\" target=\"_blank\" rel=\"noopener\">View Credential</a>\n",
            html_escape(cert.credential_url.trim())
        )
    };
    format!(
        "<div class=\"cert-card\">\n{image}<h4>{}</h4>\n\
<p><strong>Issued:</strong> {}</p>\n\
<p><strong>Issuer:</strong> {}</p>\n\
<p><strong>Credential ID:</strong> {}</p>\n\
{link}</div>\n",
        html_escape(&cert.title),
        html_escape(&cert.date),
        html_escape(&cert.issuer),
        html_escape(&cert.credential_id),
    )
}

/// Inline viewer plus download button for a document, or a notice.
///
/// The download button is only offered when `/documents/{kind}` can serve
/// the file: after a successful embed, or when it is merely too large to
/// inline. Missing and unreadable files get a notice and nothing else.
pub fn document_block(documents: &DocumentSet, kind: DocumentKind) -> String {
    let label = kind.label();
    let Some(reference) = documents.get(kind) else {
        return html::notice_html(NoticeLevel::Info, &format!("{label} is not available."));
    };

    match embed::embed(reference) {
        Ok(doc) => {
            let mut html = doc.viewer_html();
            html.push_str(&html::download_button_html(kind, reference.download_name()));
            html
        }
        Err(err) => {
            tracing::warn!(document = kind.slug(), error = %err, "document not embedded");
            let message = match &err {
                EmbedError::Missing { path } => {
                    format!("{label} not found at {}", path.display())
                }
                EmbedError::Unreadable { source, .. } => {
                    format!("Could not open {label} (error: {source}).")
                }
                EmbedError::TooLarge { size, limit, .. } => format!(
                    "{label} is too large to embed inline ({size} bytes, limit {limit}). You can download it below."
                ),
            };
            let mut html = html::notice_html(NoticeLevel::Warning, &message);
            if err.is_downloadable() {
                html.push_str(&html::download_button_html(kind, reference.download_name()));
            }
            html
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
