//! Read-only profile content.
//!
//! Loaded once at startup, either from the YAML file compiled into the
//! binary or from a user-supplied YAML/JSON file, and shared immutably by
//! every request afterwards.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;
use crate::web_assets;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProfileContent {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tagline: String,
    /// Markdown.
    #[serde(default)]
    pub journey: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub experience: Vec<TimelineEntry>,
    #[serde(default)]
    pub education: Vec<TimelineEntry>,
    #[serde(default)]
    pub certifications: Vec<Certification>,
    #[serde(default)]
    pub contacts: Contacts,
    #[serde(default)]
    pub footer: String,
    #[serde(default)]
    pub documents: DocumentSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// An experience or education entry.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TimelineEntry {
    pub title: String,
    #[serde(default)]
    pub period: String,
    #[serde(default, alias = "desc")]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Certification {
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub credential_id: String,
    #[serde(default)]
    pub credential_url: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Contacts {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Email,
    Phone,
    LinkedIn,
    GitHub,
}

impl ContactKind {
    pub fn label(self) -> &'static str {
        match self {
            ContactKind::Email => "email",
            ContactKind::Phone => "phone",
            ContactKind::LinkedIn => "linkedin",
            ContactKind::GitHub => "github",
        }
    }

    /// Link target for `value`: `mailto:`/`tel:` for email and phone, the
    /// value itself for profile URLs.
    pub fn href(self, value: &str) -> String {
        match self {
            ContactKind::Email => format!("mailto:{value}"),
            ContactKind::Phone => {
                let digits: String = value.chars().filter(|c| !c.is_whitespace()).collect();
                format!("tel:{digits}")
            }
            ContactKind::LinkedIn | ContactKind::GitHub => value.to_owned(),
        }
    }

    pub fn opens_new_tab(self) -> bool {
        matches!(self, ContactKind::LinkedIn | ContactKind::GitHub)
    }
}

impl Contacts {
    /// Contacts with a non-blank value, in display order.
    pub fn entries(&self) -> Vec<(ContactKind, &str)> {
        [
            (ContactKind::Email, &self.email),
            (ContactKind::Phone, &self.phone),
            (ContactKind::LinkedIn, &self.linkedin),
            (ContactKind::GitHub, &self.github),
        ]
        .into_iter()
        .filter_map(|(kind, value)| {
            let value = value.as_deref()?.trim();
            (!value.is_empty()).then_some((kind, value))
        })
        .collect()
    }
}

/// Document locations as written in the profile file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct DocumentSettings {
    #[serde(default)]
    pub resume: Option<DocumentEntry>,
    #[serde(default)]
    pub code_practice: Option<DocumentEntry>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct DocumentEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub filename: Option<String>,
}

/// Whether `url` is an absolute `http:` or `https:` link.
pub fn is_web_url(url: &str) -> bool {
    let url = url.trim();
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

fn web_url_or_none(field: &str, value: Option<String>) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() && !is_web_url(&v) => {
            tracing::warn!(field, value = %v, "dropping non-http link from profile");
            None
        }
        other => other,
    }
}

/// Where the running profile came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    Builtin,
    File(PathBuf),
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSource::Builtin => f.write_str("(built-in)"),
            ProfileSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl ProfileContent {
    /// The profile compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let mut profile: ProfileContent = serde_yml::from_str(web_assets::DEFAULT_PROFILE)?;
        profile.drop_unsafe_links();
        Ok(profile)
    }

    /// Load a profile file. `.json` files are parsed as JSON, everything
    /// else as YAML. Relative document paths are resolved against the
    /// file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let mut profile: ProfileContent = if is_json {
            serde_json::from_str(&text)?
        } else {
            serde_yml::from_str(&text)?
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        for entry in [
            profile.documents.resume.as_mut(),
            profile.documents.code_practice.as_mut(),
        ]
        .into_iter()
        .flatten()
        {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }
        profile.drop_unsafe_links();
        Ok(profile)
    }

    /// Clear link values that are not `http(s)` URLs. Email and phone are
    /// exempt: their scheme is added when rendering.
    fn drop_unsafe_links(&mut self) {
        self.contacts.linkedin = web_url_or_none("contacts.linkedin", self.contacts.linkedin.take());
        self.contacts.github = web_url_or_none("contacts.github", self.contacts.github.take());
        for project in &mut self.projects {
            project.url = web_url_or_none("projects.url", project.url.take());
        }
        for cert in &mut self.certifications {
            let url = std::mem::take(&mut cert.credential_url);
            cert.credential_url =
                web_url_or_none("certifications.credential_url", Some(url)).unwrap_or_default();
        }
    }

    /// Load from `path` if given, otherwise fall back to the built-in profile.
    pub fn load(path: Option<&Path>) -> Result<(Self, ProfileSource)> {
        match path {
            Some(p) => {
                let profile = Self::from_file(p)?;
                tracing::info!(path = %p.display(), "loaded profile");
                Ok((profile, ProfileSource::File(p.to_path_buf())))
            }
            None => Ok((Self::builtin()?, ProfileSource::Builtin)),
        }
    }

    /// Link for a project: its explicit URL, or a repository under the
    /// GitHub contact named after the title with spaces replaced by `_`.
    pub fn project_url(&self, project: &Project) -> Option<String> {
        if let Some(url) = project.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            return Some(url.to_owned());
        }
        let github = self.contacts.github.as_deref()?.trim();
        if github.is_empty() {
            return None;
        }
        Some(format!(
            "{}/{}",
            github.trim_end_matches('/'),
            project.title.trim().replace(' ', "_")
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
