//! Document configuration resolved at startup.
//!
//! Paths come from the profile file and may be overridden on the command
//! line. Either document may be unset; a set path is not checked here, since
//! the file is looked up again on every render pass.

use std::path::PathBuf;

use crate::embed::DocumentReference;
use crate::profile::{DocumentEntry, DocumentSettings};

/// The two documents the site knows how to embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Resume,
    CodePractice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Resume, DocumentKind::CodePractice];

    /// Path segment under `/documents/`.
    pub fn slug(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CodePractice => "code-practice",
        }
    }

    pub fn from_slug(raw: &str) -> Option<DocumentKind> {
        DocumentKind::ALL.into_iter().find(|k| k.slug() == raw)
    }

    /// Human-readable name used in notices and button captions.
    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Resume => "Resume PDF",
            DocumentKind::CodePractice => "Code Practice PDF",
        }
    }

    pub fn default_height(self) -> u32 {
        match self {
            DocumentKind::Resume => 700,
            DocumentKind::CodePractice => 800,
        }
    }

    pub fn url_path(self) -> String {
        format!("/documents/{}", self.slug())
    }
}

/// Command-line replacements for the profile's document paths.
#[derive(Debug, Clone, Default)]
pub struct DocumentOverrides {
    pub resume: Option<PathBuf>,
    pub code_practice: Option<PathBuf>,
}

/// The configured documents, immutable for the life of the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    resume: Option<DocumentReference>,
    code_practice: Option<DocumentReference>,
}

impl DocumentSet {
    /// Merge profile settings with command-line overrides. An override
    /// replaces the path only; height and download name still come from the
    /// profile entry when it has them.
    pub fn resolve(settings: &DocumentSettings, overrides: &DocumentOverrides) -> Self {
        Self {
            resume: build_reference(
                DocumentKind::Resume,
                settings.resume.as_ref(),
                overrides.resume.as_ref(),
            ),
            code_practice: build_reference(
                DocumentKind::CodePractice,
                settings.code_practice.as_ref(),
                overrides.code_practice.as_ref(),
            ),
        }
    }

    pub fn get(&self, kind: DocumentKind) -> Option<&DocumentReference> {
        match kind {
            DocumentKind::Resume => self.resume.as_ref(),
            DocumentKind::CodePractice => self.code_practice.as_ref(),
        }
    }
}

fn build_reference(
    kind: DocumentKind,
    entry: Option<&DocumentEntry>,
    override_path: Option<&PathBuf>,
) -> Option<DocumentReference> {
    let path = override_path.or(entry.map(|e| &e.path))?;
    let height = entry
        .and_then(|e| e.height)
        .filter(|h| *h > 0)
        .unwrap_or_else(|| kind.default_height());
    let reference = DocumentReference::new(path.clone(), height);
    Some(match entry.and_then(|e| e.filename.clone()) {
        Some(name) => reference.with_download_name(name),
        None => reference,
    })
}
