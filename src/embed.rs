//! Inline document embedding.
//!
//! [`embed`] reads a configured document, base64-encodes it and produces an
//! `<object>` viewer with a `data:` download fallback. Failures come back as
//! a typed [`EmbedError`] so the caller can tell a missing file from one that
//! could not be read, and render the right notice.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use crate::html::html_escape;

/// Largest document that will be embedded inline (16 MiB). Downloads are
/// not capped.
pub const MAX_DOCUMENT_SIZE: u64 = 16 * 1024 * 1024;

/// A document the site can embed: where it lives, how tall the inline viewer
/// may get, and the filename offered on download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReference {
    path: PathBuf,
    max_height: u32,
    download_name: String,
}

impl DocumentReference {
    /// The download name defaults to the path's final component.
    pub fn new(path: impl Into<PathBuf>, max_height: u32) -> Self {
        let path = path.into();
        let download_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("document.pdf")
            .to_owned();
        Self {
            path,
            max_height,
            download_name,
        }
    }

    pub fn with_download_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.download_name = name;
        }
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn max_height(&self) -> u32 {
        self.max_height
    }

    pub fn download_name(&self) -> &str {
        &self.download_name
    }

    /// Content type derived from the path extension.
    pub fn mime(&self) -> &'static str {
        let ext = self.path.extension().and_then(|e| e.to_str()).unwrap_or("");
        mime_for_ext(ext)
    }
}

/// Why a document could not be embedded.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("{} does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("could not read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is {size} bytes, over the {limit} byte limit", path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

impl EmbedError {
    /// Classify an I/O error for `path`: `NotFound` is a missing resource,
    /// everything else a read failure.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            EmbedError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            EmbedError::Unreadable {
                path: path.to_path_buf(),
                source: err,
            }
        }
    }

    /// Whether the file was absent (as opposed to present but unusable).
    pub fn is_missing(&self) -> bool {
        matches!(self, EmbedError::Missing { .. })
    }

    /// Whether the download route can still serve the file. Only an
    /// oversized file was opened successfully.
    pub fn is_downloadable(&self) -> bool {
        matches!(self, EmbedError::TooLarge { .. })
    }
}

pub type EmbedResult = Result<EmbeddedDocument, EmbedError>;

/// A successfully encoded document, ready to be placed in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedDocument {
    download_name: String,
    mime: &'static str,
    height: u32,
    byte_len: usize,
    encoded: String,
}

impl EmbeddedDocument {
    pub fn byte_len(&self) -> usize {
        self.byte_len
    }

    /// Base64 (standard alphabet, padded) encoding of the file content.
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Decode the embedded content back into the original bytes.
    #[cfg(test)]
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.encoded)
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.encoded())
    }

    /// Inline viewer sized to the configured height, with a visible
    /// fallback link for browsers that cannot render the type inline.
    pub fn viewer_html(&self) -> String {
        let uri = self.data_uri();
        let name = html_escape(&self.download_name);
        let height = self.height;
        format!(
            "<div class=\"doc-viewer\" style=\"height:{height}px\">\n\
<object data=\"{uri}\" type=\"{mime}\" width=\"100%\" height=\"{height}\">\n\
<p class=\"doc-fallback\">This browser cannot display PDFs inline. You can \
<a href=\"{uri}\" download=\"{name}\">download the PDF</a>.</p>\n\
</object>\n\
</div>\n",
            mime = self.mime,
        )
    }
}

/// Read and encode `reference`.
///
/// The file is checked on every call: one attempt, no retries, no caching.
pub fn embed(reference: &DocumentReference) -> EmbedResult {
    embed_with_limit(reference, MAX_DOCUMENT_SIZE)
}

fn embed_with_limit(reference: &DocumentReference, limit: u64) -> EmbedResult {
    let path = reference.path();
    let (file, size) = open_document(path)?;
    let too_large = |size: u64| {
        tracing::warn!(path = %path.display(), size, "document too large to embed");
        EmbedError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        }
    };
    if size > limit {
        return Err(too_large(size));
    }

    // The file may have grown since it was stat-ed.
    let bytes = read_capped(file, limit).map_err(|e| EmbedError::from_io(path, e))?;
    if bytes.len() as u64 > limit {
        return Err(too_large(bytes.len() as u64));
    }
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "embedded document");
    Ok(EmbeddedDocument {
        download_name: reference.download_name().to_owned(),
        mime: reference.mime(),
        height: reference.max_height(),
        byte_len: bytes.len(),
        encoded: BASE64.encode(&bytes),
    })
}

/// Open `reference` the way the download route does, without reading it.
/// Returns the file size; `Ok` means the file can be downloaded.
pub fn probe(reference: &DocumentReference) -> Result<u64, EmbedError> {
    open_document(reference.path()).map(|(_, size)| size)
}

/// Open `path` once and stat the handle, so the size belongs to the file
/// that will be read.
fn open_document(path: &Path) -> Result<(fs::File, u64), EmbedError> {
    let file = fs::File::open(path).map_err(|e| EmbedError::from_io(path, e))?;
    let meta = file.metadata().map_err(|e| EmbedError::from_io(path, e))?;
    if !meta.is_file() {
        return Err(EmbedError::Unreadable {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }
    Ok((file, meta.len()))
}

/// Read at most `limit + 1` bytes. A result longer than `limit` means the
/// source holds more than `limit`.
fn read_capped(reader: impl Read, limit: u64) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Derive the `Content-Type` value from a file extension (case-insensitive).
///
/// Returns `application/octet-stream` for any unrecognised extension so that
/// browsers never perform MIME sniffing on unknown types.
pub fn mime_for_ext(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        "pdf" => "application/pdf",
        "html" | "htm" => "text/html; charset=utf-8",
        "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_fixture(dir: &Path, name: &str, len: usize) -> PathBuf {
        let path = dir.join(name);
        let mut bytes = b"%PDF-1.4\n".to_vec();
        bytes.extend((0..len.saturating_sub(bytes.len())).map(|i| (i % 251) as u8));
        bytes.truncate(len);
        fs::write(&path, &bytes).unwrap();
        path
    }

    // --- DocumentReference ---

    #[test]
    fn download_name_defaults_to_file_name() {
        let r = DocumentReference::new("docs/report-2025.pdf", 800);
        assert_eq!(r.download_name(), "report-2025.pdf");
        assert_eq!(r.max_height(), 800);
        assert_eq!(r.mime(), "application/pdf");
    }

    #[test]
    fn explicit_download_name_overrides_default() {
        let r = DocumentReference::new("a.pdf", 700).with_download_name("Resume.pdf");
        assert_eq!(r.download_name(), "Resume.pdf");
    }

    #[test]
    fn blank_download_name_is_ignored() {
        let r = DocumentReference::new("a.pdf", 700).with_download_name("  ");
        assert_eq!(r.download_name(), "a.pdf");
    }

    // --- embed ---

    #[test]
    fn embed_existing_file_round_trips_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = pdf_fixture(tmp.path(), "report.pdf", 10 * 1024);
        let original = fs::read(&path).unwrap();

        let doc = embed(&DocumentReference::new(&path, 800)).unwrap();
        assert_eq!(doc.byte_len(), original.len());
        assert_eq!(doc.decode().unwrap(), original);
    }

    #[test]
    fn embed_empty_file_is_available() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.pdf");
        fs::write(&path, b"").unwrap();

        let doc = embed(&DocumentReference::new(&path, 700)).unwrap();
        assert_eq!(doc.byte_len(), 0);
        assert!(doc.decode().unwrap().is_empty());
    }

    #[test]
    fn embed_missing_file_is_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nope.pdf");

        let err = embed(&DocumentReference::new(&path, 700)).unwrap_err();
        assert!(err.is_missing(), "expected Missing, got {err:?}");
        assert!(err.to_string().contains("nope.pdf"));
    }

    #[test]
    fn embed_directory_is_unreadable_not_missing() {
        let tmp = tempfile::tempdir().unwrap();

        let err = embed(&DocumentReference::new(tmp.path(), 700)).unwrap_err();
        assert!(matches!(err, EmbedError::Unreadable { .. }), "got {err:?}");
    }

    #[test]
    fn embed_oversized_file_is_too_large() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("huge.pdf");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_DOCUMENT_SIZE + 1).unwrap();

        let err = embed(&DocumentReference::new(&path, 700)).unwrap_err();
        match err {
            EmbedError::TooLarge { size, limit, .. } => {
                assert_eq!(size, MAX_DOCUMENT_SIZE + 1);
                assert_eq!(limit, MAX_DOCUMENT_SIZE);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn embed_accepts_file_at_exact_limit() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("edge.pdf");
        let file = fs::File::create(&path).unwrap();
        file.set_len(MAX_DOCUMENT_SIZE).unwrap();

        let doc = embed(&DocumentReference::new(&path, 700)).unwrap();
        assert_eq!(doc.byte_len() as u64, MAX_DOCUMENT_SIZE);
    }

    #[test]
    fn embed_limit_boundary_with_small_cap() {
        let tmp = tempfile::tempdir().unwrap();
        let path = pdf_fixture(tmp.path(), "small.pdf", 100);
        let reference = DocumentReference::new(&path, 700);

        assert_eq!(embed_with_limit(&reference, 100).unwrap().byte_len(), 100);
        match embed_with_limit(&reference, 99).unwrap_err() {
            EmbedError::TooLarge { size, limit, .. } => {
                assert_eq!(size, 100);
                assert_eq!(limit, 99);
            }
            other => panic!("expected TooLarge, got {other:?}"),
        }
    }

    #[test]
    fn read_capped_stops_one_byte_past_limit() {
        // Longer than any size a stale stat could have reported.
        let source = io::repeat(7).take(1000);
        let bytes = read_capped(source, 10).unwrap();
        assert_eq!(bytes.len(), 11);

        let bytes = read_capped(&b"exactly10!"[..], 10).unwrap();
        assert_eq!(bytes.len(), 10);
    }

    #[test]
    fn probe_matches_download_availability() {
        let tmp = tempfile::tempdir().unwrap();
        let path = pdf_fixture(tmp.path(), "ok.pdf", 32);
        assert_eq!(probe(&DocumentReference::new(&path, 700)).unwrap(), 32);

        let dir = probe(&DocumentReference::new(tmp.path(), 700)).unwrap_err();
        assert!(!dir.is_downloadable());
        let gone = probe(&DocumentReference::new(tmp.path().join("gone.pdf"), 700)).unwrap_err();
        assert!(gone.is_missing());
    }

    #[test]
    fn only_oversized_errors_are_downloadable() {
        let big = EmbedError::TooLarge {
            path: PathBuf::from("a.pdf"),
            size: 2,
            limit: 1,
        };
        assert!(big.is_downloadable());
        assert!(!EmbedError::Missing { path: PathBuf::from("a.pdf") }.is_downloadable());
        let unreadable = EmbedError::from_io(
            Path::new("a.pdf"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(!unreadable.is_downloadable());
    }

    #[test]
    fn embed_is_deterministic() {
        let tmp = tempfile::tempdir().unwrap();
        let path = pdf_fixture(tmp.path(), "same.pdf", 3000);
        let reference = DocumentReference::new(&path, 700);

        let a = embed(&reference).unwrap();
        let b = embed(&reference).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.viewer_html(), b.viewer_html());
    }

    #[test]
    fn embed_sees_file_changes_between_calls() {
        let tmp = tempfile::tempdir().unwrap();
        let path = pdf_fixture(tmp.path(), "changing.pdf", 100);
        let reference = DocumentReference::new(&path, 700);

        assert_eq!(embed(&reference).unwrap().byte_len(), 100);
        fs::write(&path, b"%PDF-short").unwrap();
        assert_eq!(embed(&reference).unwrap().byte_len(), 10);
        fs::remove_file(&path).unwrap();
        assert!(embed(&reference).unwrap_err().is_missing());
    }

    // --- viewer markup ---

    #[test]
    fn viewer_uses_configured_height_and_download_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = pdf_fixture(tmp.path(), "cv.pdf", 64);
        let reference = DocumentReference::new(&path, 640).with_download_name("My CV.pdf");

        let html = embed(&reference).unwrap().viewer_html();
        assert!(html.contains("height:640px"));
        assert!(html.contains("height=\"640\""));
        assert!(html.contains("<object data=\"data:application/pdf;base64,"));
        assert!(html.contains("download=\"My CV.pdf\""));
        assert!(html.contains("class=\"doc-fallback\""));
    }

    #[test]
    fn viewer_escapes_download_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = pdf_fixture(tmp.path(), "x.pdf", 16);
        let reference = DocumentReference::new(&path, 100).with_download_name("a\"b<c>.pdf");

        let html = embed(&reference).unwrap().viewer_html();
        assert!(html.contains("download=\"a&quot;b&lt;c&gt;.pdf\""));
    }

    // --- error classification ---

    #[test]
    fn from_io_classifies_not_found_as_missing() {
        let err = EmbedError::from_io(Path::new("x.pdf"), io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_missing());
        let err = EmbedError::from_io(
            Path::new("x.pdf"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(err, EmbedError::Unreadable { .. }));
    }

    // --- mime_for_ext ---

    #[test]
    fn mime_pdf_case_insensitive() {
        assert_eq!(mime_for_ext("pdf"), "application/pdf");
        assert_eq!(mime_for_ext("PDF"), "application/pdf");
    }

    #[test]
    fn mime_unknown_extension_is_octet_stream() {
        assert_eq!(mime_for_ext("xyz"), "application/octet-stream");
        assert_eq!(mime_for_ext(""), "application/octet-stream");
    }
}
