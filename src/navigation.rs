//! Per-session navigation state.
//!
//! The selected section lives in a session cookie, so every browser session
//! owns its own state and the server keeps nothing mutable between requests.
//! Reading the stored value always fails open to [`SectionId::Home`].

use axum::http::{header, HeaderMap};

/// Name of the session cookie that carries the selected section slug.
pub const SECTION_COOKIE: &str = "folio_section";

/// The eight content views of the portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SectionId {
    #[default]
    Home,
    Journey,
    Skills,
    Projects,
    Experience,
    Education,
    CodePractice,
    Certifications,
}

impl SectionId {
    /// All sections in navigation-bar order.
    pub const ALL: [SectionId; 8] = [
        SectionId::Home,
        SectionId::Journey,
        SectionId::Skills,
        SectionId::Projects,
        SectionId::Experience,
        SectionId::Education,
        SectionId::CodePractice,
        SectionId::Certifications,
    ];

    /// URL-safe identifier used in routes, cookies and `data-section` attributes.
    pub fn slug(self) -> &'static str {
        match self {
            SectionId::Home => "home",
            SectionId::Journey => "journey",
            SectionId::Skills => "skills",
            SectionId::Projects => "projects",
            SectionId::Experience => "experience",
            SectionId::Education => "education",
            SectionId::CodePractice => "code-practice",
            SectionId::Certifications => "certifications",
        }
    }

    /// Text shown on the navigation button.
    pub fn label(self) -> &'static str {
        match self {
            SectionId::Home => "Home",
            SectionId::Journey => "My Journey",
            SectionId::Skills => "Skills",
            SectionId::Projects => "Projects",
            SectionId::Experience => "Experience",
            SectionId::Education => "Education",
            SectionId::CodePractice => "Code Practice",
            SectionId::Certifications => "Certifications",
        }
    }

    /// Parse a slug (case-insensitive) or an exact display label.
    pub fn from_slug(raw: &str) -> Option<SectionId> {
        let trimmed = raw.trim();
        SectionId::ALL.into_iter().find(|s| {
            s.slug().eq_ignore_ascii_case(trimmed) || s.label() == trimmed
        })
    }
}

/// Navigation controller for a single session.
///
/// Holds exactly one active section. Built fresh from the request cookie on
/// every render pass; `select` produces the value to write back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationController {
    current: SectionId,
}

impl NavigationController {
    /// Restore state from a stored value.
    ///
    /// Absent, empty or unrecognized values yield Home. This never errors.
    pub fn from_stored(stored: Option<&str>) -> Self {
        let current = match stored {
            Some(raw) => match SectionId::from_slug(raw) {
                Some(section) => section,
                None => {
                    tracing::debug!(stored = raw, "unrecognized section in session, defaulting to home");
                    SectionId::Home
                }
            },
            None => SectionId::Home,
        };
        Self { current }
    }

    /// Restore state from the `Cookie` header(s) of a request.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let stored = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|v| cookie_value(v, SECTION_COOKIE));
        Self::from_stored(stored)
    }

    pub fn current_section(&self) -> SectionId {
        self.current
    }

    /// Make `section` the active one. Selecting the active section again
    /// leaves the state unchanged.
    pub fn select(&mut self, section: SectionId) {
        self.current = section;
    }

    /// `Set-Cookie` value persisting the current section for the rest of the
    /// browser session (no `Max-Age`, so it is dropped when the session ends).
    pub fn set_cookie_header(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SECTION_COOKIE,
            self.current.slug()
        )
    }
}

/// Extract the value of the first cookie called `name` from a `Cookie`
/// header value (`a=1; b=2`).
fn cookie_value<'a>(header_value: &'a str, name: &str) -> Option<&'a str> {
    header_value.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().trim_matches('"'))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    // --- SectionId ---

    #[test]
    fn slugs_round_trip_for_every_section() {
        for section in SectionId::ALL {
            assert_eq!(SectionId::from_slug(section.slug()), Some(section));
        }
    }

    #[test]
    fn labels_parse_back_to_section() {
        assert_eq!(SectionId::from_slug("My Journey"), Some(SectionId::Journey));
        assert_eq!(SectionId::from_slug("Code Practice"), Some(SectionId::CodePractice));
    }

    #[test]
    fn slug_parse_is_case_insensitive() {
        assert_eq!(SectionId::from_slug("SKILLS"), Some(SectionId::Skills));
        assert_eq!(SectionId::from_slug(" Code-Practice "), Some(SectionId::CodePractice));
    }

    #[test]
    fn unknown_slug_is_none() {
        assert_eq!(SectionId::from_slug("blog"), None);
        assert_eq!(SectionId::from_slug(""), None);
    }

    #[test]
    fn all_slugs_are_distinct() {
        let mut slugs: Vec<&str> = SectionId::ALL.iter().map(|s| s.slug()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), 8);
    }

    // --- NavigationController ---

    #[test]
    fn defaults_to_home() {
        assert_eq!(NavigationController::default().current_section(), SectionId::Home);
        assert_eq!(
            NavigationController::from_stored(None).current_section(),
            SectionId::Home
        );
    }

    #[test]
    fn unrecognized_stored_value_fails_open_to_home() {
        for junk in ["", "Blog", "skills;drop", "%00", "home2"] {
            assert_eq!(
                NavigationController::from_stored(Some(junk)).current_section(),
                SectionId::Home,
                "stored value {junk:?} should fall back to home"
            );
        }
    }

    #[test]
    fn select_changes_current_section() {
        let mut nav = NavigationController::default();
        nav.select(SectionId::Education);
        assert_eq!(nav.current_section(), SectionId::Education);
    }

    #[test]
    fn select_is_idempotent() {
        let mut once = NavigationController::default();
        once.select(SectionId::Projects);

        let mut twice = NavigationController::default();
        twice.select(SectionId::Projects);
        twice.select(SectionId::Projects);

        assert_eq!(once, twice);
        assert_eq!(once.set_cookie_header(), twice.set_cookie_header());
    }

    #[test]
    fn every_section_reachable_from_every_other() {
        for from in SectionId::ALL {
            for to in SectionId::ALL {
                let mut nav = NavigationController::from_stored(Some(from.slug()));
                nav.select(to);
                assert_eq!(nav.current_section(), to);
            }
        }
    }

    #[test]
    fn set_cookie_is_a_session_cookie() {
        let mut nav = NavigationController::default();
        nav.select(SectionId::CodePractice);
        let cookie = nav.set_cookie_header();
        assert!(cookie.starts_with("folio_section=code-practice;"));
        assert!(cookie.contains("Path=/"));
        assert!(!cookie.contains("Max-Age") && !cookie.contains("Expires"));
    }

    // --- cookie parsing ---

    #[test]
    fn cookie_value_finds_named_cookie() {
        assert_eq!(cookie_value("a=1; folio_section=skills; b=2", SECTION_COOKIE), Some("skills"));
        assert_eq!(cookie_value("folio_section=\"projects\"", SECTION_COOKIE), Some("projects"));
    }

    #[test]
    fn cookie_value_ignores_prefix_matches() {
        assert_eq!(cookie_value("xfolio_section=skills", SECTION_COOKIE), None);
        assert_eq!(cookie_value("garbage", SECTION_COOKIE), None);
    }

    #[test]
    fn from_headers_reads_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; folio_section=education"));
        assert_eq!(
            NavigationController::from_headers(&headers).current_section(),
            SectionId::Education
        );
    }

    #[test]
    fn from_headers_first_occurrence_wins() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("folio_section=skills"));
        headers.append(header::COOKIE, HeaderValue::from_static("folio_section=projects"));
        assert_eq!(
            NavigationController::from_headers(&headers).current_section(),
            SectionId::Skills
        );
    }

    #[test]
    fn from_headers_without_cookie_is_home() {
        assert_eq!(
            NavigationController::from_headers(&HeaderMap::new()).current_section(),
            SectionId::Home
        );
    }
}
