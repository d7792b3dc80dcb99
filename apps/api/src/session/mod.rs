//! Explicit session context, no ambient globals.
//!
//! One `Session` owns the profile, the active language flag, the last
//! recommendation text, and the three pipeline guards. Pipelines receive it
//! through `AppState`; nothing else holds profile state.

pub mod guard;

use serde::{Deserialize, Serialize};

use crate::models::profile::Profile;
use guard::OperationGuard;

/// The two supported language tags. The flag is the sole source of truth for
/// "current language" and is consulted only by the Translation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Pl,
    En,
}

impl Language {
    /// Translation always targets the other supported tag.
    pub fn other(self) -> Self {
        match self {
            Language::Pl => Language::En,
            Language::En => Language::Pl,
        }
    }

    /// English name used in translation prompts.
    pub fn english_name(self) -> &'static str {
        match self {
            Language::Pl => "Polish",
            Language::En => "English",
        }
    }
}

/// Read-only view handed to the rendering collaborator. Captured fresh on
/// every read so translated content and the language flag are always from
/// the same critical section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSnapshot {
    pub profile: Profile,
    pub language: Language,
}

pub struct Session {
    pub profile: Profile,
    pub language: Language,
    /// Last successful recommendation, verbatim. Stale-until-overwritten:
    /// failed regenerations and later profile/notes edits leave it in place.
    pub recommendation: Option<String>,
    pub extraction: OperationGuard,
    pub translation: OperationGuard,
    pub recommendation_op: OperationGuard,
}

impl Session {
    pub fn snapshot(&self) -> ProfileSnapshot {
        ProfileSnapshot {
            profile: self.profile.clone(),
            language: self.language,
        }
    }

    pub fn new() -> Self {
        Self {
            profile: Profile::sample(),
            language: Language::Pl,
            recommendation: None,
            extraction: OperationGuard::new("extraction"),
            translation: OperationGuard::new("translation"),
            recommendation_op: OperationGuard::new("recommendation"),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_polish_with_sample_profile() {
        let session = Session::new();
        assert_eq!(session.language, Language::Pl);
        assert_eq!(session.profile.full_name, "Jan Kowalski");
        assert!(session.recommendation.is_none());
        assert!(!session.extraction.is_running());
    }

    #[test]
    fn test_language_other_flips_both_ways() {
        assert_eq!(Language::Pl.other(), Language::En);
        assert_eq!(Language::En.other(), Language::Pl);
    }

    #[test]
    fn test_language_serializes_lowercase() {
        assert_eq!(serde_json::to_value(Language::Pl).unwrap(), "pl");
        assert_eq!(serde_json::to_value(Language::En).unwrap(), "en");
    }
}
