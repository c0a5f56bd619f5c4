use serde::Serialize;
use thiserror::Error;

use crate::model::{Facet, FilterState};

/// Facet value sent for a facet the author left unselected.
pub const UNSPECIFIED_FACET: &str = "other";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UploadDraftError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("options must not be empty")]
    EmptyOptions,
    #[error("answer must not be empty")]
    EmptyAnswer,
    #[error("answer must be an integer, got {0:?}")]
    InvalidAnswer(String),
}

/// Raw form input for a new question.
#[derive(Debug, Clone, Default)]
pub struct UploadDraft {
    pub question: String,
    /// Comma separated choices; both `,` and `，` separate.
    pub options: String,
    pub answer: String,
    pub image: Option<String>,
    pub facets: FilterState,
}

/// Validated question payload in the backend's field layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewQuestion {
    pub question: String,
    pub subject: String,
    pub category: String,
    pub topic: String,
    pub grade: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub options: Vec<String>,
    pub answer: i32,
}

impl UploadDraft {
    /// Validate the draft into an uploadable question.
    ///
    /// # Errors
    ///
    /// Returns `UploadDraftError` when a required field is blank or the
    /// answer is not an integer.
    pub fn validate(&self) -> Result<NewQuestion, UploadDraftError> {
        let question = self.question.trim();
        if question.is_empty() {
            return Err(UploadDraftError::EmptyQuestion);
        }

        let options: Vec<String> = self
            .options
            .split([',', '，'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
        if options.is_empty() {
            return Err(UploadDraftError::EmptyOptions);
        }

        let answer = self.answer.trim();
        if answer.is_empty() {
            return Err(UploadDraftError::EmptyAnswer);
        }
        let answer = answer
            .parse::<i32>()
            .map_err(|_| UploadDraftError::InvalidAnswer(answer.to_owned()))?;

        let facet = |f: Facet| {
            self.facets
                .get(f)
                .unwrap_or(UNSPECIFIED_FACET)
                .to_owned()
        };

        Ok(NewQuestion {
            question: question.to_owned(),
            subject: facet(Facet::Subject),
            category: facet(Facet::Category),
            topic: facet(Facet::Topic),
            grade: facet(Facet::Grade),
            image: self
                .image
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            options,
            answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> UploadDraft {
        UploadDraft {
            question: " What is 2 + 2? ".into(),
            options: "3, 4，5,, ".into(),
            answer: "1".into(),
            image: None,
            facets: FilterState::default(),
        }
    }

    #[test]
    fn splits_options_on_both_commas() {
        let q = draft().validate().unwrap();
        assert_eq!(q.question, "What is 2 + 2?");
        assert_eq!(q.options, vec!["3", "4", "5"]);
        assert_eq!(q.answer, 1);
    }

    #[test]
    fn unselected_facets_become_other() {
        let mut d = draft();
        d.facets.set(Facet::Subject, Some("natural science".into()));
        let q = d.validate().unwrap();
        assert_eq!(q.subject, "natural science");
        assert_eq!(q.grade, UNSPECIFIED_FACET);
        assert_eq!(q.topic, UNSPECIFIED_FACET);
    }

    #[test]
    fn rejects_blank_fields() {
        let mut d = draft();
        d.question = "  ".into();
        assert_eq!(d.validate(), Err(UploadDraftError::EmptyQuestion));

        let mut d = draft();
        d.options = " , ，".into();
        assert_eq!(d.validate(), Err(UploadDraftError::EmptyOptions));

        let mut d = draft();
        d.answer = "".into();
        assert_eq!(d.validate(), Err(UploadDraftError::EmptyAnswer));
    }

    #[test]
    fn rejects_non_numeric_answer() {
        let mut d = draft();
        d.answer = "B".into();
        assert_eq!(
            d.validate(),
            Err(UploadDraftError::InvalidAnswer("B".into()))
        );
    }
}
