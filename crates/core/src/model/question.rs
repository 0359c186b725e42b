use thiserror::Error;

use crate::model::{Choice, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question {0} has neither prompt text nor an image")]
    EmptyPrompt(QuestionId),

    #[error("question {0} has no answer options")]
    NoOptions(QuestionId),
}

/// One answer option as shown to the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    pub choice: Choice,
    pub text: String,
}

/// A question as delivered for an attempt.
///
/// The correct answer is absent; it is only known after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    content: String,
    options: Vec<QuestionOption>,
    image_path: Option<String>,
}

impl Question {
    /// Build a question from its prompt and up to four option texts (A..D).
    ///
    /// Blank option slots are skipped so a two-option question renders only A and B.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank and there is no image.
    /// Returns `QuestionError::NoOptions` if every option slot is blank.
    pub fn new(
        id: QuestionId,
        content: impl Into<String>,
        options: [Option<String>; 4],
        image_path: Option<String>,
    ) -> Result<Self, QuestionError> {
        let content = content.into();
        let image_path = image_path.filter(|p| !p.trim().is_empty());
        if content.trim().is_empty() && image_path.is_none() {
            return Err(QuestionError::EmptyPrompt(id));
        }

        let options = Choice::ALL
            .into_iter()
            .zip(options)
            .filter_map(|(choice, text)| {
                text.filter(|t| !t.trim().is_empty())
                    .map(|text| QuestionOption { choice, text })
            })
            .collect::<Vec<_>>();
        if options.is_empty() {
            return Err(QuestionError::NoOptions(id));
        }

        Ok(Self {
            id,
            content,
            options,
            image_path,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    #[must_use]
    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }
}
