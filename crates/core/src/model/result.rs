use crate::model::{Choice, QuestionId, TestId};

/// Backend acknowledgement of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubmitReceipt {
    pub message: Option<String>,
}

/// One question as graded after submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewedAnswer {
    pub question_id: QuestionId,
    pub selected: Option<Choice>,
    pub correct: Choice,
}

impl ReviewedAnswer {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.selected == Some(self.correct)
    }
}

/// Graded outcome of a submitted attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    pub test_id: TestId,
    /// Percentage score, 0..=100.
    pub score: u32,
    pub passed: bool,
    pub correct_count: u32,
    pub total_questions: u32,
    pub answers: Vec<ReviewedAnswer>,
}

impl AttemptResult {
    /// Grade a set of reviewed answers against an optional pass threshold.
    ///
    /// Without a threshold every submitted attempt passes.
    #[must_use]
    pub fn grade(test_id: TestId, answers: Vec<ReviewedAnswer>, passing_score: Option<u32>) -> Self {
        let total = answers.len();
        let correct = answers.iter().filter(|a| a.is_correct()).count();
        let score = if total == 0 { 100 } else { correct * 100 / total };
        let score = u32::try_from(score).unwrap_or(100);
        Self {
            test_id,
            score,
            passed: passing_score.is_none_or(|threshold| score >= threshold),
            correct_count: u32::try_from(correct).unwrap_or(u32::MAX),
            total_questions: u32::try_from(total).unwrap_or(u32::MAX),
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reviewed(id: u64, selected: Option<Choice>, correct: Choice) -> ReviewedAnswer {
        ReviewedAnswer {
            question_id: QuestionId::new(id),
            selected,
            correct,
        }
    }

    #[test]
    fn grades_against_threshold() {
        let answers = vec![
            reviewed(1, Some(Choice::A), Choice::A),
            reviewed(2, None, Choice::B),
            reviewed(3, Some(Choice::C), Choice::D),
            reviewed(4, Some(Choice::D), Choice::D),
        ];
        let result = AttemptResult::grade(TestId::new(1), answers, Some(60));
        assert_eq!(result.score, 50);
        assert_eq!(result.correct_count, 2);
        assert_eq!(result.total_questions, 4);
        assert!(!result.passed);
    }

    #[test]
    fn no_threshold_always_passes() {
        let result = AttemptResult::grade(
            TestId::new(1),
            vec![reviewed(1, None, Choice::A)],
            None,
        );
        assert_eq!(result.score, 0);
        assert!(result.passed);
    }
}
