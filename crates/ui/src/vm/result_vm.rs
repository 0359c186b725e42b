use assess_core::model::{AttemptResult, Choice};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewRowVm {
    pub number: usize,
    pub selected_label: String,
    pub correct_label: &'static str,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultVm {
    pub score_label: String,
    pub verdict: &'static str,
    pub passed: bool,
    pub correct_label: String,
    pub rows: Vec<ReviewRowVm>,
}

#[must_use]
pub fn map_result(result: &AttemptResult) -> ResultVm {
    ResultVm {
        score_label: format!("{}%", result.score),
        verdict: if result.passed { "Passed" } else { "Not passed" },
        passed: result.passed,
        correct_label: format!(
            "{} of {} correct",
            result.correct_count, result.total_questions
        ),
        rows: result
            .answers
            .iter()
            .enumerate()
            .map(|(i, answer)| ReviewRowVm {
                number: i + 1,
                selected_label: answer
                    .selected
                    .map_or_else(|| "Not answered".to_string(), |c| c.letter().to_string()),
                correct_label: Choice::letter(answer.correct),
                is_correct: answer.is_correct(),
            })
            .collect(),
    }
}
