use assess_core::model::{Choice, FailureStage, QuestionId, SessionStatus, TestMetadata, TimeLimit};
use services::{AttemptSnapshot, SubmitConfirmation};

use super::content_vm::{markdown_to_html, option_label};
use super::time_fmt::{format_datetime, timer_is_urgent, timer_label};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttemptPhase {
    Loading,
    Answering,
    Submitting,
    Submitted,
    SubmitFailed,
    LoadFailed,
}

impl From<SessionStatus> for AttemptPhase {
    fn from(status: SessionStatus) -> Self {
        match status {
            SessionStatus::Loading => AttemptPhase::Loading,
            SessionStatus::InProgress => AttemptPhase::Answering,
            SessionStatus::Submitting => AttemptPhase::Submitting,
            SessionStatus::Submitted => AttemptPhase::Submitted,
            SessionStatus::Failed(FailureStage::Submit) => AttemptPhase::SubmitFailed,
            SessionStatus::Failed(FailureStage::Load) => AttemptPhase::LoadFailed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub choice: Choice,
    pub letter: &'static str,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionVm {
    pub id: QuestionId,
    pub prompt_html: String,
    pub image_path: Option<String>,
    pub options: Vec<OptionVm>,
    pub answered: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteItemVm {
    pub index: usize,
    pub number: usize,
    pub answered: bool,
    pub current: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptVm {
    pub title: String,
    pub phase: AttemptPhase,
    pub timer_label: String,
    pub timer_urgent: bool,
    pub progress_label: String,
    pub progress_percent: u8,
    pub position_label: String,
    pub question: Option<QuestionVm>,
    pub palette: Vec<PaletteItemVm>,
    pub can_previous: bool,
    pub can_next: bool,
    pub editable: bool,
    pub can_submit: bool,
    pub submit_label: &'static str,
    pub error: Option<String>,
    pub details: Vec<String>,
    pub started_label: Option<String>,
}

#[must_use]
pub fn map_attempt(snapshot: &AttemptSnapshot) -> AttemptVm {
    let phase = AttemptPhase::from(snapshot.status);
    let total = snapshot.questions.len();
    let editable = phase == AttemptPhase::Answering;

    let question = snapshot.current_question().map(|question| {
        let selected = snapshot.current_selection();
        QuestionVm {
            id: question.id(),
            prompt_html: markdown_to_html(question.content()),
            image_path: question.image_path().map(str::to_owned),
            options: question
                .options()
                .iter()
                .map(|option| OptionVm {
                    choice: option.choice,
                    letter: option.choice.letter(),
                    text: option_label(&option.text),
                    selected: selected == Some(option.choice),
                })
                .collect(),
            answered: selected.is_some(),
        }
    });

    let palette = snapshot
        .answered_flags()
        .into_iter()
        .enumerate()
        .map(|(index, answered)| PaletteItemVm {
            index,
            number: index + 1,
            answered,
            current: index == snapshot.current_index,
        })
        .collect();

    let position_label = if total == 0 {
        "This test has no questions".to_string()
    } else {
        format!("Question {} of {total}", snapshot.current_index + 1)
    };

    let progress = snapshot.progress;
    let submit_label = match phase {
        AttemptPhase::Submitting => "Submitting...",
        AttemptPhase::SubmitFailed => "Retry submit",
        _ => "Submit",
    };

    AttemptVm {
        title: snapshot
            .title()
            .map_or_else(|| format!("Test {}", snapshot.test_id), str::to_owned),
        phase,
        timer_label: timer_label(snapshot.remaining_seconds),
        timer_urgent: editable && timer_is_urgent(snapshot.remaining_seconds),
        progress_label: format!(
            "{} of {} answered ({}%)",
            progress.answered, progress.total, progress.percent
        ),
        progress_percent: progress.percent,
        position_label,
        question,
        palette,
        can_previous: editable && snapshot.current_index > 0,
        can_next: editable && snapshot.current_index + 1 < total,
        editable,
        can_submit: matches!(phase, AttemptPhase::Answering | AttemptPhase::SubmitFailed),
        submit_label,
        error: snapshot.last_error.clone(),
        details: snapshot
            .metadata
            .as_ref()
            .map(metadata_details)
            .unwrap_or_default(),
        started_label: snapshot
            .started_at
            .map(|at| format!("Started {}", format_datetime(at))),
    }
}

#[must_use]
pub fn metadata_details(metadata: &TestMetadata) -> Vec<String> {
    let mut details = Vec::with_capacity(3);
    details.push(match metadata.time_limit {
        TimeLimit::Unlimited => "No time limit".to_string(),
        limit => format!("Time limit: {limit}"),
    });
    if let Some(score) = metadata.passing_score {
        details.push(format!("Passing score: {score}%"));
    }
    if let Some(max) = metadata.max_attempts {
        details.push(format!("Attempts allowed: {max}"));
    }
    details
}

#[must_use]
pub fn confirmation_message(confirmation: &SubmitConfirmation) -> String {
    let unanswered = confirmation.unanswered();
    let noun = if unanswered == 1 { "question is" } else { "questions are" };
    format!(
        "You answered {} of {} questions. {unanswered} {noun} still unanswered. Submit anyway?",
        confirmation.answered, confirmation.total
    )
}
