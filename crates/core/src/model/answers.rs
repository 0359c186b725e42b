use std::collections::HashMap;

use crate::model::{Choice, Question, QuestionId, SessionError};

/// A single answered question, as sent in the sparse submission payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerEntry {
    pub question_id: QuestionId,
    pub selected_choice: Choice,
}

/// Aggregated view of answering progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptProgress {
    pub total: usize,
    pub answered: usize,
    /// Whole-number percentage; an attempt without questions counts as 100.
    pub percent: u8,
}

impl AttemptProgress {
    #[must_use]
    pub fn new(answered: usize, total: usize) -> Self {
        let percent = if total == 0 {
            100
        } else {
            let pct = answered.min(total) * 100 / total;
            u8::try_from(pct).unwrap_or(100)
        };
        Self {
            total,
            answered,
            percent,
        }
    }

    #[must_use]
    pub fn unanswered(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.percent >= 100
    }
}

/// Locally buffered answers for one attempt.
///
/// Keys are exactly the loaded question ids; entries start unanswered and
/// are never added or removed after construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerStore {
    order: Vec<QuestionId>,
    selected: HashMap<QuestionId, Option<Choice>>,
}

impl AnswerStore {
    #[must_use]
    pub fn for_questions(questions: &[Question]) -> Self {
        let order: Vec<QuestionId> = questions.iter().map(Question::id).collect();
        let selected = order.iter().map(|id| (*id, None)).collect();
        Self { order, selected }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    #[must_use]
    pub fn contains(&self, question_id: QuestionId) -> bool {
        self.selected.contains_key(&question_id)
    }

    /// Selected choice for a question; `None` when unanswered or unknown.
    #[must_use]
    pub fn get(&self, question_id: QuestionId) -> Option<Choice> {
        self.selected.get(&question_id).copied().flatten()
    }

    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` if the id was not part of the loaded set.
    pub fn set(&mut self, question_id: QuestionId, choice: Option<Choice>) -> Result<(), SessionError> {
        let slot = self
            .selected
            .get_mut(&question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;
        *slot = choice;
        Ok(())
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.selected.values().filter(|c| c.is_some()).count()
    }

    #[must_use]
    pub fn progress(&self) -> AttemptProgress {
        AttemptProgress::new(self.answered_count(), self.len())
    }

    /// Answered entries only, in question order.
    #[must_use]
    pub fn sparse_entries(&self) -> Vec<AnswerEntry> {
        self.order
            .iter()
            .filter_map(|id| {
                self.get(*id).map(|selected_choice| AnswerEntry {
                    question_id: *id,
                    selected_choice,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: u64) -> Vec<Question> {
        (1..=n)
            .map(|i| {
                Question::new(
                    QuestionId::new(i),
                    format!("Q{i}"),
                    ["a", "b", "c", "d"].map(|s| Some(s.to_string())),
                    None,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn store_is_total_over_loaded_ids() {
        let qs = questions(4);
        let store = AnswerStore::for_questions(&qs);
        assert_eq!(store.len(), qs.len());
        for q in &qs {
            assert!(store.contains(q.id()));
            assert_eq!(store.get(q.id()), None);
        }
    }

    #[test]
    fn unknown_question_is_rejected() {
        let mut store = AnswerStore::for_questions(&questions(2));
        let err = store.set(QuestionId::new(99), Some(Choice::A)).unwrap_err();
        assert_eq!(err, SessionError::UnknownQuestion(QuestionId::new(99)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn progress_never_decreases_while_answering_new_questions() {
        let qs = questions(7);
        let mut store = AnswerStore::for_questions(&qs);
        let mut last = store.progress().percent;
        for (q, choice) in qs.iter().zip(Choice::ALL.into_iter().cycle()) {
            store.set(q.id(), Some(choice)).unwrap();
            let now = store.progress().percent;
            assert!(now >= last, "progress dropped from {last} to {now}");
            last = now;
        }
        assert_eq!(last, 100);
    }

    #[test]
    fn overwriting_an_answer_keeps_progress() {
        let qs = questions(2);
        let mut store = AnswerStore::for_questions(&qs);
        store.set(qs[0].id(), Some(Choice::A)).unwrap();
        store.set(qs[0].id(), Some(Choice::C)).unwrap();
        assert_eq!(store.get(qs[0].id()), Some(Choice::C));
        assert_eq!(store.progress().answered, 1);
        assert_eq!(store.progress().percent, 50);
    }

    #[test]
    fn sparse_entries_skip_unanswered() {
        let qs = questions(5);
        let mut store = AnswerStore::for_questions(&qs);
        store.set(qs[3].id(), Some(Choice::D)).unwrap();
        store.set(qs[1].id(), Some(Choice::B)).unwrap();

        let entries = store.sparse_entries();
        assert_eq!(
            entries,
            vec![
                AnswerEntry {
                    question_id: qs[1].id(),
                    selected_choice: Choice::B
                },
                AnswerEntry {
                    question_id: qs[3].id(),
                    selected_choice: Choice::D
                },
            ]
        );
    }

    #[test]
    fn zero_questions_count_as_complete() {
        let store = AnswerStore::for_questions(&[]);
        let progress = store.progress();
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete());
        assert!(store.sparse_entries().is_empty());
    }

    #[test]
    fn percent_rounds_down() {
        assert_eq!(AttemptProgress::new(1, 3).percent, 33);
        assert_eq!(AttemptProgress::new(2, 3).percent, 66);
    }
}
