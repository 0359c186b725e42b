//! Seed data for `--demo`, so the UI can be tried without a server.

use assess_core::model::{Choice, CourseId, Question, QuestionId, TestId, TestMetadata, TimeLimit};
use backend::{BackendError, InMemoryBackend};

pub const DEMO_TEST_ID: u64 = 1;

struct DemoQuestion {
    prompt: &'static str,
    options: [&'static str; 4],
    correct: Choice,
}

const QUESTIONS: &[DemoQuestion] = &[
    DemoQuestion {
        prompt: "Which keyword moves ownership of captured variables into a closure?",
        options: ["ref", "move", "static", "dyn"],
        correct: Choice::B,
    },
    DemoQuestion {
        prompt: "What does `Option::take` leave behind?",
        options: ["Some(())", "The old value", "None", "A default value"],
        correct: Choice::C,
    },
    DemoQuestion {
        prompt: "Which trait lets `?` convert one error type into another?",
        options: ["Into", "AsRef", "TryFrom", "From"],
        correct: Choice::D,
    },
    DemoQuestion {
        prompt: "A `Mutex` guard is released when it is...",
        options: ["dropped", "cloned", "awaited", "printed"],
        correct: Choice::A,
    },
];

/// Build an in-memory backend holding one five minute demo test.
///
/// # Errors
///
/// Returns `BackendError` if the seed data cannot be stored.
pub fn seeded_backend() -> Result<InMemoryBackend, BackendError> {
    let backend = InMemoryBackend::new();
    let test_id = TestId::new(DEMO_TEST_ID);
    backend.insert_test(TestMetadata {
        test_id,
        course_id: CourseId::new(1),
        title: "Rust fundamentals".to_string(),
        time_limit: TimeLimit::Limited { seconds: 300 },
        passing_score: Some(75),
        max_attempts: Some(3),
    })?;

    for (index, seed) in QUESTIONS.iter().enumerate() {
        let question = Question::new(
            QuestionId::new(index as u64 + 1),
            seed.prompt,
            seed.options.map(|text| Some(text.to_string())),
            None,
        )
        .map_err(|e| BackendError::InvalidPayload(e.to_string()))?;
        backend.insert_question(test_id, question, seed.correct)?;
    }
    Ok(backend)
}
