use std::sync::Arc;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};

use assess_core::model::{Choice, CourseId, Question, QuestionId, TestId, TestMetadata, TimeLimit};
use assess_core::time::fixed_clock;
use backend::InMemoryBackend;
use services::{AppServices, AttemptService};

use crate::context::{UiApp, build_app_context};
use crate::views::{DoTestView, HomeView, TestResultView};

pub const TEST_ID: u64 = 3;

#[derive(Clone)]
struct TestApp {
    services: Arc<AppServices>,
}

impl UiApp for TestApp {
    fn attempts(&self) -> Arc<AttemptService> {
        self.services.attempts()
    }

    fn backend_label(&self) -> String {
        self.services.backend_label().to_string()
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Home,
    DoTest(u64),
    Result(u64),
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    let view = use_context::<ViewKind>();
    match view {
        ViewKind::Home => rsx! { HomeView {} },
        ViewKind::DoTest(test_id) => rsx! { DoTestView { test_id } },
        ViewKind::Result(test_id) => rsx! { TestResultView { test_id } },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub backend: InMemoryBackend,
    pub services: Arc<AppServices>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            self.dom.wait_for_work(),
        )
        .await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// A backend holding one timed test with `question_count` questions, all answered `A` correctly.
pub fn seeded_backend(question_count: u64) -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    backend
        .insert_test(TestMetadata {
            test_id: TestId::new(TEST_ID),
            course_id: CourseId::new(2),
            title: "Ownership basics".to_string(),
            time_limit: TimeLimit::Limited { seconds: 900 },
            passing_score: Some(50),
            max_attempts: None,
        })
        .expect("insert test");
    for id in 1..=question_count {
        let question = Question::new(
            QuestionId::new(id),
            format!("What does `move` do in case {id}?"),
            ["Copies", "Transfers ownership", "Borrows", "Nothing"].map(|s| Some(s.to_string())),
            None,
        )
        .expect("question");
        backend
            .insert_question(TestId::new(TEST_ID), question, Choice::B)
            .expect("insert question");
    }
    backend
}

pub fn setup_view_harness(view: ViewKind, backend: InMemoryBackend) -> ViewHarness {
    let services = Arc::new(AppServices::new_in_memory(backend.clone(), fixed_clock()));
    let app = Arc::new(TestApp {
        services: Arc::clone(&services),
    });
    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });

    ViewHarness {
        dom,
        backend,
        services,
    }
}
