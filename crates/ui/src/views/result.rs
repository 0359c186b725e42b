use dioxus::prelude::*;
use dioxus_router::Link;

use assess_core::model::TestId;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{ResultVm, map_result};

#[component]
pub fn TestResultView(test_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let attempts = ctx.attempts();
    let resource = use_resource(move || {
        let attempts = attempts.clone();
        async move {
            attempts
                .fetch_result(TestId::new(test_id))
                .await
                .map(|result| map_result(&result))
                .map_err(|err| ViewError::from(&err))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page result",
            h2 { "Result" }
            match state {
                ViewState::Idle | ViewState::Loading => rsx! {
                    p { "Loading result..." }
                },
                ViewState::Ready(vm) => rsx! {
                    ResultSummary { vm }
                },
                ViewState::Error(err) => rsx! {
                    p { class: "error", "{err.message()}" }
                },
            }
            Link { to: Route::Home {}, class: "back", "Back to start" }
        }
    }
}

#[component]
fn ResultSummary(vm: ResultVm) -> Element {
    rsx! {
        div { class: if vm.passed { "score passed" } else { "score failed" },
            span { class: "value", "{vm.score_label}" }
            span { class: "verdict", "{vm.verdict}" }
        }
        p { "{vm.correct_label}" }
        table { class: "review",
            thead {
                tr {
                    th { "#" }
                    th { "Your answer" }
                    th { "Correct answer" }
                }
            }
            tbody {
                for row in vm.rows {
                    tr { key: "{row.number}", class: if row.is_correct { "correct" } else { "wrong" },
                        td { "{row.number}" }
                        td { "{row.selected_label}" }
                        td { "{row.correct_label}" }
                    }
                }
            }
        }
    }
}
