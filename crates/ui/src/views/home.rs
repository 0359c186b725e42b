use dioxus::prelude::*;
use dioxus_router::use_navigator;

use assess_core::model::TestId;

use crate::context::AppContext;
use crate::routes::Route;

#[component]
pub fn HomeView() -> Element {
    let ctx = use_context::<AppContext>();
    let navigator = use_navigator();
    let flash = use_hook(|| ctx.take_flash());

    use_effect(move || {
        if let Some(test_id) = ctx.take_launch_test_id() {
            let _ = navigator.replace(Route::DoTest {
                test_id: test_id.value(),
            });
        }
    });

    rsx! {
        div { class: "page home",
            h2 { "Take a test" }
            if let Some(message) = flash {
                p { class: "flash", "{message}" }
            }
            StartTestForm {}
        }
    }
}

/// Landing page after a failed load of one of the course's tests.
#[component]
pub fn CourseTestsView(course_id: u64) -> Element {
    let ctx = use_context::<AppContext>();
    let flash = use_hook(|| ctx.take_flash());

    rsx! {
        div { class: "page course-tests",
            h2 { "Course {course_id}" }
            if let Some(message) = flash {
                p { class: "flash", "{message}" }
            }
            p { "Pick another test of this course to continue." }
            StartTestForm {}
        }
    }
}

#[component]
fn StartTestForm() -> Element {
    let navigator = use_navigator();
    let mut raw = use_signal(String::new);
    let mut invalid = use_signal(|| false);

    let start = move |_| {
        let parsed = raw.read().parse::<TestId>();
        match parsed {
            Ok(test_id) => {
                invalid.set(false);
                let _ = navigator.push(Route::DoTest {
                    test_id: test_id.value(),
                });
            }
            Err(_) => invalid.set(true),
        }
    };

    rsx! {
        div { class: "start-form",
            label { r#for: "test-id", "Test id" }
            input {
                id: "test-id",
                r#type: "text",
                value: "{raw}",
                oninput: move |evt| raw.set(evt.value()),
            }
            button { class: "primary", onclick: start, "Start" }
            if invalid() {
                p { class: "error", "Enter a numeric test id." }
            }
        }
    }
}
