use dioxus::prelude::*;
use dioxus_router::Router;

use crate::routes::Route;

/// Root component: stylesheet, window title and the routed pages.
#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }
        document::Title { "Assessments" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "This page failed to render" }
                        p { "Go back to the start page and open the test again." }
                        pre { "{errors:?}" }
                    }
                },
                Router::<Route> {}
            }
        }
    }
}
