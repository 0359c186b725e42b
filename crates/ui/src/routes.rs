use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable};

use services::Redirect;

use crate::context::AppContext;
use crate::views::{CourseTestsView, DoTestView, HomeView, TestResultView};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", HomeView)] Home {},
        #[route("/courses/:course_id/tests", CourseTestsView)] CourseTests { course_id: u64 },
        #[route("/tests/:test_id", DoTestView)] DoTest { test_id: u64 },
        #[route("/tests/:test_id/result", TestResultView)] TestResult { test_id: u64 },
}

impl From<Redirect> for Route {
    fn from(redirect: Redirect) -> Self {
        match redirect {
            Redirect::TestList { course_id } => Route::CourseTests {
                course_id: course_id.value(),
            },
            Redirect::Home => Route::Home {},
        }
    }
}

#[component]
fn Layout() -> Element {
    let ctx = use_context::<AppContext>();
    rsx! {
        div { class: "app",
            header { class: "topbar",
                Link { to: Route::Home {}, class: "brand", "Assessments" }
                span { class: "backend", "{ctx.backend_label()}" }
            }
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}
