mod home;
mod result;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use do_test::DoTestView;
pub use home::{CourseTestsView, HomeView};
pub use result::TestResultView;
pub use state::{ViewError, ViewState, view_state_from_resource};
