mod attempt_vm;
mod content_vm;
mod result_vm;
mod time_fmt;

pub use attempt_vm::{
    AttemptPhase, AttemptVm, OptionVm, PaletteItemVm, QuestionVm, confirmation_message,
    map_attempt, metadata_details,
};
pub use content_vm::{markdown_to_html, option_label, sanitize_html};
pub use result_vm::{ResultVm, ReviewRowVm, map_result};
pub use time_fmt::{format_datetime, timer_is_urgent, timer_label};
