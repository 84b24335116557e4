//! CLI command implementations

mod compose;
mod config;
mod progress;
mod related;
mod style;
mod submit;

pub use compose::run_compose;
pub use config::run_config;
pub use progress::CliProgress;
pub use related::{RelatedOptions, run_related};
pub use submit::{SubmitOptions, run_submit};
