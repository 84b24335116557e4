//! Post submission dialog
//!
//! The dialog is split in two:
//! 1. [`SubmissionMachine`] - pure state transitions, events in, commands out
//! 2. [`SubmissionController`] - runs the commands (uploads, API calls, timers)
//!    and feeds their results back as events

mod controller;
mod machine;
mod progress;
pub mod view;

pub use controller::{ControllerOptions, SubmissionController};
pub use machine::{AttemptId, Command, Event, Phase, SubmissionMachine};
pub use progress::{NoopObserver, SubmissionObserver};
pub use view::{View, render};
