//! The interactive flow that turns a menu choice into a running loop.

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{Orchestrator, Outcome, State};
pub use prompt::{ConsolePrompter, MenuChoice, Prompter};
