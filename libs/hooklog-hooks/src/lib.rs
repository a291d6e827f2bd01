//! Stream handlers reacting to GitHub webhook events.

pub mod error;
mod issues;
mod projects;

pub use error::HookError;
pub use issues::{ISSUES_TOPIC, IssueOutcome, IssuesProcessor};
pub use projects::IssueProjects;
