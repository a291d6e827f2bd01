//! GitHub GraphQL API client and the issue/project queries built on it.

pub mod error;
pub mod models;
mod client;
mod service;

pub use client::{GithubClient, DEFAULT_API_ENDPOINT};
pub use error::GithubError;
pub use models::{EntityId, Issue, Project, ProjectCard, Repository};
pub use service::{GithubService, IssueProjectCards, Nodes, ProjectPath};
