use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use hooklog_github::Issue;
use hooklog_stream::{BoxError, CancellationToken, Handler, Message};

use crate::error::HookError;
use crate::projects::IssueProjects;

/// Topic carrying the raw issue JSON of every opened issue.
pub const ISSUES_TOPIC: &str = "github/issues";

/// What processing one issue ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueOutcome {
    /// The issue's repository has no configured project.
    NoProject,
    /// The issue already has a card on the project.
    AlreadyOnProject,
    /// The issue was added to the project.
    Added { project_id: String },
}

/// Puts every newly opened issue on the project configured for its
/// repository.
pub struct IssuesProcessor {
    service: Arc<dyn IssueProjects>,
    /// Repository name to project resource path.
    projects: HashMap<String, String>,
}

impl IssuesProcessor {
    pub fn new(service: Arc<dyn IssueProjects>, projects: HashMap<String, String>) -> Self {
        Self { service, projects }
    }

    pub async fn process(&self, msg: &Message) -> Result<IssueOutcome, HookError> {
        let issue: Issue = serde_json::from_slice(&msg.payload).map_err(|source| HookError::Decode {
            offset: msg.offset,
            source,
        })?;

        let cards = self
            .service
            .issue_project_cards(&issue.node_id)
            .await
            .map_err(HookError::ProjectCards)?;

        let repo = &cards.repository;
        let Some(project_path) = self.projects.get(&repo.name) else {
            tracing::info!(repo = %repo.name_with_owner, issue = issue.number, "no project for repo");
            return Ok(IssueOutcome::NoProject);
        };

        if cards.has_project(project_path) {
            tracing::info!(
                repo = %repo.name_with_owner,
                issue = issue.number,
                project = %project_path,
                "nothing to be done"
            );
            return Ok(IssueOutcome::AlreadyOnProject);
        }

        let project_id = self.add_to_project(project_path, &issue.node_id).await?;
        tracing::info!(
            repo = %repo.name_with_owner,
            issue = issue.number,
            project = %project_path,
            "added issue to project"
        );
        Ok(IssueOutcome::Added { project_id })
    }

    async fn add_to_project(&self, project_path: &str, issue_id: &str) -> Result<String, HookError> {
        let project = self
            .service
            .find_project_id(project_path)
            .await
            .map_err(|source| HookError::FindProject {
                path: project_path.to_string(),
                source,
            })?;
        let project_id = project.id.to_string();

        self.service
            .add_issue_project_card(issue_id, &project_id)
            .await
            .map_err(|source| HookError::AddCard {
                issue: issue_id.to_string(),
                project: project_id.clone(),
                source,
            })?;

        Ok(project_id)
    }
}

impl Handler for IssuesProcessor {
    fn handle(
        &self,
        message: Message,
        _shutdown: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<(), BoxError>> + Send + '_>> {
        Box::pin(async move {
            self.process(&message).await?;
            Ok(())
        })
    }
}
