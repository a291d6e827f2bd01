use hooklog_github::GithubError;
use hooklog_stream::Offset;

#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("failed to unmarshal message {offset}: {source}")]
    Decode {
        offset: Offset,
        source: serde_json::Error,
    },

    #[error("failed to get issue project cards: {0}")]
    ProjectCards(#[source] GithubError),

    #[error("failed to get project id for {path:?}: {source}")]
    FindProject { path: String, source: GithubError },

    #[error("failed to add project card to issue {issue}, project {project}: {source}")]
    AddCard {
        issue: String,
        project: String,
        source: GithubError,
    },
}
