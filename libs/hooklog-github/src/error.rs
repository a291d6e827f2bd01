#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("graphql: {0}")]
    GraphQl(String),

    #[error("graphql: response has no data")]
    EmptyResponse,

    #[error("{0} not found")]
    NotFound(String),

    #[error("bad project path {path:?}: {reason}")]
    BadProjectPath { path: String, reason: String },
}
