#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("config ({context}): {detail}")]
    Config { context: &'static str, detail: String },

    #[error("github: {0}")]
    Github(#[from] hooklog_github::GithubError),

    #[error("bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("api server: {0}")]
    Serve(std::io::Error),

    #[error("signal: {0}")]
    Signal(#[from] std::io::Error),
}
