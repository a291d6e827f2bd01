use std::future::Future;
use std::pin::Pin;

use hooklog_github::{GithubError, GithubService, IssueProjectCards, Project};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, GithubError>> + Send + 'a>>;

/// Project board operations the issues processor needs.
pub trait IssueProjects: Send + Sync {
    fn issue_project_cards<'a>(&'a self, issue_id: &'a str) -> BoxFuture<'a, IssueProjectCards>;

    fn find_project_id<'a>(&'a self, resource_path: &'a str) -> BoxFuture<'a, Project>;

    fn add_issue_project_card<'a>(
        &'a self,
        issue_id: &'a str,
        project_id: &'a str,
    ) -> BoxFuture<'a, IssueProjectCards>;
}

impl IssueProjects for GithubService {
    fn issue_project_cards<'a>(&'a self, issue_id: &'a str) -> BoxFuture<'a, IssueProjectCards> {
        Box::pin(GithubService::issue_project_cards(self, issue_id))
    }

    fn find_project_id<'a>(&'a self, resource_path: &'a str) -> BoxFuture<'a, Project> {
        Box::pin(GithubService::find_project_id(self, resource_path))
    }

    fn add_issue_project_card<'a>(
        &'a self,
        issue_id: &'a str,
        project_id: &'a str,
    ) -> BoxFuture<'a, IssueProjectCards> {
        Box::pin(GithubService::add_issue_project_card(self, issue_id, project_id))
    }
}
