use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde_json::json;

use crate::client::GithubClient;
use crate::error::GithubError;
use crate::models::{Project, ProjectCard, Repository};

const QUERY_ISSUE_PROJECT_CARDS: &str = r#"
query IssueProjectCards($id: ID!) {
  node(id: $id) {
    ... on Issue {
      repository { id name nameWithOwner }
      projectCards {
        nodes {
          id
          url
          project { id name url resourcePath }
        }
      }
    }
  }
}"#;

const MUTATION_ADD_ISSUE_PROJECT_CARD: &str = r#"
mutation AddIssueProjectCard($id: ID!, $projectId: ID!) {
  updateIssue(input: {id: $id, projectIds: [$projectId]}) {
    issue {
      repository { id name nameWithOwner }
      projectCards {
        nodes {
          id
          url
          project { id name url resourcePath }
        }
      }
    }
  }
}"#;

const QUERY_ORG_PROJECT: &str = r#"
query FindProjectID($login: String!, $number: Int!) {
  organization(login: $login) {
    project(number: $number) { id name }
  }
}"#;

const QUERY_REPO_PROJECT: &str = r#"
query FindProjectID($owner: String!, $name: String!, $number: Int!) {
  repository(owner: $owner, name: $name) {
    project(number: $number) { id name }
  }
}"#;

/// The repository of an issue and the project cards it is on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueProjectCards {
    #[serde(default)]
    pub repository: Repository,
    #[serde(default)]
    pub project_cards: Nodes<ProjectCard>,
}

impl IssueProjectCards {
    pub fn cards(&self) -> &[ProjectCard] {
        &self.project_cards.nodes
    }

    /// Whether one of the cards belongs to the project at `resource_path`.
    pub fn has_project(&self, resource_path: &str) -> bool {
        self.cards()
            .iter()
            .any(|card| card.project.resource_path == resource_path)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Nodes<T> {
    #[serde(default)]
    pub nodes: Vec<T>,
}

/// Resource path of a classic project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectPath {
    /// `/orgs/<login>/projects/<number>`
    Organization { login: String, number: u32 },
    /// `/<owner>/<repo>/projects/<number>`
    Repository { owner: String, name: String, number: u32 },
}

impl FromStr for ProjectPath {
    type Err = GithubError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let bad = |reason: &str| GithubError::BadProjectPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let rest = path.strip_prefix('/').ok_or_else(|| bad("must start with '/'"))?;
        let parts: Vec<&str> = rest.splitn(4, '/').collect();
        let &[scope, name, kind, number] = parts.as_slice() else {
            return Err(bad("expected 4 segments"));
        };
        if kind != "projects" {
            return Err(bad("third segment must be 'projects'"));
        }
        let number: u32 = number
            .parse()
            .map_err(|e| bad(&format!("project number: {e}")))?;

        Ok(if scope == "orgs" {
            ProjectPath::Organization {
                login: name.to_string(),
                number,
            }
        } else {
            ProjectPath::Repository {
                owner: scope.to_string(),
                name: name.to_string(),
                number,
            }
        })
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectPath::Organization { login, number } => write!(f, "/orgs/{login}/projects/{number}"),
            ProjectPath::Repository { owner, name, number } => {
                write!(f, "/{owner}/{name}/projects/{number}")
            }
        }
    }
}

/// Issue and project operations on top of [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubService {
    client: GithubClient,
}

impl GithubService {
    pub fn new(client: GithubClient) -> Self {
        Self { client }
    }

    pub async fn issue_project_cards(&self, issue_id: &str) -> Result<IssueProjectCards, GithubError> {
        #[derive(Deserialize)]
        struct Response {
            node: Option<IssueProjectCards>,
        }

        let resp: Response = self
            .client
            .run(QUERY_ISSUE_PROJECT_CARDS, json!({ "id": issue_id }))
            .await?;
        resp.node
            .ok_or_else(|| GithubError::NotFound(format!("issue {issue_id}")))
    }

    /// Put the issue on the project's board.
    pub async fn add_issue_project_card(
        &self,
        issue_id: &str,
        project_id: &str,
    ) -> Result<IssueProjectCards, GithubError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Response {
            update_issue: UpdateIssue,
        }
        #[derive(Deserialize)]
        struct UpdateIssue {
            issue: Option<IssueProjectCards>,
        }

        let resp: Response = self
            .client
            .run(
                MUTATION_ADD_ISSUE_PROJECT_CARD,
                json!({ "id": issue_id, "projectId": project_id }),
            )
            .await?;
        resp.update_issue
            .issue
            .ok_or_else(|| GithubError::NotFound(format!("issue {issue_id}")))
    }

    /// Resolve a project resource path to the project's node id.
    pub async fn find_project_id(&self, resource_path: &str) -> Result<Project, GithubError> {
        #[derive(Deserialize)]
        struct Owner {
            project: Option<Project>,
        }
        #[derive(Deserialize)]
        struct OrgResponse {
            organization: Option<Owner>,
        }
        #[derive(Deserialize)]
        struct RepoResponse {
            repository: Option<Owner>,
        }

        let owner = match resource_path.parse::<ProjectPath>()? {
            ProjectPath::Organization { login, number } => {
                let resp: OrgResponse = self
                    .client
                    .run(QUERY_ORG_PROJECT, json!({ "login": login, "number": number }))
                    .await?;
                resp.organization
            }
            ProjectPath::Repository { owner, name, number } => {
                let resp: RepoResponse = self
                    .client
                    .run(
                        QUERY_REPO_PROJECT,
                        json!({ "owner": owner, "name": name, "number": number }),
                    )
                    .await?;
                resp.repository
            }
        };

        owner
            .and_then(|o| o.project)
            .ok_or_else(|| GithubError::NotFound(format!("project {resource_path}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_org_project_path() {
        let path: ProjectPath = "/orgs/acme/projects/13".parse().unwrap();
        assert_eq!(
            path,
            ProjectPath::Organization {
                login: "acme".into(),
                number: 13
            }
        );
        assert_eq!(path.to_string(), "/orgs/acme/projects/13");
    }

    #[test]
    fn parse_repo_project_path() {
        let path: ProjectPath = "/acme/backend/projects/1".parse().unwrap();
        assert_eq!(
            path,
            ProjectPath::Repository {
                owner: "acme".into(),
                name: "backend".into(),
                number: 1
            }
        );
    }

    #[test]
    fn reject_bad_project_paths() {
        for path in [
            "",
            "orgs/acme/projects/1",
            "/orgs/acme/projects",
            "/orgs/acme/columns/1",
            "/orgs/acme/projects/x",
            "/orgs/acme/projects/1/extra",
        ] {
            let err = path.parse::<ProjectPath>().unwrap_err();
            assert!(
                matches!(err, GithubError::BadProjectPath { .. }),
                "{path:?}: {err}"
            );
        }
    }

    #[test]
    fn issue_cards_match_project() {
        let cards: IssueProjectCards = serde_json::from_str(
            r#"{
                "repository": {"id": "R1", "name": "backend", "nameWithOwner": "acme/backend"},
                "projectCards": {"nodes": [
                    {"id": "C1", "url": "u", "project": {"id": "P1", "name": "Board", "url": "u", "resourcePath": "/orgs/acme/projects/13"}}
                ]}
            }"#,
        )
        .unwrap();

        assert_eq!(cards.repository.name_with_owner, "acme/backend");
        assert!(cards.has_project("/orgs/acme/projects/13"));
        assert!(!cards.has_project("/orgs/acme/projects/14"));
    }
}
