use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// GitHub entity id.
///
/// REST payloads carry numeric ids, GraphQL uses opaque strings; both decode
/// here, and `null` decodes to an empty id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Str(String),
            Num(u64),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            None => EntityId::default(),
            Some(Raw::Str(s)) => EntityId(s),
            Some(Raw::Num(n)) => EntityId(n.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Issue {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub node_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_with_owner: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub resource_path: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectCard {
    #[serde(default)]
    pub id: EntityId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub project: Project,
}
