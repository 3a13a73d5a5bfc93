use serde::Deserialize;
use serde_json::Value;

/// The parts of a Gitea push event the relay cares about.
///
/// Every field is optional so that a payload missing them still decodes;
/// absence is reported by [`extract_repo_info`], not by deserialization.
#[derive(Deserialize, Debug, Default)]
pub struct GiteaPushEvent {
    #[serde(default)]
    pub repository: Option<Repository>,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct Repository {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoInfo {
    pub repo_name: String,
    pub branch: String,
}

/// Pulls the repository full name and branch out of a decoded push event.
///
/// The branch is the last `/`-separated segment of `ref`, so
/// `refs/heads/main` yields `main`. Returns `None` when either value is
/// missing, not a string, or empty.
pub fn extract_repo_info(payload: &Value) -> Option<RepoInfo> {
    let event = GiteaPushEvent::deserialize(payload).unwrap_or_default();

    let repo_name = event
        .repository
        .and_then(|r| r.full_name)
        .filter(|name| !name.is_empty())?;

    let branch = event
        .git_ref
        .as_deref()
        .and_then(|r| r.rsplit('/').next())
        .filter(|b| !b.is_empty())?
        .to_string();

    Some(RepoInfo { repo_name, branch })
}
