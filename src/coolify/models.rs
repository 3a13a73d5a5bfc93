use serde::Deserialize;

/// One entry of Coolify's `GET /applications` listing.
///
/// Applications that are not built from a git source (docker images,
/// compose files) come back without `git_repository`/`git_branch`.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Application {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub git_repository: Option<String>,
    #[serde(default)]
    pub git_branch: Option<String>,
}
