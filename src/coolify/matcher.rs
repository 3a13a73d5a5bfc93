use crate::coolify::models::Application;
use crate::gitea::models::RepoInfo;

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Returns the first application whose git repository and branch equal the
/// pushed ones, ignoring case and surrounding whitespace. Directory order is
/// kept as the platform returned it.
pub fn find_application<'a>(apps: &'a [Application], info: &RepoInfo) -> Option<&'a Application> {
    let repo = normalize(&info.repo_name);
    let branch = normalize(&info.branch);

    apps.iter().find(|app| {
        let app_repo = app.git_repository.as_deref().map(normalize);
        let app_branch = app.git_branch.as_deref().map(normalize);

        app_repo.as_deref() == Some(repo.as_str()) && app_branch.as_deref() == Some(branch.as_str())
    })
}
