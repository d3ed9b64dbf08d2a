use super::{IssueTracker, check_status, http_client};
use crate::errors::{AppError, AppResult};
use crate::models::tracker::{ExternalIssue, Provider};
use serde::Deserialize;

pub const DEFAULT_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct GitHubIssue {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    html_url: String,
    state: String,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

/// Decode a GitHub issues page. Pull requests share the endpoint and are
/// dropped.
pub fn parse_github_issues(json: &str) -> AppResult<Vec<ExternalIssue>> {
    let raw: Vec<GitHubIssue> = serde_json::from_str(json)?;
    Ok(raw
        .into_iter()
        .filter(|i| i.pull_request.is_none())
        .map(|i| ExternalIssue {
            external_id: i.number.to_string(),
            title: i.title,
            body: i.body.filter(|b| !b.trim().is_empty()),
            url: i.html_url,
            closed: i.state == "closed",
        })
        .collect())
}

pub struct GitHubTracker {
    api_base: String,
    owner: String,
    repo: String,
    token: Option<String>,
    client: reqwest::blocking::Client,
}

impl GitHubTracker {
    pub fn new(api_base: &str, repository: &str, token: Option<String>) -> AppResult<Self> {
        let (owner, repo) = repository
            .split_once('/')
            .ok_or_else(|| AppError::validation("repository", "expected <owner>/<repo>"))?;
        Ok(Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            owner: owner.to_string(),
            repo: repo.to_string(),
            token,
            client: http_client()?,
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/repos/{}/{}/issues?state=all&per_page=100",
            self.api_base, self.owner, self.repo
        )
    }
}

impl IssueTracker for GitHubTracker {
    fn provider(&self) -> Provider {
        Provider::Github
    }

    fn fetch_issues(&self) -> AppResult<Vec<ExternalIssue>> {
        let mut request = self
            .client
            .get(self.endpoint())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = check_status(request.send()?)?;
        parse_github_issues(&response.text()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_requests_are_dropped() {
        let json = r#"[
            {"number": 7, "title": "Crash on start", "body": "  ", "html_url": "https://github.com/o/r/issues/7", "state": "open"},
            {"number": 8, "title": "Fix crash", "body": "patch", "html_url": "https://github.com/o/r/pull/8", "state": "open", "pull_request": {"url": "x"}},
            {"number": 9, "title": "Docs", "body": "typo", "html_url": "https://github.com/o/r/issues/9", "state": "closed"}
        ]"#;

        let issues = parse_github_issues(json).unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].external_id, "7");
        assert_eq!(issues[0].body, None);
        assert!(!issues[0].closed);
        assert!(issues[1].closed);
    }

    #[test]
    fn test_repository_must_have_owner() {
        assert!(GitHubTracker::new(DEFAULT_API, "just-a-repo", None).is_err());

        let t = GitHubTracker::new("https://api.example.com/", "o/r", None).unwrap();
        assert_eq!(
            t.endpoint(),
            "https://api.example.com/repos/o/r/issues?state=all&per_page=100"
        );
    }
}
