use super::{IssueTracker, check_status, http_client};
use crate::errors::AppResult;
use crate::models::tracker::{ExternalIssue, Provider};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraFields,
}

#[derive(Debug, Deserialize)]
struct JiraFields {
    summary: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    status: Option<JiraStatus>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraStatus {
    #[serde(default)]
    status_category: Option<StatusCategory>,
}

#[derive(Debug, Deserialize)]
struct StatusCategory {
    key: String,
}

/// Decode a Jira search response. An issue is closed once its status
/// category is `done`.
pub fn parse_jira_issues(json: &str, base_url: &str) -> AppResult<Vec<ExternalIssue>> {
    let result: SearchResult = serde_json::from_str(json)?;
    let base = base_url.trim_end_matches('/');

    Ok(result
        .issues
        .into_iter()
        .map(|i| {
            let closed = i
                .fields
                .status
                .and_then(|s| s.status_category)
                .is_some_and(|c| c.key == "done");
            ExternalIssue {
                url: format!("{base}/browse/{}", i.key),
                external_id: i.key,
                title: i.fields.summary,
                body: i.fields.description.filter(|d| !d.trim().is_empty()),
                closed,
            }
        })
        .collect())
}

pub struct JiraTracker {
    base_url: String,
    project_key: String,
    email: String,
    token: String,
    client: reqwest::blocking::Client,
}

impl JiraTracker {
    pub fn new(base_url: &str, project_key: &str, email: String, token: String) -> AppResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_key: project_key.trim().to_string(),
            email,
            token,
            client: http_client()?,
        })
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/rest/api/2/search?jql=project={}&maxResults=100",
            self.base_url, self.project_key
        )
    }
}

impl IssueTracker for JiraTracker {
    fn provider(&self) -> Provider {
        Provider::Jira
    }

    fn fetch_issues(&self) -> AppResult<Vec<ExternalIssue>> {
        let response = self
            .client
            .get(self.endpoint())
            .header("Accept", "application/json")
            .basic_auth(&self.email, Some(&self.token))
            .send()?;

        let response = check_status(response)?;
        parse_jira_issues(&response.text()?, &self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_category_done_closes_issue() {
        let json = r#"{"issues": [
            {"key": "WEB-1", "fields": {"summary": "Login", "description": "SSO", "status": {"statusCategory": {"key": "done"}}}},
            {"key": "WEB-2", "fields": {"summary": "Logout", "status": {"statusCategory": {"key": "indeterminate"}}}}
        ]}"#;

        let issues = parse_jira_issues(json, "https://acme.atlassian.net/").unwrap();
        assert_eq!(issues.len(), 2);
        assert!(issues[0].closed);
        assert_eq!(issues[0].url, "https://acme.atlassian.net/browse/WEB-1");
        assert!(!issues[1].closed);
        assert_eq!(issues[1].body, None);
    }

    #[test]
    fn test_empty_search_result() {
        assert!(parse_jira_issues("{}", "https://x").unwrap().is_empty());
    }
}
