//! GitHub connection settings.

use buildwatch_core::ConfigError;

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Connection settings for one repository.
#[derive(Clone)]
pub struct GitHubConfig {
    /// REST API base URL, without trailing slash
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    token: String,
}

impl GitHubConfig {
    /// Create a config for `owner/name` on the public API.
    pub fn new(repository: &str, token: &str) -> Result<Self, ConfigError> {
        let (owner, repo) = parse_repository(repository)?;
        Ok(GitHubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            owner,
            repo,
            token: token.to_string(),
        })
    }

    /// Point at another API base (GitHub Enterprise, test servers).
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// `{api_url}/repos/{owner}/{repo}`
    pub fn repo_url(&self) -> String {
        format!("{}/repos/{}/{}", self.api_url, self.owner, self.repo)
    }
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Split an `owner/name` slug.
pub fn parse_repository(slug: &str) -> Result<(String, String), ConfigError> {
    let invalid = || ConfigError::InvalidRepository(slug.to_string());
    let (owner, repo) = slug.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository() {
        assert_eq!(
            parse_repository("acme/builds").unwrap(),
            ("acme".to_string(), "builds".to_string())
        );
        for bad in ["acme", "acme/", "/builds", "a/b/c", ""] {
            assert!(parse_repository(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_repo_url_strips_trailing_slash() {
        let config = GitHubConfig::new("acme/builds", "t")
            .unwrap()
            .with_api_url("http://localhost:8080/");
        assert_eq!(config.repo_url(), "http://localhost:8080/repos/acme/builds");
    }

    #[test]
    fn test_default_api_url() {
        let config = GitHubConfig::new("acme/builds", "t").unwrap();
        assert_eq!(config.repo_url(), "https://api.github.com/repos/acme/builds");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = GitHubConfig::new("acme/builds", "ghs_secret").unwrap();
        assert!(!format!("{config:?}").contains("ghs_secret"));
    }
}
