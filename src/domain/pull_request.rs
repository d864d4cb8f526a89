use std::fmt;

use crate::domain::table::table_id;
use crate::error::{AppError, AppResult};

/// Identifies one pull request on the code host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    /// Parses an `owner/repo` slug together with a pull request number.
    pub fn parse(slug: &str, number: u64) -> AppResult<Self> {
        let (owner, repo) = parse_repository(slug)?;
        if number == 0 {
            return Err(AppError::Configuration(
                "pull request number must be positive".to_string(),
            ));
        }
        Ok(Self::new(owner, repo, number))
    }

    pub fn table_id(&self, bot_version: &str) -> String {
        table_id(&self.owner, &self.repo, bot_version)
    }
}

/// Splits an `owner/repo` slug.
pub fn parse_repository(slug: &str) -> AppResult<(String, String)> {
    let mut parts = slug.trim().trim_end_matches('/').split('/');
    let owner = parts.next().map(str::trim).unwrap_or_default();
    let repo = parts.next().map(str::trim).unwrap_or_default();
    if owner.is_empty() || repo.is_empty() || parts.next().is_some() {
        return Err(AppError::Configuration(format!(
            "repository must look like owner/name, got '{slug}'"
        )));
    }
    Ok((owner.to_string(), repo.to_string()))
}

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
