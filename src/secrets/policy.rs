//! Access policy carried inside a secret record.
//!
//! Four reserved keys restrict which builds may read a record. Lists are
//! comma separated allow-lists of glob patterns; an absent or empty key
//! places no restriction.

use tracing::debug;

use super::error::DenialReason;
use super::matcher;
use super::record::SecretRecord;
use super::types::SecretRequest;

pub const EVENTS_KEY: &str = "X-Drone-Events";
pub const REPOS_KEY: &str = "X-Drone-Repos";
pub const BRANCHES_KEY: &str = "X-Drone-Branches";
pub const DISALLOW_FORKS_KEY: &str = "X-Drone-Disallow-Forks";

/// Policy attributes extracted from the reserved keys of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyAttributes {
    pub events: Vec<String>,
    pub repos: Vec<String>,
    pub branches: Vec<String>,
    /// Per-secret fork override; `None` defers to the global default.
    pub disallow_forks: Option<bool>,
}

impl PolicyAttributes {
    /// Reserved keys are looked up case-insensitively.
    pub fn from_record(record: &SecretRecord) -> Self {
        let list = |key: &str| record.get_ignore_case(key).map(parse_comma_separated).unwrap_or_default();

        Self {
            events: list(EVENTS_KEY),
            repos: list(REPOS_KEY),
            branches: list(BRANCHES_KEY),
            disallow_forks: record.get_ignore_case(DISALLOW_FORKS_KEY).map(parse_bool),
        }
    }

    /// Check the request against every policy in order: event, repository,
    /// branch, fork. The first failing check decides the denial reason.
    pub fn evaluate(&self, request: &SecretRequest, disallow_forks_default: bool) -> Result<(), DenialReason> {
        let event = request.build.event.as_str();
        let repo = request.repo.slug.as_str();
        let branch = request.build.target.as_str();

        if !matcher::matches(event, &self.events) {
            debug!(event = %event, allowed = ?self.events, "access denied: event does not match");
            return Err(DenialReason::Event);
        }

        if !matcher::matches(repo, &self.repos) {
            debug!(repo = %repo, allowed = ?self.repos, "access denied: repository does not match");
            return Err(DenialReason::Repository);
        }

        if !matcher::matches(branch, &self.branches) {
            debug!(branch = %branch, allowed = ?self.branches, "access denied: branch does not match");
            return Err(DenialReason::Branch);
        }

        if request.is_fork() && self.disallow_forks.unwrap_or(disallow_forks_default) {
            debug!(
                repo = %repo,
                fork = %request.build.fork,
                secret_override = ?self.disallow_forks,
                "access denied: forks are not allowed"
            );
            return Err(DenialReason::Fork);
        }

        Ok(())
    }
}

/// Split on commas without trimming. An empty string yields an empty list.
pub fn parse_comma_separated(value: &str) -> Vec<String> {
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(str::to_string).collect()
}

/// Boolean parsing for the fork override. Anything unrecognized is `false`.
fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "t" | "T" | "true" | "TRUE" | "True")
}
