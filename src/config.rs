//! Configuration for the content layer.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CLUB_CONTENT_OWNER, CLUB_CONTENT_REPO,
//!    CLUB_CONTENT_BRANCH)
//! 2. Defaults
//!
//! The branch is the only setting the site varies between deployments;
//! owner and repo identify the content repository itself.

use std::env;

/// Default repository coordinates
pub const DEFAULT_OWNER: &str = "club-site";
pub const DEFAULT_REPO: &str = "content";
pub const DEFAULT_BRANCH: &str = "main";

/// Resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository owner (user or organization)
    pub owner: String,

    /// Repository name
    pub repo: String,

    /// Branch to resolve snapshots from
    pub branch: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            owner: env::var("CLUB_CONTENT_OWNER").unwrap_or_else(|_| DEFAULT_OWNER.to_string()),
            repo: env::var("CLUB_CONTENT_REPO").unwrap_or_else(|_| DEFAULT_REPO.to_string()),
            branch: env::var("CLUB_CONTENT_BRANCH").unwrap_or_else(|_| DEFAULT_BRANCH.to_string()),
        }
    }
}
