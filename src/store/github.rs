//! GitHub-backed content store.
//!
//! The club's content tree is a public GitHub repository. Branch resolution
//! and listings go through the REST API; raw file bodies come from the
//! `raw.githubusercontent.com` mirror, which needs no API quota.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use super::{ContentStore, DirectoryEntry, EntryKind, StoreError, TreeListing};
use crate::config::Config;

const API_BASE: &str = "https://api.github.com";
const RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Content store backed by a public GitHub repository
pub struct GithubStore {
    owner: String,
    repo: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct BranchResponse {
    commit: CommitRef,
}

#[derive(Debug, Deserialize)]
struct CommitRef {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    tree: Vec<TreeNode>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeNode {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    path: String,
    sha: String,
    #[serde(default)]
    size: u64,
    #[serde(rename = "type")]
    kind: String,
}

impl GithubStore {
    /// Create a store for one repository
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        // GitHub rejects requests without a User-Agent.
        let client = reqwest::Client::builder()
            .user_agent(concat!("club-content/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Self {
            owner: owner.into(),
            repo: repo.into(),
            client,
        }
    }

    /// Create from resolved configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.owner.clone(), config.repo.clone())
    }

    fn api_url(&self, rest: &str) -> String {
        format!("{}/repos/{}/{}/{}", API_BASE, self.owner, self.repo, rest)
    }

    async fn get(&self, url: &str, what: &str) -> Result<reqwest::Response, StoreError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(what.to_string())),
            status if !status.is_success() => Err(StoreError::Network(format!(
                "{} returned {}",
                what, status
            ))),
            _ => Ok(response),
        }
    }
}

#[async_trait]
impl ContentStore for GithubStore {
    fn name(&self) -> &str {
        "github"
    }

    async fn resolve_branch(&self, branch: &str) -> Result<String, StoreError> {
        let url = self.api_url(&format!("branches/{}", branch));
        let response = self.get(&url, &format!("branch '{}'", branch)).await?;

        let branch_info: BranchResponse = response.json().await.map_err(|e| StoreError::Parse {
            path: format!("branches/{}", branch),
            message: e.to_string(),
        })?;

        Ok(branch_info.commit.sha)
    }

    async fn list_tree(&self, snapshot: &str) -> Result<TreeListing, StoreError> {
        let url = self.api_url(&format!("git/trees/{}?recursive=1", snapshot));
        let response = self.get(&url, &format!("tree {}", snapshot)).await?;

        let tree: TreeResponse = response.json().await.map_err(|e| StoreError::Parse {
            path: format!("git/trees/{}", snapshot),
            message: e.to_string(),
        })?;

        let paths = tree
            .tree
            .into_iter()
            .filter(|node| node.kind == "blob")
            .map(|node| node.path)
            .collect();

        Ok(TreeListing {
            paths,
            truncated: tree.truncated,
        })
    }

    async fn list_dir(
        &self,
        snapshot: &str,
        path: &str,
    ) -> Result<Vec<DirectoryEntry>, StoreError> {
        let url = self.api_url(&format!("contents/{}?ref={}", path, snapshot));
        let response = self.get(&url, &format!("directory '{}'", path)).await?;

        // The contents endpoint returns an array for directories and a
        // single object for files.
        let body: serde_json::Value = response.json().await.map_err(|e| StoreError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })?;

        let entries: Vec<ContentsEntry> = match body {
            serde_json::Value::Array(_) => {
                serde_json::from_value(body).map_err(|e| StoreError::Parse {
                    path: path.to_string(),
                    message: e.to_string(),
                })?
            }
            _ => return Err(StoreError::NotADirectory(path.to_string())),
        };

        Ok(entries
            .into_iter()
            .map(|entry| DirectoryEntry {
                name: entry.name,
                path: entry.path,
                kind: if entry.kind == "dir" {
                    EntryKind::Dir
                } else {
                    EntryKind::File
                },
                sha: entry.sha,
                size: entry.size,
            })
            .collect())
    }

    async fn get_text(&self, snapshot: &str, path: &str) -> Result<String, StoreError> {
        let url = self.asset_url(snapshot, path);
        let response = self.get(&url, &format!("file '{}'", path)).await?;

        response
            .text()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    fn asset_url(&self, snapshot: &str, path: &str) -> String {
        format!("{}/{}/{}/{}/{}", RAW_BASE, self.owner, self.repo, snapshot, path)
    }
}
