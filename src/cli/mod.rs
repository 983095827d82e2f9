//! Command-line interface for the content catalog.
//!
//! Mirrors the operations the website performs: resolve the snapshot,
//! inspect the manifest, show one item, list a category, search across
//! categories, and print the landing-page overview.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::catalog::{Catalog, CATEGORY_ROOTS};
use crate::config::{self, Config};
use crate::store::GithubStore;
use crate::SourceFilter;

/// club-content - snapshot-pinned content catalog
#[derive(Parser, Debug)]
#[command(name = "club-content")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository owner
    #[arg(long, env = "CLUB_CONTENT_OWNER", default_value = config::DEFAULT_OWNER, global = true)]
    pub owner: String,

    /// Repository name
    #[arg(long, env = "CLUB_CONTENT_REPO", default_value = config::DEFAULT_REPO, global = true)]
    pub repo: String,

    /// Branch to resolve snapshots from
    #[arg(long, env = "CLUB_CONTENT_BRANCH", default_value = config::DEFAULT_BRANCH, global = true)]
    pub branch: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the branch to its current snapshot
    Snapshot,

    /// List every file path in the snapshot
    Manifest,

    /// Resolve and print one content item by id
    Show {
        /// Logical content id (markdown basename without extension)
        id: String,
    },

    /// List the items of one category root
    Category {
        /// Category root path (e.g. workshops)
        root: String,
    },

    /// Search across all categories
    Search {
        /// Query matched against title, summary and authors
        query: String,

        /// Restrict results to these source categories (repeatable)
        #[arg(short, long)]
        source: Vec<String>,
    },

    /// Item counts per category root
    Overview,

    /// Print the raw asset URL for a path in the snapshot
    AssetUrl {
        /// Path within the tree
        path: String,
    },

    /// Fetch a raw file body (e.g. the data/ datasets)
    Fetch {
        /// Path within the tree
        path: String,
    },
}

impl Cli {
    fn catalog(&self) -> Catalog {
        let config = Config {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            branch: self.branch.clone(),
        };
        Catalog::new(
            std::sync::Arc::new(GithubStore::from_config(&config)),
            config.branch,
        )
    }

    /// Execute the parsed command
    pub async fn execute(&self) -> Result<()> {
        let catalog = self.catalog();

        match &self.command {
            Commands::Snapshot => {
                match catalog.snapshot().await {
                    Some(snapshot) => {
                        println!("branch:      {}", snapshot.branch);
                        println!("snapshot:    {}", snapshot.id);
                        println!("resolved at: {}", snapshot.resolved_at.to_rfc3339());
                    }
                    None => println!("snapshot unavailable"),
                }
                Ok(())
            }

            Commands::Manifest => {
                match catalog.all_paths().await {
                    Some(paths) => {
                        for path in paths.iter() {
                            println!("{}", path);
                        }
                        println!("\n{} files", paths.len());
                    }
                    None => println!("manifest unavailable"),
                }
                Ok(())
            }

            Commands::Show { id } => {
                match catalog.resolve_item(id).await {
                    Some(item) => {
                        println!("id:         {}", item.id);
                        println!("path:       {}", item.path);
                        println!("title:      {}", item.title);
                        println!("authors:    {}", item.authors);
                        println!("kind:       {}", item.kind);
                        if let Some(date) = item.date {
                            println!("date:       {}", date);
                        }
                        if !item.categories.is_empty() {
                            println!("categories: {}", item.categories.join(", "));
                        }
                        if let Some(url) = &item.external_url {
                            println!("url:        {}", url);
                        }
                        if let Some(body) = &item.body {
                            println!("\n{}", body);
                        }
                    }
                    None => println!("no item with id '{}'", id),
                }
                Ok(())
            }

            Commands::Category { root } => {
                let listing = catalog.list_category(root).await;
                if listing.degraded {
                    println!("(category '{}' is temporarily unavailable)", root);
                    return Ok(());
                }

                for item in &listing.items {
                    let date = item
                        .date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "          ".to_string());
                    println!("{}  {:7}  {}", date, item.kind.to_string(), item.title);
                }
                println!("\n{} items", listing.items.len());
                Ok(())
            }

            Commands::Search { query, source } => {
                let index = catalog.search_index(&CATEGORY_ROOTS).await;
                let filter = if source.is_empty() {
                    SourceFilter::all()
                } else {
                    SourceFilter::only(source.iter().cloned())
                };

                let results = index.search(query, &filter);
                for result in &results {
                    println!("[{:12}]  {}", result.source, result.item.title);
                }
                println!("\n{} results", results.len());
                Ok(())
            }

            Commands::Overview => {
                for section in catalog.overview().await {
                    let note = if section.degraded { "  (unavailable)" } else { "" };
                    println!("{:14} {:4}{}", section.root, section.items, note);
                }
                Ok(())
            }

            Commands::AssetUrl { path } => {
                match catalog.asset_url(path).await {
                    Some(url) => println!("{}", url),
                    None => println!("snapshot unavailable"),
                }
                Ok(())
            }

            Commands::Fetch { path } => {
                match catalog.get_text(path).await {
                    Some(body) => println!("{}", body),
                    None => println!("file '{}' unavailable", path),
                }
                Ok(())
            }
        }
    }
}
