//! # gitseed - Session Workspace Git Initializer
//!
//! `gitseed` materializes the git repositories of a notebook session into its
//! workspace. It waits for the git server to become reachable, clones each
//! repository at a target branch and commit, configures the user's git
//! identity, scopes credentials for authenticated clones, negotiates
//! disk-space constraints for Git-LFS content, excludes cloud-storage mount
//! points from version control, and routes in-session git traffic through a
//! local proxy.
//!
//! ## Features
//!
//! - **Idempotent initialization**: safe to re-run on session resume; existing
//!   work trees are never touched
//! - **Scoped credentials**: plaintext credentials exist only for the duration
//!   of the clone and are removed on every exit path
//! - **LFS handling**: pointer-only checkouts by default, with a disk-space
//!   safety check before full content download
//! - **Actionable exit codes**: a closed failure taxonomy where each kind maps
//!   to a distinct process exit code
//!
//! ## Quick Start
//!
//! ```bash
//! gitseed clone \
//!   --repositories '[{"namespace":"group","project":"demo","branch":"main",
//!                     "commit_sha":"abc123f","url":"https://git.example/group/demo.git"}]' \
//!   --workspace-mount-path /workspace \
//!   --repository-url https://git.example
//! ```
//!
//! ## Architecture
//!
//! The crate is organized using clean architecture principles:
//!
//! - [`domain`]: Core entities and value objects
//! - [`application`]: The cloning service and its configuration
//! - [`infrastructure`]: Git subprocess execution, credentials, disk queries
//! - [`presentation`]: CLI interface and the API error taxonomy
//! - [`common`]: Shared error taxonomy and result alias
//!
//! ## Error Handling
//!
//! - [`common::error::CloneError`]: failure taxonomy with per-kind exit codes
//! - [`common::result::CloneResult`]: type alias for `Result<T, CloneError>`
//!
//! ## Using the Library
//!
//! ```rust,no_run
//! use gitseed::application::services::cloner::{ClonerConfig, GitCloner};
//! use gitseed::domain::entities::user::User;
//!
//! # async fn example() -> gitseed::Result<()> {
//! let config = ClonerConfig::new(
//!     vec![],
//!     "/workspace",
//!     User::anonymous(),
//!     "https://git.example",
//! );
//!
//! let mut cloner = GitCloner::new(config).await?;
//! cloner.run(&[]).await?;
//! # Ok(())
//! # }
//! ```

// Documentation attributes
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::CloneError;
pub use crate::common::result::CloneResult as Result;
