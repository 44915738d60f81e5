pub mod git_url;

pub use git_url::{GitUrl, GitUrlError};
