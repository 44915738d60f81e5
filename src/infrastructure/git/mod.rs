pub mod cli;
pub mod credentials;

// Re-export main types for convenience
pub use cli::{GitCli, GitCommandError};
pub use credentials::{TempCredentials, DEFAULT_CREDENTIALS_PATH};
