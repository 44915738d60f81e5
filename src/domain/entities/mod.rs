pub mod repository;
pub mod session_manifest;
pub mod user;

pub use repository::{Repository, RepositoryConfig};
pub use session_manifest::SessionManifest;
pub use user::User;
