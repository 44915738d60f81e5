pub mod error;
pub mod result;

pub use error::CloneError;
pub use result::CloneResult;
