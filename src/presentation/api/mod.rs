pub mod errors;

pub use errors::{ApiErrorResponse, UserApiError};
