use serde::Serialize;
use thiserror::Error;

/// Base code for the user-input error category.
///
/// Codes 1000 to 1999 cover failures caused by user input. There is no
/// unexpected error nor bug in this category; the user should be able to
/// address these issues themselves (a wrong parameter, a private repository
/// accessed without permission, and so on).
pub const USER_INPUT_ERROR_CODE: u32 = 1000;

/// User-facing error taxonomy for the HTTP API layer.
#[derive(Debug, Error)]
pub enum UserApiError {
    /// Invalid user input that fits no more specific kind.
    #[error("{message}")]
    InvalidInput { message: String },

    /// A resource that should exist does not, or is private and the backing
    /// API answers with a plain 404.
    #[error("{message}")]
    MissingResource { message: String },

    /// The user must authenticate to reach a resource that (possibly) exists.
    #[error("Accessing the requested resource requires authentication, please log in.")]
    Authentication,

    /// Two or more mounted storage buckets share a name. Bucket names double
    /// as mount points in the session, so they must be unique.
    #[error("The names of all mounted cloud storage buckets should be unique.")]
    DuplicateStorageNames,

    /// The docker image name cannot be parsed. A well-formed name pointing at
    /// a missing image raises [`UserApiError::MissingResource`] instead.
    #[error("The provided image name cannot be parsed.")]
    ImageParse,
}

impl UserApiError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn missing_resource(message: impl Into<String>) -> Self {
        Self::MissingResource {
            message: message.into(),
        }
    }

    /// Stable numeric code reported in API responses.
    pub fn code(&self) -> u32 {
        match self {
            Self::InvalidInput { .. } => USER_INPUT_ERROR_CODE,
            Self::MissingResource { .. } => USER_INPUT_ERROR_CODE + 404,
            Self::Authentication => USER_INPUT_ERROR_CODE + 401,
            Self::DuplicateStorageNames => USER_INPUT_ERROR_CODE + 1,
            Self::ImageParse => USER_INPUT_ERROR_CODE + 2,
        }
    }

    /// HTTP status code for the response carrying this error.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingResource { .. } => 404,
            Self::Authentication => 401,
            Self::InvalidInput { .. } | Self::DuplicateStorageNames | Self::ImageParse => 422,
        }
    }

    /// Response body for this error.
    pub fn to_response(&self) -> ApiErrorResponse {
        ApiErrorResponse {
            message: self.to_string(),
            code: self.code(),
        }
    }
}

/// Serialized error payload returned to API clients.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApiErrorResponse {
    pub message: String,
    pub code: u32,
}
