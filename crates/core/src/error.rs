use whetstone_store::StoreError;

/// Everything a request against the active-model surface can fail with.
///
/// Each variant carries the user-visible message. The transport layer maps a
/// variant to an HTTP status via [`ApiError::status`] and to a stable
/// machine-readable kind string via [`ApiError::kind`]; nothing below the
/// transport ever touches status codes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Conflicting or ambiguous identity parameters supplied.
    #[error("{0}")]
    InvalidSelector(String),

    /// Structurally valid but semantically disallowed parameter combination.
    #[error("{0}")]
    InvalidInput(String),

    /// Referenced node/policy/active model does not exist, or the node
    /// exists but holds no binding.
    #[error("{0}")]
    NotFound(String),

    /// Caller failed an origin-based authorization check.
    #[error("{0}")]
    Forbidden(String),

    /// The object store refused or failed a delete.
    #[error("{0}")]
    RemovalFailed(String),

    /// A filter expression named an attribute the entries do not have.
    #[error("{0}")]
    UnknownFilterField(String),

    /// Unclassified failure, surfaced with its message rather than swallowed.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Stable kind string carried in the response envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidSelector(_) => "invalid_selector",
            ApiError::InvalidInput(_) => "invalid_input",
            ApiError::NotFound(_) => "not_found",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::RemovalFailed(_) => "removal_failed",
            ApiError::UnknownFilterField(_) => "unknown_filter_field",
            ApiError::Internal(_) => "internal",
        }
    }

    /// HTTP status this failure surfaces as.
    ///
    /// Validation and not-found failures are 400, authorization and removal
    /// failures 403, everything unclassified 500.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidSelector(_)
            | ApiError::InvalidInput(_)
            | ApiError::NotFound(_)
            | ApiError::UnknownFilterField(_) => 400,
            ApiError::Forbidden(_) | ApiError::RemovalFailed(_) => 403,
            ApiError::Internal(_) => 500,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            // An ambiguous uuid prefix is a caller problem, not a store one.
            StoreError::AmbiguousUuid { .. } => ApiError::InvalidSelector(err.to_string()),
            StoreError::Backend(_) => ApiError::Internal(err.to_string()),
        }
    }
}
