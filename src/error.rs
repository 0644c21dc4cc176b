use thiserror::Error;

/// Coarse failure label used to decide whether a call may fall back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The round trip never completed (DNS, refused, reset, transport error).
    Connectivity,
    /// The backend answered 404.
    NotFound,
    /// Any other non-2xx answer.
    Http,
    /// A 2xx answer whose body did not match the expected shape.
    Decode,
    /// Rejected locally before any network call.
    InvalidInput,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Connectivity => "connectivity",
            FailureKind::NotFound => "not_found",
            FailureKind::Http => "http",
            FailureKind::Decode => "decode",
            FailureKind::InvalidInput => "invalid_input",
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("network request failed: {message}")]
    Connectivity { message: String },

    #[error("API error 404: {body}")]
    NotFound { body: String },

    #[error("API error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("failed to decode response from {path}: {message}")]
    Decode { path: String, message: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Build the error for a completed round trip with a non-success status.
    pub fn from_status(status: u16, body: String) -> Self {
        if status == 404 {
            ApiError::NotFound { body }
        } else {
            ApiError::Http { status, body }
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::Connectivity { .. } => FailureKind::Connectivity,
            ApiError::NotFound { .. } => FailureKind::NotFound,
            ApiError::Http { .. } => FailureKind::Http,
            ApiError::Decode { .. } => FailureKind::Decode,
            ApiError::InvalidInput(_) => FailureKind::InvalidInput,
        }
    }

    /// HTTP status of the failed response, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_connectivity(&self) -> bool {
        self.kind() == FailureKind::Connectivity
    }

    /// Connectivity failure, or an endpoint missing from an older backend deployment.
    pub fn is_connectivity_or_not_found(&self) -> bool {
        matches!(self.kind(), FailureKind::Connectivity | FailureKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ApiError::from_status(404, "missing".into()).kind(), FailureKind::NotFound);
        assert_eq!(ApiError::from_status(500, "boom".into()).kind(), FailureKind::Http);
        assert_eq!(ApiError::from_status(400, "bad".into()).kind(), FailureKind::Http);
    }

    #[test]
    fn test_display_embeds_status_and_body() {
        let err = ApiError::from_status(422, "{\"detail\":\"bad age\"}".into());
        assert_eq!(err.to_string(), "API error 422: {\"detail\":\"bad age\"}");
        let err = ApiError::from_status(404, "Not Found".into());
        assert_eq!(err.to_string(), "API error 404: Not Found");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_eligibility_predicates() {
        let conn = ApiError::Connectivity { message: "connection refused".into() };
        let missing = ApiError::from_status(404, String::new());
        let server = ApiError::from_status(500, String::new());

        assert!(conn.is_connectivity());
        assert!(!missing.is_connectivity());
        assert!(conn.is_connectivity_or_not_found());
        assert!(missing.is_connectivity_or_not_found());
        assert!(!server.is_connectivity_or_not_found());
        assert!(!ApiError::InvalidInput("x".into()).is_connectivity_or_not_found());
    }
}
