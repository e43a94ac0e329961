//! Errors returned by the Networking and Identity API clients.

use reqwest::StatusCode;

/// Error from an OpenStack API call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API answered 404.
    #[error("Resource not found: [{method} {url}]: {body}")]
    NotFound {
        method: String,
        url: String,
        body: String,
    },

    /// The API answered with a status the call does not accept.
    #[error(
        "Expected HTTP response code {expected:?} when accessing [{method} {url}], but got {status} instead: {body}"
    )]
    UnexpectedStatus {
        method: String,
        url: String,
        expected: Vec<u16>,
        status: u16,
        body: String,
    },

    /// The request did not complete.
    #[error("Request [{method} {url}] failed: {source}")]
    Transport {
        method: String,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not match the expected shape.
    #[error("Unable to decode response from {url}: path={path} error={message}")]
    Decode {
        url: String,
        path: String,
        message: String,
    },

    /// A paginated listing returned the same next link twice.
    #[error("Next page link not unique - possible infinite loop: {0}")]
    Pagination(String),

    /// Authentication or endpoint discovery failed.
    #[error("{0}")]
    Auth(String),
}

impl ApiError {
    /// True for a 404 from the API.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// HTTP status code of the failed call, when there was a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::NotFound { .. } => Some(StatusCode::NOT_FOUND),
            ApiError::UnexpectedStatus { status, .. } => StatusCode::from_u16(*status).ok(),
            ApiError::Transport { source, .. } => source.status(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::NotFound {
            method: "GET".to_string(),
            url: "http://neutron/v2.0/subnetpools/x".to_string(),
            body: String::new(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));

        let err = ApiError::UnexpectedStatus {
            method: "POST".to_string(),
            url: "http://neutron/v2.0/subnetpools".to_string(),
            expected: vec![201],
            status: 409,
            body: "conflict".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(
            err.to_string(),
            "Expected HTTP response code [201] when accessing [POST http://neutron/v2.0/subnetpools], but got 409 instead: conflict"
        );
    }
}
