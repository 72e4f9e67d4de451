/// Errors from the Scopus HTTP layer.
#[derive(thiserror::Error, Debug)]
pub enum ScopusError {
    /// HTTP transport error (connection, DNS, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 401/403: key missing, invalid, or not entitled to this resource
    #[error("Scopus rejected the API key (HTTP {status}). Check SCOPUS_API_KEY and your institutional access.")]
    Unauthorized { status: u16 },

    /// 429: quota exhausted
    #[error("Scopus API rate limit exceeded. Wait a few minutes and try again.")]
    RateLimited,

    /// Any other non-success status
    #[error("Scopus API error ({status}): {message}")]
    Status { status: u16, message: String },

    /// Body was not the JSON shape we expected
    #[error("Failed to parse Scopus response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScopusError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => ScopusError::Unauthorized {
                status: status.as_u16(),
            },
            429 => ScopusError::RateLimited,
            code => ScopusError::Status {
                status: code,
                message: body.chars().take(200).collect(),
            },
        }
    }

    /// Worth another attempt: transport hiccups and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ScopusError::Http(e) => e.is_timeout() || e.is_connect(),
            ScopusError::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, ScopusError::Unauthorized { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status_classification() {
        assert!(ScopusError::from_status(StatusCode::UNAUTHORIZED, "").is_auth());
        assert!(ScopusError::from_status(StatusCode::FORBIDDEN, "").is_auth());
        assert!(matches!(
            ScopusError::from_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ScopusError::RateLimited
        ));
        let server = ScopusError::from_status(StatusCode::BAD_GATEWAY, "upstream");
        assert!(server.is_transient());
        assert!(server.to_string().contains("upstream"));
        assert!(!ScopusError::from_status(StatusCode::BAD_REQUEST, "bad").is_transient());
    }
}
