use thiserror::Error;

/// Failures talking to the remote recipe service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The host could not be reached (DNS, connect, timeout, reset).
    #[error("Recipe service unreachable: {0}")]
    Unreachable(String),

    /// The service answered with a non-2xx status not covered below.
    #[error("Recipe service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// 400: the service rejected the draft.
    #[error("Recipe rejected by service: {0}")]
    Validation(String),

    /// 404: stale or unknown id.
    #[error("Recipe not found: {0}")]
    NotFound(String),

    /// 2xx with a body we could not understand.
    #[error("Malformed response from recipe service: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Map a non-2xx status and its body text onto the taxonomy.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            400 => Self::Validation(body),
            404 => Self::NotFound(body),
            _ => Self::Service { status, body },
        }
    }

    /// Whether trying again later might succeed.
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Unreachable(_) => true,
            Self::Service { status, .. } => *status >= 500 || *status == 429,
            Self::Validation(_) | Self::NotFound(_) | Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            Self::from_status(status.as_u16(), e.to_string())
        } else {
            Self::Unreachable(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            RemoteError::from_status(400, "missing name".into()),
            RemoteError::Validation("missing name".into())
        );
        assert_eq!(
            RemoteError::from_status(404, "gone".into()),
            RemoteError::NotFound("gone".into())
        );
        assert_eq!(
            RemoteError::from_status(503, "busy".into()),
            RemoteError::Service {
                status: 503,
                body: "busy".into()
            }
        );
    }

    #[test]
    fn retriable_classification() {
        assert!(RemoteError::Unreachable("x".into()).is_retriable());
        assert!(RemoteError::from_status(500, String::new()).is_retriable());
        assert!(!RemoteError::from_status(401, String::new()).is_retriable());
        assert!(!RemoteError::from_status(404, String::new()).is_retriable());
    }
}
