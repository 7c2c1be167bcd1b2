use greenview_core::error::ErrorKind;

/// Errors from the integration API gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// The integration is switched off and no override token was supplied.
    #[error("GreenView integration is disabled")]
    Disabled,

    /// No company token is configured. Raised before any network I/O.
    #[error("No API token configured")]
    MissingCredential,

    /// The request URL could not be built.
    #[error("Invalid request URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with something other than 200.
    #[error("Non-200 response code {status} from {url}")]
    Status {
        url: String,
        status: u16,
        /// Truncated response body for debugging.
        body_preview: String,
    },

    /// The body of a 200 response was not JSON.
    #[error("Response from {url} is not valid JSON: {message}")]
    MalformedBody {
        url: String,
        message: String,
        body_preview: String,
    },

    /// The JSON did not have the expected `{status, data}` shape.
    #[error("Unexpected response envelope from {url}: {reason}")]
    Envelope { url: String, reason: &'static str },
}

impl GatewayError {
    /// Coarse classification shared with the rest of the service.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GatewayError::Disabled => ErrorKind::Disabled,
            GatewayError::MissingCredential => ErrorKind::MissingCredential,
            GatewayError::InvalidUrl { .. }
            | GatewayError::Transport { .. }
            | GatewayError::Status { .. }
            | GatewayError::MalformedBody { .. }
            | GatewayError::Envelope { .. } => ErrorKind::RemoteError,
        }
    }

    /// HTTP status returned by the API, if the call got that far.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GatewayError::Status { status, .. } => Some(*status),
            GatewayError::MalformedBody { .. } | GatewayError::Envelope { .. } => Some(200),
            _ => None,
        }
    }

    /// Request URL, if one was built.
    pub fn url(&self) -> Option<&str> {
        match self {
            GatewayError::Disabled | GatewayError::MissingCredential => None,
            GatewayError::InvalidUrl { url, .. }
            | GatewayError::Transport { url, .. }
            | GatewayError::Status { url, .. }
            | GatewayError::MalformedBody { url, .. }
            | GatewayError::Envelope { url, .. } => Some(url),
        }
    }

    /// Truncated response body, if one was received.
    pub fn body_preview(&self) -> Option<&str> {
        match self {
            GatewayError::Status { body_preview, .. }
            | GatewayError::MalformedBody { body_preview, .. } => Some(body_preview),
            _ => None,
        }
    }
}
