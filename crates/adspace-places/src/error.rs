use adspace_core::DirectoryError;
use thiserror::Error;

/// Errors returned by the Google Places client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure, or a non-2xx HTTP status.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// No API key was configured.
    #[error("Google Places API key is not configured (set GOOGLE_PLACES_API_KEY)")]
    MissingApiKey,

    #[error("invalid Places base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The response envelope carried a status other than the accepted ones.
    #[error("Places API status {status}: {message}")]
    ApiStatus { status: String, message: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<PlacesError> for DirectoryError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::ApiStatus { status, message } => DirectoryError::Status { status, message },
            PlacesError::Deserialize { .. } => DirectoryError::Decode(err.to_string()),
            PlacesError::Http(_)
            | PlacesError::MissingApiKey
            | PlacesError::InvalidBaseUrl { .. } => DirectoryError::Request(err.to_string()),
        }
    }
}
