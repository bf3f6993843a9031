use serde::Deserialize;

/// The error bodies Spotify responds with. The Web API uses the regular error object, while the accounts service uses
/// the OAuth authentication error object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorResponse {
    Api {
        error: ApiError,
    },
    Authentication {
        error: String,
        error_description: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ApiError {
    #[allow(dead_code)]
    pub status: Option<u16>,
    pub message: String,
}

impl ErrorResponse {
    pub fn into_message(self) -> String {
        match self {
            ErrorResponse::Api { error } => error.message,
            ErrorResponse::Authentication {
                error,
                error_description: Some(description),
            } => format!("{error}: {description}"),
            ErrorResponse::Authentication { error, .. } => error,
        }
    }
}
