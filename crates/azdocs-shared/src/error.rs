use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Invalid access level {0} (expected 1-5)")]
    InvalidAccessLevel(i64),
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Token is empty")]
    Empty,

    #[error("Token must have three dot-separated segments, found {0}")]
    Malformed(usize),

    #[error("Token payload is not valid base64url")]
    Encoding(#[from] base64::DecodeError),

    #[error("Token payload is not a JSON object")]
    NotAnObject,

    #[error("Token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
