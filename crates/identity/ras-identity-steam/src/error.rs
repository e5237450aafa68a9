//! Steam sign-in error types.

use thiserror::Error;

pub type SteamAuthResult<T> = Result<T, SteamAuthError>;

#[derive(Debug, Error)]
pub enum SteamAuthError {
    #[error("\"{0}\" does not appear to be a valid realm")]
    InvalidRealm(String),

    #[error("Callback URL could not be parsed: {0}")]
    InvalidCallbackUrl(#[from] url::ParseError),

    #[error("Response parameter openid.mode value \"{actual}\" does not match expected value \"id_res\"")]
    ModeMismatch { actual: String },

    #[error("No \"{0}\" parameter is present in the URL")]
    MissingParameter(String),

    #[error("Vital parameter \"{0}\" was not signed")]
    UnsignedVitalParameter(String),

    #[error("Return realm \"{actual}\" does not match expected realm \"{expected}\"")]
    RealmMismatch { expected: String, actual: String },

    #[error("The openid.claimed_id parameter does not have the correct format")]
    MalformedClaimedId,

    #[error("HTTP error {0} when validating response")]
    RemoteHttpError(u16),

    #[error("Response was not validated by Steam. It may be forged or reused.")]
    RemoteValidationFailed,

    #[error("Network error while validating response: {0}")]
    NetworkError(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SteamAuthError {
    fn from(err: reqwest::Error) -> Self {
        SteamAuthError::NetworkError(err.to_string())
    }
}
