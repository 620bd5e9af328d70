use std::error::Error as StdError;

use thiserror::Error;

/// Failures talking to the cloud provider.
#[derive(Debug, Error)]
pub enum CloudError {
    /// The metadata request failed in transport or returned a non-success
    /// status.
    #[error("could not fetch {key:?} from {data_type:?} metadata using {url:?}: {source}")]
    Metadata {
        key: String,
        data_type: String,
        url: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The metadata server answered with a blank body.
    #[error("error when fetching metadata from {url:?}: server returned an empty value")]
    EmptyMetadata { url: String },
    /// No usable access token could be obtained.
    #[error("could not obtain an access token: {0}")]
    Token(String),
    /// The logging client could not be constructed.
    #[error("could not create cloud logging client: {0}")]
    Client(String),
}
