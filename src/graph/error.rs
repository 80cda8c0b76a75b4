use thiserror::Error;

/// Typed Graph API errors.
///
/// Transport failures and API-level failures are distinct from decode
/// failures so that a malformed response reads as "the server sent something
/// unexpected for this resource" rather than a generic type error.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Graph API error {code} ({kind}): {message}")]
    Api {
        code: i64,
        kind: String,
        message: String,
    },

    #[error("cannot decode {resource}: {source}")]
    Decode {
        resource: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bad timestamp {value:?} in {resource}")]
    BadTimestamp { resource: String, value: String },
}
