use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid API endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("GraphQL request failed: {0}")]
    Api(String),
    #[error("response carried no {0}")]
    MissingData(&'static str),
    #[error("no cache entry for {0}")]
    MissingEntry(String),
    #[error("a subscription mutation is already pending for {0}")]
    MutationInFlight(String),
}
