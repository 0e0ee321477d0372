use thiserror::Error;

/// A request that did not produce a usable page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Timed out fetching {url}")]
    Timeout { url: String },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Markup the extractor relies on was not there.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("No collection or listing heading found")]
    HeadingNotFound,

    #[error("Product card {index} has no {field}")]
    MissingCardField { index: usize, field: &'static str },

    #[error("Product page has no {field}")]
    MissingPageField { field: &'static str },

    #[error("Invalid CSS selector {selector:?}")]
    InvalidSelector { selector: String },
}
