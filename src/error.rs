use thiserror::Error;

/// Errors produced while fetching or classifying pages.
#[derive(Error, Debug)]
pub enum Error {
    /// Transport or HTTP failure. Never retried; aborts the enclosing
    /// crawl and propagates to the caller.
    #[error("fetch error: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The markup did not match the expected page structure: neither
    /// sidebar shape was found, the content block is missing, or a
    /// structure that must contain at least one link was empty.
    #[error("structure error: {0}")]
    Structure(String),

    /// Invalid configuration (bad selector, unparseable base URL).
    /// Surfaces at construction time, not during a crawl.
    #[error("config error: {0}")]
    Config(String),

    /// The recursion bound was exceeded. The traversal is
    /// eventually-terminating but not structurally bounded, so a site
    /// that never converges trips this instead of overflowing the stack.
    #[error("recursion depth limit ({0}) exceeded")]
    DepthLimit(usize),
}

impl Error {
    /// Shorthand for a structure failure with a formatted message.
    pub(crate) fn structure(msg: impl Into<String>) -> Self {
        Error::Structure(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
