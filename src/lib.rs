//! Crawls a documentation website into a traversable in-memory tree.
//!
//! Given a root URL, the crawler discovers every reachable section and
//! tutorial page, classifies each page's sidebar as one of two shapes
//! (a flat list of section links, or chapters with paragraph links),
//! extracts the sidebar plus the page's main content block, and stops
//! recursing once newly visited pages stop introducing new structure.

pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod index;
pub mod model;

// Re-export the types callers interact with
pub use config::{SelectorConfig, SiteConfig};
pub use error::{Error, Result};
pub use model::{CrawlNode, Link, LinkGroup, ParsedPage, Sidebar};

use crawler::Crawler;
use extract::Extractor;
use fetch::{Fetcher, HttpTransport, Transport};
use index::TutorialIndex;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// One crawl session against one documentation site.
///
/// Owns the page cache, the tutorial index and the traversal engine;
/// dropping the session drops everything it fetched. State is never
/// shared across sessions.
#[derive(Debug)]
pub struct Doctree<T: Transport = HttpTransport> {
    base: Url,
    crawler: Crawler<T>,
    index: TutorialIndex<T>,
}

impl Doctree<HttpTransport> {
    /// Create a session from a configuration, using the HTTP transport
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Self::with_transport(config, transport)
    }

    /// Create a session for a site with default selectors
    pub fn for_site(base_url: &str) -> Result<Self> {
        Self::new(&SiteConfig::new(base_url))
    }
}

impl<T: Transport> Doctree<T> {
    /// Create a session over a custom transport
    pub fn with_transport(config: &SiteConfig, transport: T) -> Result<Self> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| Error::Config(format!("invalid base URL {:?}: {e}", config.base_url)))?;

        let extractor = Arc::new(Extractor::new(base.clone(), &config.selectors)?);
        let fetcher = Arc::new(Fetcher::new(transport));

        Ok(Self {
            base,
            crawler: Crawler::new(
                Arc::clone(&fetcher),
                Arc::clone(&extractor),
                config.max_depth,
            ),
            index: TutorialIndex::new(fetcher, extractor),
        })
    }

    /// Root URL of the site
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Entry points of the site's top-level tutorial menu, memoized for
    /// the lifetime of the session
    pub async fn tutorials(&self) -> Result<&[Link]> {
        self.index.tutorials().await
    }

    /// Crawl starting from the site's base URL
    pub async fn crawl(&self, recursive: bool) -> Result<CrawlNode> {
        self.crawler.crawl(&self.base, recursive).await
    }

    /// Crawl starting from an arbitrary page of the site
    pub async fn crawl_from(&self, url: &str, recursive: bool) -> Result<CrawlNode> {
        let url =
            Url::parse(url).map_err(|e| Error::Config(format!("invalid URL {url:?}: {e}")))?;
        self.crawler.crawl(&url, recursive).await
    }
}
