use crate::error::{Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::OnceCell;

/// The external HTTP collaborator: `GET(url) -> body`.
///
/// Nothing is assumed about headers, auth, retries or redirects beyond
/// what the transport itself performs. Tests substitute an in-memory
/// implementation.
pub trait Transport: Send + Sync {
    /// Perform a GET request and return the response body
    fn get(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// Production transport backed by a shared reqwest client
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("doctree/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(Error::Fetch)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> impl Future<Output = Result<String>> + Send {
        let request = self.client.get(url);
        async move {
            // Non-2xx statuses count as fetch failures
            let response = request.send().await?.error_for_status()?;
            Ok(response.text().await?)
        }
    }
}

/// Memoizing page fetcher.
///
/// Maps each exact absolute URL string to its raw markup for the
/// lifetime of one crawl session; unbounded, no eviction. Each URL maps
/// to a single-flight cell rather than a plain value, so concurrent
/// callers racing on the same URL still issue at most one GET over the
/// cache's lifetime.
#[derive(Debug)]
pub struct Fetcher<T: Transport> {
    transport: T,
    cache: Mutex<HashMap<String, Arc<OnceCell<Arc<str>>>>>,
}

impl<T: Transport> Fetcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a URL, returning cached markup when present.
    ///
    /// Repeat calls for the same URL return reference-identical content.
    /// Fetch errors propagate unretried and leave no cache entry behind.
    pub async fn fetch(&self, url: &str) -> Result<Arc<str>> {
        let cell = {
            let mut cache = self.cache.lock().expect("fetch cache mutex poisoned");
            Arc::clone(cache.entry(url.to_string()).or_default())
        };

        if let Some(markup) = cell.get() {
            ::log::debug!("Cache hit: {}", url);
            return Ok(Arc::clone(markup));
        }

        let markup = cell
            .get_or_try_init(|| async {
                ::log::info!("Fetching: {}", url);
                self.transport.get(url).await.map(Arc::<str>::from)
            })
            .await?;

        Ok(Arc::clone(markup))
    }
}

#[cfg(test)]
impl<T: Transport> Fetcher<T> {
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }
}
