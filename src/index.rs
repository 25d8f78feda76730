use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::fetch::{Fetcher, Transport};
use crate::model::Link;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Memoized view of the site's top-level tutorial menu.
///
/// The menu sits on the root page outside the inner container, in a
/// different markup region from the per-page sidebars. Once extracted it
/// is never recomputed for the lifetime of the index, even across
/// repeated or concurrent calls.
#[derive(Debug)]
pub struct TutorialIndex<T: Transport> {
    fetcher: Arc<Fetcher<T>>,
    extractor: Arc<Extractor>,
    links: OnceCell<Vec<Link>>,
}

impl<T: Transport> TutorialIndex<T> {
    pub fn new(fetcher: Arc<Fetcher<T>>, extractor: Arc<Extractor>) -> Self {
        Self {
            fetcher,
            extractor,
            links: OnceCell::new(),
        }
    }

    /// Entry points of every tutorial listed in the root page's menu
    pub async fn tutorials(&self) -> Result<&[Link]> {
        let links = self
            .links
            .get_or_try_init(|| async {
                let base = self.extractor.base();
                ::log::info!("Loading tutorial index from {}", base);

                let markup = self.fetcher.fetch(base.as_str()).await?;
                let links = self.extractor.main_menu_links(&markup)?;
                if links.is_empty() {
                    // A documentation root always carries its menu; an
                    // empty match means the selector no longer fits the
                    // site's markup.
                    return Err(Error::structure(format!("no tutorial menu on {base}")));
                }

                ::log::info!("Tutorial index holds {} entries", links.len());
                Ok(links)
            })
            .await?;

        Ok(links)
    }
}
