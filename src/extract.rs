use crate::config::SelectorConfig;
use crate::error::{Error, Result};
use crate::model::{Link, LinkGroup, ParsedPage, Sidebar};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Classifies raw page markup into a sidebar structure plus content block.
///
/// Two sidebar shapes exist, checked in order: section-style (a flat run
/// of anchors under the nav-menu marker) and tutorial-style (a file tree
/// of chapter groups). Classification is mutually exclusive; a page that
/// contains both structures is classified as a section.
#[derive(Debug)]
pub struct Extractor {
    base: Url,
    main_menu: Selector,
    inner_container: Selector,
    nav_menu: Selector,
    chapter_group: Selector,
    chapter_label: Selector,
    chapter_link: Selector,
    content: Selector,
}

fn compile(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Config(format!("invalid selector {css:?}: {e}")))
}

impl Extractor {
    /// Compile the configured selectors for the given site.
    ///
    /// Bad selectors fail here, not in the middle of a crawl.
    pub fn new(base: Url, selectors: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            base,
            main_menu: compile(&selectors.main_menu)?,
            inner_container: compile(&selectors.inner_container)?,
            nav_menu: compile(&selectors.nav_menu)?,
            chapter_group: compile(&selectors.chapter_group)?,
            chapter_label: compile(&selectors.chapter_label)?,
            chapter_link: compile(&selectors.chapter_link)?,
            content: compile(&selectors.content)?,
        })
    }

    /// Base URL relative hrefs resolve against
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Classify a page's markup into its sidebar and content block
    pub fn classify(&self, url: &Url, markup: &str) -> Result<ParsedPage> {
        let doc = Html::parse_document(markup);

        let container = doc
            .select(&self.inner_container)
            .next()
            .ok_or_else(|| Error::structure(format!("no inner container on {url}")))?;

        // Re-parse the container's markup as an independent document so
        // sidebar selectors cannot cross-match unrelated elements
        // elsewhere on the page.
        let inner = Html::parse_document(&container.inner_html());

        let sidebar = self.classify_sidebar(&inner, url)?;

        let content = inner
            .select(&self.content)
            .next()
            .map(|element| element.inner_html())
            .ok_or_else(|| Error::structure(format!("no content block on {url}")))?;

        Ok(ParsedPage {
            url: url.clone(),
            sidebar,
            content,
        })
    }

    /// Extract the top-level tutorial menu from the raw root page.
    ///
    /// This menu lives outside the inner container, so it is matched on
    /// the full document rather than the re-parsed fragment.
    pub fn main_menu_links(&self, markup: &str) -> Result<Vec<Link>> {
        let doc = Html::parse_document(markup);
        let mut links = Vec::new();
        for anchor in doc.select(&self.main_menu) {
            if let Some(link) = self.link_from_anchor(anchor)? {
                links.push(link);
            }
        }
        Ok(links)
    }

    fn classify_sidebar(&self, inner: &Html, url: &Url) -> Result<Sidebar> {
        // Section-style anchors win whenever any are present.
        let anchors: Vec<ElementRef> = inner.select(&self.nav_menu).collect();
        if !anchors.is_empty() {
            let mut links = Vec::with_capacity(anchors.len());
            for anchor in anchors {
                if let Some(link) = self.link_from_anchor(anchor)? {
                    links.push(link);
                }
            }
            ::log::debug!("Classified {} as section with {} links", url, links.len());
            return Ok(Sidebar::Sections(links));
        }

        let groups: Vec<ElementRef> = inner.select(&self.chapter_group).collect();
        if groups.is_empty() {
            return Err(Error::structure(format!(
                "neither sidebar shape found on {url}"
            )));
        }

        let mut chapters = Vec::with_capacity(groups.len());
        for group in groups {
            let name = group
                .select(&self.chapter_label)
                .next()
                .map(element_text)
                .ok_or_else(|| {
                    Error::structure(format!("chapter group without a label on {url}"))
                })?;

            // Groups with no paragraph anchors are kept, not dropped.
            let mut links = Vec::new();
            for anchor in group.select(&self.chapter_link) {
                if let Some(link) = self.link_from_anchor(anchor)? {
                    links.push(link);
                }
            }
            chapters.push(LinkGroup { name, links });
        }

        ::log::debug!(
            "Classified {} as tutorial with {} chapters",
            url,
            chapters.len()
        );
        Ok(Sidebar::Chapters(chapters))
    }

    fn link_from_anchor(&self, anchor: ElementRef) -> Result<Option<Link>> {
        // Anchors without an href carry no destination; skip them.
        let Some(href) = anchor.value().attr("href") else {
            return Ok(None);
        };
        let url = self
            .base
            .join(href)
            .map_err(|e| Error::structure(format!("unresolvable href {href:?}: {e}")))?;
        Ok(Some(Link::new(url, element_text(anchor))))
    }
}

fn element_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}
