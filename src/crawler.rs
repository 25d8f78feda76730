use crate::error::{Error, Result};
use crate::extract::Extractor;
use crate::fetch::{Fetcher, Transport};
use crate::model::{CrawlNode, ParsedPage, Sidebar};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use url::Url;

/// Recursive traversal engine.
///
/// Each call fetches and classifies one page, checks it for convergence
/// against its predecessor, and expands section links into child crawls.
/// Tutorial (chapter-style) pages are leaves: their chapter URLs are
/// returned as data, never crawled from this level.
#[derive(Debug)]
pub struct Crawler<T: Transport> {
    fetcher: Arc<Fetcher<T>>,
    extractor: Arc<Extractor>,
    max_depth: usize,
}

impl<T: Transport> Crawler<T> {
    pub fn new(fetcher: Arc<Fetcher<T>>, extractor: Arc<Extractor>, max_depth: usize) -> Self {
        Self {
            fetcher,
            extractor,
            max_depth,
        }
    }

    /// Crawl a page and, if `recursive`, every section page reachable
    /// from it. Returns a leaf for a single page or a branch aggregating
    /// child results in document order.
    ///
    /// A failure at any depth unwinds the whole traversal; there is no
    /// partial tree and no skip-and-continue.
    pub async fn crawl(&self, url: &Url, recursive: bool) -> Result<CrawlNode> {
        self.crawl_inner(url.clone(), recursive, None, 0).await
    }

    // Async recursion needs the boxed indirection; `previous` is the
    // parent call's parsed page, which the convergence check compares
    // the freshly fetched page against.
    fn crawl_inner<'a>(
        &'a self,
        url: Url,
        recursive: bool,
        previous: Option<&'a ParsedPage>,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<CrawlNode>> + Send + 'a>> {
        Box::pin(async move {
            if depth > self.max_depth {
                return Err(Error::DepthLimit(self.max_depth));
            }

            let markup = self.fetcher.fetch(url.as_str()).await?;
            let current = self.extractor.classify(&url, &markup)?;

            let mut recursive = recursive;
            if let Some(previous) = previous {
                if recursive && converged(&previous.sidebar, &current.sidebar)? {
                    // The site echoed a page structurally identical to
                    // the previous one; this branch has reached its end.
                    ::log::info!("Structure converged at {}, stopping recursion", url);
                    recursive = false;
                }
            }

            if !recursive {
                return Ok(CrawlNode::Leaf(current));
            }

            let Sidebar::Sections(links) = &current.sidebar else {
                return Ok(CrawlNode::Leaf(current));
            };

            let mut children = Vec::with_capacity(links.len() + 1);
            let mut matched_self = false;

            for link in links {
                if link.url == current.url {
                    // The section lists the page itself; reuse the parse
                    // instead of re-fetching.
                    ::log::debug!("Substituting current page for self link {}", link.url);
                    matched_self = true;
                    children.push(CrawlNode::Leaf(current.clone()));
                } else {
                    let child = self
                        .crawl_inner(link.url.clone(), true, Some(&current), depth + 1)
                        .await?;
                    children.push(child);
                }
            }

            if !matched_self {
                // No child slot belonged to this page; prepend it so its
                // own parsed content is never dropped from the aggregate.
                children.insert(0, CrawlNode::Leaf(current.clone()));
            }

            Ok(CrawlNode::Branch(children))
        })
    }
}

#[cfg(test)]
impl<T: Transport> Crawler<T> {
    pub(crate) fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }
}

/// Decide whether two consecutively visited pages are structurally
/// identical.
///
/// Requires the same sidebar variant and the same entry count, then
/// compares entries pairwise by URL: section sidebars by the i-th link,
/// chapter sidebars by the first paragraph link of the i-th group. A
/// single matching pair is enough; the scan stops at the first match.
/// Labels play no part in the comparison.
fn converged(previous: &Sidebar, current: &Sidebar) -> Result<bool> {
    match (previous, current) {
        (Sidebar::Sections(prev), Sidebar::Sections(cur)) if prev.len() == cur.len() => {
            for (a, b) in prev.iter().zip(cur) {
                if a.url == b.url {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        (Sidebar::Chapters(prev), Sidebar::Chapters(cur)) if prev.len() == cur.len() => {
            for (a, b) in prev.iter().zip(cur) {
                let first_a = a.links.first().ok_or_else(|| chapter_empty(&a.name))?;
                let first_b = b.links.first().ok_or_else(|| chapter_empty(&b.name))?;
                if first_a.url == first_b.url {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Ok(false),
    }
}

fn chapter_empty(name: &str) -> Error {
    Error::structure(format!(
        "chapter {name:?} has no paragraph links to compare for convergence"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SelectorConfig;
    use crate::fetch::tests::MockTransport;
    use crate::model::{Link, LinkGroup};

    fn link(url: &str, label: &str) -> Link {
        Link::new(Url::parse(url).unwrap(), label)
    }

    fn group(name: &str, urls: &[&str]) -> LinkGroup {
        LinkGroup {
            name: name.to_string(),
            links: urls.iter().map(|u| link(u, "p")).collect(),
        }
    }

    mod convergence {
        use super::*;

        #[test]
        fn test_matching_pair_converges_despite_labels() {
            let previous = Sidebar::Sections(vec![
                link("https://site.test/a", "first"),
                link("https://site.test/b", "second"),
            ]);
            let current = Sidebar::Sections(vec![
                link("https://site.test/x", "other"),
                link("https://site.test/b", "renamed"),
            ]);
            assert!(converged(&previous, &current).unwrap());
        }

        #[test]
        fn test_length_mismatch_never_converges() {
            let previous = Sidebar::Sections(vec![link("https://site.test/a", "a")]);
            let current = Sidebar::Sections(vec![
                link("https://site.test/a", "a"),
                link("https://site.test/b", "b"),
            ]);
            assert!(!converged(&previous, &current).unwrap());
        }

        #[test]
        fn test_all_urls_distinct_does_not_converge() {
            let previous = Sidebar::Sections(vec![link("https://site.test/a", "a")]);
            let current = Sidebar::Sections(vec![link("https://site.test/b", "b")]);
            assert!(!converged(&previous, &current).unwrap());
        }

        #[test]
        fn test_variant_mismatch_does_not_converge() {
            let previous = Sidebar::Sections(vec![link("https://site.test/a", "a")]);
            let current = Sidebar::Chapters(vec![group("Intro", &["https://site.test/a"])]);
            assert!(!converged(&previous, &current).unwrap());
        }

        #[test]
        fn test_chapters_compare_first_paragraph_urls() {
            let previous = Sidebar::Chapters(vec![
                group("One", &["https://site.test/1.1", "https://site.test/1.2"]),
                group("Two", &["https://site.test/2.1"]),
            ]);
            let current = Sidebar::Chapters(vec![
                group("Uno", &["https://site.test/9.1"]),
                group("Dos", &["https://site.test/2.1", "https://site.test/2.2"]),
            ]);
            assert!(converged(&previous, &current).unwrap());
        }

        #[test]
        fn test_empty_chapter_during_comparison_is_structure_error() {
            let previous = Sidebar::Chapters(vec![group("One", &["https://site.test/1.1"])]);
            let current = Sidebar::Chapters(vec![group("Hollow", &[])]);
            let err = converged(&previous, &current).unwrap_err();
            assert!(matches!(err, Error::Structure(_)));
        }
    }

    fn section_html(links: &[(&str, &str)]) -> String {
        let anchors: String = links
            .iter()
            .map(|(href, label)| format!(r#"<a href="{href}">{label}</a>"#))
            .collect();
        format!(
            r#"<html><body><div class="innercontainer">
                <div class="navmenu">{anchors}</div>
                <div class="item center"><p>body</p></div>
            </div></body></html>"#
        )
    }

    fn tutorial_html() -> String {
        r#"<html><body><div class="innercontainer">
            <div class="filetree"><div class="folder">
                <span class="folder-name">Introduction</span>
                <a href="/t/1.1.php">1.1</a>
            </div></div>
            <div class="item center"><p>chapter body</p></div>
        </div></body></html>"#
            .to_string()
    }

    fn crawler(
        pages: impl IntoIterator<Item = (&'static str, String)>,
        max_depth: usize,
    ) -> Crawler<MockTransport> {
        let extractor = Extractor::new(
            Url::parse("https://site.test").unwrap(),
            &SelectorConfig::default(),
        )
        .unwrap();
        Crawler::new(
            Arc::new(Fetcher::new(MockTransport::new(pages))),
            Arc::new(extractor),
            max_depth,
        )
    }

    fn leaf_url(node: &CrawlNode) -> &str {
        match node {
            CrawlNode::Leaf(page) => page.url.as_str(),
            CrawlNode::Branch(_) => panic!("expected leaf, got branch"),
        }
    }

    #[tokio::test]
    async fn test_non_recursive_crawl_returns_leaf() {
        let crawler = crawler(
            [("https://site.test/a", section_html(&[("/b", "B")]))],
            32,
        );
        let node = crawler
            .crawl(&Url::parse("https://site.test/a").unwrap(), false)
            .await
            .unwrap();
        assert_eq!(leaf_url(&node), "https://site.test/a");
    }

    #[tokio::test]
    async fn test_tutorial_page_is_leaf_even_when_recursive() {
        let crawler = crawler([("https://site.test/t/", tutorial_html())], 32);
        let node = crawler
            .crawl(&Url::parse("https://site.test/t/").unwrap(), true)
            .await
            .unwrap();
        let CrawlNode::Leaf(page) = node else {
            panic!("expected leaf");
        };
        assert!(matches!(page.sidebar, Sidebar::Chapters(_)));
    }

    #[tokio::test]
    async fn test_converged_child_becomes_leaf() {
        // /a lists [/x, /y]; /x lists [/x2, /y] - index 1 matches, so /x
        // must not expand even though /x2 has no fixture at all.
        let crawler = crawler(
            [
                (
                    "https://site.test/a",
                    section_html(&[("/x", "X"), ("/y", "Y")]),
                ),
                (
                    "https://site.test/x",
                    section_html(&[("/x2", "X2"), ("/y", "Y renamed")]),
                ),
                ("https://site.test/y", tutorial_html()),
            ],
            32,
        );

        let node = crawler
            .crawl(&Url::parse("https://site.test/a").unwrap(), true)
            .await
            .unwrap();

        let CrawlNode::Branch(children) = node else {
            panic!("expected branch");
        };
        // /a had no self link, so it is prepended ahead of its children
        assert_eq!(children.len(), 3);
        assert_eq!(leaf_url(&children[0]), "https://site.test/a");
        assert_eq!(leaf_url(&children[1]), "https://site.test/x");
        assert_eq!(leaf_url(&children[2]), "https://site.test/y");
    }

    #[tokio::test]
    async fn test_self_link_substitutes_parsed_page_without_refetch() {
        let crawler = crawler(
            [
                (
                    "https://site.test/a",
                    section_html(&[("/a", "Self"), ("/b", "B")]),
                ),
                ("https://site.test/b", tutorial_html()),
            ],
            32,
        );

        let node = crawler
            .crawl(&Url::parse("https://site.test/a").unwrap(), true)
            .await
            .unwrap();

        let CrawlNode::Branch(children) = node else {
            panic!("expected branch");
        };
        // Parent appears exactly once, in its link's slot, not prepended
        assert_eq!(children.len(), 2);
        assert_eq!(leaf_url(&children[0]), "https://site.test/a");
        assert_eq!(leaf_url(&children[1]), "https://site.test/b");
        let parents = children
            .iter()
            .filter(|c| leaf_url(c) == "https://site.test/a")
            .count();
        assert_eq!(parents, 1);
        // One GET per distinct URL: the self link reused the parse
        assert_eq!(crawler.fetcher.transport().calls(), 2);
    }

    #[tokio::test]
    async fn test_length_mismatch_keeps_recursing_and_cache_dedupes() {
        // /a lists [/b, /c]; /c lists only [/b] (length 1 vs 2, no
        // convergence), so /c expands into the already-fetched /b.
        let crawler = crawler(
            [
                (
                    "https://site.test/a",
                    section_html(&[("/b", "B"), ("/c", "C")]),
                ),
                ("https://site.test/b", tutorial_html()),
                ("https://site.test/c", section_html(&[("/b", "B")])),
            ],
            32,
        );

        let node = crawler
            .crawl(&Url::parse("https://site.test/a").unwrap(), true)
            .await
            .unwrap();

        let CrawlNode::Branch(children) = node else {
            panic!("expected branch");
        };
        assert_eq!(children.len(), 3);
        assert_eq!(leaf_url(&children[0]), "https://site.test/a");
        assert_eq!(leaf_url(&children[1]), "https://site.test/b");
        let CrawlNode::Branch(grandchildren) = &children[2] else {
            panic!("expected /c to expand into a branch");
        };
        assert_eq!(leaf_url(&grandchildren[0]), "https://site.test/c");
        assert_eq!(leaf_url(&grandchildren[1]), "https://site.test/b");
        // /b appears twice in the tree but was fetched once
        assert_eq!(crawler.fetcher.transport().calls(), 3);
    }

    #[tokio::test]
    async fn test_depth_limit_trips_on_non_converging_chain() {
        // Each page lists exactly one fresh URL; nothing ever converges.
        let crawler = crawler(
            [
                ("https://site.test/0", section_html(&[("/1", "next")])),
                ("https://site.test/1", section_html(&[("/2", "next")])),
                ("https://site.test/2", section_html(&[("/3", "next")])),
                ("https://site.test/3", section_html(&[("/4", "next")])),
            ],
            3,
        );

        let err = crawler
            .crawl(&Url::parse("https://site.test/0").unwrap(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DepthLimit(3)));
    }

    #[tokio::test]
    async fn test_child_failure_unwinds_whole_traversal() {
        // /b has no fixture; the fetch error must surface at the root.
        let crawler = crawler(
            [("https://site.test/a", section_html(&[("/b", "B")]))],
            32,
        );
        let err = crawler
            .crawl(&Url::parse("https://site.test/a").unwrap(), true)
            .await;
        assert!(err.is_err());
    }
}
