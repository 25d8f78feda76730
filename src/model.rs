use serde::{Deserialize, Serialize};
use url::Url;

/// A resolved navigation link: an absolute URL paired with its anchor text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Absolute URL, resolved against the site's base URL
    pub url: Url,

    /// Text label of the anchor
    pub label: String,
}

impl Link {
    pub fn new(url: Url, label: impl Into<String>) -> Self {
        Self {
            url,
            label: label.into(),
        }
    }
}

/// One chapter of a tutorial: a named group of paragraph links.
///
/// A chapter with zero paragraph anchors is still a valid group with an
/// empty link list; it is never dropped from the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkGroup {
    /// Chapter name
    pub name: String,

    /// Paragraph links in document order
    pub links: Vec<Link>,
}

/// Classified sidebar navigation of a page.
///
/// Every successfully parsed page produces exactly one variant. A page
/// that happens to contain both structures is classified as `Sections`
/// (section-style anchors are checked first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Sidebar {
    /// Section page: flat list of sibling tutorials/topics
    Sections(Vec<Link>),

    /// Tutorial page: list of chapters, each with paragraph links
    Chapters(Vec<LinkGroup>),
}

impl Sidebar {
    /// Number of top-level entries (links or groups).
    pub fn len(&self) -> usize {
        match self {
            Sidebar::Sections(links) => links.len(),
            Sidebar::Chapters(groups) => groups.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A fetched and classified page: its sidebar plus its main content block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPage {
    /// URL the page was fetched from
    pub url: Url,

    /// Classified sidebar navigation
    pub sidebar: Sidebar,

    /// Inner markup of the main content element
    pub content: String,
}

/// Result of a recursive crawl.
///
/// A parent branch exclusively owns its children; the tree is acyclic by
/// construction because the convergence check halts recursion before a
/// branch can revisit its own structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CrawlNode {
    /// Terminal node: a single parsed page
    Leaf(ParsedPage),

    /// Aggregate of child results, in source document order
    Branch(Vec<CrawlNode>),
}

impl CrawlNode {
    /// Total number of parsed pages in this subtree.
    pub fn page_count(&self) -> usize {
        match self {
            CrawlNode::Leaf(_) => 1,
            CrawlNode::Branch(children) => children.iter().map(CrawlNode::page_count).sum(),
        }
    }
}
