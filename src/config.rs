use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Configuration for a documentation-site crawl session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Root URL of the site; relative hrefs resolve against it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// CSS selectors describing the site's markup contract
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Maximum recursion depth for the traversal engine
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Per-request timeout in seconds for the HTTP client
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// CSS selectors for the markup regions the extractor cares about.
///
/// Defaults match the metanit.com layout the crawler was written
/// against; override via config for sites with different markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Top-level tutorial menu anchors, matched on the raw root page
    #[serde(default = "default_main_menu")]
    pub main_menu: String,

    /// Per-page inner container; absence is a structure failure
    #[serde(default = "default_inner_container")]
    pub inner_container: String,

    /// Section-style sidebar anchors, matched inside the inner container
    #[serde(default = "default_nav_menu")]
    pub nav_menu: String,

    /// Chapter group elements of a tutorial-style sidebar
    #[serde(default = "default_chapter_group")]
    pub chapter_group: String,

    /// Label element inside a chapter group
    #[serde(default = "default_chapter_label")]
    pub chapter_label: String,

    /// Paragraph anchors inside a chapter group
    #[serde(default = "default_chapter_link")]
    pub chapter_link: String,

    /// Main content element; its inner markup becomes the page content
    #[serde(default = "default_content")]
    pub content: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            main_menu: default_main_menu(),
            inner_container: default_inner_container(),
            nav_menu: default_nav_menu(),
            chapter_group: default_chapter_group(),
            chapter_label: default_chapter_label(),
            chapter_link: default_chapter_link(),
            content: default_content(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self::new(&default_base_url())
    }
}

impl SiteConfig {
    /// Create a configuration for the given site with default selectors
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            selectors: SelectorConfig::default(),
            max_depth: default_max_depth(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }
}

fn default_base_url() -> String {
    "https://metanit.com".to_string()
}

fn default_main_menu() -> String {
    ".mainmenu > li > a".to_string()
}

fn default_inner_container() -> String {
    ".innercontainer".to_string()
}

fn default_nav_menu() -> String {
    ".navmenu > a".to_string()
}

fn default_chapter_group() -> String {
    ".filetree .folder".to_string()
}

fn default_chapter_label() -> String {
    ".folder-name".to_string()
}

fn default_chapter_link() -> String {
    "a".to_string()
}

fn default_content() -> String {
    ".item.center".to_string()
}

fn default_max_depth() -> usize {
    32
}

fn default_request_timeout_secs() -> u64 {
    30
}
