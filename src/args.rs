use clap::Parser;
use doctree::SiteConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "doctree")]
#[command(about = "Crawls a documentation site into a tree of sections and tutorials")]
#[command(version)]
pub struct Args {
    /// Page to start crawling from (defaults to the configured base URL)
    pub url: Option<String>,

    /// Path to a JSON site configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Parse only the requested page; do not recurse into its sections
    #[arg(long)]
    pub flat: bool,

    /// Print the top-level tutorial index and exit
    #[arg(long)]
    pub tutorials_only: bool,

    /// Maximum recursion depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Build the site configuration from the config file (if any) with
/// command-line overrides applied on top
pub fn build_config(args: &Args) -> Result<SiteConfig, Box<dyn std::error::Error>> {
    let mut config = match (&args.config, &args.url) {
        (Some(path), _) => SiteConfig::from_file(path)?,
        // No config file: a bare URL names both the start page and the
        // site base that relative hrefs resolve against
        (None, Some(url)) => SiteConfig::new(url),
        (None, None) => SiteConfig::default(),
    };

    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    if let Some(timeout) = args.timeout {
        config.request_timeout_secs = timeout;
    }

    Ok(config)
}
