use clap::Parser;
use doctree::Doctree;

mod args;
use args::{Args, build_config};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    ::log::info!("Starting crawl session for: {}", config.base_url);

    let session = match Doctree::new(&config) {
        Ok(session) => session,
        Err(e) => {
            ::log::error!("Failed to create crawl session: {}", e);
            std::process::exit(1);
        }
    };

    if args.tutorials_only {
        match session.tutorials().await {
            Ok(tutorials) => print_json(&tutorials),
            Err(e) => {
                ::log::error!("Failed to load tutorial index: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let recursive = !args.flat;
    let start_time = std::time::Instant::now();

    let result = match &args.url {
        Some(url) => session.crawl_from(url, recursive).await,
        None => session.crawl(recursive).await,
    };

    match result {
        Ok(tree) => {
            let duration = start_time.elapsed();
            ::log::info!(
                "Crawl complete - {} pages in {:.2} seconds",
                tree.page_count(),
                duration.as_secs_f64()
            );
            print_json(&tree);
        }
        Err(e) => {
            ::log::error!("Crawl failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            ::log::error!("Failed to serialize result: {}", e);
            std::process::exit(1);
        }
    }
}
