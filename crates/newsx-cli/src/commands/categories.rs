use anyhow::Result;

use newsx_core::{
    feed::{feed_url, Category},
    AppConfig, SourceMode,
};

pub fn run(config: &AppConfig) -> Result<()> {
    let mode = match config.source.mode {
        SourceMode::Rest => "NewsAPI top-headlines",
        SourceMode::Rss => "RSS feeds",
    };
    println!("Source: {}\n", mode);

    for category in Category::ALL {
        println!("  {:<14} {}", category.label(), feed_url(category));
    }

    if config.source.mode == SourceMode::Rss {
        if config.rss.proxies.is_empty() {
            println!("\nFeeds are fetched directly.");
        } else {
            println!("\nRelays (tried in order):");
            for proxy in &config.rss.proxies {
                println!("  {}?{}=<feed>", proxy.base, proxy.param);
            }
        }
    }

    Ok(())
}
