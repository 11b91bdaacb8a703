use anyhow::{bail, Result};

use newsx_core::{
    feed::{Category, NewsService, SortOrder},
    AppConfig, LoadState, NewsBoard,
};

use crate::render;

pub struct Options {
    pub category: String,
    pub search: String,
    pub sort: SortOrder,
    pub limit: Option<usize>,
    pub json: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            category: Category::General.to_string(),
            search: String::new(),
            sort: SortOrder::default(),
            limit: None,
            json: false,
        }
    }
}

pub async fn run(config: &AppConfig, options: Options) -> Result<()> {
    let category = Category::resolve(&options.category);
    if !category.as_str().eq_ignore_ascii_case(options.category.trim()) {
        tracing::warn!(
            requested = %options.category,
            "Unknown category, showing {} instead",
            category
        );
    }

    let service = NewsService::new(config)?;

    let mut board = NewsBoard::new(category);
    board.set_query(options.search);
    board.set_sort(options.sort);

    let ticket = board.select_category(category);
    eprintln!("Loading {} news...", category);
    let completion = ticket.execute(&service).await;
    board.complete(completion);

    if let LoadState::Failed { message, detail } = board.state() {
        bail!("{} ({})", message, detail);
    }

    if options.json {
        let visible = board.visible();
        let shown = options.limit.unwrap_or(visible.len());
        let articles: Vec<_> = visible.into_iter().take(shown).collect();
        println!("{}", serde_json::to_string_pretty(&articles)?);
    } else {
        print!("{}", render::board(&board, options.limit));
    }

    Ok(())
}
