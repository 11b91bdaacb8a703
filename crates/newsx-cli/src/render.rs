use std::fmt::Write;

use newsx_core::feed::{Article, Category};
use newsx_core::{LoadState, NewsBoard};

const RULE_WIDTH: usize = 72;

pub fn header(category: Category) -> String {
    format!("Latest News · {}\n{}\n", category.label(), "=".repeat(RULE_WIDTH))
}

/// One article as a text card
pub fn card(index: usize, article: &Article) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>2}. {}", index + 1, article.display_title());
    let _ = writeln!(out, "    {}", article.display_description());
    let _ = writeln!(
        out,
        "    {} · {}",
        article.source,
        article.published_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out, "    Image: {}", article.image_or_placeholder());
    match article.read_more_url() {
        Some(url) => {
            let _ = writeln!(out, "    Read more: {}", url);
        }
        None => {
            let _ = writeln!(out, "    (no link)");
        }
    }
    out
}

/// Whole board for its current state, at most `limit` cards
pub fn board(board: &NewsBoard, limit: Option<usize>) -> String {
    let mut out = header(board.category());

    match board.state() {
        LoadState::Idle => {
            out.push_str("Pick a category to load headlines.\n");
        }
        LoadState::Loading => {
            let _ = writeln!(out, "Loading {} news...", board.category());
        }
        LoadState::Failed { message, detail } => {
            let _ = writeln!(out, "Oops! Something went wrong");
            let _ = writeln!(out, "{}", message);
            let _ = writeln!(out, "  ({})", detail);
            out.push_str("Type `retry` to try again.\n");
        }
        LoadState::Loaded => {
            let visible = board.visible();
            if !board.query().is_empty() {
                let _ = writeln!(
                    out,
                    "Searching for \"{}\": {} result(s)\n",
                    board.query(),
                    visible.len()
                );
            }
            if visible.is_empty() {
                out.push_str("No articles match.\n");
            }
            let shown = limit.unwrap_or(visible.len());
            for (i, article) in visible.iter().take(shown).enumerate() {
                out.push_str(&card(i, article));
                out.push('\n');
            }
            if visible.len() > shown {
                let _ = writeln!(out, "... {} more", visible.len() - shown);
            } else if board.has_more() && board.query().is_empty() {
                out.push_str("More headlines may be available upstream.\n");
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use newsx_core::feed::{Batch, SourceKind, PLACEHOLDER_IMAGE};
    use newsx_core::{Completion, Error};

    fn article(title: &str, url: Option<&str>) -> Article {
        Article {
            id: "general-0-0".to_string(),
            title: title.to_string(),
            description: "Body text".to_string(),
            url: url.map(str::to_string),
            image_url: None,
            published_at: Utc.with_ymd_and_hms(2024, 5, 4, 10, 30, 0).unwrap(),
            category: Category::General,
            source: "BBC News".to_string(),
        }
    }

    #[test]
    fn test_card_with_link() {
        let text = card(0, &article("Headline", Some("https://bbc.example/1")));
        assert!(text.starts_with(" 1. Headline\n"));
        assert!(text.contains("BBC News · 2024-05-04 10:30 UTC"));
        assert!(text.contains(&format!("Image: {}", PLACEHOLDER_IMAGE)));
        assert!(text.contains("Read more: https://bbc.example/1"));
    }

    #[test]
    fn test_card_without_link_or_title() {
        let text = card(4, &article("", None));
        assert!(text.starts_with(" 5. No Title Available\n"));
        assert!(text.contains("(no link)"));
    }

    #[test]
    fn test_board_states() {
        let mut b = NewsBoard::new(Category::Health);
        assert!(board(&b, None).contains("Pick a category"));

        let ticket = b.retry();
        assert!(board(&b, None).contains("Loading health news..."));

        b.complete(Completion {
            generation: ticket.generation,
            result: Err(Error::EmptyResult(Category::Health)),
        });
        let text = board(&b, None);
        assert!(text.contains("Failed to fetch news articles. Please try again later."));
        assert!(text.contains("retry"));
    }

    #[test]
    fn test_board_limit_and_search() {
        let mut b = NewsBoard::new(Category::General);
        let ticket = b.retry();
        b.complete(Completion {
            generation: ticket.generation,
            result: Ok(Batch {
                category: Category::General,
                source_kind: SourceKind::Rss,
                fetched_at: Utc::now(),
                articles: vec![
                    article("Alpha", None),
                    article("Beta", None),
                    article("Gamma", None),
                ],
            }),
        });

        let text = board(&b, Some(2));
        assert!(text.contains("... 1 more"));

        b.set_query("beta");
        let text = board(&b, None);
        assert!(text.contains("Searching for \"beta\": 1 result(s)"));
        assert!(text.contains("Beta"));
        assert!(!text.contains("Alpha"));
    }
}
