use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use newsx_core::{
    feed::{ArticleSource, Category, NewsService, SortOrder},
    AppConfig, Completion, FetchTicket, NewsBoard,
};

use crate::render;

fn help_text() -> String {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
    let orders: Vec<&str> = SortOrder::ALL.iter().map(|o| o.as_str()).collect();
    format!(
        "\
Commands:
  category <name>   {}
  search [text]     filter by title or description (no text clears)
  sort <order>      {}
  retry             reload the current category
  list              show the board again
  help              show this help
  quit              exit",
        categories.join(", "),
        orders.join(", ")
    )
}

/// A parsed line of input
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Category(Category),
    Search(String),
    Sort(SortOrder),
    Retry,
    List,
    Help,
    Quit,
    Invalid(String),
}

fn parse_command(line: &str) -> Command {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_ascii_lowercase().as_str() {
        "category" | "c" | "cat" if !rest.is_empty() => Command::Category(Category::resolve(rest)),
        "search" | "s" | "/" => Command::Search(rest.to_string()),
        "sort" | "o" => match rest.parse() {
            Ok(order) => Command::Sort(order),
            Err(e) => Command::Invalid(e.to_string()),
        },
        "retry" | "r" => Command::Retry,
        "list" | "l" | "" => Command::List,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        // A bare category name switches to it
        other => match Category::ALL.iter().find(|c| c.as_str() == other) {
            Some(category) => Command::Category(*category),
            None => Command::Invalid(format!("Unknown command: {}", line)),
        },
    }
}

fn spawn_load(
    service: &Arc<dyn ArticleSource>,
    ticket: FetchTicket,
    tx: &mpsc::UnboundedSender<Completion>,
) {
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let completion = ticket.execute(service.as_ref()).await;
        // Receiver gone means the session ended
        let _ = tx.send(completion);
    });
}

fn show(board: &NewsBoard) {
    print!("{}", render::board(board, None));
    prompt();
}

fn prompt() {
    print!("newsx> ");
    io::stdout().flush().ok();
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let service: Arc<dyn ArticleSource> = Arc::new(NewsService::new(config)?);
    let mut board = NewsBoard::new(Category::General);

    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", help_text());
    spawn_load(&service, board.select_category(Category::General), &tx);
    show(&board);

    loop {
        tokio::select! {
            Some(completion) = rx.recv() => {
                if board.complete(completion) {
                    println!();
                    show(&board);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match parse_command(&line) {
                    Command::Category(category) => {
                        spawn_load(&service, board.select_category(category), &tx);
                        show(&board);
                    }
                    Command::Retry => {
                        spawn_load(&service, board.retry(), &tx);
                        show(&board);
                    }
                    Command::Search(query) => {
                        board.set_query(query);
                        show(&board);
                    }
                    Command::Sort(order) => {
                        board.set_sort(order);
                        show(&board);
                    }
                    Command::List => show(&board),
                    Command::Help => {
                        println!("{}", help_text());
                        prompt();
                    }
                    Command::Invalid(message) => {
                        println!("{} (type `help` for commands)", message);
                        prompt();
                    }
                    Command::Quit => break,
                }
            }
        }
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_command("category technology"), Command::Category(Category::Technology));
        assert_eq!(parse_command("  c Sports "), Command::Category(Category::Sports));
        assert_eq!(parse_command("category fashion"), Command::Category(Category::General));
        assert_eq!(parse_command("health"), Command::Category(Category::Health));
    }

    #[test]
    fn test_parse_search_and_sort() {
        assert_eq!(parse_command("search Election 2024"), Command::Search("Election 2024".to_string()));
        assert_eq!(parse_command("search"), Command::Search(String::new()));
        assert_eq!(parse_command("sort title"), Command::Sort(SortOrder::Title));
        assert!(matches!(parse_command("sort sideways"), Command::Invalid(_)));
    }

    #[test]
    fn test_help_lists_every_category_and_order() {
        let help = help_text();
        for category in Category::ALL {
            assert!(help.contains(category.as_str()));
        }
        assert!(help.contains("newest, oldest, title"));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(parse_command("retry"), Command::Retry);
        assert_eq!(parse_command(""), Command::List);
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert!(matches!(parse_command("category"), Command::Invalid(_)));
        assert!(matches!(parse_command("dance"), Command::Invalid(_)));
    }
}
