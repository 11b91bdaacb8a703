//! Typed state for a news board: selected category, search query, sort order
//! and the single batch currently on display
//!
//! Every load gets a generation number and a cancel token. Starting a new load
//! cancels the previous one, and completions from older generations are
//! dropped, so a slow response for an abandoned category never replaces the
//! batch the reader asked for last.

use crate::error::USER_FACING_MESSAGE;
use crate::feed::{
    visible_articles, Article, ArticleSource, Batch, CancelHandle, CancelToken, Category, SortOrder,
};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Failed {
        /// Text for the reader
        message: String,
        /// Underlying cause, for logs and verbose output
        detail: String,
    },
}

/// Permission to load one category for one generation
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub generation: u64,
    pub category: Category,
    pub cancel: CancelToken,
}

/// Outcome of a ticket, handed back to [`NewsBoard::complete`]
#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub result: Result<Batch>,
}

impl FetchTicket {
    /// Run the load this ticket stands for
    pub async fn execute(self, source: &dyn ArticleSource) -> Completion {
        let result = source.load(self.category, &self.cancel).await;
        Completion {
            generation: self.generation,
            result,
        }
    }
}

#[derive(Debug)]
pub struct NewsBoard {
    category: Category,
    query: String,
    sort: SortOrder,
    state: LoadState,
    batch: Option<Batch>,
    generation: u64,
    in_flight: Option<CancelHandle>,
}

impl Default for NewsBoard {
    fn default() -> Self {
        Self::new(Category::General)
    }
}

impl NewsBoard {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            query: String::new(),
            sort: SortOrder::default(),
            state: LoadState::Idle,
            batch: None,
            generation: 0,
            in_flight: None,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn batch(&self) -> Option<&Batch> {
        self.batch.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Switch category and start loading it, superseding any load in flight
    pub fn select_category(&mut self, category: Category) -> FetchTicket {
        self.category = category;
        self.begin_load()
    }

    /// Reload the current category
    pub fn retry(&mut self) -> FetchTicket {
        self.begin_load()
    }

    fn begin_load(&mut self) -> FetchTicket {
        if let Some(previous) = self.in_flight.take() {
            tracing::debug!(generation = self.generation, "Cancelling superseded load");
            previous.cancel();
        }

        self.generation += 1;
        self.state = LoadState::Loading;
        self.batch = None;

        let (handle, cancel) = CancelHandle::new();
        self.in_flight = Some(handle);

        FetchTicket {
            generation: self.generation,
            category: self.category,
            cancel,
        }
    }

    /// Apply a finished load; returns false when it belongs to a superseded generation
    pub fn complete(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            tracing::debug!(
                stale = completion.generation,
                current = self.generation,
                "Discarding stale load result"
            );
            return false;
        }

        self.in_flight = None;
        match completion.result {
            Ok(batch) => {
                self.batch = Some(batch);
                self.state = LoadState::Loaded;
            }
            Err(Error::Cancelled) => {
                self.state = LoadState::Idle;
            }
            Err(e) => {
                tracing::error!("Failed to load {} news: {}", self.category, e);
                self.batch = None;
                self.state = LoadState::Failed {
                    message: USER_FACING_MESSAGE.to_string(),
                    detail: e.to_string(),
                };
            }
        }
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    /// The batch after search and sort; empty unless a batch is loaded
    pub fn visible(&self) -> Vec<&Article> {
        match &self.batch {
            Some(batch) => visible_articles(&batch.articles, &self.query, self.sort),
            None => Vec::new(),
        }
    }

    pub fn has_more(&self) -> bool {
        self.batch.as_ref().map(Batch::has_more).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::SourceKind;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn batch(category: Category, titles: &[&str]) -> Batch {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        Batch {
            category,
            source_kind: SourceKind::Rss,
            fetched_at: base,
            articles: titles
                .iter()
                .enumerate()
                .map(|(i, title)| Article {
                    id: format!("{}-{}-0", category, i),
                    title: title.to_string(),
                    description: String::new(),
                    url: None,
                    image_url: None,
                    published_at: base + Duration::minutes(i as i64),
                    category,
                    source: "Test".to_string(),
                })
                .collect(),
        }
    }

    /// Returns a fixed batch, or waits for cancellation when asked for sports
    struct FakeSource {
        loads: AtomicU32,
    }

    #[async_trait::async_trait]
    impl ArticleSource for FakeSource {
        async fn load(&self, category: Category, cancel: &CancelToken) -> Result<Batch> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            if category == Category::Sports {
                return cancel.run(std::future::pending::<Result<Batch>>()).await;
            }
            Ok(batch(category, &["Alpha", "Beta"]))
        }
    }

    #[test]
    fn test_initial_state() {
        let board = NewsBoard::default();
        assert_eq!(board.category(), Category::General);
        assert_eq!(board.state(), &LoadState::Idle);
        assert!(board.visible().is_empty());
        assert!(!board.has_more());
    }

    #[test]
    fn test_load_cycle() {
        let mut board = NewsBoard::default();
        let ticket = board.select_category(Category::Technology);
        assert!(board.is_loading());
        assert_eq!(ticket.category, Category::Technology);

        let applied = board.complete(Completion {
            generation: ticket.generation,
            result: Ok(batch(Category::Technology, &["One", "Two", "Three"])),
        });

        assert!(applied);
        assert_eq!(board.state(), &LoadState::Loaded);
        assert_eq!(board.visible().len(), 3);
        // Newest first by default
        assert_eq!(board.visible()[0].title, "Three");
    }

    #[test]
    fn test_stale_completion_discarded() {
        let mut board = NewsBoard::default();
        let first = board.select_category(Category::Technology);
        let second = board.select_category(Category::Health);

        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());

        let applied = board.complete(Completion {
            generation: first.generation,
            result: Ok(batch(Category::Technology, &["Old news"])),
        });
        assert!(!applied);
        assert!(board.is_loading());
        assert!(board.batch().is_none());

        board.complete(Completion {
            generation: second.generation,
            result: Ok(batch(Category::Health, &["Fresh"])),
        });
        assert_eq!(board.batch().unwrap().category, Category::Health);
        assert_eq!(board.visible()[0].title, "Fresh");
    }

    #[test]
    fn test_failure_replaces_batch_with_message() {
        let mut board = NewsBoard::default();
        let ticket = board.retry();
        board.complete(Completion {
            generation: ticket.generation,
            result: Ok(batch(Category::General, &["Kept?"])),
        });

        let ticket = board.retry();
        board.complete(Completion {
            generation: ticket.generation,
            result: Err(Error::AllProxiesFailed {
                attempts: 3,
                last_error: "HTTP 500".into(),
            }),
        });

        match board.state() {
            LoadState::Failed { message, detail } => {
                assert_eq!(message, USER_FACING_MESSAGE);
                assert!(detail.contains("HTTP 500"));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(board.visible().is_empty());
    }

    #[test]
    fn test_query_and_sort_recompute_view() {
        let mut board = NewsBoard::default();
        let ticket = board.retry();
        board.complete(Completion {
            generation: ticket.generation,
            result: Ok(batch(Category::General, &["Election today", "Weather", "ELECTION recap"])),
        });

        board.set_query("election");
        let titles: Vec<&str> = board.visible().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["ELECTION recap", "Election today"]);

        board.set_sort(SortOrder::Oldest);
        let titles: Vec<&str> = board.visible().iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Election today", "ELECTION recap"]);

        board.set_query("");
        assert_eq!(board.visible().len(), 3);
    }

    #[tokio::test]
    async fn test_superseded_ticket_resolves_cancelled() {
        let source = FakeSource {
            loads: AtomicU32::new(0),
        };
        let mut board = NewsBoard::default();

        let sports = board.select_category(Category::Sports);
        let pending = tokio::spawn(async move {
            let source = FakeSource {
                loads: AtomicU32::new(0),
            };
            sports.execute(&source).await
        });

        let business = board.select_category(Category::Business);
        let done = business.execute(&source).await;
        assert!(board.complete(done));

        let stale = pending.await.unwrap();
        assert!(matches!(stale.result, Err(Error::Cancelled)));
        assert!(!board.complete(stale));

        assert_eq!(board.state(), &LoadState::Loaded);
        assert_eq!(board.batch().unwrap().category, Category::Business);
        assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    }
}
