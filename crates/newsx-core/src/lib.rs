pub mod board;
pub mod config;
pub mod error;
pub mod feed;

pub use board::{Completion, FetchTicket, LoadState, NewsBoard};
pub use config::{AppConfig, ProxyEndpoint, SourceMode};
pub use error::{Error, Result, USER_FACING_MESSAGE};
