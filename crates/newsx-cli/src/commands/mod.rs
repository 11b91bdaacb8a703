pub mod categories;
pub mod headlines;
pub mod init;
pub mod interactive;
