//! Database initialization and the per-dimension summary store

pub mod init;
pub mod summary;

pub use init::{connect_readonly, init_database};
pub use summary::SummaryStore;
