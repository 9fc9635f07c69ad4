pub mod daemon;
pub mod grid;
pub mod output;
pub mod query;
pub mod summary;
