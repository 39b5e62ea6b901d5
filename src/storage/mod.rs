pub mod sqlite;
pub mod trait_def;

pub use sqlite::SqliteVisitStore;
pub use trait_def::VisitStore;
