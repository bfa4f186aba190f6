pub mod table;

pub use table::{profile, SearchObjectProfile, SEARCH_OBJECT_COUNT};
