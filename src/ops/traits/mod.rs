//! Operation traits implemented by runtime clients

mod indexing;

pub use indexing::IndexingOps;
