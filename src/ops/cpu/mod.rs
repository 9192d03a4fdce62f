//! CPU implementations of the operation traits

mod indexing;
