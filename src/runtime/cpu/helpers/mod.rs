//! Operation drivers for CPU tensors

mod indexing;

pub(crate) use indexing::*;
