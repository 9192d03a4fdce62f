//! CPU kernels for the indexed data-movement operations

mod index;

pub(crate) use index::*;
