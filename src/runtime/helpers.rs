//! Shared helper functions for runtime backends

use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Ensure a tensor is contiguous in memory.
///
/// If the tensor is already contiguous (elements laid out consecutively in
/// memory), returns a clone (zero-copy, just increments the Arc refcount).
/// Otherwise, creates a new contiguous copy by materializing the strided
/// view.
///
/// This is typically required before passing a tensor to a kernel that walks
/// raw element slices rather than strided descriptors.
#[inline]
pub fn ensure_contiguous<R: Runtime>(tensor: &Tensor<R>) -> Tensor<R> {
    if tensor.is_contiguous() {
        tensor.clone()
    } else {
        tensor.contiguous()
    }
}
