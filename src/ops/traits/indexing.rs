//! Indexed data-movement operations trait.

use crate::error::{Error, Result};
use crate::runtime::Runtime;
use crate::tensor::Tensor;

/// Indexed bulk data-movement operations
///
/// The four operations move elements between a source and a destination
/// along a single axis, directed by an `I64` index tensor. The index tensor
/// is walked in row-major order (last axis fastest); for each coordinate,
/// the index value replaces the coordinate's axis component in the operand
/// being addressed.
///
/// # Mutation contract
///
/// The scatter family mutates the storage the destination view designates,
/// through an explicit `&mut` borrow. The caller guarantees no other call
/// accesses that storage concurrently for the duration of one operation
/// (single writer per call; not enforced internally).
///
/// # Failure atomicity
///
/// Shape, axis, rank, and dtype errors are detected before any mutation.
/// A per-element `IndexOutOfBounds` error is discovered mid-sweep:
/// - when the destination layout required aliasing staging, the original
///   destination is untouched (the staging copy is discarded uncommitted);
/// - otherwise writes preceding the bad element have already landed and the
///   destination is left in an unspecified, partially-mutated state.
///
/// This asymmetry is a documented part of the contract, not an oversight.
///
/// # Aliasing
///
/// A destination view whose strides can map distinct logical coordinates
/// onto one element (e.g. a broadcast view with a zero stride on a non-unit
/// axis) is detected up front; the sweep then runs against a contiguous
/// staging copy which is committed back afterwards. Distinct logical index
/// positions that land on the same true address remain a caller hazard: the
/// commit is a best-effort element-wise copy, not a merge.
pub trait IndexingOps<R: Runtime> {
    /// Gather elements along a dimension using an index tensor.
    ///
    /// For a 3D tensor with dim=1:
    /// `` `out[i][j][k] = src[i][index[i][j][k]][k]` ``
    ///
    /// # Arguments
    ///
    /// * `src` - Source tensor
    /// * `dim` - Dimension along which to gather
    /// * `index` - Index tensor (I64) with the same rank as `src`; every
    ///   non-axis extent must equal the source's
    ///
    /// # Returns
    ///
    /// A freshly allocated contiguous tensor with `index`'s shape and
    /// `src`'s dtype. An empty index yields an empty result.
    fn gather(&self, src: &Tensor<R>, dim: usize, index: &Tensor<R>) -> Result<Tensor<R>> {
        let _ = (src, dim, index);
        Err(Error::NotImplemented {
            feature: "IndexingOps::gather",
        })
    }

    /// Gather elements along a dimension into a caller-provided destination.
    ///
    /// Like [`Self::gather`], but writes into `out`, whose shape must equal
    /// the index tensor's shape and whose dtype must match `src`. The
    /// aliasing guard applies to `out`.
    fn gather_out(
        &self,
        out: &mut Tensor<R>,
        src: &Tensor<R>,
        dim: usize,
        index: &Tensor<R>,
    ) -> Result<()> {
        let _ = (out, src, dim, index);
        Err(Error::NotImplemented {
            feature: "IndexingOps::gather_out",
        })
    }

    /// Scatter values into a tensor at positions specified by an index
    /// tensor (in place).
    ///
    /// For a 3D tensor with dim=1:
    /// `` `dst[i][index[i][j][k]][k] = src[i][j][k]` ``
    ///
    /// # Arguments
    ///
    /// * `dst` - Destination tensor, mutated in place
    /// * `dim` - Dimension along which to scatter
    /// * `index` - Index tensor (I64). Its extent must not exceed the
    ///   source's anywhere, nor the destination's outside `dim`. A rank-0 or
    ///   zero-element index makes the call a no-op.
    /// * `src` - Source tensor with values to scatter; same rank and dtype
    ///   as `dst`
    ///
    /// # Determinism
    ///
    /// When several index positions address the same destination element,
    /// the sweep's row-major order makes the last writer win
    /// deterministically.
    fn scatter(
        &self,
        dst: &mut Tensor<R>,
        dim: usize,
        index: &Tensor<R>,
        src: &Tensor<R>,
    ) -> Result<()> {
        let _ = (dst, dim, index, src);
        Err(Error::NotImplemented {
            feature: "IndexingOps::scatter",
        })
    }

    /// Scatter-accumulate values into a tensor at positions specified by an
    /// index tensor (in place).
    ///
    /// For a 3D tensor with dim=1:
    /// `` `dst[i][index[i][j][k]][k] += src[i][j][k]` ``
    ///
    /// Colliding index positions accumulate (order-independent for integer
    /// kinds; floating-point accumulation follows the sweep order).
    ///
    /// # Errors
    ///
    /// `UnsupportedDType` for non-numeric kinds (e.g. `Bool`), detected at
    /// dispatch with zero mutation.
    fn scatter_add(
        &self,
        dst: &mut Tensor<R>,
        dim: usize,
        index: &Tensor<R>,
        src: &Tensor<R>,
    ) -> Result<()> {
        let _ = (dst, dim, index, src);
        Err(Error::NotImplemented {
            feature: "IndexingOps::scatter_add",
        })
    }

    /// Scatter a constant value at positions specified by an index tensor
    /// (in place).
    ///
    /// `` `dst[..., index[...], ...] = value` `` along `dim`.
    ///
    /// The fill value is converted to the destination's dtype. For integer
    /// destinations the value must be finite and within the dtype's
    /// representable range (`ValueConversion` otherwise, checked before the
    /// sweep); in-range fractional values truncate. Boolean destinations
    /// store any non-zero value as 1.
    fn scatter_fill(
        &self,
        dst: &mut Tensor<R>,
        dim: usize,
        index: &Tensor<R>,
        value: f64,
    ) -> Result<()> {
        let _ = (dst, dim, index, value);
        Err(Error::NotImplemented {
            feature: "IndexingOps::scatter_fill",
        })
    }
}
