//! Index operation kernels (gather, scatter, scatter-add, scatter-fill)
//!
//! The kernels walk the Cartesian coordinate space of the index tensor in
//! row-major order (last axis fastest). Every operand is described by a
//! [`TensorDesc`]: a base pointer plus fixed-capacity size/stride arrays, so
//! arbitrary strided views (transposed, narrowed, flipped, broadcast) are
//! addressed directly without materialization.
//!
//! Two specializations keep the hot loop cheap:
//! - the linear-offset arithmetic width `I` is either `i32` (all operands
//!   small enough) or `i64`, selected once per call;
//! - the coordinate decomposition is unrolled for index ranks 1, 2, and 3
//!   via the `DIMS` const parameter, with `-1` selecting the generic loop.
//!
//! Both specializations are pure performance choices; every instantiation
//! computes identical results.

use crate::dtype::Element;
use std::ops::{Add, Div, Mul, Rem};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Maximum supported rank. Descriptors carry fixed-size arrays of this
/// length; operations on higher-rank tensors are rejected up front.
pub const MAX_DIMS: usize = 8;

/// Parallelization threshold: skip Rayon for small sweeps (overhead > benefit)
#[cfg(feature = "rayon")]
const PARALLEL_THRESHOLD: usize = 4096;

/// Linear-offset arithmetic width.
///
/// Implemented for `i32` (narrow path) and `i64` (wide path). Signed types
/// are used so views with negative strides address correctly; the width
/// selector guarantees every reachable offset fits the chosen type.
pub trait OffsetMath:
    Copy
    + Send
    + Sync
    + PartialOrd
    + 'static
    + Add<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Rem<Output = Self>
{
    /// Additive identity
    const ZERO: Self;

    /// Widen a (validated) element count or coordinate
    fn from_usize(v: usize) -> Self;

    /// Widen a (validated) signed stride or index value
    fn from_isize(v: isize) -> Self;

    /// Narrow to a pointer offset
    fn to_isize(self) -> isize;

    /// Narrow to a slice index (must be non-negative)
    fn to_usize(self) -> usize;
}

impl OffsetMath for i32 {
    const ZERO: Self = 0;

    #[inline(always)]
    fn from_usize(v: usize) -> Self {
        v as i32
    }

    #[inline(always)]
    fn from_isize(v: isize) -> Self {
        v as i32
    }

    #[inline(always)]
    fn to_isize(self) -> isize {
        self as isize
    }

    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }
}

impl OffsetMath for i64 {
    const ZERO: Self = 0;

    #[inline(always)]
    fn from_usize(v: usize) -> Self {
        v as i64
    }

    #[inline(always)]
    fn from_isize(v: isize) -> Self {
        v as i64
    }

    #[inline(always)]
    fn to_isize(self) -> isize {
        self as isize
    }

    #[inline(always)]
    fn to_usize(self) -> usize {
        self as usize
    }
}

/// Strided-view descriptor handed to kernels.
///
/// `data` already accounts for the view's storage offset. Sizes and strides
/// beyond `dims` are padding (size 1, stride 0) and never read.
pub struct TensorDesc<T, I: OffsetMath> {
    /// Base element pointer (storage pointer advanced by the view offset)
    pub data: *mut T,
    /// Extent per dimension
    pub sizes: [I; MAX_DIMS],
    /// Element stride per dimension
    pub strides: [I; MAX_DIMS],
    /// Number of valid dimensions
    pub dims: usize,
}

impl<T, I: OffsetMath> TensorDesc<T, I> {
    /// Build a descriptor from a base pointer and a layout's shape/strides.
    ///
    /// Callers must have verified `shape.len() <= MAX_DIMS`.
    pub fn new(data: *mut T, shape: &[usize], strides: &[isize]) -> Self {
        debug_assert_eq!(shape.len(), strides.len());
        debug_assert!(shape.len() <= MAX_DIMS);

        let mut sizes = [I::from_usize(1); MAX_DIMS];
        let mut st = [I::ZERO; MAX_DIMS];
        for (d, (&size, &stride)) in shape.iter().zip(strides.iter()).enumerate() {
            sizes[d] = I::from_usize(size);
            st[d] = I::from_isize(stride);
        }

        Self {
            data,
            sizes,
            strides: st,
            dims: shape.len(),
        }
    }

    /// Extent along one dimension
    #[inline(always)]
    pub fn size(&self, d: usize) -> usize {
        self.sizes[d].to_usize()
    }

    /// True if no dimension has a negative stride
    #[inline]
    #[cfg(feature = "rayon")]
    fn nonnegative_strides(&self) -> bool {
        self.strides[..self.dims].iter().all(|s| *s >= I::ZERO)
    }

    /// Number of elements from `data` to one past the furthest reachable
    /// element. Only meaningful when all strides are non-negative.
    #[inline]
    #[cfg(feature = "rayon")]
    fn span(&self) -> usize {
        let mut last = 0usize;
        for d in 0..self.dims {
            last += self.size(d).saturating_sub(1) * self.strides[d].to_usize();
        }
        last + 1
    }
}

/// An index value that failed its per-element bounds check.
///
/// Mapped to `Error::IndexOutOfBounds` by the dispatch layer; kernels stay
/// independent of the crate error type.
#[derive(Debug, Clone, Copy)]
pub struct BadIndex {
    /// The offending index value
    pub value: i64,
    /// Exclusive upper bound along the addressed axis
    pub bound: usize,
}

/// Decompose a linear position into coordinates over `sizes`, row-major.
///
/// `DIMS` of 1, 2, or 3 selects an unrolled form; any other value selects
/// the generic per-axis loop.
#[inline(always)]
fn index_coords<I: OffsetMath, const DIMS: i32>(
    linear: I,
    dims: usize,
    sizes: &[I; MAX_DIMS],
) -> [I; MAX_DIMS] {
    let mut coords = [I::ZERO; MAX_DIMS];
    match DIMS {
        1 => {
            coords[0] = linear;
        }
        2 => {
            coords[1] = linear % sizes[1];
            coords[0] = linear / sizes[1];
        }
        3 => {
            let rest = linear / sizes[2];
            coords[2] = linear % sizes[2];
            coords[1] = rest % sizes[1];
            coords[0] = rest / sizes[1];
        }
        _ => {
            let mut rest = linear;
            for d in (1..dims).rev() {
                coords[d] = rest % sizes[d];
                rest = rest / sizes[d];
            }
            coords[0] = rest;
        }
    }
    coords
}

/// Linear element offset of `coords` under `strides`
#[inline(always)]
fn offset_for<I: OffsetMath>(coords: &[I; MAX_DIMS], strides: &[I; MAX_DIMS], dims: usize) -> I {
    let mut off = I::ZERO;
    for d in 0..dims {
        off = off + coords[d] * strides[d];
    }
    off
}

/// Like `offset_for`, but skipping the contribution of `axis`.
///
/// The caller adds `index_value * strides[axis]` to finish composing the
/// offset of the indexed operand.
#[inline(always)]
fn offset_skip_axis<I: OffsetMath>(
    coords: &[I; MAX_DIMS],
    strides: &[I; MAX_DIMS],
    dims: usize,
    axis: usize,
) -> I {
    let mut off = I::ZERO;
    for d in 0..dims {
        if d != axis {
            off = off + coords[d] * strides[d];
        }
    }
    off
}

/// Gather elements along an axis into a strided destination.
///
/// `out[coord] = src[coord with axis component replaced by index[coord]]`
///
/// `out` must have the index tensor's shape; `src` must match it on every
/// non-axis dimension.
///
/// # Safety
/// - All descriptors must address memory valid for their full coordinate
///   space
/// - `out` must not alias `src` or `index`
pub unsafe fn gather_kernel<T: Element, I: OffsetMath, const DIMS: i32>(
    out: &TensorDesc<T, I>,
    src: &TensorDesc<T, I>,
    index: &TensorDesc<i64, I>,
    axis: usize,
    total: usize,
) -> Result<(), BadIndex> {
    let dims = index.dims;
    let bound = src.size(axis);

    for linear in 0..total {
        let coords = index_coords::<I, DIMS>(I::from_usize(linear), dims, &index.sizes);

        let idx_off = offset_for(&coords, &index.strides, dims);
        let value = *index.data.offset(idx_off.to_isize());
        if value < 0 || value as usize >= bound {
            return Err(BadIndex { value, bound });
        }

        let out_off = offset_for(&coords, &out.strides, dims);
        let src_off = offset_skip_axis(&coords, &src.strides, dims, axis)
            + I::from_isize(value as isize) * src.strides[axis];

        *out.data.offset(out_off.to_isize()) = *src.data.offset(src_off.to_isize());
    }

    Ok(())
}

/// Gather into a freshly allocated contiguous destination.
///
/// Since output element `linear` is written exactly once and writes are
/// disjoint, the sweep parallelizes when the operands permit slice views
/// (non-negative strides) and the sweep is large enough to amortize the
/// fork/join cost.
///
/// # Safety
/// - `out` must be valid for `total` elements
/// - `src` and `index` descriptors must address valid memory and must not
///   alias `out`
pub unsafe fn gather_contig_kernel<T: Element, I: OffsetMath, const DIMS: i32>(
    out: *mut T,
    src: &TensorDesc<T, I>,
    index: &TensorDesc<i64, I>,
    axis: usize,
    total: usize,
) -> Result<(), BadIndex> {
    let dims = index.dims;
    let bound = src.size(axis);

    #[cfg(feature = "rayon")]
    if total >= PARALLEL_THRESHOLD
        && src.nonnegative_strides()
        && index.nonnegative_strides()
    {
        let idx_sizes = index.sizes;
        let idx_strides = index.strides;
        let src_strides = src.strides;
        let axis_stride = src.strides[axis];

        let out_slice = std::slice::from_raw_parts_mut(out, total);
        let src_slice = std::slice::from_raw_parts(src.data as *const T, src.span());
        let idx_slice = std::slice::from_raw_parts(index.data as *const i64, index.span());

        return out_slice
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(linear, out_elem)| {
                let coords = index_coords::<I, DIMS>(I::from_usize(linear), dims, &idx_sizes);

                let idx_off = offset_for(&coords, &idx_strides, dims);
                let value = idx_slice[idx_off.to_usize()];
                if value < 0 || value as usize >= bound {
                    return Err(BadIndex { value, bound });
                }

                let src_off = offset_skip_axis(&coords, &src_strides, dims, axis)
                    + I::from_isize(value as isize) * axis_stride;
                *out_elem = src_slice[src_off.to_usize()];
                Ok(())
            });
    }

    // Serial fallback (small sweeps or negative-stride operands)
    for linear in 0..total {
        let coords = index_coords::<I, DIMS>(I::from_usize(linear), dims, &index.sizes);

        let idx_off = offset_for(&coords, &index.strides, dims);
        let value = *index.data.offset(idx_off.to_isize());
        if value < 0 || value as usize >= bound {
            return Err(BadIndex { value, bound });
        }

        let src_off = offset_skip_axis(&coords, &src.strides, dims, axis)
            + I::from_isize(value as isize) * src.strides[axis];

        *out.add(linear) = *src.data.offset(src_off.to_isize());
    }

    Ok(())
}

/// Scatter elements from `src` into a strided destination along an axis.
///
/// `dst[coord with axis component replaced by index[coord]] = src[coord]`
///
/// The sweep is serial in index row-major order: when several index
/// positions address the same destination element, the last one in that
/// order wins, deterministically.
///
/// # Safety
/// - All descriptors must address memory valid for their full coordinate
///   space
/// - `dst` must not alias `src` or `index`
pub unsafe fn scatter_kernel<T: Element, I: OffsetMath, const DIMS: i32>(
    dst: &TensorDesc<T, I>,
    src: &TensorDesc<T, I>,
    index: &TensorDesc<i64, I>,
    axis: usize,
    total: usize,
) -> Result<(), BadIndex> {
    let dims = index.dims;
    let bound = dst.size(axis);

    for linear in 0..total {
        let coords = index_coords::<I, DIMS>(I::from_usize(linear), dims, &index.sizes);

        let idx_off = offset_for(&coords, &index.strides, dims);
        let value = *index.data.offset(idx_off.to_isize());
        if value < 0 || value as usize >= bound {
            return Err(BadIndex { value, bound });
        }

        let src_off = offset_for(&coords, &src.strides, dims);
        let dst_off = offset_skip_axis(&coords, &dst.strides, dims, axis)
            + I::from_isize(value as isize) * dst.strides[axis];

        *dst.data.offset(dst_off.to_isize()) = *src.data.offset(src_off.to_isize());
    }

    Ok(())
}

/// Scatter-accumulate elements from `src` into a strided destination.
///
/// `dst[coord with axis replaced] += src[coord]`
///
/// Serial in index row-major order so that colliding updates accumulate
/// without a lost-update race.
///
/// # Safety
/// Same contract as [`scatter_kernel`].
pub unsafe fn scatter_add_kernel<T: Element, I: OffsetMath, const DIMS: i32>(
    dst: &TensorDesc<T, I>,
    src: &TensorDesc<T, I>,
    index: &TensorDesc<i64, I>,
    axis: usize,
    total: usize,
) -> Result<(), BadIndex> {
    let dims = index.dims;
    let bound = dst.size(axis);

    for linear in 0..total {
        let coords = index_coords::<I, DIMS>(I::from_usize(linear), dims, &index.sizes);

        let idx_off = offset_for(&coords, &index.strides, dims);
        let value = *index.data.offset(idx_off.to_isize());
        if value < 0 || value as usize >= bound {
            return Err(BadIndex { value, bound });
        }

        let src_off = offset_for(&coords, &src.strides, dims);
        let dst_off = (offset_skip_axis(&coords, &dst.strides, dims, axis)
            + I::from_isize(value as isize) * dst.strides[axis])
            .to_isize();

        let current = *dst.data.offset(dst_off);
        *dst.data.offset(dst_off) = current + *src.data.offset(src_off.to_isize());
    }

    Ok(())
}

/// Scatter a constant into a strided destination along an axis.
///
/// `dst[coord with axis component replaced by index[coord]] = fill`
///
/// # Safety
/// - Both descriptors must address memory valid for their full coordinate
///   space
/// - `dst` must not alias `index`
pub unsafe fn scatter_fill_kernel<T: Element, I: OffsetMath, const DIMS: i32>(
    dst: &TensorDesc<T, I>,
    index: &TensorDesc<i64, I>,
    fill: T,
    axis: usize,
    total: usize,
) -> Result<(), BadIndex> {
    let dims = index.dims;
    let bound = dst.size(axis);

    for linear in 0..total {
        let coords = index_coords::<I, DIMS>(I::from_usize(linear), dims, &index.sizes);

        let idx_off = offset_for(&coords, &index.strides, dims);
        let value = *index.data.offset(idx_off.to_isize());
        if value < 0 || value as usize >= bound {
            return Err(BadIndex { value, bound });
        }

        let dst_off = offset_skip_axis(&coords, &dst.strides, dims, axis)
            + I::from_isize(value as isize) * dst.strides[axis];

        *dst.data.offset(dst_off.to_isize()) = fill;
    }

    Ok(())
}
