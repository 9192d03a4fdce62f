//! Validation, bounds-checking, and aliasing-guard tests

use idxr::dtype::DType;
use idxr::error::Error;
use idxr::ops::IndexingOps;
use idxr::runtime::cpu::{CpuDevice, CpuRuntime};
use idxr::runtime::Runtime;
use idxr::tensor::Tensor;

// ============================================================================
// Shape / axis / rank validation
// ============================================================================

#[test]
fn test_axis_out_of_range() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1, 1, 0], &[2, 2], &device);

    let result = client.gather(&src, 2, &index);
    assert!(matches!(result, Err(Error::InvalidDimension { .. })));

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::F32, &device);
    let result = client.scatter(&mut dst, 5, &index, &src);
    assert!(matches!(result, Err(Error::InvalidDimension { .. })));
}

#[test]
fn test_gather_rank_mismatch() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[2], &device);

    let result = client.gather(&src, 0, &index);
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
}

#[test]
fn test_gather_non_axis_extent_mismatch() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2], &device);
    // Non-axis dimension 1 has extent 3 != 2
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1, 2, 0, 1, 2], &[2, 3], &device);

    let result = client.gather(&src, 0, &index);
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
}

#[test]
fn test_scatter_index_larger_than_destination() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::F32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1, 0, 1, 0, 1], &[3, 2], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 6], &[3, 2], &device);

    // Non-axis extent 3 exceeds the destination's 2
    let result = client.scatter(&mut dst, 1, &index, &src);
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
}

#[test]
fn test_scatter_index_larger_than_source() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[4, 4], DType::F32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64; 12], &[3, 4], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 8], &[2, 4], &device);

    // The index may never exceed the source, the scatter axis included
    let result = client.scatter(&mut dst, 0, &index, &src);
    assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
}

#[test]
fn test_index_dtype_must_be_i64() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0], &[2], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i32, 1], &[2], &device);

    let result = client.gather(&src, 0, &index);
    assert!(matches!(result, Err(Error::DTypeMismatch { .. })));
}

#[test]
fn test_scatter_source_dtype_must_match() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2], DType::F32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[2], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0], &[2], &device);

    let result = client.scatter(&mut dst, 0, &index, &src);
    assert!(matches!(result, Err(Error::DTypeMismatch { .. })));
}

#[test]
fn test_rank_ceiling() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    // Rank 9 exceeds the supported maximum of 8
    let shape = [1usize; 9];
    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32], &shape, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64], &shape, &device);

    let result = client.gather(&src, 0, &index);
    assert!(matches!(result, Err(Error::RankTooHigh { .. })));

    let mut dst = Tensor::<CpuRuntime>::zeros(&shape, DType::F32, &device);
    let result = client.scatter(&mut dst, 0, &index, &src);
    assert!(matches!(result, Err(Error::RankTooHigh { .. })));
}

// ============================================================================
// Per-element bounds checks
// ============================================================================

#[test]
fn test_gather_index_out_of_range() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 12], &[3, 4], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 5, 1, 2], &[1, 4], &device);

    let result = client.gather(&src, 0, &index);
    match result {
        Err(Error::IndexOutOfBounds { index, size }) => {
            assert_eq!(index, 5);
            assert_eq!(size, 3);
        }
        other => panic!("expected IndexOutOfBounds, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_gather_negative_index_rejected() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[3], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[-1i64], &[1], &device);

    let result = client.gather(&src, 0, &index);
    match result {
        Err(Error::IndexOutOfBounds { index, size }) => {
            assert_eq!(index, -1);
            assert_eq!(size, 3);
        }
        other => panic!("expected IndexOutOfBounds, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_scatter_index_out_of_range() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    // Destination shape [3, 4], axis 0, index value 5: rejected during the
    // sweep
    let mut dst = Tensor::<CpuRuntime>::zeros(&[3, 4], DType::F32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 5, 1, 2], &[1, 4], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32; 4], &[1, 4], &device);

    let result = client.scatter(&mut dst, 0, &index, &src);
    assert!(matches!(
        result,
        Err(Error::IndexOutOfBounds { index: 5, size: 3 })
    ));
}

// ============================================================================
// Aliasing guard
// ============================================================================

#[test]
fn test_scatter_into_broadcast_destination() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    // A [1, 3] row broadcast to [4, 3]: every row aliases the same storage.
    // The guard stages the sweep; the commit walks rows in order, so the
    // last logical row wins.
    let base = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[1, 3], &device);
    let mut dst = base.broadcast_to(&[4, 3]).unwrap();
    assert!(dst.layout().maybe_overlapping());

    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1, 2, 0], &[4, 1], &device);
    let src =
        Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0, 30.0, 40.0], &[4, 1], &device);

    client.scatter(&mut dst, 1, &index, &src).unwrap();

    // Staged rows: [10,2,3], [1,20,3], [1,2,30], [40,2,3]; commit leaves the
    // final row in the shared storage
    let data: Vec<f32> = base.to_vec();
    assert_eq!(data, [40.0, 2.0, 3.0]);
}

#[test]
fn test_staged_scatter_failure_leaves_destination_untouched() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let original = [1.0f32, 2.0, 3.0];
    let base = Tensor::<CpuRuntime>::from_slice(&original, &[1, 3], &device);
    let mut dst = base.broadcast_to(&[4, 3]).unwrap();

    // The bad value sits last, after several sweep writes have landed in
    // the staging copy
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1, 2, 9], &[4, 1], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[10.0f32, 20.0, 30.0, 40.0], &[4, 1], &device);

    let result = client.scatter(&mut dst, 1, &index, &src);
    assert!(matches!(result, Err(Error::IndexOutOfBounds { .. })));

    // Commit never ran: the true destination still holds its original data
    let data: Vec<f32> = base.to_vec();
    assert_eq!(data, original);
}

#[test]
fn test_scatter_fill_through_broadcast_destination() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let base = Tensor::<CpuRuntime>::zeros(&[1, 3], DType::I32, &device);
    let mut dst = base.broadcast_to(&[2, 3]).unwrap();

    // Row 0 fills column 0, row 1 fills column 2; the commit's last row
    // determines the shared storage
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 2], &[2, 1], &device);

    client.scatter_fill(&mut dst, 1, &index, 9.0).unwrap();

    let data: Vec<i32> = base.to_vec();
    assert_eq!(data, [0, 0, 9]);
}

#[test]
fn test_scatter_overlap_last_writer_wins() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    // Colliding index positions on a well-formed destination resolve
    // deterministically: the later position in row-major order wins
    let mut dst = Tensor::<CpuRuntime>::zeros(&[3], DType::I32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[1i64, 1, 1], &[3], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[7i32, 8, 9], &[3], &device);

    client.scatter(&mut dst, 0, &index, &src).unwrap();

    let data: Vec<i32> = dst.to_vec();
    assert_eq!(data, [0, 9, 0]);
}

#[test]
fn test_gather_out_into_broadcast_destination() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0, 4.0], &[2, 2], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 0, 1, 1], &[2, 2], &device);

    let base = Tensor::<CpuRuntime>::zeros(&[1, 2], DType::F32, &device);
    let mut out = base.broadcast_to(&[2, 2]).unwrap();

    client.gather_out(&mut out, &src, 0, &index).unwrap();

    // Gathered rows: [1, 2], [3, 4]; commit leaves the last row
    let data: Vec<f32> = base.to_vec();
    assert_eq!(data, [3.0, 4.0]);
}
