//! Scatter-fill and scatter-add tests

use idxr::dtype::DType;
use idxr::error::Error;
use idxr::ops::IndexingOps;
use idxr::runtime::cpu::{CpuDevice, CpuRuntime};
use idxr::runtime::Runtime;
use idxr::tensor::Tensor;

// ============================================================================
// Scatter-add Tests
// ============================================================================

#[test]
fn test_scatter_add_accumulates_collisions() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[4], DType::F32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 0, 2], &[3], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f32, 2.0, 3.0], &[3], &device);

    client.scatter_add(&mut dst, 0, &index, &src).unwrap();

    let data: Vec<f32> = dst.to_vec();
    // src[0] + src[1] land on slot 0, src[2] on slot 2
    assert_eq!(data, [3.0, 0.0, 3.0, 0.0]);
}

#[test]
fn test_scatter_add_includes_existing_values() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::from_slice(&[10i32, 20, 30], &[3], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[2i64, 2, 0], &[3], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[1i32, 2, 3], &[3], &device);

    client.scatter_add(&mut dst, 0, &index, &src).unwrap();

    let data: Vec<i32> = dst.to_vec();
    assert_eq!(data, [13, 20, 33]);
}

#[test]
fn test_scatter_add_dim1() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2, 3], DType::F64, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[1i64, 1, 0, 2], &[2, 2], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[1.0f64, 2.0, 3.0, 4.0], &[2, 2], &device);

    client.scatter_add(&mut dst, 1, &index, &src).unwrap();

    let data: Vec<f64> = dst.to_vec();
    // Row 0: both updates hit column 1
    // Row 1: columns 0 and 2
    assert_eq!(data, [0.0, 3.0, 0.0, 3.0, 0.0, 4.0]);
}

#[test]
fn test_scatter_add_unsigned_kind() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[3], DType::U8, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[1i64, 1, 1], &[3], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[5u8, 6, 7], &[3], &device);

    client.scatter_add(&mut dst, 0, &index, &src).unwrap();

    let data: Vec<u8> = dst.to_vec();
    assert_eq!(data, [0, 18, 0]);
}

#[test]
fn test_scatter_add_bool_rejected_without_mutation() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[4], DType::Bool, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[2], &device);
    let src = Tensor::<CpuRuntime>::full_scalar(&[2], DType::Bool, 1.0, &device);

    let result = client.scatter_add(&mut dst, 0, &index, &src);
    assert!(matches!(result, Err(Error::UnsupportedDType { .. })));

    // Zero mutation guaranteed for a dispatch-time rejection
    let data: Vec<u8> = dst.to_vec();
    assert_eq!(data, [0, 0, 0, 0]);
}

#[test]
fn test_scatter_add_empty_index_is_noop() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let original = [4.0f32, 5.0, 6.0];
    let mut dst = Tensor::<CpuRuntime>::from_slice(&original, &[3], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[] as &[i64], &[0], &device);
    let src = Tensor::<CpuRuntime>::from_slice(&[] as &[f32], &[0], &device);

    client.scatter_add(&mut dst, 0, &index, &src).unwrap();

    let data: Vec<f32> = dst.to_vec();
    assert_eq!(data, original);
}

// ============================================================================
// Scatter-fill Tests
// ============================================================================

#[test]
fn test_scatter_fill_dim1() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[3, 4], DType::F32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 3, 1, 2, 2, 0], &[3, 2], &device);

    client.scatter_fill(&mut dst, 1, &index, 7.5).unwrap();

    let data: Vec<f32> = dst.to_vec();
    // Row 0: columns 0 and 3; row 1: columns 1 and 2; row 2: columns 2 and 0
    assert_eq!(
        data,
        [7.5, 0.0, 0.0, 7.5, 0.0, 7.5, 7.5, 0.0, 7.5, 0.0, 7.5, 0.0]
    );
}

#[test]
fn test_scatter_fill_integer_truncates_in_range() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[3], DType::I16, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[1i64], &[1], &device);

    client.scatter_fill(&mut dst, 0, &index, -2.75).unwrap();

    let data: Vec<i16> = dst.to_vec();
    assert_eq!(data, [0, -2, 0]);
}

#[test]
fn test_scatter_fill_value_out_of_range() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2, 2], DType::U8, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64, 1], &[1, 2], &device);

    // 300 does not fit an 8-bit unsigned element
    let result = client.scatter_fill(&mut dst, 0, &index, 300.0);
    assert!(matches!(result, Err(Error::ValueConversion { .. })));

    let data: Vec<u8> = dst.to_vec();
    assert_eq!(data, [0, 0, 0, 0]);
}

#[test]
fn test_scatter_fill_negative_into_unsigned() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[4], DType::U16, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64], &[1], &device);

    let result = client.scatter_fill(&mut dst, 0, &index, -1.0);
    assert!(matches!(result, Err(Error::ValueConversion { .. })));
}

#[test]
fn test_scatter_fill_nan_into_integer() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2], DType::I32, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[0i64], &[1], &device);

    let result = client.scatter_fill(&mut dst, 0, &index, f64::NAN);
    assert!(matches!(result, Err(Error::ValueConversion { .. })));
}

#[test]
fn test_scatter_fill_conversion_checked_even_for_empty_index() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2], DType::U8, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[] as &[i64], &[0], &device);

    // The value is vetted before the empty-index short-circuit
    let result = client.scatter_fill(&mut dst, 0, &index, 300.0);
    assert!(matches!(result, Err(Error::ValueConversion { .. })));
}

#[test]
fn test_scatter_fill_bool_destination() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[3], DType::Bool, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[2i64, 0], &[2], &device);

    // Any non-zero fill stores as 1
    client.scatter_fill(&mut dst, 0, &index, 42.0).unwrap();

    let data: Vec<u8> = dst.to_vec();
    assert_eq!(data, [1, 0, 1]);
}

#[test]
fn test_scatter_fill_nan_into_float() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let mut dst = Tensor::<CpuRuntime>::zeros(&[2], DType::F64, &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[1i64], &[1], &device);

    client.scatter_fill(&mut dst, 0, &index, f64::NAN).unwrap();

    let data: Vec<f64> = dst.to_vec();
    assert_eq!(data[0], 0.0);
    assert!(data[1].is_nan());
}

#[test]
fn test_scatter_fill_empty_index_is_noop() {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let original = [1u8, 2, 3];
    let mut dst = Tensor::<CpuRuntime>::from_slice(&original, &[3], &device);
    let index = Tensor::<CpuRuntime>::from_slice(&[] as &[i64], &[0], &device);

    client.scatter_fill(&mut dst, 0, &index, 9.0).unwrap();

    let data: Vec<u8> = dst.to_vec();
    assert_eq!(data, original);
}
