//! CPU implementation of the indexed data-movement operations.

use crate::error::Result;
use crate::ops::IndexingOps;
use crate::runtime::cpu::helpers::{
    gather_impl, gather_out_impl, scatter_add_impl, scatter_fill_impl, scatter_impl,
};
use crate::runtime::cpu::{CpuClient, CpuRuntime};
use crate::tensor::Tensor;

/// IndexingOps implementation for the CPU runtime.
impl IndexingOps<CpuRuntime> for CpuClient {
    fn gather(
        &self,
        src: &Tensor<CpuRuntime>,
        dim: usize,
        index: &Tensor<CpuRuntime>,
    ) -> Result<Tensor<CpuRuntime>> {
        gather_impl(self, src, dim, index)
    }

    fn gather_out(
        &self,
        out: &mut Tensor<CpuRuntime>,
        src: &Tensor<CpuRuntime>,
        dim: usize,
        index: &Tensor<CpuRuntime>,
    ) -> Result<()> {
        gather_out_impl(self, out, src, dim, index)
    }

    fn scatter(
        &self,
        dst: &mut Tensor<CpuRuntime>,
        dim: usize,
        index: &Tensor<CpuRuntime>,
        src: &Tensor<CpuRuntime>,
    ) -> Result<()> {
        scatter_impl(self, dst, dim, index, src)
    }

    fn scatter_add(
        &self,
        dst: &mut Tensor<CpuRuntime>,
        dim: usize,
        index: &Tensor<CpuRuntime>,
        src: &Tensor<CpuRuntime>,
    ) -> Result<()> {
        scatter_add_impl(self, dst, dim, index, src)
    }

    fn scatter_fill(
        &self,
        dst: &mut Tensor<CpuRuntime>,
        dim: usize,
        index: &Tensor<CpuRuntime>,
        value: f64,
    ) -> Result<()> {
        scatter_fill_impl(self, dst, dim, index, value)
    }
}
