use std::str::FromStr;

use strata_dtype::DType;
use test_case::test_case;

use crate::{Arch, Target};

#[test_case(Arch::X86, "x86")]
#[test_case(Arch::NVGPU, "nvgpu")]
#[test_case(Arch::Unknown, "unknown")]
fn test_arch_names(arch: Arch, name: &str) {
    assert_eq!(arch.to_string(), name);
    assert_eq!(Arch::from_str(name).unwrap(), arch);
}

#[test_case(DType::Float32, 8)]
#[test_case(DType::Float64, 4)]
#[test_case(DType::Float16, 16)]
#[test_case(DType::Int8, 32)]
#[test_case(DType::Bool, 32)]
fn test_host_vector_lanes(dtype: DType, lanes: usize) {
    assert_eq!(Target::host().vector_lanes(dtype), lanes);
}

#[test]
fn test_gpu_has_no_vector_lanes() {
    assert_eq!(Target::nvgpu().vector_lanes(DType::Float32), 1);
    assert_eq!(Target::unknown().vector_lanes(DType::Int8), 1);
}

#[test]
fn test_strategy_names() {
    assert_eq!(Target::host().strategy_name("argmin"), "strategy.argmin.x86");
    assert_eq!(Target::nvgpu().strategy_name("elementwise_add"), "strategy.elementwise_add.nvgpu");
    assert_eq!(Target::unknown().strategy_name("reciprocal"), "strategy.reciprocal.unknown");
}

#[test]
fn test_extern_backend() {
    assert_eq!(Target::host().extern_backend(), "host");
    assert_eq!(Target::nvgpu().extern_backend(), "cuda");
    assert_eq!(Target::unknown().extern_backend(), "host");
    assert_eq!(Target::default(), Target::host());
}
