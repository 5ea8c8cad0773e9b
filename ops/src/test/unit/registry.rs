use strata_dtype::DType;
use strata_schedule::Target;
use test_case::test_case;

use crate::error::Error;
use crate::kernel::ArgReduceKind;
use crate::{AttrMap, BinaryPrimitive, OpDescriptor, OpKind, OpPatternKind, OpRegistry, registry};

#[test]
fn test_builtin_count() {
    assert_eq!(registry().len(), 29);
    assert_eq!(OpRegistry::with_builtins().len(), registry().len());
    assert!(OpRegistry::new().is_empty());
}

#[test]
fn test_names_sorted() {
    let names: Vec<&str> = registry().names().collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"elementwise_add_grad"));
}

#[test_case("argmin", 1, 1, OpPatternKind::Reduction ; "argmin")]
#[test_case("argmax", 1, 1, OpPatternKind::Reduction ; "argmax")]
#[test_case("reciprocal", 1, 1, OpPatternKind::ElementWise ; "reciprocal")]
#[test_case("broadcast_to", 1, 1, OpPatternKind::Broadcast ; "broadcast_to")]
#[test_case("greater_equal", 2, 1, OpPatternKind::Broadcast ; "greater_equal")]
#[test_case("elementwise_add_grad", 3, 2, OpPatternKind::Opaque ; "grad")]
fn test_descriptor_metadata(name: &str, inputs: usize, outputs: usize, pattern: OpPatternKind) {
    let desc = registry().get(name).unwrap();
    assert_eq!(desc.name, name);
    assert_eq!((desc.num_inputs, desc.num_outputs), (inputs, outputs));
    assert_eq!(desc.pattern, pattern);
    assert_eq!(desc.support_level, 4);
    assert!(!desc.description.is_empty());
}

#[test]
fn test_kinds() {
    assert_eq!(registry().get("argmax").unwrap().kind, OpKind::ArgReduce(ArgReduceKind::Max));
    assert_eq!(registry().get("substract").unwrap().kind, OpKind::Binary(BinaryPrimitive::Subtract));
    assert_eq!(registry().get("power").unwrap().kind, OpKind::Binary(BinaryPrimitive::Power));
}

#[test]
fn test_unknown_operator() {
    let err = registry().get("conv2d").unwrap_err();
    assert_eq!(err, Error::UnknownOperator { name: "conv2d".into() });
}

#[test]
fn test_register() {
    let mut ops = OpRegistry::new();
    let custom = OpDescriptor::builder()
        .name("my_reciprocal")
        .kind(OpKind::Reciprocal)
        .pattern(OpPatternKind::ElementWise)
        .support_level(2)
        .build();
    ops.register(custom.clone()).unwrap();
    assert_eq!(ops.get("my_reciprocal").unwrap(), &custom);

    let err = ops.register(custom).unwrap_err();
    assert_eq!(err, Error::DuplicateOperator { name: "my_reciprocal".into() });
    assert_eq!(ops.len(), 1);
}

#[test]
fn test_gradient_rules() {
    let desc = registry().get("elementwise_add_grad").unwrap();
    let shapes = desc.infer_shape(&[vec![2, 3], vec![2, 3], vec![3]], &AttrMap::new()).unwrap();
    assert_eq!(shapes, vec![vec![2, 3], vec![3]]);

    let types = desc.infer_dtype(&[DType::Float32, DType::Float16, DType::Float64], &AttrMap::new()).unwrap();
    assert_eq!(types, vec![DType::Float16, DType::Float64]);

    let err = desc.infer_shape(&[vec![2]], &AttrMap::new()).unwrap_err();
    let Error::InOperator { source, .. } = err else { panic!("expected operator error") };
    assert!(matches!(*source, Error::ArityMismatch { expected: 3, actual: 1, .. }));
}

#[test_case(Target::host() ; "host")]
#[test_case(Target::nvgpu() ; "nvgpu")]
fn test_gradient_has_no_strategy(target: Target) {
    let desc = registry().get("elementwise_add_grad").unwrap();
    let err = desc.strategy(&AttrMap::new(), &[DType::Float32; 2], &[vec![4], vec![4]], &target).unwrap_err();
    assert_eq!(
        err,
        Error::InOperator {
            op: "elementwise_add_grad".into(),
            source: Box::new(Error::GradientNotDecomposed { op: "elementwise_add_grad".into() }),
        }
    );
}

#[test]
fn test_arg_reduce_requires_axis() {
    let desc = registry().get("argmin").unwrap();
    let err = desc.strategy(&AttrMap::new(), &[DType::Int32], &[vec![1]], &Target::host()).unwrap_err();
    let Error::InOperator { op, source } = err else { panic!("expected operator error") };
    assert_eq!(op, "argmin");
    assert_eq!(*source, Error::MissingRequiredAttribute { name: "axis".into() });
}

#[test]
fn test_layout_passthrough() {
    let desc = registry().get("reciprocal").unwrap();
    let layouts = vec!["NCHW".to_string()];
    let inferred = desc.infer_layout(&[vec![1, 2, 3, 4]], &layouts, &AttrMap::new(), &Target::host()).unwrap();
    assert_eq!(inferred.outputs, vec!["NCHW".to_string()]);
    assert_eq!(inferred.inputs, layouts);
}
