use snafu::Snafu;
use strata_dtype::DType;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("cannot broadcast {lhs:?} with {rhs:?}: dimension {lhs_dim} vs {rhs_dim}"))]
    ShapeMismatch { lhs: Vec<usize>, rhs: Vec<usize>, lhs_dim: usize, rhs_dim: usize },

    #[snafu(display("axis {axis} is out of range for rank {rank}"))]
    AxisOutOfRange { axis: i64, rank: usize },

    #[snafu(display("input rank {rank} does not match {axes} broadcast axes"))]
    AxisMapMismatch { rank: usize, axes: usize },

    #[snafu(display("target rank {target} is smaller than {axes} broadcast axes"))]
    RankMismatch { target: usize, axes: usize },

    #[snafu(display("dtype inference needs at least one input type"))]
    EmptyInputType,

    #[snafu(display("layout `{layout}` belongs to a rank-{rank} input but the other input has rank {other_rank}"))]
    LayoutRankViolation { layout: String, rank: usize, other_rank: usize },

    #[snafu(display("dimension {dim} of `{tensor}` is not a compile-time constant"))]
    NonConstantShape { tensor: String, dim: usize },

    #[snafu(display("{operation} does not support {dtype}"))]
    UnsupportedDtype { operation: String, dtype: DType },

    #[snafu(display("compute phase invoked without inputs"))]
    EmptyArguments,

    #[snafu(display("{operation} expects {expected} inputs, got {actual}"))]
    ArityMismatch { operation: String, expected: usize, actual: usize },

    #[snafu(display("gradient of `{op}` must be decomposed before lowering"))]
    GradientNotDecomposed { op: String },

    #[snafu(display("required attribute `{name}` is missing"))]
    MissingRequiredAttribute { name: String },

    #[snafu(display("attribute `{name}` is not {expected}"))]
    AttributeTypeMismatch { name: String, expected: &'static str },

    #[snafu(display("`{layout}` is not a valid layout tag"))]
    InvalidLayout { layout: String },

    #[snafu(display("{operation} needs an input of rank at least 1"))]
    EmptyInputShape { operation: String },

    #[snafu(display("{operation} reduces over axis {axis}, which has no elements"))]
    EmptyReduction { operation: String, axis: usize },

    #[snafu(display("no operator named `{name}`"))]
    UnknownOperator { name: String },

    #[snafu(display("operator `{name}` is already registered"))]
    DuplicateOperator { name: String },

    #[snafu(display("in `{op}`: {source}"))]
    InOperator {
        op: String,
        #[snafu(source(from(Error, Box::new)))]
        source: Box<Error>,
    },

    #[snafu(display("IR construction failed: {source}"))]
    Ir { source: strata_ir::Error },

    #[snafu(display("scheduling failed: {source}"))]
    Schedule { source: strata_schedule::Error },
}
