use smallvec::SmallVec;
use snafu::Snafu;
use strata_dtype::DType;

use crate::{BinaryOp, UnaryOp};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// DType mismatch in binary operation.
    #[snafu(display("dtype mismatch: cannot perform operation on {lhs:?} and {rhs:?}"))]
    DTypeMismatch { lhs: DType, rhs: DType },

    /// Invalid dtype for operation (e.g., negation of bool).
    #[snafu(display("invalid dtype for operation: operation {operation:?}; dtype {dtype:?}"))]
    InvalidDTypeForUnaryOp { operation: UnaryOp, dtype: DType },

    /// Invalid dtype for operation (e.g., bitwise on float).
    #[snafu(display("invalid dtype for operation: operation {operation:?}; dtypes {dtypes:?}"))]
    InvalidDTypeForBinaryOp { operation: BinaryOp, dtypes: SmallVec<[DType; 2]> },

    /// Void dtype cannot be used in operations.
    #[snafu(display("void dtype cannot be used in operations"))]
    VoidTypeInOp,

    /// Index parameter must have an integer dtype.
    #[snafu(display("index parameter must have an integer dtype, got {actual:?}"))]
    IndexTypeMismatch { actual: DType },

    /// Select/if condition must be bool.
    #[snafu(display("condition must be bool, got {actual:?}"))]
    ConditionNotBool { actual: DType },

    /// Store value dtype differs from buffer dtype.
    #[snafu(display("cannot store {actual:?} into buffer `{buffer}` of {expected:?}"))]
    StoreTypeMismatch { buffer: String, expected: DType, actual: DType },

    /// Tensor indexed with the wrong number of indices.
    #[snafu(display("tensor `{tensor}` has rank {expected} but was indexed with {actual} indices"))]
    TensorRankMismatch { tensor: String, expected: usize, actual: usize },

    /// Placeholders cannot be lowered as function outputs.
    #[snafu(display("tensor `{tensor}` is a placeholder and cannot be an output"))]
    PlaceholderOutput { tensor: String },

    /// Only local buffers can be scoped to a statement.
    #[snafu(display("buffer `{buffer}` is not local and cannot be allocated in a statement"))]
    NotLocalBuffer { buffer: String },

    /// Lowered function has no outputs.
    #[snafu(display("function `{function}` has no outputs"))]
    NoOutputs { function: String },

    /// Symbolic shape unsupported.
    #[snafu(display("symbolic shape is not supported for {operation}: shape dimensions must be concrete values"))]
    SymbolicShapeUnsupported { operation: String },

    // =========================================================================
    // Interpreter
    // =========================================================================
    /// Variable used outside of its binding loop.
    #[snafu(display("unbound variable `{name}`"))]
    UnboundVariable { name: String },

    /// Function argument not supplied.
    #[snafu(display("missing input buffer `{name}`"))]
    MissingInput { name: String },

    /// Supplied input has the wrong length or dtype.
    #[snafu(display("input `{name}` expects {expected} elements of {dtype:?}, got {actual}"))]
    InputSizeMismatch { name: String, dtype: DType, expected: usize, actual: usize },

    /// Index out of bounds.
    #[snafu(display("index {index} out of bounds for buffer `{buffer}` of length {len}"))]
    IndexOutOfBounds { buffer: String, index: i64, len: usize },

    /// Extern function is not registered.
    #[snafu(display("unknown extern function `{name}`"))]
    UnknownExtern { name: String },

    /// Extern function called with the wrong number of arguments.
    #[snafu(display("extern `{name}` takes {expected} arguments, got {actual}"))]
    ExternArityMismatch { name: String, expected: usize, actual: usize },

    /// Division by zero.
    #[snafu(display("division by zero"))]
    DivisionByZero,

    /// Expression could not be evaluated.
    #[snafu(display("cannot evaluate {what}"))]
    EvalFailed { what: String },
}
