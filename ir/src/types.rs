//! Type definitions for IR operations.
//!
//! Constant values, operation kinds, loop kinds and memory scopes used by
//! [`Expr`](crate::Expr) nodes.

use strata_dtype::DType;

/// Constant value that can be stored in an expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

/// Helper macro to cast to target width and back to storage type (for proper truncation/extension).
macro_rules! cast_via {
    ($v:expr, $target:ty, $storage:ty) => {
        ($v as $target) as $storage
    };
}

#[inline]
fn cast_bool(v: bool, to: DType) -> Option<ConstValue> {
    use DType::*;
    Some(match to {
        Bool => ConstValue::Bool(v),
        Int8 | Int16 | Int32 | Int64 | Index => ConstValue::Int(v as i64),
        UInt8 | UInt16 | UInt32 | UInt64 => ConstValue::UInt(v as u64),
        Float16 | BFloat16 | Float32 | Float64 => ConstValue::Float(v as u8 as f64),
        Void => return None,
    })
}

#[inline]
fn cast_int(v: i64, to: DType) -> Option<ConstValue> {
    use DType::*;
    Some(match to {
        Bool => ConstValue::Bool(v != 0),
        Int8 => ConstValue::Int(cast_via!(v, i8, i64)),
        Int16 => ConstValue::Int(cast_via!(v, i16, i64)),
        Int32 => ConstValue::Int(cast_via!(v, i32, i64)),
        Int64 | Index => ConstValue::Int(v),
        UInt8 => ConstValue::UInt(cast_via!(v, u8, u64)),
        UInt16 => ConstValue::UInt(cast_via!(v, u16, u64)),
        UInt32 => ConstValue::UInt(cast_via!(v, u32, u64)),
        UInt64 => ConstValue::UInt(v as u64),
        Float32 => ConstValue::Float(cast_via!(v, f32, f64)),
        Float16 | BFloat16 | Float64 => ConstValue::Float(v as f64),
        Void => return None,
    })
}

#[inline]
fn cast_uint(v: u64, to: DType) -> Option<ConstValue> {
    use DType::*;
    Some(match to {
        Bool => ConstValue::Bool(v != 0),
        Int8 => ConstValue::Int(cast_via!(v, i8, i64)),
        Int16 => ConstValue::Int(cast_via!(v, i16, i64)),
        Int32 => ConstValue::Int(cast_via!(v, i32, i64)),
        Int64 | Index => ConstValue::Int(v as i64),
        UInt8 => ConstValue::UInt(cast_via!(v, u8, u64)),
        UInt16 => ConstValue::UInt(cast_via!(v, u16, u64)),
        UInt32 => ConstValue::UInt(cast_via!(v, u32, u64)),
        UInt64 => ConstValue::UInt(v),
        Float32 => ConstValue::Float(cast_via!(v, f32, f64)),
        Float16 | BFloat16 | Float64 => ConstValue::Float(v as f64),
        Void => return None,
    })
}

#[inline]
fn cast_float(v: f64, to: DType) -> Option<ConstValue> {
    use DType::*;
    Some(match to {
        Bool => ConstValue::Bool(v != 0.0),
        Int8 => ConstValue::Int(cast_via!(v, i8, i64)),
        Int16 => ConstValue::Int(cast_via!(v, i16, i64)),
        Int32 => ConstValue::Int(cast_via!(v, i32, i64)),
        Int64 | Index => ConstValue::Int(v as i64),
        // Float-to-unsigned: route through i64 first
        UInt8 => ConstValue::UInt(cast_via!(v as i64, u8, u64)),
        UInt16 => ConstValue::UInt(cast_via!(v as i64, u16, u64)),
        UInt32 => ConstValue::UInt(cast_via!(v as i64, u32, u64)),
        UInt64 => ConstValue::UInt((v as i64) as u64),
        Float32 => ConstValue::Float(cast_via!(v, f32, f64)),
        Float16 | BFloat16 | Float64 => ConstValue::Float(v),
        Void => return None,
    })
}

impl ConstValue {
    pub const fn zero(dtype: DType) -> Self {
        use DType::*;
        match dtype {
            Bool => Self::Bool(false),
            Int8 | Int16 | Int32 | Int64 | Index | Void => Self::Int(0),
            UInt8 | UInt16 | UInt32 | UInt64 => Self::UInt(0),
            Float16 | BFloat16 | Float32 | Float64 => Self::Float(0.0),
        }
    }

    pub const fn one(dtype: DType) -> Self {
        use DType::*;
        match dtype {
            Bool => Self::Bool(true),
            Int8 | Int16 | Int32 | Int64 | Index | Void => Self::Int(1),
            UInt8 | UInt16 | UInt32 | UInt64 => Self::UInt(1),
            Float16 | BFloat16 | Float32 | Float64 => Self::Float(1.0),
        }
    }

    /// Largest finite value representable in `dtype`.
    ///
    /// Used as the identity of min-style folds (argmin starts from it).
    pub const fn max_of(dtype: DType) -> Self {
        use DType::*;
        match dtype {
            Bool => Self::Bool(true),
            Int8 => Self::Int(i8::MAX as i64),
            Int16 => Self::Int(i16::MAX as i64),
            Int32 => Self::Int(i32::MAX as i64),
            Int64 | Index | Void => Self::Int(i64::MAX),
            UInt8 => Self::UInt(u8::MAX as u64),
            UInt16 => Self::UInt(u16::MAX as u64),
            UInt32 => Self::UInt(u32::MAX as u64),
            UInt64 => Self::UInt(u64::MAX),
            Float16 => Self::Float(65504.0),
            BFloat16 => Self::Float(3.389_531_389_251_535e38),
            Float32 => Self::Float(f32::MAX as f64),
            Float64 => Self::Float(f64::MAX),
        }
    }

    /// Smallest finite value representable in `dtype`.
    pub const fn min_of(dtype: DType) -> Self {
        use DType::*;
        match dtype {
            Bool => Self::Bool(false),
            Int8 => Self::Int(i8::MIN as i64),
            Int16 => Self::Int(i16::MIN as i64),
            Int32 => Self::Int(i32::MIN as i64),
            Int64 | Index | Void => Self::Int(i64::MIN),
            UInt8 | UInt16 | UInt32 | UInt64 => Self::UInt(0),
            Float16 => Self::Float(-65504.0),
            BFloat16 => Self::Float(-3.389_531_389_251_535e38),
            Float32 => Self::Float(f32::MIN as f64),
            Float64 => Self::Float(f64::MIN),
        }
    }

    /// Cast this constant value to the target dtype.
    ///
    /// Follows C semantics: truncation for narrowing integer casts, truncation
    /// toward zero for float-to-int. `Float32` results are rounded to single
    /// precision. Returns `None` only for `Void`.
    pub fn cast(&self, dtype: DType) -> Option<Self> {
        match *self {
            ConstValue::Bool(v) => cast_bool(v, dtype),
            ConstValue::Int(v) => cast_int(v, dtype),
            ConstValue::UInt(v) => cast_uint(v, dtype),
            ConstValue::Float(v) => cast_float(v, dtype),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            ConstValue::Int(v) => Some(v),
            ConstValue::UInt(v) => i64::try_from(v).ok(),
            ConstValue::Bool(v) => Some(v as i64),
            ConstValue::Float(_) => None,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            ConstValue::Int(v) => v as f64,
            ConstValue::UInt(v) => v as f64,
            ConstValue::Float(v) => v,
            ConstValue::Bool(v) => v as u8 as f64,
        }
    }

    /// C-style truthiness.
    pub fn is_truthy(&self) -> bool {
        match *self {
            ConstValue::Int(v) => v != 0,
            ConstValue::UInt(v) => v != 0,
            ConstValue::Float(v) => v != 0.0,
            ConstValue::Bool(v) => v,
        }
    }
}

impl std::fmt::Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::UInt(v) => write!(f, "{v}u"),
            ConstValue::Float(v) => write!(f, "{v:?}f"),
            ConstValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

/// Unary operation types. All preserve the input dtype except [`UnaryOp::Not`],
/// which yields `Bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation: -x
    Neg,
    /// Logical not: !x
    Not,
    /// Round toward negative infinity (float only).
    Floor,
}

/// Binary operation types.
///
/// Arithmetic and bitwise operations preserve the LHS dtype.
/// Comparison and logical operations always return `Bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    // Arithmetic operations
    Add,
    Sub,
    Mul,
    /// Truncated division for integers, IEEE division for floats.
    Div,
    /// Division rounded toward negative infinity.
    FloorDiv,
    /// C-style remainder: result has the sign of the dividend.
    Mod,
    /// Floored remainder: result has the sign of the divisor.
    FloorMod,
    Max,
    Min,
    Pow,

    // Bitwise operations (int/bool only)
    And,
    Or,
    Xor,
    Shl,
    Shr,

    // Logical operations (any dtype, truthiness)
    LogicalAnd,
    LogicalOr,
    LogicalXor,

    // Comparison operations
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    /// Returns true if this is a comparison operation.
    pub fn is_comparison(self) -> bool {
        matches!(self, Self::Lt | Self::Le | Self::Gt | Self::Ge | Self::Eq | Self::Ne)
    }

    /// Returns true if this is a logical (truthiness) operation.
    pub fn is_logical(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr | Self::LogicalXor)
    }

    /// Returns true if this is a bitwise operation.
    pub fn is_bitwise(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Xor | Self::Shl | Self::Shr)
    }

    /// Returns true if the result is always `Bool`.
    pub fn yields_bool(self) -> bool {
        self.is_comparison() || self.is_logical()
    }

    /// C-like spelling for infix operators; `None` for operations printed as calls.
    pub fn symbol(self) -> Option<&'static str> {
        Some(match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::FloorDiv | Self::FloorMod | Self::Max | Self::Min | Self::Pow | Self::LogicalXor => return None,
        })
    }
}

/// GPU grid/block axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuAxis {
    X,
    Y,
    Z,
}

impl GpuAxis {
    pub const fn suffix(&self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

/// How a loop is executed. Everything except `Serial` is a schedule annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ForKind {
    #[default]
    Serial,
    /// Iterations run on CPU worker threads.
    Parallel,
    /// Iterations map onto SIMD lanes.
    Vectorized(usize),
    /// Body is replicated by the code generator.
    Unrolled,
    /// Bound to `blockIdx.<axis>`.
    GpuBlock(GpuAxis),
    /// Bound to `threadIdx.<axis>`.
    GpuThread(GpuAxis),
}

impl ForKind {
    pub const fn is_gpu_bound(&self) -> bool {
        matches!(self, Self::GpuBlock(_) | Self::GpuThread(_))
    }
}

/// Memory scope of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemScope {
    /// Kernel argument in device memory.
    Global,
    /// Private per-iteration storage (registers/stack), e.g. reduction scratch.
    Local,
}

macro_rules! impl_const_from {
    ($variant:ident as $storage:ty: $($ty:ty),*) => {
        $(impl From<$ty> for ConstValue {
            fn from(value: $ty) -> Self {
                ConstValue::$variant(value as $storage)
            }
        })*
    };
}

impl_const_from!(Int as i64: i8, i16, i32, i64);
impl_const_from!(UInt as u64: u8, u16, u32, u64);
impl_const_from!(Float as f64: f32, f64);

impl From<bool> for ConstValue {
    fn from(value: bool) -> Self {
        ConstValue::Bool(value)
    }
}
