//! The closed set of broadcast-binary primitives.

use strata_ir::BinaryOp;

/// A broadcast-binary operator, named as it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::Display, strum::EnumString, strum::EnumIter, strum::IntoStaticStr, strum::EnumCount)]
#[strum(serialize_all = "snake_case")]
pub enum BinaryPrimitive {
    ElementwiseAdd,
    ElementwiseMul,
    /// Registered under its historical spelling.
    #[strum(serialize = "substract")]
    Subtract,
    Divide,
    FloorDivide,
    Mod,
    FloorMod,
    Max,
    Min,
    Power,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Greater,
    Less,
    Equal,
    NotEqual,
    GreaterEqual,
    LessEqual,
    BitwiseOr,
    BitwiseXor,
    BitwiseAnd,
    LeftShift,
    RightShift,
}

impl BinaryPrimitive {
    /// Element operation applied per output index.
    pub const fn op(self) -> BinaryOp {
        match self {
            Self::ElementwiseAdd => BinaryOp::Add,
            Self::ElementwiseMul => BinaryOp::Mul,
            Self::Subtract => BinaryOp::Sub,
            Self::Divide => BinaryOp::Div,
            Self::FloorDivide => BinaryOp::FloorDiv,
            Self::Mod => BinaryOp::Mod,
            Self::FloorMod => BinaryOp::FloorMod,
            Self::Max => BinaryOp::Max,
            Self::Min => BinaryOp::Min,
            Self::Power => BinaryOp::Pow,
            Self::LogicalAnd => BinaryOp::LogicalAnd,
            Self::LogicalOr => BinaryOp::LogicalOr,
            Self::LogicalXor => BinaryOp::LogicalXor,
            Self::Greater => BinaryOp::Gt,
            Self::Less => BinaryOp::Lt,
            Self::Equal => BinaryOp::Eq,
            Self::NotEqual => BinaryOp::Ne,
            Self::GreaterEqual => BinaryOp::Ge,
            Self::LessEqual => BinaryOp::Le,
            Self::BitwiseOr => BinaryOp::Or,
            Self::BitwiseXor => BinaryOp::Xor,
            Self::BitwiseAnd => BinaryOp::And,
            Self::LeftShift => BinaryOp::Shl,
            Self::RightShift => BinaryOp::Shr,
        }
    }

    /// Comparison and logical primitives produce `Bool` whatever their inputs.
    pub fn yields_bool(self) -> bool {
        self.op().yields_bool()
    }

    /// Bitwise and shift primitives are undefined on floats.
    pub fn rejects_float(self) -> bool {
        self.op().is_bitwise()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}
