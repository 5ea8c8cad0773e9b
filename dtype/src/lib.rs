//! Element types for tensors and expressions.
//!
//! Every tensor, buffer and expression node carries exactly one [`DType`].
//! Vector and pointer types do not exist at this layer: vectorization is a
//! schedule annotation on loops, and buffers are modeled explicitly by the IR.

pub mod ext;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest_gen;


/// Scalar element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::FromRepr)]
pub enum DType {
    Bool = 0,

    Int8 = 1,
    UInt8 = 2,
    Int16 = 3,
    UInt16 = 4,
    Int32 = 5,
    UInt32 = 6,
    Int64 = 7,
    UInt64 = 8,

    Float16 = 9,
    BFloat16 = 10,
    Float32 = 11,
    Float64 = 12,

    /// Index type for loop variables and buffer offsets.
    Index = 13,

    /// Statements (stores, loops, blocks) carry no value.
    Void = 14,
}

impl DType {
    /// Width of one element in bits.
    pub const fn bits(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 8,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 16,
            Self::Int32 | Self::UInt32 | Self::Float32 => 32,
            Self::Int64 | Self::UInt64 | Self::Float64 => 64,
            Self::Index => 64, // Treat as 64-bit index
            Self::Void => 0,
        }
    }

    /// Storage size of one element in bytes.
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Void => 0,
            _ => self.bits() / 8,
        }
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64)
    }

    pub const fn is_int(&self) -> bool {
        self.is_signed() || self.is_unsigned() || matches!(self, Self::Index)
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }

    /// Check for an IEEE float of exactly `bits` width.
    ///
    /// `BFloat16` is not an IEEE half and never matches `16`.
    pub const fn is_float_of(&self, bits: usize) -> bool {
        match self {
            Self::Float16 => bits == 16,
            Self::Float32 => bits == 32,
            Self::Float64 => bits == 64,
            _ => false,
        }
    }

    /// Short type name used in extern function suffixes and debug output.
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "i8",
            Self::Int16 => "i16",
            Self::Int32 => "i32",
            Self::Int64 => "i64",
            Self::UInt8 => "u8",
            Self::UInt16 => "u16",
            Self::UInt32 => "u32",
            Self::UInt64 => "u64",
            Self::Float16 => "fp16",
            Self::BFloat16 => "bf16",
            Self::Float32 => "fp32",
            Self::Float64 => "fp64",
            Self::Index => "idx",
            Self::Void => "void",
        }
    }

    pub const fn c_style(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int8 => "int8_t",
            Self::Int16 => "int16_t",
            Self::Int32 => "int32_t",
            Self::Int64 => "int64_t",
            Self::UInt8 => "uint8_t",
            Self::UInt16 => "uint16_t",
            Self::UInt32 => "uint32_t",
            Self::UInt64 => "uint64_t",
            Self::Float16 => "float16",
            Self::BFloat16 => "bfloat16",
            Self::Float32 => "float",
            Self::Float64 => "double",
            Self::Index => "int64_t",
            Self::Void => "void",
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.short_name())
    }
}
