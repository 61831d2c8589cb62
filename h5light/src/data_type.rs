//! The native data type table.
//!
//! A stored dataset's native scalar type is mapped to exactly one output
//! element type, or refused. There is no default lane: a native type without
//! a table entry is an [`UnsupportedDataTypeError`], so a successful read is
//! always bit-identical to the stored values.

use hdf5::types::{FloatSize, IntSize, TypeDescriptor};
use thiserror::Error;

/// The element type of an extracted array.
///
/// One variant per output lane of the native type table. 8-bit integer,
/// extended-precision, and non-numeric native types have no lane and are
/// reported as unsupported.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, derive_more::Display)]
pub enum DataType {
    /// Signed 16-bit integers.
    #[display("int16")]
    Int16,
    /// Signed 32-bit integers.
    #[display("int32")]
    Int32,
    /// Signed 64-bit integers.
    #[display("int64")]
    Int64,
    /// Unsigned 16-bit integers.
    #[display("uint16")]
    UInt16,
    /// Unsigned 32-bit integers.
    #[display("uint32")]
    UInt32,
    /// Unsigned 64-bit integers.
    #[display("uint64")]
    UInt64,
    /// IEEE 754 single precision.
    #[display("float32")]
    Float32,
    /// IEEE 754 double precision.
    #[display("float64")]
    Float64,
}

impl DataType {
    /// Map a native stored type to its output lane.
    ///
    /// At most one lane matches a given descriptor; zero matches is an
    /// error, never a default.
    ///
    /// # Errors
    /// Returns [`UnsupportedDataTypeError`] if the descriptor has no entry
    /// in the table.
    pub fn from_descriptor(descriptor: &TypeDescriptor) -> Result<Self, UnsupportedDataTypeError> {
        match descriptor {
            TypeDescriptor::Integer(IntSize::U2) => Ok(Self::Int16),
            TypeDescriptor::Integer(IntSize::U4) => Ok(Self::Int32),
            TypeDescriptor::Integer(IntSize::U8) => Ok(Self::Int64),
            TypeDescriptor::Unsigned(IntSize::U2) => Ok(Self::UInt16),
            TypeDescriptor::Unsigned(IntSize::U4) => Ok(Self::UInt32),
            TypeDescriptor::Unsigned(IntSize::U8) => Ok(Self::UInt64),
            TypeDescriptor::Float(FloatSize::U4) => Ok(Self::Float32),
            TypeDescriptor::Float(FloatSize::U8) => Ok(Self::Float64),
            other => Err(UnsupportedDataTypeError::no_table_entry(other)),
        }
    }

    /// The size of one element in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Int64 | Self::UInt64 | Self::Float64 => 8,
        }
    }
}

/// A native type with no entry in the output type table.
#[derive(Clone, Debug, Error)]
#[error("unrecognized native datatype: {reason}")]
pub struct UnsupportedDataTypeError {
    reason: String,
}

impl UnsupportedDataTypeError {
    pub(crate) fn no_table_entry(descriptor: &TypeDescriptor) -> Self {
        Self {
            reason: format!("{descriptor:?} has no output mapping; use a more advanced reader"),
        }
    }

    pub(crate) fn no_kernel(data_type: DataType) -> Self {
        Self {
            reason: format!("{data_type} particle coordinates have no classification kernel"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_maps_every_supported_lane() {
        for (descriptor, data_type) in [
            (TypeDescriptor::Integer(IntSize::U2), DataType::Int16),
            (TypeDescriptor::Integer(IntSize::U4), DataType::Int32),
            (TypeDescriptor::Integer(IntSize::U8), DataType::Int64),
            (TypeDescriptor::Unsigned(IntSize::U2), DataType::UInt16),
            (TypeDescriptor::Unsigned(IntSize::U4), DataType::UInt32),
            (TypeDescriptor::Unsigned(IntSize::U8), DataType::UInt64),
            (TypeDescriptor::Float(FloatSize::U4), DataType::Float32),
            (TypeDescriptor::Float(FloatSize::U8), DataType::Float64),
        ] {
            assert_eq!(DataType::from_descriptor(&descriptor).unwrap(), data_type);
        }
    }

    #[test]
    fn unmapped_native_types_are_refused() {
        for descriptor in [
            TypeDescriptor::Integer(IntSize::U1),
            TypeDescriptor::Unsigned(IntSize::U1),
            TypeDescriptor::Boolean,
            TypeDescriptor::VarLenUnicode,
            TypeDescriptor::FixedAscii(8),
        ] {
            assert!(DataType::from_descriptor(&descriptor).is_err());
        }
    }

    #[test]
    fn element_sizes() {
        assert_eq!(DataType::Int16.size(), 2);
        assert_eq!(DataType::UInt32.size(), 4);
        assert_eq!(DataType::Float64.size(), 8);
    }

    #[test]
    fn display_names() {
        assert_eq!(DataType::Float32.to_string(), "float32");
        assert_eq!(DataType::UInt64.to_string(), "uint64");
    }
}
