//! Extracted array values.
//!
//! A [`NumericArray`] is the output of every dataset read: one contiguous,
//! owned [`ArrayD`] in the dataset's native element type. Ownership transfers
//! to the caller on success only; failed reads drop any partial buffer.

use ndarray::ArrayD;

use crate::data_type::DataType;

/// A numeric array extracted from a container, one variant per lane of the
/// native type table.
#[derive(Clone, Debug, PartialEq, derive_more::From)]
pub enum NumericArray {
    /// Signed 16-bit integers.
    Int16(ArrayD<i16>),
    /// Signed 32-bit integers.
    Int32(ArrayD<i32>),
    /// Signed 64-bit integers.
    Int64(ArrayD<i64>),
    /// Unsigned 16-bit integers.
    UInt16(ArrayD<u16>),
    /// Unsigned 32-bit integers.
    UInt32(ArrayD<u32>),
    /// Unsigned 64-bit integers.
    UInt64(ArrayD<u64>),
    /// IEEE 754 single precision.
    Float32(ArrayD<f32>),
    /// IEEE 754 double precision.
    Float64(ArrayD<f64>),
}

/// Apply `$body` to the inner array of any variant.
macro_rules! with_inner {
    ($self:expr, $array:pat => $body:expr) => {
        match $self {
            NumericArray::Int16($array) => $body,
            NumericArray::Int32($array) => $body,
            NumericArray::Int64($array) => $body,
            NumericArray::UInt16($array) => $body,
            NumericArray::UInt32($array) => $body,
            NumericArray::UInt64($array) => $body,
            NumericArray::Float32($array) => $body,
            NumericArray::Float64($array) => $body,
        }
    };
}

impl NumericArray {
    /// The element type of this array.
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int16(_) => DataType::Int16,
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::UInt16(_) => DataType::UInt16,
            Self::UInt32(_) => DataType::UInt32,
            Self::UInt64(_) => DataType::UInt64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
        }
    }

    /// The ordered shape vector.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        with_inner!(self, array => array.shape())
    }

    /// The rank.
    #[must_use]
    pub fn ndim(&self) -> usize {
        with_inner!(self, array => array.ndim())
    }

    /// The number of elements.
    #[must_use]
    pub fn num_elements(&self) -> usize {
        with_inner!(self, array => array.len())
    }

    /// Returns `true` if the array holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_elements() == 0
    }

    /// Extract the typed array, if `T` is this array's element type.
    #[must_use]
    pub fn into_typed<T: Element>(self) -> Option<ArrayD<T>> {
        T::from_numeric(self)
    }
}

/// An element type with a lane in the native type table.
pub trait Element: Sized {
    /// The table lane of this element type.
    const DATA_TYPE: DataType;

    /// Extract the typed array if `array` holds this element type.
    fn from_numeric(array: NumericArray) -> Option<ArrayD<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident) => {
        impl Element for $ty {
            const DATA_TYPE: DataType = DataType::$variant;

            fn from_numeric(array: NumericArray) -> Option<ArrayD<Self>> {
                match array {
                    NumericArray::$variant(array) => Some(array),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(i16, Int16);
impl_element!(i32, Int32);
impl_element!(i64, Int64);
impl_element!(u16, UInt16);
impl_element!(u32, UInt32);
impl_element!(u64, UInt64);
impl_element!(f32, Float32);
impl_element!(f64, Float64);

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn variant_accessors() {
        let array = NumericArray::from(array![[1.0_f32, 2.0], [3.0, 4.0]].into_dyn());
        assert_eq!(array.data_type(), DataType::Float32);
        assert_eq!(array.shape(), &[2, 2]);
        assert_eq!(array.ndim(), 2);
        assert_eq!(array.num_elements(), 4);
        assert!(!array.is_empty());
    }

    #[test]
    fn typed_extraction_requires_matching_lane() {
        let array = NumericArray::from(array![1_i64, 2, 3].into_dyn());
        assert!(array.clone().into_typed::<f64>().is_none());
        let typed = array.into_typed::<i64>().unwrap();
        assert_eq!(typed.as_slice().unwrap(), &[1, 2, 3]);
    }

    #[test]
    fn element_lanes_match_data_types() {
        assert_eq!(<u16 as Element>::DATA_TYPE, DataType::UInt16);
        assert_eq!(<f64 as Element>::DATA_TYPE, DataType::Float64);
    }
}
