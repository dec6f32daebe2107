use crate::{
    components::{Pixel, PixelType},
    errors::{BandioError, Result},
};

macro_rules! for_each_variant {
    ($value:expr, $data:ident => $body:expr) => {
        match $value {
            Self::UInt8($data) => $body,
            Self::UInt16($data) => $body,
            Self::Int16($data) => $body,
            Self::UInt32($data) => $body,
            Self::Int32($data) => $body,
            Self::Float32($data) => $body,
            Self::Float64($data) => $body,
        }
    };
}

/// Contiguous pixels of one of the supported types.
///
/// Multi-band buffers are band-major, each band row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    Int16(Vec<i16>),
    UInt32(Vec<u32>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl PixelBuffer {
    pub fn new_zeroed(pixel_type: PixelType, len: usize) -> Result<Self> {
        Ok(match pixel_type {
            PixelType::Unknown => {
                return Err(BandioError::UnsupportedType(pixel_type.to_string()))
            }
            PixelType::UInt8 => Self::UInt8(vec![0; len]),
            PixelType::UInt16 => Self::UInt16(vec![0; len]),
            PixelType::Int16 => Self::Int16(vec![0; len]),
            PixelType::UInt32 => Self::UInt32(vec![0; len]),
            PixelType::Int32 => Self::Int32(vec![0; len]),
            PixelType::Float32 => Self::Float32(vec![0.; len]),
            PixelType::Float64 => Self::Float64(vec![0.; len]),
        })
    }

    pub fn from_vec<T: Pixel>(data: Vec<T>) -> Self {
        T::into_buffer(data)
    }

    /// Inner vector, `None` if `T` is not the buffer's element type.
    pub fn into_vec<T: Pixel>(self) -> Option<Vec<T>> {
        T::from_buffer(self)
    }

    pub fn pixel_type(&self) -> PixelType {
        self.as_slice().pixel_type()
    }

    pub fn len(&self) -> usize {
        for_each_variant!(self, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.pixel_type().element_size()
    }

    pub fn as_slice(&self) -> PixelSlice<'_> {
        match self {
            Self::UInt8(data) => PixelSlice::UInt8(data),
            Self::UInt16(data) => PixelSlice::UInt16(data),
            Self::Int16(data) => PixelSlice::Int16(data),
            Self::UInt32(data) => PixelSlice::UInt32(data),
            Self::Int32(data) => PixelSlice::Int32(data),
            Self::Float32(data) => PixelSlice::Float32(data),
            Self::Float64(data) => PixelSlice::Float64(data),
        }
    }

    pub fn as_slice_mut(&mut self) -> PixelSliceMut<'_> {
        match self {
            Self::UInt8(data) => PixelSliceMut::UInt8(data),
            Self::UInt16(data) => PixelSliceMut::UInt16(data),
            Self::Int16(data) => PixelSliceMut::Int16(data),
            Self::UInt32(data) => PixelSliceMut::UInt32(data),
            Self::Int32(data) => PixelSliceMut::Int32(data),
            Self::Float32(data) => PixelSliceMut::Float32(data),
            Self::Float64(data) => PixelSliceMut::Float64(data),
        }
    }

    pub fn to_f64_vec(&self) -> Vec<f64> {
        let slice = self.as_slice();
        (0..slice.len()).map(|idx| slice.get_f64(idx)).collect()
    }
}

impl<T: Pixel> From<Vec<T>> for PixelBuffer {
    fn from(value: Vec<T>) -> Self {
        T::into_buffer(value)
    }
}

/// Borrowed [PixelBuffer].
#[derive(Debug, Clone, Copy)]
pub enum PixelSlice<'a> {
    UInt8(&'a [u8]),
    UInt16(&'a [u16]),
    Int16(&'a [i16]),
    UInt32(&'a [u32]),
    Int32(&'a [i32]),
    Float32(&'a [f32]),
    Float64(&'a [f64]),
}

impl<'a> PixelSlice<'a> {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            Self::UInt8(_) => PixelType::UInt8,
            Self::UInt16(_) => PixelType::UInt16,
            Self::Int16(_) => PixelType::Int16,
            Self::UInt32(_) => PixelType::UInt32,
            Self::Int32(_) => PixelType::Int32,
            Self::Float32(_) => PixelType::Float32,
            Self::Float64(_) => PixelType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        for_each_variant!(self, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_f64(&self, idx: usize) -> f64 {
        for_each_variant!(self, data => data[idx].to_f64())
    }

    /// Sub range of the same type.
    pub fn slice(&self, range: std::ops::Range<usize>) -> PixelSlice<'a> {
        match *self {
            Self::UInt8(data) => Self::UInt8(&data[range]),
            Self::UInt16(data) => Self::UInt16(&data[range]),
            Self::Int16(data) => Self::Int16(&data[range]),
            Self::UInt32(data) => Self::UInt32(&data[range]),
            Self::Int32(data) => Self::Int32(&data[range]),
            Self::Float32(data) => Self::Float32(&data[range]),
            Self::Float64(data) => Self::Float64(&data[range]),
        }
    }
}

/// Mutably borrowed [PixelBuffer].
#[derive(Debug)]
pub enum PixelSliceMut<'a> {
    UInt8(&'a mut [u8]),
    UInt16(&'a mut [u16]),
    Int16(&'a mut [i16]),
    UInt32(&'a mut [u32]),
    Int32(&'a mut [i32]),
    Float32(&'a mut [f32]),
    Float64(&'a mut [f64]),
}

impl<'a> PixelSliceMut<'a> {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            Self::UInt8(_) => PixelType::UInt8,
            Self::UInt16(_) => PixelType::UInt16,
            Self::Int16(_) => PixelType::Int16,
            Self::UInt32(_) => PixelType::UInt32,
            Self::Int32(_) => PixelType::Int32,
            Self::Float32(_) => PixelType::Float32,
            Self::Float64(_) => PixelType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        for_each_variant!(self, data => data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stores `value` with an `as` cast to the element type.
    pub fn set_f64(&mut self, idx: usize, value: f64) {
        for_each_variant!(self, data => data[idx] = Pixel::from_f64(value))
    }

    /// Reborrows a sub range, consuming the outer borrow.
    pub fn into_slice(self, range: std::ops::Range<usize>) -> PixelSliceMut<'a> {
        match self {
            Self::UInt8(data) => Self::UInt8(&mut data[range]),
            Self::UInt16(data) => Self::UInt16(&mut data[range]),
            Self::Int16(data) => Self::Int16(&mut data[range]),
            Self::UInt32(data) => Self::UInt32(&mut data[range]),
            Self::Int32(data) => Self::Int32(&mut data[range]),
            Self::Float32(data) => Self::Float32(&mut data[range]),
            Self::Float64(data) => Self::Float64(&mut data[range]),
        }
    }

    pub fn reborrow(&mut self) -> PixelSliceMut<'_> {
        match self {
            Self::UInt8(data) => PixelSliceMut::UInt8(data),
            Self::UInt16(data) => PixelSliceMut::UInt16(data),
            Self::Int16(data) => PixelSliceMut::Int16(data),
            Self::UInt32(data) => PixelSliceMut::UInt32(data),
            Self::Int32(data) => PixelSliceMut::Int32(data),
            Self::Float32(data) => PixelSliceMut::Float32(data),
            Self::Float64(data) => PixelSliceMut::Float64(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn zeroed_buffers_have_requested_type() {
        for pixel_type in PixelType::SUPPORTED {
            let buffer = PixelBuffer::new_zeroed(pixel_type, 6).unwrap();
            assert_eq!(buffer.pixel_type(), pixel_type);
            assert_eq!(buffer.len(), 6);
            assert_eq!(buffer.byte_len(), 6 * pixel_type.element_size());
        }
        assert!(matches!(
            PixelBuffer::new_zeroed(PixelType::Unknown, 6),
            Err(BandioError::UnsupportedType(_))
        ));
    }

    #[rstest]
    fn into_vec_checks_element_type() {
        let buffer = PixelBuffer::from(vec![1i16, -2, 3]);
        assert_eq!(buffer.clone().into_vec::<u16>(), None);
        assert_eq!(buffer.into_vec::<i16>(), Some(vec![1, -2, 3]));
    }

    #[rstest]
    fn sub_slices_keep_type() {
        let mut buffer = PixelBuffer::from(vec![0u8; 8]);
        {
            let mut tail = buffer.as_slice_mut().into_slice(4..8);
            tail.set_f64(0, 9.7);
            tail.set_f64(3, -1.0);
        }
        assert_eq!(
            buffer.as_slice().slice(4..8).pixel_type(),
            PixelType::UInt8
        );
        assert_eq!(buffer.into_vec::<u8>().unwrap(), vec![0, 0, 0, 0, 9, 0, 0, 0]);
    }
}
