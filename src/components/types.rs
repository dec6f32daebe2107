use num::traits::AsPrimitive;
use std::{fmt::Debug, str::FromStr};

use crate::{
    buffer::{PixelBuffer, PixelSlice, PixelSliceMut},
    errors::{BandioError, Result},
};

/// Tag a storage engine uses for the pixel type of a band.
///
/// Values follow `GDALDataType` ordinals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeTag(pub u32);

impl NativeTag {
    pub const UNKNOWN: NativeTag = NativeTag(0);
    pub const BYTE: NativeTag = NativeTag(1);
    pub const UINT16: NativeTag = NativeTag(2);
    pub const INT16: NativeTag = NativeTag(3);
    pub const UINT32: NativeTag = NativeTag(4);
    pub const INT32: NativeTag = NativeTag(5);
    pub const FLOAT32: NativeTag = NativeTag(6);
    pub const FLOAT64: NativeTag = NativeTag(7);
}

/// Pixel types a band can be read or written as.
///
/// `Unknown` is what [PixelType::from_native] yields for tags outside
/// the supported set, it can never be used for I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelType {
    Unknown,
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl PixelType {
    pub const SUPPORTED: [PixelType; 7] = [
        PixelType::UInt8,
        PixelType::UInt16,
        PixelType::Int16,
        PixelType::UInt32,
        PixelType::Int32,
        PixelType::Float32,
        PixelType::Float64,
    ];

    pub fn to_native(self) -> Result<NativeTag> {
        match self {
            PixelType::Unknown => Err(BandioError::UnsupportedType(self.to_string())),
            PixelType::UInt8 => Ok(NativeTag::BYTE),
            PixelType::UInt16 => Ok(NativeTag::UINT16),
            PixelType::Int16 => Ok(NativeTag::INT16),
            PixelType::UInt32 => Ok(NativeTag::UINT32),
            PixelType::Int32 => Ok(NativeTag::INT32),
            PixelType::Float32 => Ok(NativeTag::FLOAT32),
            PixelType::Float64 => Ok(NativeTag::FLOAT64),
        }
    }

    pub fn from_native(tag: NativeTag) -> PixelType {
        match tag {
            NativeTag::BYTE => PixelType::UInt8,
            NativeTag::UINT16 => PixelType::UInt16,
            NativeTag::INT16 => PixelType::Int16,
            NativeTag::UINT32 => PixelType::UInt32,
            NativeTag::INT32 => PixelType::Int32,
            NativeTag::FLOAT32 => PixelType::Float32,
            NativeTag::FLOAT64 => PixelType::Float64,
            _ => PixelType::Unknown,
        }
    }

    /// Bytes per element, 0 for `Unknown`.
    pub fn element_size(self) -> usize {
        match self {
            PixelType::Unknown => 0,
            PixelType::UInt8 => 1,
            PixelType::UInt16 | PixelType::Int16 => 2,
            PixelType::UInt32 | PixelType::Int32 | PixelType::Float32 => 4,
            PixelType::Float64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(
            self,
            PixelType::Unknown | PixelType::Float32 | PixelType::Float64
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            PixelType::Unknown => "unknown",
            PixelType::UInt8 => "uint8",
            PixelType::UInt16 => "uint16",
            PixelType::Int16 => "int16",
            PixelType::UInt32 => "uint32",
            PixelType::Int32 => "int32",
            PixelType::Float32 => "float32",
            PixelType::Float64 => "float64",
        }
    }

    /// Value as it would come back after being stored with this type.
    pub fn quantize(self, value: f64) -> f64 {
        match self {
            PixelType::Unknown | PixelType::Float64 => value,
            PixelType::UInt8 => u8::from_f64(value).to_f64(),
            PixelType::UInt16 => u16::from_f64(value).to_f64(),
            PixelType::Int16 => i16::from_f64(value).to_f64(),
            PixelType::UInt32 => u32::from_f64(value).to_f64(),
            PixelType::Int32 => i32::from_f64(value).to_f64(),
            PixelType::Float32 => f32::from_f64(value).to_f64(),
        }
    }
}

impl std::fmt::Display for PixelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PixelType {
    type Err = BandioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "uint8" | "byte" | "u8" => Ok(PixelType::UInt8),
            "uint16" | "u16" => Ok(PixelType::UInt16),
            "int16" | "i16" => Ok(PixelType::Int16),
            "uint32" | "u32" => Ok(PixelType::UInt32),
            "int32" | "i32" => Ok(PixelType::Int32),
            "float32" | "f32" => Ok(PixelType::Float32),
            "float64" | "f64" => Ok(PixelType::Float64),
            _ => Err(BandioError::UnsupportedType(s.to_string())),
        }
    }
}

/// Rust element type of a pixel buffer.
///
/// Implemented for the seven supported types only, which ties every
/// typed read or write to exactly one [PixelType].
pub trait Pixel: Copy + Default + PartialEq + Debug + Send + Sync + 'static {
    const PIXEL_TYPE: PixelType;

    fn into_buffer(data: Vec<Self>) -> PixelBuffer;
    fn from_buffer(buffer: PixelBuffer) -> Option<Vec<Self>>;
    fn as_pixel_slice(data: &[Self]) -> PixelSlice<'_>;
    fn as_pixel_slice_mut(data: &mut [Self]) -> PixelSliceMut<'_>;

    /// `as` cast: floats truncate toward zero and saturate at the type bounds.
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

macro_rules! impl_pixel {
    ($t:ty, $variant:ident) => {
        impl Pixel for $t {
            const PIXEL_TYPE: PixelType = PixelType::$variant;

            fn into_buffer(data: Vec<Self>) -> PixelBuffer {
                PixelBuffer::$variant(data)
            }

            fn from_buffer(buffer: PixelBuffer) -> Option<Vec<Self>> {
                match buffer {
                    PixelBuffer::$variant(data) => Some(data),
                    _ => None,
                }
            }

            fn as_pixel_slice(data: &[Self]) -> PixelSlice<'_> {
                PixelSlice::$variant(data)
            }

            fn as_pixel_slice_mut(data: &mut [Self]) -> PixelSliceMut<'_> {
                PixelSliceMut::$variant(data)
            }

            fn from_f64(value: f64) -> Self {
                AsPrimitive::<$t>::as_(value)
            }

            fn to_f64(self) -> f64 {
                AsPrimitive::<f64>::as_(self)
            }
        }
    };
}

impl_pixel!(u8, UInt8);
impl_pixel!(u16, UInt16);
impl_pixel!(i16, Int16);
impl_pixel!(u32, UInt32);
impl_pixel!(i32, Int32);
impl_pixel!(f32, Float32);
impl_pixel!(f64, Float64);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn native_tags_round_trip() {
        for pixel_type in PixelType::SUPPORTED {
            let tag = pixel_type.to_native().unwrap();
            assert_eq!(PixelType::from_native(tag), pixel_type);
        }
    }

    #[rstest]
    fn unknown_is_not_a_native_type() {
        assert!(matches!(
            PixelType::Unknown.to_native(),
            Err(BandioError::UnsupportedType(_))
        ));
        // complex types and anything newer than float64 collapse to unknown
        assert_eq!(PixelType::from_native(NativeTag(10)), PixelType::Unknown);
        assert_eq!(PixelType::from_native(NativeTag::UNKNOWN), PixelType::Unknown);
    }

    #[rstest]
    #[case(PixelType::UInt8, 1)]
    #[case(PixelType::UInt16, 2)]
    #[case(PixelType::Int16, 2)]
    #[case(PixelType::UInt32, 4)]
    #[case(PixelType::Int32, 4)]
    #[case(PixelType::Float32, 4)]
    #[case(PixelType::Float64, 8)]
    #[case(PixelType::Unknown, 0)]
    fn element_sizes(#[case] pixel_type: PixelType, #[case] size: usize) {
        assert_eq!(pixel_type.element_size(), size);
    }

    #[rstest]
    #[case("uint8", PixelType::UInt8)]
    #[case("Byte", PixelType::UInt8)]
    #[case("int16", PixelType::Int16)]
    #[case("FLOAT32", PixelType::Float32)]
    #[case("f64", PixelType::Float64)]
    fn parses_names(#[case] name: &str, #[case] expected: PixelType) {
        assert_eq!(name.parse::<PixelType>().unwrap(), expected);
    }

    #[rstest]
    #[case("complex64")]
    #[case("unknown")]
    #[case("")]
    fn rejects_unsupported_names(#[case] name: &str) {
        assert!(matches!(
            name.parse::<PixelType>(),
            Err(BandioError::UnsupportedType(_))
        ));
    }

    #[rstest]
    fn float_to_integer_truncates_toward_zero() {
        assert_eq!(i16::from_f64(-2.9), -2);
        assert_eq!(u8::from_f64(2.9), 2);
        assert_eq!(u8::from_f64(300.0), 255);
        assert_eq!(u16::from_f64(-1.0), 0);
        assert_eq!(PixelType::Int32.quantize(7.75), 7.0);
        assert_eq!(PixelType::Float64.quantize(7.75), 7.75);
    }

    #[rstest]
    fn serde_uses_canonical_names() {
        let json = serde_json::to_string(&PixelType::Float32).unwrap();
        assert_eq!(json, "\"float32\"");
        let parsed: PixelType = serde_json::from_str("\"uint16\"").unwrap();
        assert_eq!(parsed, PixelType::UInt16);
    }
}
