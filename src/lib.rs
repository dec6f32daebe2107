//! Windowed reads and writes of multi-band rasters.
//!
//! A [DatasetFactory] opens or creates a [Dataset] on a storage engine,
//! GDAL by default or the in-memory engine. Pixels move between a
//! rectangular [Window] of one or more bands and typed buffers, either
//! plain `Vec<T>` for any [Pixel] type or a [PixelBuffer] chosen at runtime.
//!
//! ```no_run
//! # #[cfg(feature = "gdal")]
//! # fn main() -> bandio::Result<()> {
//! use bandio::{CreationOptions, PixelType, Window};
//!
//! let mut dataset = bandio::create("out.tif", 256, 256, 3, PixelType::UInt8, &CreationOptions::default())?;
//! dataset.set_transform([500_000., 10., 0., 4_600_000., 0., -10.])?;
//! dataset.set_crs("EPSG:32633")?;
//! let window = Window::new((0, 128), (0, 128));
//! dataset.write_bands(&vec![1u8; 3 * window.len()], &[1, 2, 3], &window)?;
//! let rgb: Vec<u8> = dataset.read_bands(&[3, 2, 1], &window)?;
//! dataset.close()?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "gdal"))]
//! # fn main() {}
//! ```

pub mod buffer;
pub mod components;
pub mod crs;
mod errors;

pub use buffer::PixelBuffer;
pub use components::{
    engines::{
        memory_engine::{MemEngine, MemHandle},
        StorageEngine, StorageHandle,
    },
    Bounds, CreationOptions, Dataset, DatasetFactory, GeoMetadata, GeoTransform, NativeTag,
    OpenMode, Pixel, PixelType, RasterBand, Window,
};
pub use crs::{CrsService, WktAuthority};
pub use errors::{BandioError, EngineError, Result};

#[cfg(feature = "gdal")]
pub use components::engines::gdal_engine::{GdalEngine, GdalHandle};

use num::traits::AsPrimitive;
#[cfg(feature = "gdal")]
use std::path::Path;

fn tuple_to<TO: Copy + 'static, TI: AsPrimitive<TO>>(tuple: (TI, TI)) -> (TO, TO) {
    (tuple.0.as_(), tuple.1.as_())
}

/// Opens `path` with GDAL, `mode` being one of `r`, `read`, `w`, `update` or `r+`.
#[cfg(feature = "gdal")]
pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Dataset<GdalHandle>> {
    DatasetFactory::gdal().open(path, mode)
}

/// Creates a dataset with GDAL, see [DatasetFactory::create].
#[cfg(feature = "gdal")]
pub fn create(
    path: impl AsRef<Path>,
    width: usize,
    height: usize,
    band_count: usize,
    pixel_type: PixelType,
    options: &CreationOptions,
) -> Result<Dataset<GdalHandle>> {
    DatasetFactory::gdal().create(path, width, height, band_count, pixel_type, options)
}
