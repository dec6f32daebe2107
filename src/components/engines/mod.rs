//! Storage engines: the codecs and drivers that hold the pixels.
//!
//! A [StorageEngine] opens or creates [StorageHandle]s. A handle is the
//! single owner of the underlying file, dropping it releases the file.

#[cfg(feature = "gdal")]
pub mod gdal_engine;
pub mod memory_engine;

use std::{collections::BTreeMap, fmt::Debug, path::Path};

use crate::{
    buffer::{PixelSlice, PixelSliceMut},
    components::{factory::CreationOptions, NativeTag, OpenMode, Window},
    errors::Result,
};

pub trait StorageEngine: Debug {
    type Handle: StorageHandle;

    fn open_handle(&self, path: &Path, mode: OpenMode) -> Result<Self::Handle>;

    fn create_handle(
        &self,
        path: &Path,
        size: (usize, usize),
        band_count: usize,
        tag: NativeTag,
        options: &CreationOptions,
    ) -> Result<Self::Handle>;
}

/// Open dataset of a [StorageEngine].
///
/// Band indexes are 1-based and windows are already validated against
/// the raster size by the caller.
pub trait StorageHandle: Debug + Sized {
    /// (width, height)
    fn raster_size(&self) -> (usize, usize);
    fn band_count(&self) -> usize;
    fn driver_name(&self) -> String;

    /// `None` if the dataset carries no geo transform.
    fn geo_transform(&self) -> Option<[f64; 6]>;
    fn set_geo_transform(&mut self, coefficients: [f64; 6]) -> Result<()>;
    fn projection(&self) -> Option<String>;
    fn set_projection(&mut self, encoding: &str) -> Result<()>;

    fn band_type(&self, band: usize) -> Result<NativeTag>;
    fn no_data(&self, band: usize) -> Result<Option<f64>>;
    /// Natural (width, height) block of the band, the unit storage reads and writes in.
    fn block_size(&self, band: usize) -> Result<(usize, usize)>;
    fn set_no_data(&mut self, band: usize, value: f64) -> Result<()>;

    /// Reads `window` of `band` into `out`, casting to the type of `out`.
    /// `out` holds exactly `window.len()` elements.
    fn read_window(&self, band: usize, window: &Window, out: PixelSliceMut<'_>) -> Result<()>;
    /// Writes `data`, exactly `window.len()` elements, into `window` of `band`.
    fn write_window(&mut self, band: usize, window: &Window, data: PixelSlice<'_>) -> Result<()>;
    fn flush(&mut self) -> Result<()>;

    /// Copies structure, geocoding and pixels into a new dataset at `path`.
    fn create_copy(&self, path: &Path, options: &CreationOptions) -> Result<Self>;
    /// One shot transcode into `format`, nothing is kept open.
    fn convert_to_image(
        &self,
        path: &Path,
        format: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<()>;
}
