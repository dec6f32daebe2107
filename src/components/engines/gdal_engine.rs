//! Implementations for gdal
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use gdal::{
    cpl::CslStringList,
    errors::GdalError,
    raster::{Buffer, RasterBand as GdalRasterBand},
    Dataset as GdalDataset, DatasetOptions, DriverManager, GdalOpenFlags,
};

use super::{StorageEngine, StorageHandle};
use crate::{
    buffer::{PixelSlice, PixelSliceMut},
    components::{factory::CreationOptions, NativeTag, OpenMode, PixelType, Window},
    errors::{BandioError, Result},
};

fn io_error(context: &str) -> impl Fn(GdalError) -> BandioError + '_ {
    move |err| BandioError::IoError {
        reason: context.to_string(),
        source: Some(Box::new(err)),
    }
}

fn create_error(path: &Path) -> impl Fn(GdalError) -> BandioError + '_ {
    move |err| BandioError::CreateError {
        path: path.to_path_buf(),
        reason: "rejected by the GDAL driver".to_string(),
        source: Some(Box::new(err)),
    }
}

fn csl_options(options: &BTreeMap<String, String>) -> std::result::Result<CslStringList, GdalError> {
    let mut csl = CslStringList::new();
    for (key, value) in options {
        csl.set_name_value(key, value)?;
    }
    Ok(csl)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GdalEngine;

impl StorageEngine for GdalEngine {
    type Handle = GdalHandle;

    fn open_handle(&self, path: &Path, mode: OpenMode) -> Result<GdalHandle> {
        let access = match mode {
            OpenMode::Read => GdalOpenFlags::GDAL_OF_READONLY,
            OpenMode::Update => GdalOpenFlags::GDAL_OF_UPDATE,
        };
        let options = DatasetOptions {
            open_flags: access | GdalOpenFlags::GDAL_OF_RASTER,
            ..Default::default()
        };
        let dataset =
            GdalDataset::open_ex(path, options).map_err(|err| BandioError::OpenError {
                path: path.to_path_buf(),
                reason: "not a recognized raster".to_string(),
                source: Some(Box::new(err)),
            })?;
        Ok(GdalHandle {
            path: path.to_path_buf(),
            dataset,
        })
    }

    fn create_handle(
        &self,
        path: &Path,
        size: (usize, usize),
        band_count: usize,
        tag: NativeTag,
        options: &CreationOptions,
    ) -> Result<GdalHandle> {
        let driver = DriverManager::get_driver_by_name(&options.driver).map_err(create_error(path))?;
        let csl = csl_options(&options.options).map_err(create_error(path))?;
        let (width, height) = size;
        let dataset = match PixelType::from_native(tag) {
            PixelType::UInt8 => driver
                .create_with_band_type_with_options::<u8, _>(path, width, height, band_count, &csl),
            PixelType::UInt16 => driver
                .create_with_band_type_with_options::<u16, _>(path, width, height, band_count, &csl),
            PixelType::Int16 => driver
                .create_with_band_type_with_options::<i16, _>(path, width, height, band_count, &csl),
            PixelType::UInt32 => driver
                .create_with_band_type_with_options::<u32, _>(path, width, height, band_count, &csl),
            PixelType::Int32 => driver
                .create_with_band_type_with_options::<i32, _>(path, width, height, band_count, &csl),
            PixelType::Float32 => driver
                .create_with_band_type_with_options::<f32, _>(path, width, height, band_count, &csl),
            PixelType::Float64 => driver
                .create_with_band_type_with_options::<f64, _>(path, width, height, band_count, &csl),
            PixelType::Unknown => {
                return Err(BandioError::UnsupportedType(format!("native tag {}", tag.0)))
            }
        }
        .map_err(create_error(path))?;
        Ok(GdalHandle {
            path: path.to_path_buf(),
            dataset,
        })
    }
}

#[derive(Debug)]
pub struct GdalHandle {
    path: PathBuf,
    dataset: GdalDataset,
}

impl GdalHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn band(&self, index: usize) -> Result<GdalRasterBand<'_>> {
        self.dataset
            .rasterband(index)
            .map_err(io_error(&format!("band {index} of {:?}", self.path)))
    }
}

impl StorageHandle for GdalHandle {
    fn raster_size(&self) -> (usize, usize) {
        self.dataset.raster_size()
    }

    fn band_count(&self) -> usize {
        self.dataset.raster_count()
    }

    fn driver_name(&self) -> String {
        self.dataset.driver().short_name()
    }

    fn geo_transform(&self) -> Option<[f64; 6]> {
        self.dataset.geo_transform().ok()
    }

    fn set_geo_transform(&mut self, coefficients: [f64; 6]) -> Result<()> {
        self.dataset
            .set_geo_transform(&coefficients)
            .map_err(io_error("set geo transform"))
    }

    fn projection(&self) -> Option<String> {
        let projection = self.dataset.projection();
        (!projection.is_empty()).then_some(projection)
    }

    fn set_projection(&mut self, encoding: &str) -> Result<()> {
        self.dataset
            .set_projection(encoding)
            .map_err(io_error("set projection"))
    }

    fn band_type(&self, band: usize) -> Result<NativeTag> {
        Ok(NativeTag(self.band(band)?.band_type() as u32))
    }

    fn no_data(&self, band: usize) -> Result<Option<f64>> {
        Ok(self.band(band)?.no_data_value())
    }

    fn block_size(&self, band: usize) -> Result<(usize, usize)> {
        Ok(self.band(band)?.block_size())
    }

    fn set_no_data(&mut self, band: usize, value: f64) -> Result<()> {
        let mut rasterband = self.band(band)?;
        rasterband
            .set_no_data_value(Some(value))
            .map_err(io_error("set no data"))
    }

    fn read_window(&self, band: usize, window: &Window, out: PixelSliceMut<'_>) -> Result<()> {
        let rasterband = self.band(band)?;
        let (offset, shape) = (window.offset(), window.shape());
        macro_rules! read_into {
            ($slice:expr) => {
                rasterband.read_into_slice(offset, shape, shape, $slice, None)
            };
        }
        match out {
            PixelSliceMut::UInt8(slice) => read_into!(slice),
            PixelSliceMut::UInt16(slice) => read_into!(slice),
            PixelSliceMut::Int16(slice) => read_into!(slice),
            PixelSliceMut::UInt32(slice) => read_into!(slice),
            PixelSliceMut::Int32(slice) => read_into!(slice),
            PixelSliceMut::Float32(slice) => read_into!(slice),
            PixelSliceMut::Float64(slice) => read_into!(slice),
        }
        .map_err(io_error(&format!("read {window} of band {band}")))
    }

    fn write_window(&mut self, band: usize, window: &Window, data: PixelSlice<'_>) -> Result<()> {
        let mut rasterband = self.band(band)?;
        let (offset, shape) = (window.offset(), window.shape());
        macro_rules! write_from {
            ($slice:expr) => {
                rasterband.write(offset, shape, &mut Buffer::new(shape, $slice.to_vec()))
            };
        }
        match data {
            PixelSlice::UInt8(slice) => write_from!(slice),
            PixelSlice::UInt16(slice) => write_from!(slice),
            PixelSlice::Int16(slice) => write_from!(slice),
            PixelSlice::UInt32(slice) => write_from!(slice),
            PixelSlice::Int32(slice) => write_from!(slice),
            PixelSlice::Float32(slice) => write_from!(slice),
            PixelSlice::Float64(slice) => write_from!(slice),
        }
        .map_err(io_error(&format!("write {window} of band {band}")))
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.dataset.flush_cache()?)
    }

    fn create_copy(&self, path: &Path, options: &CreationOptions) -> Result<Self> {
        let driver = DriverManager::get_driver_by_name(&options.driver).map_err(create_error(path))?;
        let csl = csl_options(&options.options).map_err(create_error(path))?;
        let dataset = self
            .dataset
            .create_copy(&driver, path, &csl)
            .map_err(create_error(path))?;
        Ok(GdalHandle {
            path: path.to_path_buf(),
            dataset,
        })
    }

    fn convert_to_image(
        &self,
        path: &Path,
        format: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<()> {
        let context = format!("convert to {format}");
        let driver = DriverManager::get_driver_by_name(format).map_err(io_error(&context))?;
        let csl = csl_options(options).map_err(io_error(&context))?;
        self.dataset
            .create_copy(&driver, path, &csl)
            .map_err(io_error(&context))?;
        Ok(())
    }
}
