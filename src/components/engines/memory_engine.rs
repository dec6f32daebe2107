//! In process engine keeping every raster in memory.
//!
//! Rasters live in a store shared by the engine and its handles, keyed by
//! path, so a dataset closed and opened again sees what was written.
//! Pixels are kept as `f64` and quantized to the band type on write.
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::debug;

use super::{StorageEngine, StorageHandle};
use crate::{
    buffer::{PixelSlice, PixelSliceMut},
    components::{factory::CreationOptions, NativeTag, OpenMode, PixelType, Window},
    errors::{BandioError, Result},
};

/// Drivers the memory engine pretends to be.
pub const MEMORY_DRIVERS: [&str; 4] = ["MEM", "GTiff", "COG", "PNG"];

type Store = Rc<RefCell<HashMap<PathBuf, Rc<RefCell<MemRaster>>>>>;

#[derive(Debug, Clone)]
struct MemBand {
    pixel_type: PixelType,
    no_data: Option<f64>,
    data: Vec<f64>,
}

#[derive(Debug, Clone)]
struct MemRaster {
    driver: String,
    size: (usize, usize),
    transform: Option<[f64; 6]>,
    projection: Option<String>,
    bands: Vec<MemBand>,
}

impl MemRaster {
    fn band(&self, index: usize) -> Result<&MemBand> {
        index
            .checked_sub(1)
            .and_then(|idx| self.bands.get(idx))
            .ok_or_else(|| BandioError::io(format!("no band {index}")))
    }

    fn band_mut(&mut self, index: usize) -> Result<&mut MemBand> {
        index
            .checked_sub(1)
            .and_then(|idx| self.bands.get_mut(idx))
            .ok_or_else(|| BandioError::io(format!("no band {index}")))
    }

    // Row major offsets of the window pixels.
    fn offsets<'a>(&self, window: &'a Window) -> impl Iterator<Item = usize> + 'a {
        let width = self.size.0;
        let (col0, row0) = (window.col0 as usize, window.row0 as usize);
        let (cols, rows) = window.shape();
        (row0..row0 + rows).flat_map(move |row| (col0..col0 + cols).map(move |col| row * width + col))
    }
}

fn check_driver(driver: &str) -> std::result::Result<(), String> {
    if MEMORY_DRIVERS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(driver))
    {
        Ok(())
    } else {
        Err(format!("unknown driver {driver:?}"))
    }
}

// Same rules gdal applies to NAME=VALUE option lists.
fn check_options(options: &BTreeMap<String, String>) -> std::result::Result<(), String> {
    match options
        .keys()
        .find(|key| key.is_empty() || key.contains(['=', ' ', '\t', '\n']))
    {
        Some(key) => Err(format!("invalid creation option name {key:?}")),
        None => Ok(()),
    }
}

#[derive(Default, Clone)]
pub struct MemEngine {
    store: Store,
}

impl Debug for MemEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemEngine")
            .field("paths", &self.paths())
            .finish()
    }
}

impl MemEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths of every raster in the store.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.store.borrow().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Number of handles currently holding the raster at `path`.
    pub fn open_handles(&self, path: impl AsRef<Path>) -> usize {
        self.store
            .borrow()
            .get(path.as_ref())
            .map_or(0, |raster| Rc::strong_count(raster) - 1)
    }

    fn register(&self, path: &Path, raster: MemRaster) -> Rc<RefCell<MemRaster>> {
        let raster = Rc::new(RefCell::new(raster));
        self.store
            .borrow_mut()
            .insert(path.to_path_buf(), Rc::clone(&raster));
        raster
    }

    fn handle(&self, path: &Path, raster: Rc<RefCell<MemRaster>>, mode: OpenMode) -> MemHandle {
        MemHandle {
            engine: self.clone(),
            path: path.to_path_buf(),
            raster,
            mode,
        }
    }
}

impl StorageEngine for MemEngine {
    type Handle = MemHandle;

    fn open_handle(&self, path: &Path, mode: OpenMode) -> Result<MemHandle> {
        let raster = self
            .store
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| BandioError::OpenError {
                path: path.to_path_buf(),
                reason: "not a recognized raster".to_string(),
                source: None,
            })?;
        Ok(self.handle(path, raster, mode))
    }

    fn create_handle(
        &self,
        path: &Path,
        size: (usize, usize),
        band_count: usize,
        tag: NativeTag,
        options: &CreationOptions,
    ) -> Result<MemHandle> {
        let create_error = |reason: String| BandioError::CreateError {
            path: path.to_path_buf(),
            reason,
            source: None,
        };
        check_driver(&options.driver).map_err(create_error)?;
        check_options(&options.options).map_err(create_error)?;
        let pixel_type = PixelType::from_native(tag);
        if pixel_type == PixelType::Unknown {
            return Err(BandioError::UnsupportedType(format!("native tag {}", tag.0)));
        }
        let band = MemBand {
            pixel_type,
            no_data: None,
            data: vec![0.; size.0 * size.1],
        };
        let raster = MemRaster {
            driver: options.driver.clone(),
            size,
            transform: None,
            projection: None,
            bands: vec![band; band_count],
        };
        debug!("registering {band_count} band {pixel_type} raster at {path:?}");
        Ok(self.handle(path, self.register(path, raster), OpenMode::Update))
    }
}

pub struct MemHandle {
    engine: MemEngine,
    path: PathBuf,
    raster: Rc<RefCell<MemRaster>>,
    mode: OpenMode,
}

impl Debug for MemHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemHandle")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .finish()
    }
}

impl MemHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn writable(&self) -> Result<()> {
        match self.mode {
            OpenMode::Update => Ok(()),
            OpenMode::Read => Err(BandioError::io(format!(
                "{:?} is opened read only",
                self.path
            ))),
        }
    }
}

impl StorageHandle for MemHandle {
    fn raster_size(&self) -> (usize, usize) {
        self.raster.borrow().size
    }

    fn band_count(&self) -> usize {
        self.raster.borrow().bands.len()
    }

    fn driver_name(&self) -> String {
        self.raster.borrow().driver.clone()
    }

    fn geo_transform(&self) -> Option<[f64; 6]> {
        self.raster.borrow().transform
    }

    fn set_geo_transform(&mut self, coefficients: [f64; 6]) -> Result<()> {
        self.writable()?;
        self.raster.borrow_mut().transform = Some(coefficients);
        Ok(())
    }

    fn projection(&self) -> Option<String> {
        self.raster.borrow().projection.clone()
    }

    fn set_projection(&mut self, encoding: &str) -> Result<()> {
        self.writable()?;
        self.raster.borrow_mut().projection = Some(encoding.to_string());
        Ok(())
    }

    fn band_type(&self, band: usize) -> Result<NativeTag> {
        let raster = self.raster.borrow();
        let pixel_type = raster.band(band)?.pixel_type;
        Ok(pixel_type.to_native().unwrap_or(NativeTag::UNKNOWN))
    }

    fn no_data(&self, band: usize) -> Result<Option<f64>> {
        Ok(self.raster.borrow().band(band)?.no_data)
    }

    /// Rasters are kept row by row.
    fn block_size(&self, band: usize) -> Result<(usize, usize)> {
        let raster = self.raster.borrow();
        raster.band(band)?;
        Ok((raster.size.0, 1))
    }

    fn set_no_data(&mut self, band: usize, value: f64) -> Result<()> {
        self.writable()?;
        self.raster.borrow_mut().band_mut(band)?.no_data = Some(value);
        Ok(())
    }

    fn read_window(&self, band: usize, window: &Window, mut out: PixelSliceMut<'_>) -> Result<()> {
        let raster = self.raster.borrow();
        let data = &raster.band(band)?.data;
        for (idx, offset) in raster.offsets(window).enumerate() {
            out.set_f64(idx, data[offset]);
        }
        Ok(())
    }

    fn write_window(&mut self, band: usize, window: &Window, data: PixelSlice<'_>) -> Result<()> {
        self.writable()?;
        let mut raster = self.raster.borrow_mut();
        let offsets: Vec<usize> = raster.offsets(window).collect();
        let band = raster.band_mut(band)?;
        for (idx, offset) in offsets.into_iter().enumerate() {
            band.data[offset] = band.pixel_type.quantize(data.get_f64(idx));
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn create_copy(&self, path: &Path, options: &CreationOptions) -> Result<Self> {
        let create_error = |reason: String| BandioError::CreateError {
            path: path.to_path_buf(),
            reason,
            source: None,
        };
        check_driver(&options.driver).map_err(create_error)?;
        check_options(&options.options).map_err(create_error)?;
        let mut raster = self.raster.borrow().clone();
        raster.driver = options.driver.clone();
        let raster = self.engine.register(path, raster);
        Ok(self.engine.handle(path, raster, OpenMode::Update))
    }

    fn convert_to_image(
        &self,
        path: &Path,
        format: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<()> {
        check_driver(format)
            .and_then(|_| check_options(options))
            .map_err(BandioError::io)?;
        let mut raster = self.raster.borrow().clone();
        if format.eq_ignore_ascii_case("PNG") {
            if let Some(band) = raster
                .bands
                .iter()
                .find(|band| !matches!(band.pixel_type, PixelType::UInt8 | PixelType::UInt16))
            {
                return Err(BandioError::io(format!(
                    "PNG can not hold {} pixels",
                    band.pixel_type
                )));
            }
        }
        raster.driver = format.to_string();
        self.engine.register(path, raster);
        Ok(())
    }
}
