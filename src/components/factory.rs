use log::info;
use std::{collections::BTreeMap, path::Path, str::FromStr, sync::Arc};

use crate::{
    components::{
        engines::{memory_engine::MemEngine, StorageEngine},
        Dataset, PixelType,
    },
    crs::{CrsService, WktAuthority},
    errors::{BandioError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    Read,
    Update,
}

impl OpenMode {
    pub fn is_writable(self) -> bool {
        self == OpenMode::Update
    }
}

impl FromStr for OpenMode {
    type Err = BandioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "r" | "read" => Ok(OpenMode::Read),
            "w" | "update" | "r+" => Ok(OpenMode::Update),
            _ => Err(BandioError::InvalidMode(s.to_string())),
        }
    }
}

fn default_driver() -> String {
    "GTiff".to_string()
}

/// Settings for [DatasetFactory::create] and [Dataset::create_copy].
///
/// `options` are handed to the driver as `NAME=VALUE` pairs
/// (e.g. `COMPRESS=DEFLATE`), without any interpretation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CreationOptions {
    pub driver: String,
    /// Applied to every band of a created dataset.
    pub no_data: Option<f64>,
    pub options: BTreeMap<String, String>,
}

impl Default for CreationOptions {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            no_data: None,
            options: BTreeMap::new(),
        }
    }
}

impl CreationOptions {
    /// Default options for driver `name`.
    pub fn driver(name: impl Into<String>) -> Self {
        Self {
            driver: name.into(),
            ..Default::default()
        }
    }

    pub fn with_no_data(mut self, value: f64) -> Self {
        self.no_data = Some(value);
        self
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

/// Opens and creates [Dataset]s on a [StorageEngine].
#[derive(Debug, Clone)]
pub struct DatasetFactory<E: StorageEngine> {
    engine: E,
    crs_service: Arc<dyn CrsService>,
}

#[cfg(feature = "gdal")]
impl DatasetFactory<crate::components::engines::gdal_engine::GdalEngine> {
    pub fn gdal() -> Self {
        Self::new(crate::components::engines::gdal_engine::GdalEngine)
            .with_crs_service(crate::crs::GdalCrs)
    }
}

impl DatasetFactory<MemEngine> {
    pub fn memory() -> Self {
        Self::new(MemEngine::new())
    }
}

impl<E: StorageEngine> DatasetFactory<E> {
    /// Factory resolving crs codes with [WktAuthority].
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            crs_service: Arc::new(WktAuthority),
        }
    }

    pub fn with_crs_service(mut self, service: impl CrsService + 'static) -> Self {
        self.crs_service = Arc::new(service);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// `mode` is one of `r`, `read`, `w`, `update` or `r+`.
    pub fn open(&self, path: impl AsRef<Path>, mode: &str) -> Result<Dataset<E::Handle>> {
        self.open_with_mode(path, mode.parse()?)
    }

    pub fn open_with_mode(
        &self,
        path: impl AsRef<Path>,
        mode: OpenMode,
    ) -> Result<Dataset<E::Handle>> {
        let path = path.as_ref();
        let handle = self.engine.open_handle(path, mode)?;
        let dataset = Dataset::load(handle, path, mode, Arc::clone(&self.crs_service))?;
        info!("opened {dataset:?}");
        Ok(dataset)
    }

    /// Creates a `width` x `height` dataset of `band_count` bands, opened for update.
    pub fn create(
        &self,
        path: impl AsRef<Path>,
        width: usize,
        height: usize,
        band_count: usize,
        pixel_type: PixelType,
        options: &CreationOptions,
    ) -> Result<Dataset<E::Handle>> {
        if width == 0 || height == 0 || band_count == 0 {
            return Err(BandioError::InvalidDimensions {
                width,
                height,
                bands: band_count,
            });
        }
        let tag = pixel_type.to_native()?;
        let path = path.as_ref();
        let handle =
            self.engine
                .create_handle(path, (width, height), band_count, tag, options)?;
        let dataset = Dataset::load(handle, path, OpenMode::Update, Arc::clone(&self.crs_service))?;
        if let Some(value) = options.no_data {
            dataset.set_no_data_all(value)?;
        }
        info!("created {dataset:?}");
        Ok(dataset)
    }
}
