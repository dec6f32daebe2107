use itertools::Itertools;
use log::{debug, info, warn};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt::Debug,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    buffer::{PixelBuffer, PixelSlice, PixelSliceMut},
    components::{
        engines::StorageHandle,
        metadata::{Bounds, GeoMetadata, GeoTransform},
        CreationOptions, OpenMode, Pixel, PixelType, RasterBand, Window,
    },
    crs::CrsService,
    errors::{BandioError, Result},
};

/// An open raster: a grid of `width` x `height` pixels in `band_count` bands.
///
/// The dataset owns its storage handle. The handle is released by
/// [Dataset::close], or when the dataset is dropped. Once closed, every
/// operation that touches storage fails with [BandioError::DatasetClosed],
/// while the metadata loaded at open stays readable.
pub struct Dataset<H: StorageHandle> {
    handle: RefCell<Option<H>>,
    path: PathBuf,
    mode: OpenMode,
    driver: String,
    band_count: usize,
    /// Type of band 1
    pixel_type: PixelType,
    /// No data of every band, band 1 first
    no_data: RefCell<Vec<Option<f64>>>,
    geo: GeoMetadata,
    crs_service: Arc<dyn CrsService>,
}

impl<H: StorageHandle> Debug for Dataset<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("path", &self.path)
            .field("driver", &self.driver)
            .field("size", &self.size())
            .field("band_count", &self.band_count)
            .field("pixel_type", &self.pixel_type)
            .field("mode", &self.mode)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl<H: StorageHandle> Dataset<H> {
    pub(crate) fn load(
        handle: H,
        path: &Path,
        mode: OpenMode,
        crs_service: Arc<dyn CrsService>,
    ) -> Result<Self> {
        let size = handle.raster_size();
        let band_count = handle.band_count();
        let pixel_type = if band_count > 0 {
            PixelType::from_native(handle.band_type(1)?)
        } else {
            PixelType::Unknown
        };
        let no_data = (1..=band_count)
            .map(|band| handle.no_data(band))
            .collect::<Result<Vec<_>>>()?;
        let transform = handle
            .geo_transform()
            .map(GeoTransform::from)
            .unwrap_or_default();
        let geo = GeoMetadata::new(transform, handle.projection(), size);
        Ok(Self {
            driver: handle.driver_name(),
            handle: RefCell::new(Some(handle)),
            path: path.to_path_buf(),
            mode,
            band_count,
            pixel_type,
            no_data: RefCell::new(no_data),
            geo,
            crs_service,
        })
    }

    fn with_handle<R>(&self, f: impl FnOnce(&H) -> Result<R>) -> Result<R> {
        let handle = self.handle.borrow();
        f(handle.as_ref().ok_or(BandioError::DatasetClosed)?)
    }

    fn with_handle_mut<R>(&self, f: impl FnOnce(&mut H) -> Result<R>) -> Result<R> {
        let mut handle = self.handle.borrow_mut();
        f(handle.as_mut().ok_or(BandioError::DatasetClosed)?)
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(BandioError::DatasetClosed);
        }
        Ok(())
    }

    pub(crate) fn check_writable(&self) -> Result<()> {
        self.check_open()?;
        if !self.mode.is_writable() {
            return Err(BandioError::NotWritable);
        }
        Ok(())
    }

    pub(crate) fn check_window(&self, window: &Window) -> Result<()> {
        self.check_open()?;
        window.validate(self.width(), self.height())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index == 0 || index > self.band_count {
            return Err(BandioError::InvalidBandIndex {
                index,
                band_count: self.band_count,
            });
        }
        Ok(())
    }

    fn check_indexes(&self, indexes: &[usize]) -> Result<()> {
        indexes
            .iter()
            .try_for_each(|&index| self.check_index(index))
    }

    pub(crate) fn read_band_window(
        &self,
        index: usize,
        window: &Window,
        out: PixelSliceMut<'_>,
    ) -> Result<()> {
        debug!("reading {window} of band {index} as {}", out.pixel_type());
        self.with_handle(|handle| handle.read_window(index, window, out))
    }

    pub(crate) fn write_band_window(
        &self,
        index: usize,
        window: &Window,
        data: PixelSlice<'_>,
    ) -> Result<()> {
        debug!("writing {} {window} of band {index}", data.pixel_type());
        self.with_handle_mut(|handle| handle.write_window(index, window, data))
    }

    pub(crate) fn band_no_data(&self, index: usize) -> Option<f64> {
        let no_data = self.no_data.borrow();
        index.checked_sub(1).and_then(|idx| no_data.get(idx).copied().flatten())
    }

    pub(crate) fn band_block_size(&self, index: usize) -> Result<(usize, usize)> {
        self.check_open()?;
        self.check_index(index)?;
        self.with_handle(|handle| handle.block_size(index))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Short name of the driver holding the dataset, e.g. `GTiff`.
    pub fn driver(&self) -> &str {
        &self.driver
    }

    pub fn width(&self) -> usize {
        self.geo.size().0
    }

    pub fn height(&self) -> usize {
        self.geo.size().1
    }

    /// (width, height)
    pub fn size(&self) -> (usize, usize) {
        self.geo.size()
    }

    pub fn band_count(&self) -> usize {
        self.band_count
    }

    /// Stored type of band 1.
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// No data value of band 1.
    pub fn no_data(&self) -> Option<f64> {
        self.band_no_data(1)
    }

    pub fn geo_metadata(&self) -> &GeoMetadata {
        &self.geo
    }

    pub fn transform(&self) -> &GeoTransform {
        self.geo.transform()
    }

    pub fn crs(&self) -> Option<&str> {
        self.geo.crs()
    }

    pub fn bounds(&self) -> Bounds {
        self.geo.bounds()
    }

    pub fn epsg_code(&self) -> Result<i32> {
        self.geo.epsg_code(self.crs_service.as_ref())
    }

    pub fn is_closed(&self) -> bool {
        self.handle.borrow().is_none()
    }

    /// Band `index`, 1-based.
    pub fn get_band(&self, index: usize) -> Result<RasterBand<'_, H>> {
        self.check_open()?;
        self.check_index(index)?;
        let tag = self.with_handle(|handle| handle.band_type(index))?;
        Ok(RasterBand::new(self, index, PixelType::from_native(tag)))
    }

    fn read_stack(&self, indexes: &[usize], window: &Window, mut out: PixelSliceMut<'_>) -> Result<()> {
        let band_len = window.len();
        debug!(
            "reading {window} of bands [{}]",
            indexes.iter().join(", ")
        );
        for (position, &index) in indexes.iter().enumerate() {
            let chunk = out
                .reborrow()
                .into_slice(position * band_len..(position + 1) * band_len);
            self.read_band_window(index, window, chunk)?;
        }
        Ok(())
    }

    /// Reads `window` of each band in `indexes`, in that order.
    ///
    /// The result is band-major: `indexes.len()` consecutive row-major
    /// windows. Indexes may repeat.
    pub fn read_bands<T: Pixel>(&self, indexes: &[usize], window: &Window) -> Result<Vec<T>> {
        self.check_window(window)?;
        self.check_indexes(indexes)?;
        let mut data = vec![T::default(); window.len() * indexes.len()];
        self.read_stack(indexes, window, T::as_pixel_slice_mut(&mut data))?;
        Ok(data)
    }

    /// [Dataset::read_bands] into a buffer of `pixel_type`.
    pub fn read_bands_as(
        &self,
        indexes: &[usize],
        window: &Window,
        pixel_type: PixelType,
    ) -> Result<PixelBuffer> {
        self.check_window(window)?;
        self.check_indexes(indexes)?;
        let mut buffer = PixelBuffer::new_zeroed(pixel_type, window.len() * indexes.len())?;
        self.read_stack(indexes, window, buffer.as_slice_mut())?;
        Ok(buffer)
    }

    fn write_stack(&self, data: PixelSlice<'_>, indexes: &[usize], window: &Window) -> Result<()> {
        self.check_writable()?;
        self.check_window(window)?;
        self.check_indexes(indexes)?;
        let band_len = window.len();
        let expected = band_len * indexes.len();
        if data.len() != expected {
            return Err(BandioError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        debug!(
            "writing {window} of bands [{}]",
            indexes.iter().join(", ")
        );
        for (position, &index) in indexes.iter().enumerate() {
            let chunk = data.slice(position * band_len..(position + 1) * band_len);
            self.write_band_window(index, window, chunk)?;
        }
        Ok(())
    }

    /// Writes band-major `data` into `window` of each band in `indexes`.
    ///
    /// `data` must hold exactly one window per index. Nothing is written
    /// unless all indexes and the window are valid.
    pub fn write_bands<T: Pixel>(&self, data: &[T], indexes: &[usize], window: &Window) -> Result<()> {
        self.write_stack(T::as_pixel_slice(data), indexes, window)
    }

    pub fn write_bands_buffer(
        &self,
        data: &PixelBuffer,
        indexes: &[usize],
        window: &Window,
    ) -> Result<()> {
        self.write_stack(data.as_slice(), indexes, window)
    }

    pub fn set_transform(&mut self, coefficients: [f64; 6]) -> Result<()> {
        self.check_writable()?;
        let transform = GeoTransform::new(coefficients)?;
        self.with_handle_mut(|handle| handle.set_geo_transform(*transform))?;
        self.geo.set_transform(coefficients)
    }

    /// Stored as given, the encoding is not validated.
    pub fn set_crs(&mut self, encoding: &str) -> Result<()> {
        self.check_writable()?;
        self.with_handle_mut(|handle| handle.set_projection(encoding))?;
        self.geo.set_crs(encoding);
        Ok(())
    }

    /// Sets the no data value of band 1.
    pub fn set_no_data(&self, value: f64) -> Result<()> {
        self.set_band_no_data(1, value)
    }

    pub fn set_band_no_data(&self, index: usize, value: f64) -> Result<()> {
        self.check_writable()?;
        self.check_index(index)?;
        self.with_handle_mut(|handle| handle.set_no_data(index, value))?;
        self.no_data.borrow_mut()[index - 1] = Some(value);
        Ok(())
    }

    /// Sets the no data value of every band.
    pub fn set_no_data_all(&self, value: f64) -> Result<()> {
        self.check_writable()?;
        (1..=self.band_count).try_for_each(|index| self.set_band_no_data(index, value))
    }

    /// Pushes pending writes down to storage.
    pub fn flush(&self) -> Result<()> {
        self.with_handle_mut(|handle| handle.flush())
    }

    /// Copies this dataset to `path`, opened for update.
    ///
    /// `options.options` reach the driver untouched.
    pub fn create_copy(
        &self,
        path: impl AsRef<Path>,
        options: &CreationOptions,
    ) -> Result<Dataset<H>> {
        let path = path.as_ref();
        let handle = self.with_handle(|handle| handle.create_copy(path, options))?;
        let copy = Dataset::load(handle, path, OpenMode::Update, Arc::clone(&self.crs_service))?;
        if let Some(value) = options.no_data {
            copy.set_no_data_all(value)?;
        }
        info!("copied {:?} to {copy:?}", self.path);
        Ok(copy)
    }

    /// Exports the dataset to an image `format` (e.g. `PNG`) at `path`.
    pub fn to_image(
        &self,
        path: impl AsRef<Path>,
        format: &str,
        options: &BTreeMap<String, String>,
    ) -> Result<()> {
        let path = path.as_ref();
        self.with_handle(|handle| handle.convert_to_image(path, format, options))?;
        info!("exported {:?} as {format} to {path:?}", self.path);
        Ok(())
    }

    /// Releases the storage handle, flushing datasets opened for update.
    ///
    /// Closing a closed dataset does nothing.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut handle) = self.handle.get_mut().take() else {
            return Ok(());
        };
        let flushed = if self.mode.is_writable() {
            handle.flush()
        } else {
            Ok(())
        };
        drop(handle);
        info!("closed {:?}", self.path);
        flushed
    }
}

impl<H: StorageHandle> Drop for Dataset<H> {
    fn drop(&mut self) {
        if let Some(mut handle) = self.handle.get_mut().take() {
            warn!("{:?} dropped without close", self.path);
            if self.mode.is_writable() {
                if let Err(err) = handle.flush() {
                    warn!("flush of {:?} failed: {err}", self.path);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{
        engines::memory_engine::{MemEngine, MemHandle},
        DatasetFactory,
    };
    use ndarray::Array3;
    use rstest::{fixture, rstest};

    const WGS84: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984"],AUTHORITY["EPSG","4326"]]"#;

    #[fixture]
    fn factory() -> DatasetFactory<MemEngine> {
        DatasetFactory::memory()
    }

    // 3 bands of 4x3, band b holding 100 * b + pixel offset.
    fn stacked(factory: &DatasetFactory<MemEngine>) -> Dataset<MemHandle> {
        let dataset = factory
            .create("stack", 4, 3, 3, PixelType::UInt16, &CreationOptions::driver("MEM"))
            .unwrap();
        let data: Vec<u16> = (1..=3u16)
            .flat_map(|band| (0..12).map(move |offset| band * 100 + offset))
            .collect();
        dataset
            .write_bands(&data, &[1, 2, 3], &Window::full(4, 3))
            .unwrap();
        dataset
    }

    #[rstest]
    fn stacks_bands_in_requested_order(factory: DatasetFactory<MemEngine>) {
        let dataset = stacked(&factory);
        let window = Window::new((1, 3), (2, 4));
        let data = dataset.read_bands::<u16>(&[2, 1], &window).unwrap();
        assert_eq!(data, vec![206, 207, 210, 211, 106, 107, 110, 111]);
        assert_eq!(data[..4], dataset.read_bands::<u16>(&[2], &window).unwrap()[..]);
        assert_eq!(data[4..], dataset.read_bands::<u16>(&[1], &window).unwrap()[..]);

        let data = dataset.read_bands::<u16>(&[3, 3, 1], &window).unwrap();
        let cube = Array3::from_shape_vec((3, 2, 2), data).unwrap();
        assert_eq!(cube[[0, 1, 0]], 310);
        assert_eq!(cube.index_axis(ndarray::Axis(0), 0), cube.index_axis(ndarray::Axis(0), 1));
        assert_eq!(cube[[2, 0, 1]], 107);
    }

    #[rstest]
    fn stacks_into_any_type(factory: DatasetFactory<MemEngine>) {
        let dataset = stacked(&factory);
        let buffer = dataset
            .read_bands_as(&[1], &Window::new((0, 1), (0, 2)), PixelType::Float64)
            .unwrap();
        assert_eq!(buffer, PixelBuffer::Float64(vec![100., 101.]));
    }

    #[rstest]
    fn create_set_geocoding_write_and_reopen(factory: DatasetFactory<MemEngine>) {
        let window = Window::full(100, 100);
        let data: Vec<f32> = (0..10_000).map(|i| i as f32 / 4.).collect();
        let mut dataset = factory
            .create("scene.tif", 100, 100, 1, PixelType::Float32, &CreationOptions::default())
            .unwrap();
        dataset.set_transform([0., 1., 0., 0., 0., -1.]).unwrap();
        dataset.set_crs(WGS84).unwrap();
        dataset.get_band(1).unwrap().write(&window, &data).unwrap();
        dataset.close().unwrap();

        let dataset = factory.open("scene.tif", "r").unwrap();
        assert_eq!(dataset.driver(), "GTiff");
        assert_eq!(dataset.size(), (100, 100));
        assert_eq!(dataset.crs(), Some(WGS84));
        assert_eq!(dataset.epsg_code().unwrap(), 4326);
        assert_eq!(
            dataset.bounds(),
            Bounds {
                left: 0.,
                bottom: -100.,
                right: 100.,
                top: 0.
            }
        );
        assert_eq!(dataset.get_band(1).unwrap().read::<f32>(&window).unwrap(), data);
    }

    #[rstest]
    fn close_is_idempotent_and_final(factory: DatasetFactory<MemEngine>) {
        let mut dataset = stacked(&factory);
        dataset.close().unwrap();
        dataset.close().unwrap();
        assert!(dataset.is_closed());
        assert_eq!(dataset.size(), (4, 3));
        let window = Window::full(4, 3);
        assert!(matches!(
            dataset.read_bands::<u16>(&[1], &window),
            Err(BandioError::DatasetClosed)
        ));
        assert!(matches!(
            dataset.write_bands::<u16>(&[0; 12], &[9], &window),
            Err(BandioError::DatasetClosed)
        ));
        assert!(matches!(dataset.get_band(1), Err(BandioError::DatasetClosed)));
        assert!(matches!(
            dataset.set_transform([0., 1., 0., 0., 0., -1.]),
            Err(BandioError::DatasetClosed)
        ));
        assert!(matches!(dataset.flush(), Err(BandioError::DatasetClosed)));
    }

    #[test_log::test]
    fn handle_is_released_on_close_and_drop() {
        let factory = DatasetFactory::memory();
        let mut first = stacked(&factory);
        let second = factory.open("stack", "r").unwrap();
        assert_eq!(factory.engine().open_handles("stack"), 2);
        first.close().unwrap();
        assert_eq!(factory.engine().open_handles("stack"), 1);
        drop(first);
        assert_eq!(factory.engine().open_handles("stack"), 1);
        drop(second);
        assert_eq!(factory.engine().open_handles("stack"), 0);
    }

    #[rstest]
    fn band_indexes_are_checked(factory: DatasetFactory<MemEngine>) {
        let dataset = stacked(&factory);
        for index in [0, 4] {
            assert!(matches!(
                dataset.get_band(index),
                Err(BandioError::InvalidBandIndex { band_count: 3, .. })
            ));
        }
        assert!(matches!(
            dataset.read_bands::<u16>(&[1, 4], &Window::full(4, 3)),
            Err(BandioError::InvalidBandIndex { index: 4, .. })
        ));
    }

    #[rstest]
    fn invalid_writes_leave_data_untouched(factory: DatasetFactory<MemEngine>) {
        let dataset = stacked(&factory);
        let window = Window::new((0, 1), (0, 2));
        assert!(matches!(
            dataset.write_bands::<u16>(&[0; 4], &[1, 5], &window),
            Err(BandioError::InvalidBandIndex { index: 5, .. })
        ));
        assert!(matches!(
            dataset.write_bands::<u16>(&[0; 3], &[1, 2], &window),
            Err(BandioError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
        assert!(matches!(
            dataset.write_bands::<u16>(&[0; 6], &[1, 2], &window),
            Err(BandioError::DimensionMismatch { .. })
        ));
        assert_eq!(
            dataset.read_bands::<u16>(&[1, 2], &window).unwrap(),
            vec![100, 101, 200, 201]
        );
    }

    #[rstest]
    fn read_only_datasets_refuse_changes(factory: DatasetFactory<MemEngine>) {
        stacked(&factory).close().unwrap();
        let mut dataset = factory.open("stack", "read").unwrap();
        let window = Window::full(4, 3);
        assert!(matches!(
            dataset.write_bands::<u16>(&[0; 12], &[1], &window),
            Err(BandioError::NotWritable)
        ));
        assert!(matches!(
            dataset.get_band(1).unwrap().write::<u16>(&window, &[0; 12]),
            Err(BandioError::NotWritable)
        ));
        assert!(matches!(dataset.set_no_data(0.), Err(BandioError::NotWritable)));
        assert!(matches!(dataset.set_crs(WGS84), Err(BandioError::NotWritable)));
        assert_eq!(dataset.read_bands::<u16>(&[1], &window).unwrap()[0], 100);
    }

    #[rstest]
    fn transform_updates_bounds(factory: DatasetFactory<MemEngine>) {
        let mut dataset = stacked(&factory);
        assert_eq!(dataset.transform(), &GeoTransform::default());
        dataset.set_transform([500., 10., 0., 300., 0., -10.]).unwrap();
        assert_eq!(
            dataset.bounds(),
            Bounds {
                left: 500.,
                bottom: 270.,
                right: 540.,
                top: 300.
            }
        );
        assert!(matches!(
            dataset.set_transform([0., 0., 0., 0., 0., -1.]),
            Err(BandioError::InvalidTransform(_))
        ));
        assert_eq!(dataset.transform().resolution(), (10., -10.));
        assert!(matches!(dataset.epsg_code(), Err(BandioError::CrsNotFound)));
    }

    #[rstest]
    fn no_data_per_band_and_for_all(factory: DatasetFactory<MemEngine>) {
        let dataset = stacked(&factory);
        dataset.set_no_data(1.).unwrap();
        assert_eq!(dataset.no_data(), Some(1.));
        assert_eq!(dataset.get_band(2).unwrap().no_data(), None);
        dataset.set_band_no_data(3, 3.).unwrap();
        assert_eq!(dataset.get_band(3).unwrap().no_data(), Some(3.));
        dataset.set_no_data_all(0.).unwrap();
        assert!((1..=3).all(|index| dataset.get_band(index).unwrap().no_data() == Some(0.)));
        assert_eq!(dataset.no_data(), Some(0.));
        assert!(matches!(
            dataset.set_band_no_data(4, 0.),
            Err(BandioError::InvalidBandIndex { .. })
        ));
    }

    #[rstest]
    fn band_no_data_survives_reopen(factory: DatasetFactory<MemEngine>) {
        let mut dataset = stacked(&factory);
        dataset.set_band_no_data(3, 3.).unwrap();
        dataset.close().unwrap();
        let dataset = factory.open("stack", "r").unwrap();
        assert_eq!(dataset.no_data(), None);
        assert_eq!(dataset.get_band(3).unwrap().no_data(), Some(3.));
    }

    #[rstest]
    #[case(PixelBuffer::UInt8(vec![u8::MIN, 7, u8::MAX]))]
    #[case(PixelBuffer::UInt16(vec![u16::MIN, 7, u16::MAX]))]
    #[case(PixelBuffer::Int16(vec![i16::MIN, -1, i16::MAX]))]
    #[case(PixelBuffer::UInt32(vec![u32::MIN, 7, u32::MAX]))]
    #[case(PixelBuffer::Int32(vec![i32::MIN, -1, i32::MAX]))]
    #[case(PixelBuffer::Float32(vec![f32::MIN, -0.5, f32::MAX]))]
    #[case(PixelBuffer::Float64(vec![f64::MIN, -0.25, f64::MAX]))]
    fn extreme_values_survive_reopen(
        factory: DatasetFactory<MemEngine>,
        #[case] buffer: PixelBuffer,
    ) {
        let window = Window::full(3, 1);
        let pixel_type = buffer.pixel_type();
        let mut dataset = factory
            .create("extremes", 3, 1, 1, pixel_type, &CreationOptions::driver("MEM"))
            .unwrap();
        dataset.write_bands_buffer(&buffer, &[1], &window).unwrap();
        dataset.close().unwrap();

        let dataset = factory.open("extremes", "r").unwrap();
        assert_eq!(dataset.get_band(1).unwrap().pixel_type(), pixel_type);
        assert_eq!(dataset.read_bands_as(&[1], &window, pixel_type).unwrap(), buffer);
    }

    #[rstest]
    fn copies_keep_pixels_and_geocoding(factory: DatasetFactory<MemEngine>) {
        let mut dataset = stacked(&factory);
        dataset.set_transform([1., 2., 0., 3., 0., -2.]).unwrap();
        dataset.set_crs("EPSG:32633").unwrap();
        let copy = dataset
            .create_copy("copy", &CreationOptions::driver("COG").with_no_data(9.))
            .unwrap();
        assert_eq!(copy.driver(), "COG");
        assert_eq!(copy.bounds(), dataset.bounds());
        assert_eq!(copy.epsg_code().unwrap(), 32633);
        assert_eq!(copy.no_data(), Some(9.));
        let window = Window::full(4, 3);
        assert_eq!(
            copy.read_bands::<u16>(&[1, 2, 3], &window).unwrap(),
            dataset.read_bands::<u16>(&[1, 2, 3], &window).unwrap()
        );
        assert!(matches!(
            dataset.create_copy("bad", &CreationOptions::driver("NOPE")),
            Err(BandioError::CreateError { .. })
        ));
    }

    #[rstest]
    fn exports_to_image(factory: DatasetFactory<MemEngine>) {
        let dataset = stacked(&factory);
        dataset
            .to_image("stack.png", "PNG", &BTreeMap::new())
            .unwrap();
        assert!(factory.engine().paths().contains(&PathBuf::from("stack.png")));
        assert!(matches!(
            dataset.to_image("stack.xyz", "XYZ", &BTreeMap::new()),
            Err(BandioError::IoError { .. })
        ));
    }
}
