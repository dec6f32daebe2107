use crate::{
    buffer::{PixelBuffer, PixelSlice},
    components::{engines::StorageHandle, Dataset, Pixel, PixelType, Window},
    errors::{BandioError, Result},
};

/// One band of a [Dataset], borrowed from it.
///
/// Windows are validated against the dataset grid on every call.
/// Every read allocates or fills exactly `window.len()` elements, row-major.
#[derive(Debug)]
pub struct RasterBand<'a, H: StorageHandle> {
    dataset: &'a Dataset<H>,
    index: usize,
    pixel_type: PixelType,
}

impl<'a, H: StorageHandle> RasterBand<'a, H> {
    pub(crate) fn new(dataset: &'a Dataset<H>, index: usize, pixel_type: PixelType) -> Self {
        Self {
            dataset,
            index,
            pixel_type,
        }
    }

    /// 1-based
    pub fn index(&self) -> usize {
        self.index
    }

    /// Stored type of the band.
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Current sentinel, including values set through the dataset.
    pub fn no_data(&self) -> Option<f64> {
        self.dataset.band_no_data(self.index)
    }

    /// Natural (width, height) block of the band.
    ///
    /// Windows aligned to it avoid partial block reads.
    pub fn block_size(&self) -> Result<(usize, usize)> {
        self.dataset.band_block_size(self.index)
    }

    pub fn dataset(&self) -> &'a Dataset<H> {
        self.dataset
    }

    pub fn read<T: Pixel>(&self, window: &Window) -> Result<Vec<T>> {
        self.dataset.check_window(window)?;
        let mut data = vec![T::default(); window.len()];
        self.read_into(window, &mut data)?;
        Ok(data)
    }

    /// Fills the first `window.len()` elements of `data`.
    pub fn read_into<T: Pixel>(&self, window: &Window, data: &mut [T]) -> Result<()> {
        self.dataset.check_window(window)?;
        let required = window.len();
        if data.len() < required {
            return Err(BandioError::BufferTooSmall {
                required,
                actual: data.len(),
            });
        }
        self.dataset
            .read_band_window(self.index, window, T::as_pixel_slice_mut(&mut data[..required]))
    }

    /// Reads into a new buffer of `pixel_type`, whatever the stored type.
    pub fn read_as(&self, window: &Window, pixel_type: PixelType) -> Result<PixelBuffer> {
        self.dataset.check_window(window)?;
        let mut buffer = PixelBuffer::new_zeroed(pixel_type, window.len())?;
        self.read_into_buffer(window, &mut buffer)?;
        Ok(buffer)
    }

    pub fn read_into_buffer(&self, window: &Window, buffer: &mut PixelBuffer) -> Result<()> {
        self.dataset.check_window(window)?;
        let required = window.len();
        if buffer.len() < required {
            return Err(BandioError::BufferTooSmall {
                required,
                actual: buffer.len(),
            });
        }
        let out = buffer.as_slice_mut().into_slice(0..required);
        self.dataset.read_band_window(self.index, window, out)
    }

    /// Writes the first `window.len()` elements of `data`.
    pub fn write<T: Pixel>(&self, window: &Window, data: &[T]) -> Result<()> {
        self.write_buffer_slice(window, T::as_pixel_slice(data))
    }

    pub fn write_buffer(&self, window: &Window, buffer: &PixelBuffer) -> Result<()> {
        self.write_buffer_slice(window, buffer.as_slice())
    }

    fn write_buffer_slice(&self, window: &Window, data: PixelSlice<'_>) -> Result<()> {
        self.dataset.check_writable()?;
        self.dataset.check_window(window)?;
        let required = window.len();
        if data.len() < required {
            return Err(BandioError::BufferTooSmall {
                required,
                actual: data.len(),
            });
        }
        self.dataset
            .write_band_window(self.index, window, data.slice(0..required))
    }

    /// Persists the no data sentinel of this band.
    ///
    /// Reads return stored values as they are, no masking is applied.
    pub fn set_no_data(&self, value: f64) -> Result<()> {
        self.dataset.set_band_no_data(self.index, value)
    }
}
