use std::fmt::Display;

use crate::{
    errors::{BandioError, Result},
    tuple_to,
};

/// Rectangular pixel window of a raster.
///
/// Defined by half open row and column ranges, `[row0, row1)` and
/// `[col0, col1)`, with origin at the top left pixel of the raster.
/// Coordinates are signed so that windows reaching outside of the
/// raster can be expressed and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Window {
    pub row0: isize,
    pub row1: isize,
    pub col0: isize,
    pub col1: isize,
}

impl Window {
    pub fn new(rows: (isize, isize), cols: (isize, isize)) -> Self {
        Self {
            row0: rows.0,
            row1: rows.1,
            col0: cols.0,
            col1: cols.1,
        }
    }

    /// Window covering a `width` x `height` grid.
    pub fn full(width: usize, height: usize) -> Self {
        Self::from_offset_shape((0, 0), (width, height))
    }

    /// From `offset` (col, row) of the top left pixel and `shape` (cols, rows).
    pub fn from_offset_shape(offset: (usize, usize), shape: (usize, usize)) -> Self {
        let (col0, row0): (isize, isize) = tuple_to(offset);
        let (cols, rows): (isize, isize) = tuple_to(shape);
        Self::new(
            (row0, row0.saturating_add(rows)),
            (col0, col0.saturating_add(cols)),
        )
    }

    pub fn rows(&self) -> usize {
        self.row1.saturating_sub(self.row0).max(0) as usize
    }

    pub fn cols(&self) -> usize {
        self.col1.saturating_sub(self.col0).max(0) as usize
    }

    /// Number of pixels in the window, saturating at `usize::MAX`.
    pub fn len(&self) -> usize {
        self.rows().saturating_mul(self.cols())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// (x, y) offset of the top left pixel.
    pub fn offset(&self) -> (isize, isize) {
        (self.col0, self.row0)
    }

    /// (width, height)
    pub fn shape(&self) -> (usize, usize) {
        (self.cols(), self.rows())
    }

    /// Checks `0 <= row0 < row1 <= height` and `0 <= col0 < col1 <= width`.
    pub fn validate(&self, width: usize, height: usize) -> Result<()> {
        let (width_i, height_i): (isize, isize) = tuple_to((width, height));
        let rows_ok = 0 <= self.row0 && self.row0 < self.row1 && self.row1 <= height_i;
        let cols_ok = 0 <= self.col0 && self.col0 < self.col1 && self.col1 <= width_i;
        if rows_ok && cols_ok {
            Ok(())
        } else {
            Err(BandioError::WindowOutOfBounds {
                window: *self,
                width,
                height,
            })
        }
    }
}

impl Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rows [{}, {}) cols [{}, {})",
            self.row0, self.row1, self.col0, self.col1
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn full_window_is_valid() {
        let window = Window::full(100, 50);
        assert_eq!(window.shape(), (100, 50));
        assert_eq!(window.len(), 5000);
        assert!(window.validate(100, 50).is_ok());
    }

    #[rstest]
    fn offset_shape_maps_to_ranges() {
        let window = Window::from_offset_shape((3, 4), (10, 2));
        assert_eq!(window, Window::new((4, 6), (3, 13)));
        assert_eq!(window.offset(), (3, 4));
    }

    #[rstest]
    #[case(Window::new((-1, 10), (0, 10)))]
    #[case(Window::new((0, 11), (0, 10)))]
    #[case(Window::new((0, 10), (0, 11)))]
    #[case(Window::new((0, 10), (-3, 2)))]
    #[case(Window::new((5, 5), (0, 10)))]
    #[case(Window::new((6, 5), (0, 10)))]
    fn out_of_grid_windows_are_rejected(#[case] window: Window) {
        let err = window.validate(10, 10).unwrap_err();
        assert!(matches!(err, BandioError::WindowOutOfBounds { .. }));
    }

    #[rstest]
    fn inverted_window_has_no_pixels() {
        let window = Window::new((6, 5), (0, 10));
        assert_eq!(window.rows(), 0);
        assert!(window.is_empty());
    }

    #[rstest]
    fn extreme_windows_saturate() {
        let tall = Window::new((-1, isize::MAX), (0, 1));
        assert_eq!(tall.rows(), isize::MAX as usize);
        assert_eq!(tall.len(), isize::MAX as usize);
        let huge = Window::new((isize::MIN, isize::MAX), (isize::MIN, isize::MAX));
        assert_eq!(huge.shape(), (isize::MAX as usize, isize::MAX as usize));
        assert_eq!(huge.len(), usize::MAX);
        assert!(matches!(
            huge.validate(10, 10),
            Err(BandioError::WindowOutOfBounds { .. })
        ));
        let shifted = Window::from_offset_shape((1, isize::MAX as usize), (3, 2));
        assert_eq!(shifted.row1, isize::MAX);
        assert_eq!(shifted.cols(), 3);
    }
}
