use geo::{AffineTransform, Coord, Rect};
use shrinkwraprs::Shrinkwrap;

use crate::{
    components::Window,
    crs::CrsService,
    errors::{BandioError, Result},
};

/// GDAL ordered affine coefficients:
/// `[origin_x, pixel_width, row_rotation, origin_y, column_rotation, pixel_height]`.
///
/// Maps pixel `(col, row)` to `x = t0 + col*t1 + row*t2`, `y = t3 + col*t4 + row*t5`.
#[derive(Shrinkwrap, Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoTransform([f64; 6]);

impl Default for GeoTransform {
    fn default() -> Self {
        Self([0., 1., 0., 0., 0., 1.])
    }
}

impl From<[f64; 6]> for GeoTransform {
    fn from(value: [f64; 6]) -> Self {
        Self(value)
    }
}

impl GeoTransform {
    /// Fails for a zero pixel width or height.
    pub fn new(coefficients: [f64; 6]) -> Result<Self> {
        if coefficients[1] == 0. || coefficients[5] == 0. {
            return Err(BandioError::InvalidTransform(coefficients));
        }
        Ok(Self(coefficients))
    }

    pub fn coefficients(&self) -> [f64; 6] {
        self.0
    }

    pub fn origin(&self) -> (f64, f64) {
        (self.0[0], self.0[3])
    }

    /// (pixel width, pixel height), height is negative for north up rasters.
    pub fn resolution(&self) -> (f64, f64) {
        (self.0[1], self.0[5])
    }

    pub fn affine(&self) -> AffineTransform {
        AffineTransform::new(self.0[1], self.0[2], self.0[0], self.0[4], self.0[5], self.0[3])
    }
}

/// Spatial extent of a raster in its crs.
///
/// Corners are taken as they come out of the transform, so `bottom < top`
/// only holds for negative pixel heights. Use [Bounds::to_rect] for a
/// normalized box.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

impl Bounds {
    pub fn from_transform(transform: &GeoTransform, size: (usize, usize)) -> Self {
        let (width, height) = (size.0 as f64, size.1 as f64);
        let left = transform[0];
        let top = transform[3];
        Self {
            left,
            bottom: top + height * transform[5],
            right: left + width * transform[1],
            top,
        }
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            Coord {
                x: self.left,
                y: self.bottom,
            },
            Coord {
                x: self.right,
                y: self.top,
            },
        )
    }
}

/// Geocoding of a dataset: transform, crs and the pixel grid size.
///
/// Bounds are never stored, every call to [GeoMetadata::bounds] derives
/// them from the current transform.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoMetadata {
    transform: GeoTransform,
    crs: Option<String>,
    size: (usize, usize),
}

impl GeoMetadata {
    pub fn new(transform: GeoTransform, crs: Option<String>, size: (usize, usize)) -> Self {
        Self {
            transform,
            crs,
            size,
        }
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    /// (width, height)
    pub fn size(&self) -> (usize, usize) {
        self.size
    }

    pub fn set_transform(&mut self, coefficients: [f64; 6]) -> Result<()> {
        self.transform = GeoTransform::new(coefficients)?;
        Ok(())
    }

    /// Stored verbatim, validity is up to whoever interprets it.
    pub fn set_crs(&mut self, encoding: impl Into<String>) {
        self.crs = Some(encoding.into());
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_transform(&self.transform, self.size)
    }

    pub fn epsg_code(&self, service: &dyn CrsService) -> Result<i32> {
        let encoding = self.crs().ok_or(BandioError::CrsNotFound)?;
        let code = service
            .authority_code(encoding, "EPSG")
            .ok_or(BandioError::CrsNotFound)?;
        code.trim()
            .parse::<i32>()
            .map_err(|source| BandioError::CrsParseError { code, source })
    }

    /// Geographic coordinates of the top left corner of pixel `(col, row)`.
    pub fn pixel_to_geo(&self, col: f64, row: f64) -> Coord {
        self.transform.affine().apply(Coord { x: col, y: row })
    }

    /// Fractional pixel `(col, row)` of a geographic coordinate.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> Result<Coord> {
        let inverse = self
            .transform
            .affine()
            .inverse()
            .ok_or(BandioError::InvalidTransform(self.transform.coefficients()))?;
        Ok(inverse.apply(Coord { x, y }))
    }

    /// Geographic extent of a pixel window.
    pub fn window_bounds(&self, window: &Window) -> Bounds {
        let top_left = self.pixel_to_geo(window.col0 as f64, window.row0 as f64);
        let bottom_right = self.pixel_to_geo(window.col1 as f64, window.row1 as f64);
        Bounds {
            left: top_left.x,
            bottom: bottom_right.y,
            right: bottom_right.x,
            top: top_left.y,
        }
    }

    /// Smallest pixel window covering `bounds`.
    ///
    /// Not clamped to the grid, reads and writes reject windows outside it.
    pub fn bounds_window(&self, bounds: &Bounds) -> Result<Window> {
        let corners = [
            self.geo_to_pixel(bounds.left, bounds.top)?,
            self.geo_to_pixel(bounds.right, bounds.bottom)?,
            self.geo_to_pixel(bounds.left, bounds.bottom)?,
            self.geo_to_pixel(bounds.right, bounds.top)?,
        ];
        let (min, max) = corners.iter().fold(
            (corners[0], corners[0]),
            |(min, max), corner| {
                (
                    Coord {
                        x: min.x.min(corner.x),
                        y: min.y.min(corner.y),
                    },
                    Coord {
                        x: max.x.max(corner.x),
                        y: max.y.max(corner.y),
                    },
                )
            },
        );
        Ok(Window::new(
            (snap(min.y).floor() as isize, snap(max.y).ceil() as isize),
            (snap(min.x).floor() as isize, snap(max.x).ceil() as isize),
        ))
    }
}

// Absorbs floating point noise from the inverse transform.
fn snap(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 {
        rounded
    } else {
        value
    }
}
