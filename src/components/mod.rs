pub mod band;
pub mod dataset;
pub mod engines;
pub mod factory;
pub mod metadata;
pub mod types;
pub mod window;

pub use band::RasterBand;
pub use dataset::Dataset;
pub use factory::{CreationOptions, DatasetFactory, OpenMode};
pub use metadata::{Bounds, GeoMetadata, GeoTransform};
pub use types::{NativeTag, Pixel, PixelType};
pub use window::Window;
