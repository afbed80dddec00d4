//! Request / result types shared by the routes and the conversion pipeline.

pub mod conversion;

pub use conversion::{ConversionRequest, ConversionResult};
