//! Conversion building blocks: storage layout, intake, ffmpeg and the
//! pipeline tying them together.

pub mod ffmpeg;
pub mod intake;
pub mod pipeline;
pub mod storage;

pub use ffmpeg::{AudioConverter, FfmpegConverter};
pub use intake::IntakeResolver;
pub use pipeline::Pipeline;
pub use storage::Storage;
