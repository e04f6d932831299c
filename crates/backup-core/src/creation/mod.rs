//! Archive creation.
//!
//! [`Pipeline`] turns a list of selected files into a tar stream passed
//! through compression and optional encryption to one or more outputs.

pub mod compression;
pub mod pipeline;
pub mod tar;

pub use compression::CompressionCodec;
pub use compression::Compressor;
pub use pipeline::Pipeline;
