//! # decaycloud display
//!
//! Aggregation of streamed point cloud frames into one render buffer.
//!
//! Frames are converted into colored render points by the [`FrameTransformer`],
//! kept in arrival order by the [`FrameBuffer`] until they decay, and driven by
//! the [`PointCloudPipeline`]:
//! - channel discovery and default color source selection
//! - intensity/curvature auto-ranging
//! - packed and separate RGB decoding
//! - normals as positions ("Normal Sphere")
//! - replace-on-arrival or time based decay

pub mod catalog;
pub mod color;
pub mod config;
pub mod frame_buffer;
pub mod pipeline;
pub mod point_buffer;
pub mod range;
pub mod transformer;

// Re-export commonly used items
pub use catalog::*;
pub use color::ColorParams;
pub use config::*;
pub use frame_buffer::*;
pub use pipeline::*;
pub use point_buffer::*;
pub use range::*;
pub use transformer::*;
