//! # decaycloud
//!
//! Decay-aware aggregation of streamed point cloud frames.
//!
//! This is the umbrella crate that provides convenient access to all decaycloud functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Messages, channels, render points, range bounds and collaborator traits
//! - **Display**: Frame transformer, decaying frame buffer and the pipeline driving them
//!
//! ## Quick Start
//!
//! ```rust
//! use decaycloud::prelude::*;
//!
//! let pipeline = PointCloudPipeline::new(
//!     PointBuffer::new(),
//!     DisplayConfig::default().with_decay_time(1.0),
//! );
//!
//! let frame = PointCloudMessage::new("laser", vec![Point3f::new(1.0, 0.0, 0.0)])
//!     .with_channel("intensity", vec![42.0]);
//! pipeline.submit_frame(frame);
//! pipeline.tick(0.016);
//!
//! assert_eq!(pipeline.config().color_source, Some(ColorSource::Intensity));
//! assert_eq!(pipeline.render().scope(|sink| sink.len()), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables display
//! - `display`: The aggregation pipeline

// Re-export core functionality
pub use decaycloud_core::*;

// Re-export sub-crates
#[cfg(feature = "display")]
pub use decaycloud_display as display;

/// Convenient imports for common use cases
pub mod prelude {
    pub use decaycloud_core::*;

    #[cfg(feature = "display")]
    pub use decaycloud_display::*;
}
