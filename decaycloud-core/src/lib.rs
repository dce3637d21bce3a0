//! Core data structures and traits for decaycloud
//!
//! This crate provides the shared data model for streamed point cloud display:
//! incoming messages and their channels, render points and colors, channel
//! roles, range bounds, and the traits through which the display talks to
//! pose services, render buffers and configuration surfaces.

pub mod channel;
pub mod error;
pub mod message;
pub mod point;
pub mod range;
pub mod traits;
pub mod transform;

pub use channel::*;
pub use error::*;
pub use message::*;
pub use point::*;
pub use range::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};
