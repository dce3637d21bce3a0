//! Incoming point cloud messages

use crate::point::Point3f;
use serde::{Deserialize, Serialize};

/// A named per-point scalar array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub values: Vec<f32>,
}

impl Channel {
    pub fn new(name: impl Into<String>, values: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// A channel is usable only when it carries exactly one value per point
    pub fn is_valid_for(&self, point_count: usize) -> bool {
        self.values.len() == point_count
    }
}

/// One raw point cloud frame as delivered by the transport
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointCloudMessage {
    /// Coordinate frame the points are expressed in; empty means the fixed frame
    pub frame_id: String,
    /// Acquisition time in seconds
    pub stamp: f64,
    pub points: Vec<Point3f>,
    pub channels: Vec<Channel>,
}

impl PointCloudMessage {
    /// Create a message with positions only
    pub fn new(frame_id: impl Into<String>, points: Vec<Point3f>) -> Self {
        Self {
            frame_id: frame_id.into(),
            stamp: 0.0,
            points,
            channels: Vec::new(),
        }
    }

    /// Builder-style channel attachment
    pub fn with_channel(mut self, name: impl Into<String>, values: Vec<f32>) -> Self {
        self.channels.push(Channel::new(name, values));
        self
    }

    pub fn with_stamp(mut self, stamp: f64) -> Self {
        self.stamp = stamp;
        self
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// First channel with the given name, if any
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// First channel with the given name whose length matches the point count
    pub fn valid_channel(&self, name: &str) -> Option<&Channel> {
        self.channel(name)
            .filter(|c| c.is_valid_for(self.point_count()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_channel_lookup() {
        let msg = PointCloudMessage::new("base", vec![Point3f::origin(); 3])
            .with_channel("intensity", vec![1.0, 2.0, 3.0])
            .with_channel("rgb", vec![0.0; 2]);

        assert!(msg.valid_channel("intensity").is_some());
        assert!(msg.channel("rgb").is_some());
        assert!(msg.valid_channel("rgb").is_none());
        assert!(msg.channel("missing").is_none());
    }
}
