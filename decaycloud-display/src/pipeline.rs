//! Orchestration of transform, buffering, aging and catalog refresh

use crate::catalog::ChannelCatalog;
use crate::config::{sanitize_decay_time, DisplayConfig, SharedConfig, MIN_BILLBOARD_SIZE};
use crate::frame_buffer::{FrameBuffer, RenderSync};
use crate::transformer::{Diagnostic, FrameTransformer};
use decaycloud_core::{
    Color, ColorSource, DisplayObserver, Error, NoopObserver, PointCloudMessage, PoseTransformer,
    Property, RangeBounds, RenderSink, RenderStyle, Result, TransformError,
};
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// What a tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Frames evicted by decay
    pub evicted: usize,
    /// The channel catalog was recomputed from a new frame
    pub catalog_refreshed: bool,
}

/// Streams point cloud frames into a decaying, colored render buffer.
///
/// A producer calls [`submit_frame`](Self::submit_frame) while a consumer
/// calls [`tick`](Self::tick) and draws through [`render`](Self::render).
/// Configuration changes only affect frames submitted afterwards.
pub struct PointCloudPipeline<S> {
    config: SharedConfig,
    buffer: FrameBuffer<S>,
    transformer: FrameTransformer,
    pose: Option<Arc<dyn PoseTransformer>>,
    observer: Arc<dyn DisplayObserver>,
    available: Mutex<Vec<ColorSource>>,
    bounds_changed: AtomicBool,
}

impl<S: RenderSink> PointCloudPipeline<S> {
    /// Create a pipeline drawing into `sink`
    pub fn new(sink: S, config: DisplayConfig) -> Self {
        let config = config.normalized();
        let render = Arc::new(RenderSync::new(sink));
        render.scope(|sink| {
            sink.set_use_points(config.style == RenderStyle::Points);
            sink.set_billboard_dimensions(config.billboard_size, config.billboard_size);
            sink.set_alpha(config.alpha);
        });

        Self {
            config: SharedConfig::new(config),
            buffer: FrameBuffer::new(render),
            transformer: FrameTransformer::default(),
            pose: None,
            observer: Arc::new(NoopObserver),
            available: Mutex::new(Vec::new()),
            bounds_changed: AtomicBool::new(false),
        }
    }

    pub fn with_transformer(mut self, transformer: FrameTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    /// Move incoming points into the fixed frame before transforming them
    pub fn with_pose_transformer(mut self, pose: Arc<dyn PoseTransformer>) -> Self {
        self.pose = Some(pose);
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn DisplayObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Transform and buffer one frame.
    ///
    /// Returns the recoverable problems met on the way; the frame is buffered
    /// regardless.
    pub fn submit_frame(&self, mut message: PointCloudMessage) -> Vec<Diagnostic> {
        let config = self.config.snapshot();
        let mut diagnostics = Vec::new();

        if let Some(pose) = &self.pose {
            if let Err(diagnostic) = self.move_to_fixed_frame(pose.as_ref(), &mut message, &config) {
                diagnostics.push(diagnostic);
            }
        }

        let transformed = self.transformer.transform(&message, &config);
        diagnostics.extend(transformed.diagnostics);

        if let Some(bounds) = transformed.bounds {
            self.config.update(|c| c.bounds = bounds);
            self.bounds_changed.store(true, Ordering::Release);
        }

        self.buffer
            .insert(Arc::new(message), &transformed.points, config.decay_time);
        self.observer.render_requested();

        diagnostics
    }

    fn move_to_fixed_frame(
        &self,
        pose: &dyn PoseTransformer,
        message: &mut PointCloudMessage,
        config: &DisplayConfig,
    ) -> std::result::Result<(), Diagnostic> {
        let target = config.fixed_frame.as_str();
        let source = if message.frame_id.is_empty() {
            target
        } else {
            message.frame_id.as_str()
        };

        let result = pose
            .transform_points(&message.points, source, target)
            .and_then(|points| {
                if points.len() == message.points.len() {
                    Ok(points)
                } else {
                    Err(TransformError::LengthMismatch {
                        expected: message.points.len(),
                        actual: points.len(),
                    })
                }
            });

        match result {
            Ok(points) => {
                message.points = points;
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Error transforming point cloud from frame '{}' to frame '{}': {}",
                    source, target, e
                );
                Err(Diagnostic::PoseTransformFailed {
                    source_frame: source.to_string(),
                    target_frame: target.to_string(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Age frames by `dt` seconds, evict expired ones and, if a frame arrived
    /// since the last tick, refresh the channel catalog from it
    pub fn tick(&self, dt: f32) -> TickSummary {
        if self.bounds_changed.swap(false, Ordering::AcqRel) {
            self.config.update(|c| {
                let (min, max) = (c.bounds.min(), c.bounds.max());
                c.bounds.set_min(min);
                c.bounds.set_max(max);
            });
            self.notify(Property::MinIntensity);
            self.notify(Property::MaxIntensity);
        }

        let decay_time = self.config.snapshot().decay_time;
        let outcome = self.buffer.age(dt, decay_time);

        if outcome.evicted > 0 {
            self.observer.render_requested();
        }

        let catalog_refreshed = match outcome.fresh {
            Some(message) => {
                self.refresh_catalog(&message);
                true
            }
            None => false,
        };

        TickSummary {
            evicted: outcome.evicted,
            catalog_refreshed,
        }
    }

    fn refresh_catalog(&self, message: &PointCloudMessage) {
        let catalog = ChannelCatalog::scan(message);
        debug!("Channel catalog refreshed: {:?}", catalog.available());

        *self.available.lock().unwrap_or_else(PoisonError::into_inner) = catalog.available().to_vec();
        self.observer.channels_changed(catalog.available());

        let assigned = self.config.update(|c| match c.color_source {
            Some(_) => false,
            None => {
                c.color_source = catalog.default_source();
                c.color_source.is_some()
            }
        });
        if assigned {
            self.notify(Property::ColorSource);
        }
    }

    /// Select the color source for frames submitted from now on
    pub fn set_color_source(&self, source: ColorSource) {
        self.config.update(|c| c.color_source = Some(source));
        self.notify(Property::ColorSource);
    }

    /// Select the color source by its option index
    pub fn set_color_source_index(&self, index: i32) -> Result<()> {
        self.set_color_source(ColorSource::try_from(index)?);
        Ok(())
    }

    /// Unset the selection so the next catalog refresh picks a default
    pub fn clear_color_source(&self) {
        self.config.update(|c| c.color_source = None);
        self.notify(Property::ColorSource);
    }

    /// Lower bound; values above the current max are clamped down to it
    pub fn set_min_intensity(&self, value: f32) -> Result<()> {
        check_finite("min intensity", value)?;
        self.config.update(|c| c.bounds.set_min(value));
        self.notify_visual(Property::MinIntensity);
        Ok(())
    }

    /// Upper bound; values below the current min are clamped up to it
    pub fn set_max_intensity(&self, value: f32) -> Result<()> {
        check_finite("max intensity", value)?;
        self.config.update(|c| c.bounds.set_max(value));
        self.notify_visual(Property::MaxIntensity);
        Ok(())
    }

    /// Replace both bounds; an inverted pair collapses onto `min`
    pub fn set_range_bounds(&self, min: f32, max: f32) -> Result<()> {
        check_finite("min intensity", min)?;
        check_finite("max intensity", max)?;
        self.config.update(|c| c.bounds = RangeBounds::new(min, max));
        self.notify(Property::MinIntensity);
        self.notify_visual(Property::MaxIntensity);
        Ok(())
    }

    pub fn set_auto_range(&self, auto_range: bool) {
        self.config.update(|c| c.auto_range = auto_range);
        self.notify_visual(Property::AutoRange);
    }

    /// Seconds a frame stays visible; 0 keeps only the latest frame
    pub fn set_decay_time(&self, decay_time: f32) {
        let decay_time = sanitize_decay_time(decay_time);
        self.config.update(|c| c.decay_time = decay_time);
        self.notify_visual(Property::DecayTime);
    }

    pub fn set_min_color(&self, color: Color) {
        self.config.update(|c| c.min_color = color);
        self.notify_visual(Property::MinColor);
    }

    pub fn set_max_color(&self, color: Color) {
        self.config.update(|c| c.max_color = color);
        self.notify_visual(Property::MaxColor);
    }

    pub fn set_alpha(&self, alpha: f32) {
        let alpha = if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) };
        self.config.update(|c| c.alpha = alpha);
        self.render().scope(|sink| sink.set_alpha(alpha));
        self.notify_visual(Property::Alpha);
    }

    pub fn set_style(&self, style: RenderStyle) {
        self.config.update(|c| c.style = style);
        self.render()
            .scope(|sink| sink.set_use_points(style == RenderStyle::Points));
        self.notify_visual(Property::Style);
    }

    pub fn set_billboard_size(&self, size: f32) {
        let size = size.max(MIN_BILLBOARD_SIZE);
        self.config.update(|c| c.billboard_size = size);
        self.render()
            .scope(|sink| sink.set_billboard_dimensions(size, size));
        self.notify_visual(Property::BillboardSize);
    }

    /// Change the target frame; buffered history is discarded
    pub fn set_fixed_frame(&self, frame: impl Into<String>) {
        let frame = frame.into();
        self.config.update(|c| c.fixed_frame = frame);
        self.notify(Property::FixedFrame);
        self.reset();
    }

    /// Drop all buffered frames and clear the render buffer
    pub fn reset(&self) {
        self.buffer.reset();
        self.observer.render_requested();
    }

    /// Stop displaying; equivalent to [`reset`](Self::reset)
    pub fn disable(&self) {
        self.reset();
    }

    /// Snapshot of the current configuration
    pub fn config(&self) -> DisplayConfig {
        self.config.snapshot()
    }

    /// Color sources offered by the most recent catalog refresh
    pub fn available_sources(&self) -> Vec<ColorSource> {
        self.available
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn frame_count(&self) -> usize {
        self.buffer.len()
    }

    /// Points held by retained frames
    pub fn point_count(&self) -> usize {
        self.buffer.point_count()
    }

    pub fn frame_buffer(&self) -> &FrameBuffer<S> {
        &self.buffer
    }

    /// The render scope a drawer reads the buffer through
    pub fn render(&self) -> &Arc<RenderSync<S>> {
        self.buffer.render()
    }

    fn notify(&self, property: Property) {
        self.observer.property_changed(property);
    }

    fn notify_visual(&self, property: Property) {
        self.notify(property);
        self.observer.render_requested();
    }
}

fn check_finite(what: &str, value: f32) -> Result<()> {
    if value.is_nan() {
        Err(Error::InvalidConfig(format!("{} must not be NaN", what)))
    } else {
        Ok(())
    }
}
