//! Decay-aware collection of transformed frames

use decaycloud_core::{PointCloudMessage, RenderPoint, RenderSink};
use log::{debug, trace, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Render-synchronization scope around a shared render sink.
///
/// Every mutation of the sink, and every read by the drawer, runs inside
/// [`RenderSync::scope`]; the sink is released when the closure returns.
#[derive(Debug, Default)]
pub struct RenderSync<S> {
    sink: Mutex<S>,
}

impl<S: RenderSink> RenderSync<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }

    /// Run `f` with exclusive access to the sink
    pub fn scope<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut sink)
    }
}

/// A retained frame
#[derive(Debug, Clone)]
pub struct Frame {
    message: Arc<PointCloudMessage>,
    age: f32,
    point_count: usize,
}

impl Frame {
    pub fn message(&self) -> &Arc<PointCloudMessage> {
        &self.message
    }

    /// Seconds since insertion, advanced by ticks
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Number of points this frame contributed to the render buffer
    pub fn point_count(&self) -> usize {
        self.point_count
    }
}

/// Outcome of one aging step
#[derive(Debug, Clone, Default)]
pub struct AgeOutcome {
    /// Frames evicted by decay
    pub evicted: usize,
    /// Newest frame, if one was inserted since the previous step
    pub fresh: Option<Arc<PointCloudMessage>>,
}

#[derive(Debug, Default)]
struct FrameList {
    frames: VecDeque<Frame>,
    new_frame: bool,
}

/// Frames in arrival order plus their points in the shared render sink.
///
/// Lock order is frame list, then render scope. The render sink always holds
/// exactly the points of the retained frames, oldest first.
#[derive(Debug)]
pub struct FrameBuffer<S> {
    list: Mutex<FrameList>,
    render: Arc<RenderSync<S>>,
}

impl<S: RenderSink> FrameBuffer<S> {
    pub fn new(render: Arc<RenderSync<S>>) -> Self {
        Self {
            list: Mutex::new(FrameList::default()),
            render,
        }
    }

    pub fn render(&self) -> &Arc<RenderSync<S>> {
        &self.render
    }

    /// Append a transformed frame. With `decay_time == 0` the frame replaces
    /// everything retained so far.
    pub fn insert(&self, message: Arc<PointCloudMessage>, points: &[RenderPoint], decay_time: f32) {
        let mut list = self.lock();
        let replace = decay_time <= 0.0;

        self.render.scope(|sink| {
            if replace {
                sink.clear();
            }
            if !points.is_empty() {
                sink.append(points);
            }
        });

        if replace {
            list.frames.clear();
        }
        list.frames.push_back(Frame {
            message,
            age: 0.0,
            point_count: points.len(),
        });
        list.new_frame = true;

        trace!(
            "Inserted frame with {} points, {} frames retained",
            points.len(),
            list.frames.len()
        );
    }

    /// Advance every frame's age by `dt` and evict, oldest first, the frames
    /// older than `decay_time`. A zero decay time never evicts.
    ///
    /// A negative or non-finite `dt` is treated as zero so ages never decrease.
    pub fn age(&self, dt: f32, decay_time: f32) -> AgeOutcome {
        let dt = sanitize_elapsed(dt);
        let mut list = self.lock();

        for frame in list.frames.iter_mut() {
            frame.age += dt;
        }

        let mut evicted = 0;
        if decay_time > 0.0 {
            let expired = list
                .frames
                .iter()
                .take_while(|f| f.age > decay_time)
                .count();

            if expired > 0 {
                self.render.scope(|sink| {
                    for frame in list.frames.drain(..expired) {
                        sink.pop_front(frame.point_count);
                    }
                });
                evicted = expired;
                debug!("Evicted {} frames older than {}s", evicted, decay_time);
            }
        }

        let fresh = if std::mem::take(&mut list.new_frame) {
            list.frames.back().map(|f| Arc::clone(&f.message))
        } else {
            None
        };

        AgeOutcome { evicted, fresh }
    }

    /// Drop every frame and clear the render sink
    pub fn reset(&self) {
        let mut list = self.lock();
        self.render.scope(|sink| sink.clear());
        list.frames.clear();
        list.new_frame = false;
    }

    pub fn len(&self) -> usize {
        self.lock().frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().frames.is_empty()
    }

    /// Sum of the point counts of retained frames
    pub fn point_count(&self) -> usize {
        self.lock().frames.iter().map(Frame::point_count).sum()
    }

    /// Snapshot of the retained frames, oldest first
    pub fn frames(&self) -> Vec<Frame> {
        self.lock().frames.iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, FrameList> {
        self.list.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn sanitize_elapsed(dt: f32) -> f32 {
    if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        warn!("Ignoring invalid elapsed time {}, frames are not aged", dt);
        0.0
    }
}
