//! Freehand stroke capture.
//!
//! A `TraceHandle` is shared between the input method, which keeps it until
//! the recognition attempt containing the stroke has been consumed, and the
//! host, which may keep rendering the stroke after capture ends. The trace is
//! freed when the last handle is dropped.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::error;

use crate::modes::PatternRecognitionMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TraceId(pub u32);

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Value in an opaque capture-device or screen descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

pub type InfoMap = BTreeMap<String, InfoValue>;

/// One sample of a stroke. `t_ms` is the host's timestamp for the sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub x: f32,
    pub y: f32,
    pub t_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceState {
    Capturing,
    Ended,
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TraceError {
    #[error("trace {id} is not capturing (state: {state:?})")]
    NotCapturing { id: TraceId, state: TraceState },
    #[error("trace {id} reached its limit of {limit} points")]
    Full { id: TraceId, limit: usize },
}

#[derive(Debug)]
struct Trace {
    mode: PatternRecognitionMode,
    device_info: InfoMap,
    screen_info: InfoMap,
    points: Vec<TracePoint>,
    state: TraceState,
    opacity: f32,
    max_points: usize,
}

/// Immutable copy of an ended trace, shared with the recognizer thread.
#[derive(Debug, Clone, PartialEq)]
pub struct SealedTrace {
    pub id: TraceId,
    pub mode: PatternRecognitionMode,
    pub device_info: InfoMap,
    pub screen_info: InfoMap,
    pub points: Vec<TracePoint>,
}

/// Shared, reference-counted handle to a trace.
#[derive(Clone)]
pub struct TraceHandle {
    id: TraceId,
    inner: Arc<RwLock<Trace>>,
}

impl fmt::Debug for TraceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.read();
        f.debug_struct("TraceHandle")
            .field("id", &self.id)
            .field("state", &t.state)
            .field("points", &t.points.len())
            .finish()
    }
}

impl TraceHandle {
    pub fn new(
        id: TraceId,
        mode: PatternRecognitionMode,
        device_info: InfoMap,
        screen_info: InfoMap,
        max_points: usize,
    ) -> Self {
        Self {
            id,
            inner: Arc::new(RwLock::new(Trace {
                mode,
                device_info,
                screen_info,
                points: Vec::new(),
                state: TraceState::Capturing,
                opacity: 1.0,
                max_points,
            })),
        }
    }

    // A writer that panicked mid-append leaves the point list intact, so a
    // poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Trace> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Trace> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> TraceId {
        self.id
    }

    pub fn mode(&self) -> PatternRecognitionMode {
        self.read().mode
    }

    pub fn state(&self) -> TraceState {
        self.read().state
    }

    pub fn is_canceled(&self) -> bool {
        self.read().state == TraceState::Discarded
    }

    /// Append a sample. Returns the index of the new point.
    pub fn add_point(&self, x: f32, y: f32, t_ms: u64) -> Result<usize, TraceError> {
        let mut t = self.write();
        if t.state != TraceState::Capturing {
            let err = TraceError::NotCapturing {
                id: self.id,
                state: t.state,
            };
            error!(%err, "point appended outside capture");
            return Err(err);
        }
        if t.points.len() >= t.max_points {
            return Err(TraceError::Full {
                id: self.id,
                limit: t.max_points,
            });
        }
        t.points.push(TracePoint { x, y, t_ms });
        Ok(t.points.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.read().points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn points(&self) -> Vec<TracePoint> {
        self.read().points.clone()
    }

    pub fn device_info(&self) -> InfoMap {
        self.read().device_info.clone()
    }

    pub fn screen_info(&self) -> InfoMap {
        self.read().screen_info.clone()
    }

    /// Display hint for the host; sealed strokes are typically faded out.
    pub fn opacity(&self) -> f32 {
        self.read().opacity
    }

    pub fn set_opacity(&self, opacity: f32) {
        self.write().opacity = opacity.clamp(0.0, 1.0);
    }

    /// End capture and take an immutable snapshot for recognition.
    pub fn seal(&self) -> Result<Arc<SealedTrace>, TraceError> {
        let mut t = self.write();
        if t.state != TraceState::Capturing {
            return Err(TraceError::NotCapturing {
                id: self.id,
                state: t.state,
            });
        }
        t.state = TraceState::Ended;
        Ok(Arc::new(SealedTrace {
            id: self.id,
            mode: t.mode,
            device_info: t.device_info.clone(),
            screen_info: t.screen_info.clone(),
            points: t.points.clone(),
        }))
    }

    /// Mark the trace as canceled. Captured points are kept for display.
    pub fn discard(&self) {
        self.write().state = TraceState::Discarded;
    }

    pub fn ptr_eq(&self, other: &TraceHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this trace.
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(max_points: usize) -> TraceHandle {
        TraceHandle::new(
            TraceId(1),
            PatternRecognitionMode::Handwriting,
            InfoMap::new(),
            InfoMap::new(),
            max_points,
        )
    }

    #[test]
    fn sealed_points_match_appended_points() {
        let h = handle(100);
        let input = [(1.0, 2.0, 10), (3.0, 4.0, 20), (5.0, 6.0, 30), (5.0, 6.0, 31)];
        for (i, &(x, y, t)) in input.iter().enumerate() {
            assert_eq!(h.add_point(x, y, t), Ok(i));
        }
        let sealed = h.seal().unwrap();
        let got: Vec<_> = sealed.points.iter().map(|p| (p.x, p.y, p.t_ms)).collect();
        assert_eq!(got, input);
        assert_eq!(h.state(), TraceState::Ended);
    }

    #[test]
    fn append_after_end_is_rejected() {
        let h = handle(100);
        h.add_point(0.0, 0.0, 0).unwrap();
        h.seal().unwrap();
        let err = h.add_point(1.0, 1.0, 1).unwrap_err();
        assert!(matches!(err, TraceError::NotCapturing { state: TraceState::Ended, .. }));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn seal_twice_fails() {
        let h = handle(100);
        h.seal().unwrap();
        assert!(h.seal().is_err());
    }

    #[test]
    fn point_limit() {
        let h = handle(2);
        h.add_point(0.0, 0.0, 0).unwrap();
        h.add_point(0.0, 0.0, 1).unwrap();
        assert_eq!(
            h.add_point(0.0, 0.0, 2),
            Err(TraceError::Full {
                id: TraceId(1),
                limit: 2
            })
        );
    }

    #[test]
    fn discard_keeps_points_and_sets_canceled() {
        let h = handle(10);
        h.add_point(0.0, 0.0, 0).unwrap();
        h.discard();
        assert!(h.is_canceled());
        assert_eq!(h.len(), 1);
        assert!(h.add_point(1.0, 1.0, 1).is_err());
    }

    #[test]
    fn handles_share_one_trace() {
        let h = handle(10);
        let host_copy = h.clone();
        assert_eq!(h.strong_count(), 2);
        host_copy.add_point(1.0, 1.0, 1).unwrap();
        assert_eq!(h.len(), 1);
        assert!(h.ptr_eq(&host_copy));
        drop(h);
        assert_eq!(host_copy.strong_count(), 1);
    }

    #[test]
    fn opacity_is_clamped() {
        let h = handle(10);
        h.set_opacity(1.5);
        assert_eq!(h.opacity(), 1.0);
        h.set_opacity(-0.5);
        assert_eq!(h.opacity(), 0.0);
    }
}
