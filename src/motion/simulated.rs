//! In-memory motion controller for tests and the simulation runner.

use super::{MotionController, MotionEvent, MotionPrimitive, RealizedMotion};
use crate::error::{ChetanaError, Result};
use std::collections::VecDeque;

/// Queue-backed controller that completes one primitive per [`poll`].
///
/// [`poll`]: SimulatedMotionController::poll
#[derive(Debug, Default)]
pub struct SimulatedMotionController {
    queue: VecDeque<MotionPrimitive>,
    /// Every primitive ever enqueued, in order
    issued: Vec<MotionPrimitive>,
    /// Queue drained by completion and QueueEmpty not yet reported
    drain_pending: bool,
    /// Fraction of commanded motion actually realized (1.0 = perfect)
    slip: f64,
    stop_count: usize,
    clear_count: usize,
    offline: bool,
}

impl SimulatedMotionController {
    pub fn new() -> Self {
        Self {
            slip: 1.0,
            ..Default::default()
        }
    }

    /// Scale realized motion by `factor` to emulate wheel slip.
    pub fn with_slip(mut self, factor: f64) -> Self {
        self.slip = factor;
        self
    }

    /// Make every command fail, as a disconnected serial link would.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Advance the simulation by one completion event.
    ///
    /// Completes the front primitive if any; once the queue drains through
    /// completion, the following call reports `QueueEmpty`.
    pub fn poll(&mut self) -> Option<MotionEvent> {
        if let Some(primitive) = self.queue.pop_front() {
            self.drain_pending = self.queue.is_empty();
            let realized = RealizedMotion {
                distance_mm: primitive.distance_mm * self.slip,
                turn_deg: primitive.turn_deg * self.slip,
            };
            log::debug!(
                "SimMotion: completed {:.0}mm / {:.1}°",
                realized.distance_mm,
                realized.turn_deg
            );
            return Some(MotionEvent::PrimitiveDone(realized));
        }
        if self.drain_pending {
            self.drain_pending = false;
            return Some(MotionEvent::QueueEmpty);
        }
        None
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn queued(&self) -> impl Iterator<Item = &MotionPrimitive> {
        self.queue.iter()
    }

    pub fn issued(&self) -> &[MotionPrimitive] {
        &self.issued
    }

    pub fn last_issued(&self) -> Option<&MotionPrimitive> {
        self.issued.last()
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    fn check_link(&self) -> Result<()> {
        if self.offline {
            Err(ChetanaError::Motion("simulated link offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl MotionController for SimulatedMotionController {
    fn enqueue(&mut self, primitive: MotionPrimitive) -> Result<()> {
        self.check_link()?;
        self.queue.push_back(primitive);
        self.issued.push(primitive);
        self.drain_pending = false;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.check_link()?;
        self.stop_count += 1;
        Ok(())
    }

    fn clear_queue(&mut self) -> Result<()> {
        self.check_link()?;
        self.queue.clear();
        self.drain_pending = false;
        self.clear_count += 1;
        Ok(())
    }
}
