//! Motion controller trait

use super::MotionPrimitive;
use crate::error::Result;

/// Command side of a queued motion controller.
///
/// Completion feedback flows back as [`super::MotionEvent`]s. After
/// `clear_queue` returns, no `PrimitiveDone` may be reported for the
/// discarded primitives.
pub trait MotionController {
    /// Append one primitive to the controller's queue.
    fn enqueue(&mut self, primitive: MotionPrimitive) -> Result<()>;

    /// Stop the wheels immediately.
    fn stop(&mut self) -> Result<()>;

    /// Discard all pending primitives.
    fn clear_queue(&mut self) -> Result<()>;
}
