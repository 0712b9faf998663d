use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Handle to a scheduled callback. Firings come back as
/// [`GameEvent::TimerFired`](super::GameEvent::TimerFired) carrying this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerId(pub u64);

/// Timer service owned by whoever drives the event loop.
///
/// Implementations must deliver firings back into the same single-consumer
/// event queue as client input, never concurrently with another event.
pub trait Scheduler {
    fn schedule_once(&mut self, delay: Duration) -> TimerId;
    fn schedule_repeating(&mut self, period: Duration) -> TimerId;
    /// Stop a timer. Unknown or already-finished ids are ignored.
    fn cancel(&mut self, id: TimerId);
}
