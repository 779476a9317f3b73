//! Game clock backed by the embassy time driver.

use crate::timing::{Clock, TickInstant};

/// Millisecond clock for the frame loop. Wraps after ~49 days, which the
/// frame timer tolerates.
#[derive(Clone, Copy, Debug, Default)]
pub struct BadgeClock;

impl Clock for BadgeClock {
    fn now(&mut self) -> TickInstant {
        TickInstant::from_ticks(embassy_time::Instant::now().as_millis() as u32)
    }
}
