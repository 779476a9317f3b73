//! Millisecond tick clock and drop-speed model.

/// Reading of the platform's millisecond tick counter. Wraps at `u32::MAX`.
pub type TickInstant = fugit::TimerInstantU32<1000>;
/// Span between two [`TickInstant`]s.
pub type TickDuration = fugit::MillisDurationU32;

/// Monotonic millisecond tick source.
pub trait Clock {
    fn now(&mut self) -> TickInstant;
}

/// Time from `earlier` to `later`, correct across one counter wraparound.
pub fn elapsed_between(earlier: TickInstant, later: TickInstant) -> TickDuration {
    TickDuration::from_ticks(later.ticks().wrapping_sub(earlier.ticks()))
}

/// Remembers the previous reading of a [`Clock`] and reports the time passed
/// since then.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    last: TickInstant,
}

impl FrameClock {
    pub fn new<C: Clock>(clock: &mut C) -> Self {
        Self { last: clock.now() }
    }

    /// Time since the previous call (or since construction).
    pub fn lap<C: Clock>(&mut self, clock: &mut C) -> TickDuration {
        let now = clock.now();
        let elapsed = elapsed_between(self.last, now);
        self.last = now;
        elapsed
    }
}

/// Drop interval as a function of cleared rows:
/// `max(min, start - decrement_per_row * rows)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedCurve {
    pub start: TickDuration,
    pub decrement_per_row: TickDuration,
    pub min: TickDuration,
}

impl SpeedCurve {
    /// Constant 300 ms per row drop.
    pub const CONSTANT: Self = Self {
        start: TickDuration::from_ticks(300),
        decrement_per_row: TickDuration::from_ticks(0),
        min: TickDuration::from_ticks(100),
    };

    pub fn interval(&self, rows: u32) -> TickDuration {
        let faster = self
            .start
            .ticks()
            .saturating_sub(self.decrement_per_row.ticks().saturating_mul(rows));
        TickDuration::from_ticks(faster.max(self.min.ticks()))
    }
}

impl Default for SpeedCurve {
    fn default() -> Self {
        Self::CONSTANT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Script<'a>(core::slice::Iter<'a, u32>);

    impl Clock for Script<'_> {
        fn now(&mut self) -> TickInstant {
            TickInstant::from_ticks(*self.0.next().unwrap_or(&0))
        }
    }

    #[test]
    fn lap_survives_counter_wraparound() {
        let readings = [u32::MAX - 5, 10, 40];
        let mut clock = Script(readings.iter());
        let mut frame = FrameClock::new(&mut clock);
        assert_eq!(frame.lap(&mut clock).ticks(), 16);
        assert_eq!(frame.lap(&mut clock).ticks(), 30);
    }

    #[test]
    fn constant_curve_never_speeds_up() {
        let curve = SpeedCurve::default();
        assert_eq!(curve.interval(0).ticks(), 300);
        assert_eq!(curve.interval(10_000).ticks(), 300);
    }

    #[test]
    fn progressive_curve_floors_at_min() {
        let curve = SpeedCurve {
            start: TickDuration::from_ticks(600),
            decrement_per_row: TickDuration::from_ticks(5),
            min: TickDuration::from_ticks(100),
        };
        assert_eq!(curve.interval(0).ticks(), 600);
        assert_eq!(curve.interval(20).ticks(), 500);
        assert_eq!(curve.interval(100).ticks(), 100);
        assert_eq!(curve.interval(u32::MAX).ticks(), 100);
    }
}
