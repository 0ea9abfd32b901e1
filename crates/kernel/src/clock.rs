/// How elapsed frame time is turned into simulation ticks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum StepMode {
    /// One tick per rendered frame, whatever the frame took. Motion speed
    /// follows the display refresh rate.
    #[default]
    PerFrame,
    /// Ticks at a fixed rate, independent of the display.
    Fixed { hz: f64 },
}

impl std::fmt::Display for StepMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepMode::PerFrame => f.write_str("per-frame"),
            StepMode::Fixed { hz } => write!(f, "fixed {hz} Hz"),
        }
    }
}

/// Longest frame delta fed to the accumulator, so a stall does not trigger a
/// burst of catch-up ticks.
pub const MAX_FRAME_DT: f64 = 0.1;

/// Highest rate accepted by [`FrameClock::fixed`].
pub const MAX_TICK_RATE: f64 = 1000.0;

/// Most ticks a single frame may request. Any larger backlog is dropped.
pub const MAX_TICKS_PER_FRAME: u32 = 120;

/// Scheduler between the render loop and [`crate::Simulation::tick`].
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    mode: StepMode,
    accumulator: f64,
}

impl FrameClock {
    pub fn new(mode: StepMode) -> Self {
        Self {
            mode,
            accumulator: 0.0,
        }
    }

    pub fn per_frame() -> Self {
        Self::new(StepMode::PerFrame)
    }

    /// Fixed-rate clock. Rates that are not finite, not positive or above
    /// [`MAX_TICK_RATE`] fall back to per-frame stepping.
    pub fn fixed(hz: f64) -> Self {
        if hz.is_finite() && hz > 0.0 && hz <= MAX_TICK_RATE {
            Self::new(StepMode::Fixed { hz })
        } else {
            tracing::warn!(hz, "invalid tick rate, stepping once per frame");
            Self::per_frame()
        }
    }

    pub fn mode(&self) -> StepMode {
        self.mode
    }

    /// Feed one frame's elapsed time in seconds and get the number of ticks
    /// to run for it, at most [`MAX_TICKS_PER_FRAME`].
    pub fn advance(&mut self, dt: f64) -> u32 {
        match self.mode {
            StepMode::PerFrame => 1,
            StepMode::Fixed { hz } => {
                let step = 1.0 / hz;
                self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
                let due = (self.accumulator / step).floor();
                if due >= f64::from(MAX_TICKS_PER_FRAME) {
                    tracing::debug!(due, "dropping tick backlog");
                    self.accumulator = 0.0;
                    return MAX_TICKS_PER_FRAME;
                }
                let ticks = due as u32;
                self.accumulator = (self.accumulator - f64::from(ticks) * step).max(0.0);
                ticks
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_frame_always_one_tick() {
        let mut clock = FrameClock::per_frame();
        assert_eq!(clock.advance(0.0), 1);
        assert_eq!(clock.advance(1.0 / 144.0), 1);
        assert_eq!(clock.advance(0.5), 1);
    }

    #[test]
    fn fixed_accumulates_partial_frames() {
        let mut clock = FrameClock::fixed(60.0);
        // 120 Hz display: a tick every other frame.
        let ticks: u32 = (0..120).map(|_| clock.advance(1.0 / 120.0)).sum();
        assert!((59..=60).contains(&ticks));
    }

    #[test]
    fn fixed_runs_several_ticks_for_a_slow_frame() {
        let mut clock = FrameClock::fixed(100.0);
        assert_eq!(clock.advance(0.055), 5);
    }

    #[test]
    fn fixed_clamps_long_stalls() {
        let mut clock = FrameClock::fixed(60.0);
        let ticks = clock.advance(5.0);
        assert!((5..=6).contains(&ticks));
    }

    #[test]
    fn rates_above_ceiling_fall_back_to_per_frame() {
        let mut clock = FrameClock::fixed(1e20);
        assert_eq!(clock.mode(), StepMode::PerFrame);
        assert_eq!(clock.advance(1.0 / 60.0), 1);
        assert_eq!(
            FrameClock::fixed(MAX_TICK_RATE).mode(),
            StepMode::Fixed { hz: 1000.0 }
        );
    }

    #[test]
    fn huge_rate_caps_ticks_per_frame() {
        // Built directly so the rate ceiling in `fixed` is bypassed.
        for hz in [1e10, 1e20, f64::MAX] {
            let mut clock = FrameClock::new(StepMode::Fixed { hz });
            assert_eq!(clock.advance(1.0 / 60.0), MAX_TICKS_PER_FRAME);
            assert_eq!(clock.advance(0.1), MAX_TICKS_PER_FRAME);
        }
    }

    #[test]
    fn max_rate_runs_uncapped_below_the_limit() {
        let mut clock = FrameClock::fixed(MAX_TICK_RATE);
        assert_eq!(clock.advance(0.0505), 50);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut clock = FrameClock::fixed(60.0);
        assert_eq!(clock.advance(-1.0), 0);
    }

    #[test]
    fn invalid_rate_falls_back_to_per_frame() {
        assert_eq!(FrameClock::fixed(0.0).mode(), StepMode::PerFrame);
        assert_eq!(FrameClock::fixed(f64::NAN).mode(), StepMode::PerFrame);
    }
}
