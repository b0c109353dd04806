//! Fixed-timestep game clock using an accumulator pattern.
//!
//! `draw_web()` calls at ~60fps with variable delta. GameTime converts this
//! into a fixed number of discrete ticks per second. Ticks only drive
//! animation timers and the autosave cadence — banana accrual itself is
//! strictly click-driven.

pub struct GameTime {
    /// Milliseconds per tick (e.g. 100ms = 10 ticks/sec)
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// Create a new GameTime with the given tick rate.
    /// `ticks_per_sec`: how many game ticks per real-time second (e.g. 10).
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed wall-clock timestamp (from `performance.now()` or similar).
    /// Returns the number of discrete ticks to process this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => {
                let d = now_ms - prev;
                // Clamp to avoid spiral-of-death if tab was backgrounded
                d.clamp(0.0, 500.0)
            }
            None => 0.0, // First frame: no delta
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}
