//! Game clock with fixed-timestep accumulator

/// Tracks game time and meters out fixed physics steps.
///
/// The caller feeds frame time through [`advance`](Self::advance); the clock
/// never reads the wall clock itself, so runs are reproducible.
#[derive(Debug, Clone)]
pub struct GameClock {
    /// Total elapsed game time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Fixed timestep interval (default: 1/50 second)
    pub fixed_timestep: f64,
    /// Upper bound on a single frame's delta
    pub max_delta: f64,
    /// Number of fixed steps consumed so far
    pub fixed_steps: u64,
    /// Number of frames advanced so far
    pub frames: u64,
    accumulator: f64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            fixed_timestep: 1.0 / 50.0,
            max_delta: 0.25,
            fixed_steps: 0,
            frames: 0,
            accumulator: 0.0,
        }
    }
}

impl GameClock {
    /// Create a new game clock with the default 50Hz fixed timestep
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a game clock with a custom fixed rate
    pub fn with_fixed_rate(hz: f64) -> Self {
        Self {
            fixed_timestep: 1.0 / hz,
            ..Self::default()
        }
    }

    /// Advance the clock by one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        // Clamp to avoid spiral of death
        self.delta_time = dt.clamp(0.0, self.max_delta);
        self.total_time += self.delta_time;
        self.accumulator += self.delta_time;
        self.frames += 1;
    }

    /// Returns true if there's enough accumulated time for a fixed update step
    pub fn should_fixed_update(&self) -> bool {
        self.accumulator >= self.fixed_timestep
    }

    /// Consume one fixed timestep from the accumulator
    pub fn consume_fixed_step(&mut self) {
        self.accumulator -= self.fixed_timestep;
        self.fixed_steps += 1;
    }
}
