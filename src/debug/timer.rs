use instant::Instant;

/// Which step of a backdrop tick is being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TickPhase {
    Fade = 0,
    Particles = 1,
    Links = 2,
    Nodes = 3,
}

impl TickPhase {
    pub const ALL: [TickPhase; 4] = [Self::Fade, Self::Particles, Self::Links, Self::Nodes];

    pub fn label(self) -> &'static str {
        match self {
            Self::Fade => "fade",
            Self::Particles => "particles",
            Self::Links => "links",
            Self::Nodes => "nodes",
        }
    }
}

const EMA_ALPHA: f64 = 0.1;

/// Per-phase timing with exponential moving average smoothing.
pub struct PhaseTimers {
    /// EMA-smoothed duration in microseconds per phase.
    pub durations_us: [f64; 4],
    start: Instant,
}

impl PhaseTimers {
    pub fn new() -> Self {
        Self {
            durations_us: [0.0; 4],
            start: Instant::now(),
        }
    }

    pub fn begin(&mut self) {
        self.start = Instant::now();
    }

    /// Record time since `begin()` for `phase`, then restart the clock so
    /// consecutive phases can be chained.
    pub fn lap(&mut self, phase: TickPhase) {
        let now = Instant::now();
        let elapsed_us = now.duration_since(self.start).as_secs_f64() * 1_000_000.0;
        self.record(phase, elapsed_us);
        self.start = now;
    }

    fn record(&mut self, phase: TickPhase, elapsed_us: f64) {
        let idx = phase as usize;
        self.durations_us[idx] =
            self.durations_us[idx] * (1.0 - EMA_ALPHA) + elapsed_us * EMA_ALPHA;
    }

    /// Sum of all phase durations (microseconds).
    #[cfg(test)]
    pub fn total_us(&self) -> f64 {
        self.durations_us.iter().sum()
    }

    /// `fade=1.2us particles=...` for log lines.
    pub fn summary(&self) -> String {
        TickPhase::ALL
            .iter()
            .map(|p| format!("{}={:.1}us", p.label(), self.durations_us[*p as usize]))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
