pub mod ring;
pub mod timer;

use self::ring::RingBuffer;
use self::timer::PhaseTimers;

/// Number of frame times kept for the rolling stats.
const FRAME_HISTORY_LEN: usize = 300;
/// How often to log frame stats (seconds of frame time).
const LOG_INTERVAL: f64 = 5.0;

/// Rolling frame statistics with a periodic log line.
pub struct FrameStats {
    pub frame_times: RingBuffer<f64>,
    pub fps: f64,
    pub frame_time_avg: f64,
    pub frame_time_min: f64,
    pub frame_time_max: f64,
    frame_count: u64,
    log_timer: f64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            frame_time_min: 0.0,
            frame_time_max: 0.0,
            frame_count: 0,
            log_timer: 0.0,
        }
    }

    /// Record a frame time in seconds. Returns true when a log line was emitted.
    pub fn record_frame(&mut self, dt: f64, timers: &PhaseTimers, entities: usize) -> bool {
        self.frame_count += 1;
        self.frame_times.push(dt);

        let len = self.frame_times.len();
        let mut sum = 0.0;
        let mut min = f64::MAX;
        let mut max = 0.0f64;
        for &t in self.frame_times.iter() {
            sum += t;
            min = min.min(t);
            max = max.max(t);
        }
        self.frame_time_avg = sum / len as f64;
        self.frame_time_min = min;
        self.frame_time_max = max;
        self.fps = if self.frame_time_avg > 0.0 {
            1.0 / self.frame_time_avg
        } else {
            0.0
        };

        self.log_timer += dt;
        if self.log_timer < LOG_INTERVAL {
            return false;
        }
        self.log_timer = 0.0;
        log::info!(
            "FPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | entities: {} | tick: {} | total frames: {}",
            self.fps,
            self.frame_time_avg * 1000.0,
            self.frame_time_min * 1000.0,
            self.frame_time_max * 1000.0,
            entities,
            timers.summary(),
            self.frame_count,
        );
        true
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logs_once_per_interval() {
        let mut stats = FrameStats::new();
        let timers = PhaseTimers::new();
        let mut logged = 0;
        // 11 seconds at 100 fps.
        for _ in 0..1_100 {
            if stats.record_frame(0.01, &timers, 10) {
                logged += 1;
            }
        }
        assert_eq!(logged, 2);
        assert_eq!(stats.frame_count(), 1_100);
        assert!((stats.fps - 100.0).abs() < 1e-6);
    }
}
