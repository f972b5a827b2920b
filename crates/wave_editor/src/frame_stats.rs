//! Rolling frame-time statistics for the performance overlay

/// Number of frames kept
pub const FRAME_HISTORY: usize = 120;

/// Ring buffer of recent frame times in milliseconds
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_times: [f32; FRAME_HISTORY],
    offset: usize,
    recorded: usize,
}

impl FrameStats {
    pub fn new() -> Self {
        Self {
            frame_times: [0.0; FRAME_HISTORY],
            offset: 0,
            recorded: 0,
        }
    }

    /// Record one frame of `delta_time` seconds
    pub fn record(&mut self, delta_time: f32) {
        self.frame_times[self.offset] = delta_time * 1000.0;
        self.offset = (self.offset + 1) % FRAME_HISTORY;
        self.recorded = (self.recorded + 1).min(FRAME_HISTORY);
    }

    fn samples(&self) -> &[f32] {
        if self.recorded < FRAME_HISTORY {
            &self.frame_times[..self.recorded]
        } else {
            &self.frame_times
        }
    }

    /// Average frame time in milliseconds
    pub fn average_ms(&self) -> f32 {
        let samples = self.samples();
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    pub fn min_ms(&self) -> f32 {
        self.samples().iter().copied().reduce(f32::min).unwrap_or(0.0)
    }

    pub fn max_ms(&self) -> f32 {
        self.samples().iter().copied().reduce(f32::max).unwrap_or(0.0)
    }

    /// Frames per second derived from the average frame time
    ///
    /// Falls back to 60 while the average is too small to divide by.
    pub fn fps(&self) -> f32 {
        let avg = self.average_ms();
        1000.0 / if avg > 0.001 { avg } else { 16.66 }
    }

    /// Samples oldest first, for plotting
    pub fn history(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.recorded);
        if self.recorded < FRAME_HISTORY {
            out.extend_from_slice(&self.frame_times[..self.recorded]);
        } else {
            out.extend_from_slice(&self.frame_times[self.offset..]);
            out.extend_from_slice(&self.frame_times[..self.offset]);
        }
        out
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        format!(
            "{:.0} FPS | Avg: {:.2} ms | Min: {:.2} ms | Max: {:.2} ms",
            self.fps(),
            self.average_ms(),
            self.min_ms(),
            self.max_ms()
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = FrameStats::new();
        assert_eq!(stats.average_ms(), 0.0);
        assert_eq!(stats.max_ms(), 0.0);
        assert!((stats.fps() - 1000.0 / 16.66).abs() < 0.01);
        assert!(stats.history().is_empty());
    }

    #[test]
    fn test_average_min_max() {
        let mut stats = FrameStats::new();
        stats.record(0.010);
        stats.record(0.020);
        stats.record(0.030);
        assert!((stats.average_ms() - 20.0).abs() < 0.001);
        assert!((stats.min_ms() - 10.0).abs() < 0.001);
        assert!((stats.max_ms() - 30.0).abs() < 0.001);
        assert!((stats.fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_ring_buffer_wraps() {
        let mut stats = FrameStats::new();
        stats.record(1.0);
        for _ in 0..FRAME_HISTORY {
            stats.record(0.005);
        }
        // The 1 s spike has been overwritten
        assert!((stats.max_ms() - 5.0).abs() < 0.001);

        stats.record(0.010);
        let history = stats.history();
        assert_eq!(history.len(), FRAME_HISTORY);
        assert!((history[FRAME_HISTORY - 1] - 10.0).abs() < 0.001);
    }
}
