//! Frame clock
//!
//! Turns raw timestamps into frame deltas. While paused the host keeps
//! discarding, so the first delta after a resume covers one frame only.

use crate::consts::FRAME_DT;

/// Timestamp-to-delta converter
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta in seconds since the previous call. The first call (and the
    /// first after `discard`) returns the nominal frame delta.
    pub fn advance(&mut self, now_secs: f64) -> f32 {
        let dt = match self.last {
            Some(last) => (now_secs - last).max(0.0) as f32,
            None => FRAME_DT,
        };
        self.last = Some(now_secs);
        dt
    }

    /// Forget the last timestamp
    pub fn discard(&mut self) {
        self.last = None;
    }
}
