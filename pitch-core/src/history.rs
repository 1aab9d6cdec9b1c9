//! # Pitch History
//!
//! A time-windowed, append-only record of detected pitches for the
//! scrolling graph. Points arrive in timestamp order from the frame loop,
//! so eviction only ever pops from the front.

use std::collections::VecDeque;

use crate::tuning::NoteResult;

/// Default length of the rolling window in seconds.
pub const WINDOW_SECONDS: f64 = 15.0;

/// One detected pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchPoint {
    /// Seconds since the listening session started.
    pub timestamp: f64,
    /// Detected frequency in Hz, before transposition.
    pub frequency: f32,
    /// Note after transposition.
    pub note: NoteResult,
}

/// Rolling history of [`PitchPoint`]s.
#[derive(Debug, Clone)]
pub struct PitchHistory {
    points: VecDeque<PitchPoint>,
    window_secs: f64,
}

impl Default for PitchHistory {
    fn default() -> Self {
        Self::new(WINDOW_SECONDS)
    }
}

impl PitchHistory {
    pub fn new(window_secs: f64) -> Self {
        Self {
            points: VecDeque::new(),
            window_secs,
        }
    }

    pub fn window_secs(&self) -> f64 {
        self.window_secs
    }

    /// Appends `point` and evicts everything that has left the window.
    ///
    /// The new point's timestamp is the current session time: afterwards
    /// every retained point satisfies `point.timestamp - old.timestamp < window`.
    ///
    /// # Arguments
    /// * `point` - The newest detection; its timestamp must not be earlier
    ///   than the last appended one
    pub fn append(&mut self, point: PitchPoint) {
        debug_assert!(
            self.latest().is_none_or(|last| last.timestamp <= point.timestamp),
            "pitch points must arrive in timestamp order"
        );

        let now = point.timestamp;
        self.points.push_back(point);
        while let Some(oldest) = self.points.front() {
            if now - oldest.timestamp < self.window_secs {
                break;
            }
            self.points.pop_front();
        }
    }

    /// Drops every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points from oldest to newest.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &PitchPoint> + '_ {
        self.points.iter()
    }

    pub fn latest(&self) -> Option<&PitchPoint> {
        self.points.back()
    }

    /// Timestamps of the oldest and newest retained points.
    pub fn span(&self) -> Option<(f64, f64)> {
        Some((self.points.front()?.timestamp, self.points.back()?.timestamp))
    }
}
