//! # Tracking Session
//!
//! Ties the pipeline together: each tick pulls one frame from the capture
//! source, estimates its pitch, applies the transposition, maps it to a note
//! and appends it to the history. Everything runs on the caller's thread;
//! the caller drives [`Tracker::tick`] from its refresh timer and applies
//! user actions between ticks.

use std::time::Instant;
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::history::{PitchHistory, PitchPoint};
use crate::pitch::{AudioFrame, PitchEstimator};
use crate::transpose::Transpose;
use crate::tuning::{self, NoteResult};

/// Supplier of audio frames for a running session.
///
/// A session owns its source exclusively; pulling a frame and releasing the
/// source are the only operations the tracker performs on it.
pub trait FrameSource {
    /// The most recent frame, if one is available. Must not block.
    fn pull_frame(&mut self) -> Option<AudioFrame>;

    /// Releases the underlying device.
    fn release(self)
    where
        Self: Sized,
    {
    }
}

/// The values currently on display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Frequency after transposition, in Hz.
    pub frequency: f32,
    pub note: NoteResult,
}

struct ActiveSession<S> {
    source: S,
    started_at: Instant,
}

/// Owns the session state, the history and the transposition setting.
pub struct Tracker<S: FrameSource> {
    estimator: PitchEstimator,
    history: PitchHistory,
    transpose: Transpose,
    session: Option<ActiveSession<S>>,
    reading: Option<Reading>,
}

impl<S: FrameSource> Tracker<S> {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            estimator: PitchEstimator::new(config.estimator.clone()),
            history: PitchHistory::new(config.history_window_secs),
            transpose: Transpose::ZERO,
            session: None,
            reading: None,
        }
    }

    /// Starts listening on `source`. Timestamps count from `now`.
    ///
    /// An already running session is stopped first.
    pub fn start(&mut self, source: S, now: Instant) {
        if self.session.is_some() {
            self.stop();
        }
        info!("listening session started");
        self.session = Some(ActiveSession { source, started_at: now });
    }

    /// Stops listening, releases the source and resets history and reading.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.take() {
            session.source.release();
            info!(points = self.history.len(), "listening session stopped");
        }
        self.history.clear();
        self.reading = None;
    }

    pub fn is_listening(&self) -> bool {
        self.session.is_some()
    }

    /// Seconds since the session started, or `None` when not listening.
    pub fn session_time(&self, now: Instant) -> Option<f64> {
        self.session
            .as_ref()
            .map(|session| now.saturating_duration_since(session.started_at).as_secs_f64())
    }

    /// Runs one iteration of the frame loop.
    ///
    /// Returns the point appended to the history, or `None` when not
    /// listening, no frame was available, or no pitch was detected. In the
    /// last two cases the current reading is left as it was.
    pub fn tick(&mut self, now: Instant) -> Option<PitchPoint> {
        let session = self.session.as_mut()?;
        let frame = session.source.pull_frame()?;
        let timestamp = now.saturating_duration_since(session.started_at).as_secs_f64();

        let detected = self.estimator.estimate(&frame)?;
        let shifted = self.transpose.frequency(detected);
        let note = tuning::to_note(shifted)?;

        let point = PitchPoint {
            timestamp,
            frequency: detected,
            note,
        };
        self.history.append(point);
        self.reading = Some(Reading { frequency: shifted, note });
        Some(point)
    }

    /// Empties the history without stopping the session.
    pub fn clear_history(&mut self) {
        debug!(points = self.history.len(), "history cleared");
        self.history.clear();
    }

    /// Changes the transposition for subsequent ticks.
    pub fn set_transpose(&mut self, transpose: Transpose) {
        if transpose != self.transpose {
            debug!(semitones = transpose.semitones(), "transpose changed");
        }
        self.transpose = transpose;
    }

    pub fn transpose(&self) -> Transpose {
        self.transpose
    }

    pub fn history(&self) -> &PitchHistory {
        &self.history
    }

    pub fn reading(&self) -> Option<&Reading> {
        self.reading.as_ref()
    }
}

impl<S: FrameSource> Drop for Tracker<S> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            session.source.release();
        }
    }
}
