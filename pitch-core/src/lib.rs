// pitch-core/src/lib.rs

//! The core logic for the voice pitch tracker.
//! This crate is responsible for audio capture, pitch detection, note
//! mapping, transposition and the rolling pitch history. It is completely
//! headless and contains no GUI code.

pub mod audio;
pub mod config;
pub mod error;
pub mod fft;
pub mod graph;
pub mod history;
pub mod pitch;
pub mod session;
pub mod transpose;
pub mod tuning;

pub use config::{EstimatorConfig, TrackerConfig};
pub use error::{CaptureError, ConfigError, ParseNoteNameError, TransposeError};
pub use history::{PitchHistory, PitchPoint};
pub use pitch::{AudioFrame, PitchEstimator};
pub use session::{FrameSource, Reading, Tracker};
pub use transpose::Transpose;
pub use tuning::{NoteName, NoteResult};
