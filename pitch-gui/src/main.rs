//! # Pitch Tracker - Voice Pitch GUI
//!
//! The display side of the pitch tracker: a live note readout with a cent
//! meter, and a scrolling, octave-wrapped graph of the last few seconds of
//! detected pitches.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application; runs the frame loop on each tick
//! - **Capture**: `pitch_core::audio::CaptureSession`, opened in a background
//!   task on start and released on stop or exit
//! - **Updates**: 60 FPS tick subscription, active only while listening

mod ui;

use clap::Parser;
use iced::{Element, Subscription, Task, Theme};
use pitch_core::audio::CaptureSession;
use pitch_core::{PitchPoint, Reading, Tracker, TrackerConfig, Transpose};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use ui::main_display::create_main_view;

/// Interval between frame-loop ticks (~60 FPS).
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Command line options.
#[derive(Debug, Parser)]
#[command(name = "pitch-gui", version, about = "Real-time voice pitch tracker")]
struct Args {
    /// JSON file with tracker settings; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial transposition in semitones
    #[arg(
        long,
        default_value_t = 0,
        allow_negative_numbers = true,
        value_parser = clap::value_parser!(i32).range(-12..=12)
    )]
    transpose: i32,

    /// Write the effective settings to this file and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

/// Main entry point.
///
/// Initializes logging, reads the configuration, and runs the Iced
/// application with the dark theme.
pub fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };

    if let Some(path) = &args.write_config {
        config.save(path)?;
        info!("wrote settings to {}", path.display());
        return Ok(());
    }

    let transpose = Transpose::new(args.transpose)?;

    info!("Starting pitch tracker...");
    iced::application("Pitch Tracker", PitchApp::update, PitchApp::view)
        .subscription(PitchApp::subscription)
        .theme(PitchApp::theme)
        .window(iced::window::Settings {
            exit_on_close_request: false,
            ..Default::default()
        })
        .run_with(move || (PitchApp::new(config, transpose), Task::none()))
        .map_err(|e| anyhow::anyhow!("GUI error: {e}"))
}

/// Application message types.
#[derive(Debug, Clone)]
pub enum Message {
    // Session control
    ToggleListening,
    CaptureOpened(Result<OpenedCapture, String>),
    ClearHistory,

    // Transposition
    TransposeChanged(i32),
    ResetTranspose,
    ToggleTransposeControls,

    // Capture failure notice
    DismissError,

    // Window close request
    Exit,

    // Frame loop tick
    Tick,
}

/// A freshly opened capture session on its way from the opening task to
/// `update`. Taken exactly once.
#[derive(Clone)]
pub struct OpenedCapture(Arc<Mutex<Option<CaptureSession>>>);

impl OpenedCapture {
    fn new(session: CaptureSession) -> Self {
        Self(Arc::new(Mutex::new(Some(session))))
    }

    fn take(&self) -> Option<CaptureSession> {
        self.0.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl fmt::Debug for OpenedCapture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedCapture").finish_non_exhaustive()
    }
}

/// Opens the microphone. Blocks until the device is running or has failed,
/// which may include an OS permission prompt, so it runs as a task.
async fn open_capture(config: TrackerConfig) -> Result<OpenedCapture, String> {
    CaptureSession::start(&config)
        .map(OpenedCapture::new)
        .map_err(|e| e.to_string())
}

/// Everything the view needs for one render.
#[derive(Debug, Clone)]
pub struct AppDisplayData {
    pub listening: bool,
    /// The microphone is being opened.
    pub starting: bool,
    pub reading: Option<Reading>,
    pub history: Vec<PitchPoint>,
    /// Seconds since the session started, as of the last tick.
    pub session_time: f64,
    pub window_secs: f64,
    pub transpose: Transpose,
    pub transpose_controls_visible: bool,
    pub error: Option<String>,
}

/// Main application state.
struct PitchApp {
    config: TrackerConfig,
    tracker: Tracker<CaptureSession>,
    last_tick: Option<Instant>,
    starting: bool,
    transpose_controls_visible: bool,
    error: Option<String>,
}

impl PitchApp {
    fn new(config: TrackerConfig, transpose: Transpose) -> Self {
        let mut tracker = Tracker::new(&config);
        tracker.set_transpose(transpose);
        Self {
            config,
            tracker,
            last_tick: None,
            starting: false,
            transpose_controls_visible: false,
            error: None,
        }
    }

    /// Starts opening the microphone. Ignored while an open is pending.
    fn start_listening(&mut self) -> Task<Message> {
        if self.starting {
            return Task::none();
        }
        self.starting = true;
        Task::perform(open_capture(self.config.clone()), Message::CaptureOpened)
    }

    /// Starts the session once the microphone is open.
    ///
    /// On failure nothing is started and the error is shown until dismissed.
    fn finish_starting(&mut self, opened: Result<OpenedCapture, String>) {
        self.starting = false;
        match opened.map(|capture| capture.take()) {
            Ok(Some(session)) => {
                info!(sample_rate = session.sample_rate(), "microphone opened");
                let now = Instant::now();
                self.tracker.start(session, now);
                self.last_tick = Some(now);
                self.error = None;
            }
            Ok(None) => {}
            Err(e) => {
                error!("could not start listening: {}", e);
                self.error = Some(e);
            }
        }
    }

    fn stop_listening(&mut self) {
        self.tracker.stop();
        self.last_tick = None;
    }

    /// Handles application state updates based on incoming messages.
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ToggleListening => {
                if self.tracker.is_listening() {
                    self.stop_listening();
                } else {
                    return self.start_listening();
                }
            }
            Message::CaptureOpened(opened) => self.finish_starting(opened),
            Message::ClearHistory => self.tracker.clear_history(),
            Message::TransposeChanged(semitones) => {
                self.tracker.set_transpose(Transpose::clamped(semitones));
            }
            Message::ResetTranspose => self.tracker.set_transpose(Transpose::ZERO),
            Message::ToggleTransposeControls => {
                self.transpose_controls_visible = !self.transpose_controls_visible;
            }
            Message::DismissError => self.error = None,
            Message::Exit => {
                info!("Window close requested - releasing audio");
                self.stop_listening();
                return iced::exit();
            }
            Message::Tick => {
                let now = Instant::now();
                self.last_tick = Some(now);
                self.tracker.tick(now);
            }
        }
        Task::none()
    }

    fn display_data(&self) -> AppDisplayData {
        AppDisplayData {
            listening: self.tracker.is_listening(),
            starting: self.starting,
            reading: self.tracker.reading().copied(),
            history: self.tracker.history().iter().copied().collect(),
            session_time: self
                .last_tick
                .and_then(|now| self.tracker.session_time(now))
                .unwrap_or(0.0),
            window_secs: self.tracker.history().window_secs(),
            transpose: self.tracker.transpose(),
            transpose_controls_visible: self.transpose_controls_visible,
            error: self.error.clone(),
        }
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data())
    }

    /// Ticks at ~60 FPS while listening; close requests are always watched
    /// so the microphone is released before exit.
    fn subscription(&self) -> Subscription<Message> {
        let close_requests = iced::window::close_requests().map(|_| Message::Exit);
        if self.tracker.is_listening() {
            Subscription::batch([
                close_requests,
                iced::time::every(FRAME_INTERVAL).map(|_| Message::Tick),
            ])
        } else {
            close_requests
        }
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> PitchApp {
        PitchApp::new(TrackerConfig::default(), Transpose::ZERO)
    }

    #[test]
    fn failed_open_shows_the_error() {
        let mut app = app();
        app.starting = true;
        let _ = app.update(Message::CaptureOpened(Err("microphone access was denied".into())));

        assert!(!app.starting);
        assert!(!app.tracker.is_listening());
        assert_eq!(app.display_data().error.as_deref(), Some("microphone access was denied"));

        let _ = app.update(Message::DismissError);
        assert_eq!(app.display_data().error, None);
    }

    #[test]
    fn toggle_while_opening_does_not_open_twice() {
        let mut app = app();
        app.starting = true;
        let _ = app.update(Message::ToggleListening);

        assert!(app.starting);
        assert!(!app.tracker.is_listening());
    }

    #[test]
    fn transpose_messages_clamp_and_reset() {
        let mut app = app();
        let _ = app.update(Message::TransposeChanged(15));
        assert_eq!(app.display_data().transpose.semitones(), 12);
        let _ = app.update(Message::ResetTranspose);
        assert!(app.display_data().transpose.is_zero());
    }
}
