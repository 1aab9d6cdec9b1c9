//! # Audio Capture Module
//!
//! Real-time microphone capture using CPAL (Cross-Platform Audio Library).
//!
//! ## Features
//! - Default input device with a preferred mono `f32` configuration
//! - Fallback to the device default config, down-mixed to mono
//! - Sliding window of the most recent samples, handed over without blocking
//! - A single owned [`CaptureSession`] that releases the device on drop

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample, SupportedStreamConfig, SupportedStreamConfigRange};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::error::CaptureError;
use crate::pitch::AudioFrame;
use crate::session::FrameSource;

/// Frames queued between the audio callback and the frame loop.
const FRAME_QUEUE_DEPTH: usize = 4;

/// An open microphone stream.
///
/// The cpal stream lives on a dedicated worker thread because streams are
/// not `Send` on every host; this handle only holds the receiving end of the
/// frame channel and the worker's shutdown line.
pub struct CaptureSession {
    frames: Receiver<Vec<f32>>,
    latest: Option<Vec<f32>>,
    sample_rate: u32,
    shutdown_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl CaptureSession {
    /// Opens the default input device and starts streaming.
    ///
    /// Blocks until the device is either running or has failed to open, so
    /// on error no session exists and nothing needs cleaning up.
    pub fn start(config: &TrackerConfig) -> Result<Self, CaptureError> {
        let frame_size = config.frame_size;
        let preferred_rate = config.preferred_sample_rate;

        let (frame_tx, frame_rx) = crossbeam_channel::bounded(FRAME_QUEUE_DEPTH);
        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<u32, CaptureError>>(1);
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);

        let worker = thread::Builder::new()
            .name("audio-capture".into())
            .spawn(move || {
                let (stream, sample_rate) =
                    match open_input_stream(frame_size, preferred_rate, frame_tx) {
                        Ok(opened) => opened,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                let _ = ready_tx.send(Ok(sample_rate));

                // Parked until release; a dropped sender also wakes us.
                let _ = shutdown_rx.recv();

                if let Err(e) = stream.pause() {
                    warn!("error pausing input stream: {}", e);
                }
                drop(stream);
                debug!("capture worker finished");
            })?;

        let opened = ready_rx.recv().unwrap_or_else(|_| {
            Err(CaptureError::Backend("capture worker exited before reporting".into()))
        });

        match opened {
            Ok(sample_rate) => Ok(Self {
                frames: frame_rx,
                latest: None,
                sample_rate,
                shutdown_tx: Some(shutdown_tx),
                worker: Some(worker),
            }),
            Err(e) => {
                let _ = worker.join();
                Err(e)
            }
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("capture worker panicked during shutdown");
            }
            info!("audio capture released");
        }
    }
}

impl FrameSource for CaptureSession {
    /// Drains whatever the callback has queued and returns the newest
    /// window. Repeats the previous window when nothing new has arrived.
    fn pull_frame(&mut self) -> Option<AudioFrame> {
        while let Ok(samples) = self.frames.try_recv() {
            self.latest = Some(samples);
        }
        self.latest
            .as_ref()
            .map(|samples| AudioFrame::new(samples.clone(), self.sample_rate))
    }

    fn release(mut self) {
        self.shutdown();
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Selects a device and config, then builds and plays the input stream.
fn open_input_stream(
    frame_size: usize,
    preferred_rate: u32,
    sender: Sender<Vec<f32>>,
) -> Result<(cpal::Stream, u32), CaptureError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into()))?;

    match device.name() {
        Ok(name) => info!("Using audio input device: {}", name),
        Err(e) => warn!("input device has no readable name: {}", e),
    }

    let supported = match device.supported_input_configs() {
        Ok(configs) => find_supported_config(configs.collect(), preferred_rate),
        Err(e) => {
            debug!("could not enumerate input configs: {}", e);
            None
        }
    };
    let supported = match supported {
        Some(config) => config,
        None => device.default_input_config()?,
    };

    let sample_format = supported.sample_format();
    let sample_rate = supported.sample_rate().0;
    let config: cpal::StreamConfig = supported.into();
    debug!(?config, ?sample_format, "input stream config");

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, frame_size, sender)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, frame_size, sender)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, frame_size, sender)?,
        other => return Err(CaptureError::UnsupportedFormat(other)),
    };
    stream.play()?;

    info!("Selected sample rate: {} Hz", sample_rate);
    Ok((stream, sample_rate))
}

/// Prefers a mono `f32` config whose range covers `target_rate`.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfig> {
    configs
        .into_iter()
        .filter(|c| c.channels() == 1 && c.sample_format() == SampleFormat::F32)
        .find(|c| c.min_sample_rate().0 <= target_rate && target_rate <= c.max_sample_rate().0)
        .map(|c| c.with_sample_rate(cpal::SampleRate(target_rate)))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    frame_size: usize,
    sender: Sender<Vec<f32>>,
) -> Result<cpal::Stream, CaptureError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));
    let mut window = SlidingWindow::new(frame_size);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            window.push_interleaved(data, channels);
            if let Some(frame) = window.snapshot() {
                // A full queue means the frame loop is behind; drop this one.
                if let Err(TrySendError::Disconnected(_)) = sender.try_send(frame) {
                    debug!("frame receiver gone");
                }
            }
        },
        |err| warn!("An error occurred on the audio stream: {}", err),
        None,
    )?;
    Ok(stream)
}

/// The last `capacity` mono samples seen by the callback.
struct SlidingWindow {
    samples: Vec<f32>,
    capacity: usize,
}

impl SlidingWindow {
    fn new(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity * 2),
            capacity,
        }
    }

    /// Down-mixes interleaved samples to mono and appends them.
    fn push_interleaved<T>(&mut self, data: &[T], channels: usize)
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        for chunk in data.chunks(channels) {
            let sum: f32 = chunk.iter().map(|&s| f32::from_sample_(s)).sum();
            self.samples.push(sum / chunk.len() as f32);
        }
        if self.samples.len() > self.capacity {
            let excess = self.samples.len() - self.capacity;
            self.samples.drain(..excess);
        }
    }

    /// A copy of the window once it is full.
    fn snapshot(&self) -> Option<Vec<f32>> {
        (self.samples.len() == self.capacity).then(|| self.samples.clone())
    }
}
