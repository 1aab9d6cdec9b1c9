//! End-to-end tests of the tracking pipeline with a synthetic voice.
//!
//! A scripted source plays the role of the microphone, producing one frame
//! per 60 Hz tick, so the whole chain (estimate, transpose, note mapping,
//! history window) runs exactly as it does behind the GUI.

use std::f32::consts::PI;
use std::time::{Duration, Instant};

use pitch_core::graph;
use pitch_core::tuning::{reference_frequency, to_note};
use pitch_core::{AudioFrame, FrameSource, NoteName, Tracker, TrackerConfig, Transpose};

const SAMPLE_RATE: u32 = 44100;
const TICK: Duration = Duration::from_micros(16_667);

/// Sings `notes` in turn, one per `hold` ticks, with a silent gap after each.
struct SyntheticSinger {
    notes: Vec<f32>,
    hold: usize,
    gap: usize,
    tick: usize,
    frame_size: usize,
}

impl SyntheticSinger {
    fn new(notes: Vec<f32>, hold: usize, gap: usize) -> Self {
        Self {
            notes,
            hold,
            gap,
            tick: 0,
            frame_size: TrackerConfig::default().frame_size,
        }
    }
}

impl FrameSource for SyntheticSinger {
    fn pull_frame(&mut self) -> Option<AudioFrame> {
        let period = self.hold + self.gap;
        let slot = self.tick / period;
        let within = self.tick % period;
        self.tick += 1;

        let freq = *self.notes.get(slot % self.notes.len())?;
        let amplitude = if within < self.hold { 0.5 } else { 0.0 };
        let samples = (0..self.frame_size)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                amplitude * ((2.0 * PI * freq * t).sin() + 0.4 * (4.0 * PI * freq * t).sin())
            })
            .collect();
        Some(AudioFrame::new(samples, SAMPLE_RATE))
    }
}

fn run(tracker: &mut Tracker<SyntheticSinger>, start: Instant, ticks: u32) -> Vec<(NoteName, i32)> {
    (0..ticks)
        .filter_map(|i| tracker.tick(start + TICK * i))
        .map(|point| (point.note.name, point.note.octave))
        .collect()
}

#[test]
fn scale_is_tracked_note_by_note() -> anyhow::Result<()> {
    let scale = [NoteName::C, NoteName::D, NoteName::E, NoteName::G];
    let freqs = scale.iter().map(|&n| reference_frequency(n, 3)).collect();

    let config = TrackerConfig::default();
    let mut tracker = Tracker::new(&config);
    let start = Instant::now();
    tracker.start(SyntheticSinger::new(freqs, 10, 5), start);

    let notes = run(&mut tracker, start, 60);

    // Ten voiced ticks per note, the gaps contribute nothing.
    assert_eq!(notes.len(), 40);
    for (i, chunk) in notes.chunks(10).enumerate() {
        assert!(chunk.iter().all(|&n| n == (scale[i], 3)), "note {i}: {chunk:?}");
    }
    for point in tracker.history().iter() {
        assert!(point.note.cents.abs() <= 5, "{point:?}");
    }
    Ok(())
}

#[test]
fn history_window_holds_over_a_long_session() -> anyhow::Result<()> {
    let config = TrackerConfig::default();
    let mut tracker = Tracker::new(&config);
    let start = Instant::now();
    tracker.start(SyntheticSinger::new(vec![220.0, 330.0], 30, 0), start);

    // 25 seconds of ticks
    let ticks = 25 * 60;
    for i in 0..ticks {
        let now = start + TICK * i;
        tracker.tick(now);
        let session_time = tracker
            .session_time(now)
            .ok_or_else(|| anyhow::anyhow!("session ended early"))?;
        assert!(
            tracker
                .history()
                .iter()
                .all(|p| session_time - p.timestamp < config.history_window_secs)
        );
    }

    let (oldest, newest) = tracker
        .history()
        .span()
        .ok_or_else(|| anyhow::anyhow!("history is empty"))?;
    assert!(newest - oldest < config.history_window_secs);
    assert!(newest - oldest > config.history_window_secs - 0.1);
    Ok(())
}

#[test]
fn transposed_labels_match_transposed_points() -> anyhow::Result<()> {
    let config = TrackerConfig::default();
    let mut tracker = Tracker::new(&config);
    let transpose = Transpose::new(-3)?;
    tracker.set_transpose(transpose);
    let start = Instant::now();
    tracker.start(SyntheticSinger::new(vec![reference_frequency(NoteName::A, 3)], 5, 0), start);

    let point = tracker
        .tick(start)
        .ok_or_else(|| anyhow::anyhow!("no pitch detected"))?;
    assert_eq!((point.note.name, point.note.octave), (NoteName::FSharp, 3));

    // The grid line the point sits on carries the point's own name. The
    // axis wraps, so distance is measured around the octave.
    let y = graph::graph_y(point.frequency);
    let distance = |label_y: f32| {
        let d = (label_y - y).abs();
        d.min(graph::GRAPH_HEIGHT - d)
    };
    let nearest = graph::axis_labels(transpose)
        .into_iter()
        .min_by(|a, b| distance(a.y).total_cmp(&distance(b.y)))
        .ok_or_else(|| anyhow::anyhow!("no axis labels"))?;
    assert_eq!(nearest.name, point.note.name);

    // Untransposed, the detected frequency still maps to A.
    assert_eq!(to_note(point.frequency).map(|n| n.name), Some(NoteName::A));
    Ok(())
}

#[test]
fn stop_then_restart_begins_a_fresh_session() -> anyhow::Result<()> {
    let config = TrackerConfig::default();
    let mut tracker = Tracker::new(&config);
    let start = Instant::now();
    tracker.start(SyntheticSinger::new(vec![300.0], 100, 0), start);
    run(&mut tracker, start, 30);
    assert_eq!(tracker.history().len(), 30);

    tracker.stop();
    assert!(tracker.history().is_empty());
    assert!(tracker.reading().is_none());

    let restart = start + Duration::from_secs(60);
    tracker.start(SyntheticSinger::new(vec![300.0], 100, 0), restart);
    let point = tracker
        .tick(restart + Duration::from_secs(1))
        .ok_or_else(|| anyhow::anyhow!("no pitch after restart"))?;
    assert!((point.timestamp - 1.0).abs() < 1e-9);
    Ok(())
}
