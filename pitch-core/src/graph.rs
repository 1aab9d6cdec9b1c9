//! # Graph Mapping
//!
//! Pure functions that place a frequency on the history graph. The vertical
//! axis spans a single octave and wraps, so the same pitch class always sits
//! at the same height; the color follows the same position around a hue
//! wheel.

use crate::transpose::Transpose;
use crate::tuning::{self, NoteName};

/// Height of the graph's vertical span in graph units.
pub const GRAPH_HEIGHT: f32 = 400.0;

pub const SATURATION: f32 = 0.7;
pub const LIGHTNESS: f32 = 0.5;

/// Octave-wrapped vertical position of `freq` in `[0, GRAPH_HEIGHT)`.
///
/// # Arguments
/// * `freq` - Frequency in Hz
///
/// # Returns
/// The fractional part of `log2(freq / 440) + 4` scaled to the graph
/// height, so every A lands at 0. Frequencies below 20 Hz map to 0.
pub fn graph_y(freq: f32) -> f32 {
    if !(freq >= tuning::MIN_NOTE_FREQUENCY) {
        return 0.0;
    }
    let position = ((freq / tuning::A4_FREQUENCY).log2() + 4.0).rem_euclid(1.0);
    // rem_euclid can round up to exactly 1.0 for tiny negative inputs
    if position >= 1.0 { 0.0 } else { position * GRAPH_HEIGHT }
}

/// A color in HSL space. Hue in degrees, the rest in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    /// Converts to RGB components in `[0, 1]`.
    pub fn to_rgb(self) -> [f32; 3] {
        let chroma = (1.0 - (2.0 * self.lightness - 1.0).abs()) * self.saturation;
        let sector = self.hue.rem_euclid(360.0) / 60.0;
        let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = self.lightness - chroma / 2.0;
        [r + m, g + m, b + m]
    }
}

/// Color for a graph position: hue runs once around the wheel per octave.
pub fn color(y: f32) -> Hsl {
    Hsl {
        hue: (y / GRAPH_HEIGHT) * 360.0,
        saturation: SATURATION,
        lightness: LIGHTNESS,
    }
}

/// Color for a frequency, via its graph position.
pub fn frequency_color(freq: f32) -> Hsl {
    color(graph_y(freq))
}

/// One horizontal grid line of the pitch axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLabel {
    /// Name shown on the legend, after transposition.
    pub name: NoteName,
    pub y: f32,
}

/// Grid lines for every pitch class.
///
/// Lines are positioned by the untransposed pitch class so they line up with
/// points plotted from detected frequencies, and labelled with the
/// transposed name so the legend matches the displayed notes.
pub fn axis_labels(transpose: Transpose) -> Vec<AxisLabel> {
    NoteName::ALL
        .iter()
        .map(|&name| {
            let (label, _) = transpose.note_name(name, 4);
            AxisLabel {
                name: label,
                y: graph_y(name.base_frequency()),
            }
        })
        .collect()
}
