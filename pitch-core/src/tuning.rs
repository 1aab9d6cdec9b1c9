//! # Musical Tuning Module
//!
//! Maps frequencies onto 12-tone equal temperament: pitch class, octave and
//! cent deviation from the nearest tempered note, with A4 = 440 Hz.
//!
//! All values are computed directly from logarithms rather than looked up in
//! a table, so sub-semitone accuracy is preserved at any frequency.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseNoteNameError;

/// Concert pitch reference.
pub const A4_FREQUENCY: f32 = 440.0;

/// Frequencies below this are not treated as musical notes.
pub const MIN_NOTE_FREQUENCY: f32 = 20.0;

/// C0, 57 semitones (4.75 octaves) below A4.
pub fn c0_frequency() -> f32 {
    A4_FREQUENCY * 2.0_f32.powf(-4.75)
}

/// One of the twelve pitch classes, indexed from C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteName {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl NoteName {
    /// All pitch classes in ascending order starting from C.
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::CSharp,
        NoteName::D,
        NoteName::DSharp,
        NoteName::E,
        NoteName::F,
        NoteName::FSharp,
        NoteName::G,
        NoteName::GSharp,
        NoteName::A,
        NoteName::ASharp,
        NoteName::B,
    ];

    /// Position within the octave, C = 0 through B = 11.
    pub fn index(self) -> i32 {
        self as i32
    }

    /// Pitch class for any semitone index; wraps outside `0..12`.
    pub fn from_index(index: i32) -> NoteName {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteName::C => "C",
            NoteName::CSharp => "C#",
            NoteName::D => "D",
            NoteName::DSharp => "D#",
            NoteName::E => "E",
            NoteName::F => "F",
            NoteName::FSharp => "F#",
            NoteName::G => "G",
            NoteName::GSharp => "G#",
            NoteName::A => "A",
            NoteName::ASharp => "A#",
            NoteName::B => "B",
        }
    }

    /// Frequency of this pitch class in octave 4.
    pub fn base_frequency(self) -> f32 {
        reference_frequency(self, 4)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteName {
    type Err = ParseNoteNameError;

    /// Accepts sharp spellings ("C#") and the flat spellings of the same
    /// pitch classes ("Db").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = match s.trim() {
            "C" => NoteName::C,
            "C#" | "Db" => NoteName::CSharp,
            "D" => NoteName::D,
            "D#" | "Eb" => NoteName::DSharp,
            "E" => NoteName::E,
            "F" => NoteName::F,
            "F#" | "Gb" => NoteName::FSharp,
            "G" => NoteName::G,
            "G#" | "Ab" => NoteName::GSharp,
            "A" => NoteName::A,
            "A#" | "Bb" => NoteName::ASharp,
            "B" => NoteName::B,
            other => return Err(ParseNoteNameError(other.to_string())),
        };
        Ok(name)
    }
}

/// A frequency expressed as the nearest tempered note plus deviation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteResult {
    pub name: NoteName,
    pub octave: i32,
    /// Deviation from the tempered note; positive is sharp.
    pub cents: i32,
}

impl fmt::Display for NoteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {:+}¢", self.name, self.octave, self.cents)
    }
}

/// Tempered frequency of `name` in `octave`.
pub fn reference_frequency(name: NoteName, octave: i32) -> f32 {
    let semitones_above_c0 = octave * 12 + name.index();
    c0_frequency() * 2.0_f32.powf(semitones_above_c0 as f32 / 12.0)
}

/// Calculates the deviation from a target frequency in cents.
///
/// 100 cents is one semitone; positive values are sharp of the target.
pub fn cents_between(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

/// Maps a frequency to its nearest equal-tempered note.
///
/// Returns `None` for frequencies below 20 Hz or that are not finite.
///
/// The nearest semitone is chosen first and both octave and pitch class are
/// derived from it, so a pitch just below C lands on C of the next octave
/// and the deviation always stays within half a semitone.
pub fn to_note(frequency: f32) -> Option<NoteResult> {
    if !frequency.is_finite() || frequency < MIN_NOTE_FREQUENCY {
        return None;
    }

    let half_steps = 12.0 * (frequency / c0_frequency()).log2();
    let nearest = half_steps.round() as i32;
    let name = NoteName::from_index(nearest);
    let octave = nearest.div_euclid(12);

    let target = reference_frequency(name, octave);
    let cents = cents_between(frequency, target).round() as i32;

    Some(NoteResult { name, octave, cents })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concert_a_is_exact() {
        let note = to_note(440.0).unwrap();
        assert_eq!(note.name, NoteName::A);
        assert_eq!(note.octave, 4);
        assert_eq!(note.cents, 0);
    }

    #[test]
    fn middle_c_is_close_to_zero_cents() {
        let note = to_note(261.63).unwrap();
        assert_eq!(note.name, NoteName::C);
        assert_eq!(note.octave, 4);
        assert_eq!(note.cents, 0);
    }

    #[test]
    fn tempered_frequencies_have_zero_cents() {
        for octave in 2..=5 {
            for name in NoteName::ALL {
                let freq = reference_frequency(name, octave);
                let note = to_note(freq).unwrap();
                assert_eq!((note.name, note.octave, note.cents), (name, octave, 0), "{freq} Hz");
            }
        }
    }

    #[test]
    fn deviation_stays_within_half_a_semitone_over_the_voice_band() {
        let mut freq = 85.0_f32;
        while freq <= 750.0 {
            let note = to_note(freq).unwrap();
            assert!(note.cents.abs() <= 50, "{freq} Hz gave {note}");
            let reference = reference_frequency(note.name, note.octave);
            assert!(cents_between(freq, reference).abs() < 50.0 + 1e-3, "{freq} Hz");
            freq += 0.37;
        }
    }

    #[test]
    fn just_below_c_rolls_into_the_next_octave() {
        // 20 cents flat of C4
        let freq = reference_frequency(NoteName::C, 4) * 2.0_f32.powf(-20.0 / 1200.0);
        let note = to_note(freq).unwrap();
        assert_eq!(note.name, NoteName::C);
        assert_eq!(note.octave, 4);
        assert_eq!(note.cents, -20);
    }

    #[test]
    fn sharp_and_flat_are_signed() {
        let sharp = to_note(440.0 * 2.0_f32.powf(30.0 / 1200.0)).unwrap();
        assert_eq!((sharp.name, sharp.cents), (NoteName::A, 30));
        let flat = to_note(440.0 * 2.0_f32.powf(-12.0 / 1200.0)).unwrap();
        assert_eq!((flat.name, flat.cents), (NoteName::A, -12));
    }

    #[test]
    fn sub_audio_frequencies_have_no_note() {
        assert_eq!(to_note(19.9), None);
        assert_eq!(to_note(0.0), None);
        assert_eq!(to_note(f32::NAN), None);
        assert!(to_note(20.0).is_some());
    }

    #[test]
    fn base_frequencies_match_octave_four() {
        assert!((NoteName::A.base_frequency() - 440.0).abs() < 1e-3);
        assert!((NoteName::C.base_frequency() - 261.6256).abs() < 1e-2);
        let a3 = reference_frequency(NoteName::A, 3);
        assert!((a3 - 220.0).abs() < 1e-3);
    }

    #[test]
    fn names_parse_and_display() {
        for name in NoteName::ALL {
            assert_eq!(name.as_str().parse::<NoteName>(), Ok(name));
        }
        assert_eq!("Bb".parse::<NoteName>(), Ok(NoteName::ASharp));
        let err = "H".parse::<NoteName>().unwrap_err();
        assert_eq!(err, ParseNoteNameError("H".into()));
        assert_eq!(err.to_string(), "unknown note name `H`");
        assert_eq!(NoteName::from_index(-1), NoteName::B);
        assert_eq!(NoteName::from_index(13), NoteName::CSharp);

        let note = NoteResult { name: NoteName::FSharp, octave: 3, cents: -7 };
        assert_eq!(note.to_string(), "F#3 -7¢");
    }
}
