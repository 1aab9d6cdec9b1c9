//! # Transposition
//!
//! Shifts frequencies and note names by a whole number of semitones, e.g.
//! to read a B-flat instrument in written pitch.

use crate::error::TransposeError;
use crate::tuning::NoteName;

/// Largest supported shift in either direction.
pub const MAX_SEMITONES: i32 = 12;

/// A session-wide semitone offset in `[-12, 12]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Transpose(i32);

impl Transpose {
    pub const ZERO: Transpose = Transpose(0);

    pub fn new(semitones: i32) -> Result<Self, TransposeError> {
        if (-MAX_SEMITONES..=MAX_SEMITONES).contains(&semitones) {
            Ok(Transpose(semitones))
        } else {
            Err(TransposeError::OutOfRange(semitones))
        }
    }

    /// Saturates at the ends of the range instead of failing.
    pub fn clamped(semitones: i32) -> Self {
        Transpose(semitones.clamp(-MAX_SEMITONES, MAX_SEMITONES))
    }

    pub fn semitones(self) -> i32 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Applies this offset to a frequency.
    pub fn frequency(self, freq: f32) -> f32 {
        shift_frequency(freq, self.0)
    }

    /// Applies this offset to a note.
    pub fn note_name(self, name: NoteName, octave: i32) -> (NoteName, i32) {
        shift_note_name(name, octave, self.0)
    }
}

impl TryFrom<i32> for Transpose {
    type Error = TransposeError;

    fn try_from(semitones: i32) -> Result<Self, Self::Error> {
        Transpose::new(semitones)
    }
}

/// Multiplies `freq` by `2^(semitones/12)`. Exact identity for zero.
pub fn shift_frequency(freq: f32, semitones: i32) -> f32 {
    if semitones == 0 {
        return freq;
    }
    freq * 2.0_f32.powf(semitones as f32 / 12.0)
}

/// Moves a note by `semitones`, carrying into the octave number.
///
/// # Arguments
/// * `name` - Pitch class to shift
/// * `octave` - Octave number of the note
/// * `semitones` - Signed shift; any value is accepted
///
/// # Returns
/// The shifted pitch class and octave, e.g. B3 up one semitone is C4.
pub fn shift_note_name(name: NoteName, octave: i32, semitones: i32) -> (NoteName, i32) {
    let shifted = name.index() + semitones;
    (NoteName::from_index(shifted), octave + shifted.div_euclid(12))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{reference_frequency, to_note};

    #[test]
    fn zero_is_identity() {
        assert_eq!(shift_frequency(313.7, 0), 313.7);
        assert_eq!(shift_note_name(NoteName::E, 3, 0), (NoteName::E, 3));
    }

    #[test]
    fn octave_shifts_double_and_halve() {
        assert!((shift_frequency(220.0, 12) - 440.0).abs() < 1e-3);
        assert!((shift_frequency(220.0, -12) - 110.0).abs() < 1e-3);
        assert_eq!(shift_note_name(NoteName::A, 3, 12), (NoteName::A, 4));
        assert_eq!(shift_note_name(NoteName::A, 3, -12), (NoteName::A, 2));
    }

    #[test]
    fn note_shift_wraps_across_c() {
        assert_eq!(shift_note_name(NoteName::B, 3, 1), (NoteName::C, 4));
        assert_eq!(shift_note_name(NoteName::C, 4, -1), (NoteName::B, 3));
        assert_eq!(shift_note_name(NoteName::ASharp, 2, 2), (NoteName::C, 3));
        assert_eq!(shift_note_name(NoteName::D, 5, -3), (NoteName::B, 4));
    }

    #[test]
    fn shifting_commutes_with_note_mapping() {
        // Offsets of -30..=30 cents stay clear of the rounding boundary.
        for octave in 2..=5 {
            for name in NoteName::ALL {
                for detune in [-30.0_f32, -10.0, 0.0, 15.0, 30.0] {
                    let freq = reference_frequency(name, octave) * 2.0_f32.powf(detune / 1200.0);
                    let original = to_note(freq).unwrap();
                    for semitones in -MAX_SEMITONES..=MAX_SEMITONES {
                        let via_frequency = to_note(shift_frequency(freq, semitones)).unwrap();
                        let via_name = shift_note_name(original.name, original.octave, semitones);
                        assert_eq!(
                            (via_frequency.name, via_frequency.octave),
                            via_name,
                            "{freq} Hz shifted by {semitones}"
                        );
                        assert!((via_frequency.cents - original.cents).abs() <= 1);
                    }
                }
            }
        }
    }

    #[test]
    fn setting_is_range_checked() {
        assert_eq!(Transpose::new(12).map(Transpose::semitones), Ok(12));
        assert_eq!(Transpose::new(-12).map(Transpose::semitones), Ok(-12));
        assert_eq!(Transpose::new(13), Err(TransposeError::OutOfRange(13)));
        assert_eq!(Transpose::try_from(-20), Err(TransposeError::OutOfRange(-20)));
        assert_eq!(Transpose::clamped(40).semitones(), 12);
        assert_eq!(Transpose::clamped(-40).semitones(), -12);
        assert!(Transpose::default().is_zero());
        assert_eq!(Transpose::ZERO.frequency(440.0), 440.0);
    }
}
