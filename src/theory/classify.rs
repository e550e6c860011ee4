use crate::analysis::types::{Classification, NoteFunction};
use crate::theory::chords::{chord_intervals, parse_chord_symbol};

/// Tension intervals relative to the root, reduced mod 12 (9th, 11th, 13th).
const TENSIONS: [i32; 4] = [1, 2, 5, 9];

/// Classify a note against the chord sounding under it.
///
/// The interval from the chord root is reduced mod 12 before comparison, so
/// octave placement never affects the result.
pub fn classify_note(pitch: i32, chord_symbol: &str) -> (Classification, NoteFunction) {
    let (root_pc, _) = parse_chord_symbol(chord_symbol);
    let interval = (pitch.rem_euclid(12) - root_pc).rem_euclid(12);

    if chord_intervals(chord_symbol).contains(&interval) {
        let function = match interval {
            0 => NoteFunction::Root,
            3 | 4 => NoteFunction::Third,
            6 | 7 | 8 => NoteFunction::Fifth,
            10 | 11 => NoteFunction::Seventh,
            _ => NoteFunction::ChordTone,
        };
        return (Classification::ChordTone, function);
    }

    if TENSIONS.contains(&interval) {
        let function = match interval {
            1 | 2 => NoteFunction::Ninth,
            5 => NoteFunction::Eleventh,
            _ => NoteFunction::Thirteenth,
        };
        return (Classification::Tension, function);
    }

    (Classification::Outside, NoteFunction::Chromatic)
}
