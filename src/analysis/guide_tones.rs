use crate::analysis::types::{Chorus, NoteFunction};

/// How far a note's beat may sit from beat 1 or beat 3 and still count as
/// landing on the strong beat.
const STRONG_BEAT_TOLERANCE: f64 = 0.25;

/// Count guide-tone hits: 3rds and 7ths landing on a strong beat (1 or 3)
/// in a bar where a chord change occurs.
///
/// The match key is the change's bar only; beat proximity is measured
/// against the fixed strong beats, not the change's own beat.
pub fn count_guide_tones(chorus: &Chorus) -> u32 {
    let mut hits = 0;

    for change in &chorus.tune.chord_grid {
        for note in &chorus.notes {
            if note.bar != change.bar {
                continue;
            }

            let on_strong_beat = (note.beat - 1.0).abs() < STRONG_BEAT_TOLERANCE
                || (note.beat - 3.0).abs() < STRONG_BEAT_TOLERANCE;
            if !on_strong_beat {
                continue;
            }

            if matches!(
                note.note_function,
                Some(NoteFunction::Third) | Some(NoteFunction::Seventh)
            ) {
                hits += 1;
            }
        }
    }

    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{
        ChordChange, Classification, NoteEvent, TimeSignature, Tune,
    };

    fn test_tune(chord_grid: Vec<ChordChange>) -> Tune {
        Tune {
            title: "Test Guide Tones".to_string(),
            key: "C".to_string(),
            tempo_bpm: 120.0,
            time_signature: TimeSignature {
                beats_per_bar: 4,
                beat_unit: 4,
            },
            chorus_length_bars: 4,
            chord_grid,
        }
    }

    fn change(bar: i32, beat: f64, symbol: &str) -> ChordChange {
        ChordChange {
            bar,
            beat,
            chord_symbol: symbol.to_string(),
            duration_beats: 4.0,
        }
    }

    fn guide_note(pitch: i32, bar: i32, beat: f64, function: NoteFunction) -> NoteEvent {
        NoteEvent {
            pitch,
            start_time_ms: 0,
            duration_ms: 400,
            velocity: 80,
            bar,
            beat,
            chord_at_time: None,
            classification: Some(Classification::ChordTone),
            note_function: Some(function),
        }
    }

    fn chorus_with(tune: Tune, notes: Vec<NoteEvent>) -> Chorus {
        Chorus {
            chorus_number: 1,
            tune,
            notes,
            start_time_ms: 0,
            end_time_ms: 4000,
        }
    }

    #[test]
    fn test_hits_on_strong_beats() {
        let tune = test_tune(vec![
            change(0, 1.0, "Cmaj7"),
            change(1, 1.0, "Dm7"),
        ]);
        let notes = vec![
            // E, 3rd of Cmaj7, beat 1 of bar 0
            guide_note(64, 0, 1.0, NoteFunction::Third),
            // C, 7th of Dm7, beat 1 of bar 1
            guide_note(60, 1, 1.0, NoteFunction::Seventh),
        ];
        assert_eq!(count_guide_tones(&chorus_with(tune, notes)), 2);
    }

    #[test]
    fn test_beat_three_counts() {
        let tune = test_tune(vec![change(0, 1.0, "Cmaj7")]);
        let notes = vec![guide_note(64, 0, 3.0, NoteFunction::Third)];
        assert_eq!(count_guide_tones(&chorus_with(tune, notes)), 1);
    }

    #[test]
    fn test_weak_beats_do_not_count() {
        let tune = test_tune(vec![change(0, 1.0, "Cmaj7")]);
        let notes = vec![guide_note(64, 0, 2.0, NoteFunction::Third)];
        assert_eq!(count_guide_tones(&chorus_with(tune, notes)), 0);
    }

    #[test]
    fn test_tolerance_boundary() {
        let tune = test_tune(vec![change(0, 1.0, "Cmaj7")]);
        // Just inside the window
        let inside = vec![guide_note(64, 0, 1.2, NoteFunction::Third)];
        assert_eq!(count_guide_tones(&chorus_with(tune.clone(), inside)), 1);
        // Exactly at the window edge is outside (strict comparison)
        let edge = vec![guide_note(64, 0, 1.25, NoteFunction::Third)];
        assert_eq!(count_guide_tones(&chorus_with(tune, edge)), 0);
    }

    #[test]
    fn test_non_guide_functions_do_not_count() {
        let tune = test_tune(vec![change(0, 1.0, "Cmaj7")]);
        let notes = vec![
            guide_note(60, 0, 1.0, NoteFunction::Root),
            guide_note(67, 0, 3.0, NoteFunction::Fifth),
        ];
        assert_eq!(count_guide_tones(&chorus_with(tune, notes)), 0);
    }

    #[test]
    fn test_wrong_bar_does_not_count() {
        let tune = test_tune(vec![change(0, 1.0, "Cmaj7")]);
        let notes = vec![guide_note(64, 2, 1.0, NoteFunction::Third)];
        assert_eq!(count_guide_tones(&chorus_with(tune, notes)), 0);
    }

    #[test]
    fn test_two_changes_in_one_bar_count_twice() {
        // Both changes share bar 0, so a qualifying note pairs with each
        let tune = test_tune(vec![
            change(0, 1.0, "Bbmaj7"),
            change(0, 3.0, "G7"),
        ]);
        let notes = vec![guide_note(62, 0, 1.0, NoteFunction::Third)];
        assert_eq!(count_guide_tones(&chorus_with(tune, notes)), 2);
    }
}
