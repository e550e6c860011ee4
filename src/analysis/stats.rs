//! Aggregate harmonic and rhythmic statistics over one chorus.

use crate::analysis::guide_tones::count_guide_tones;
use crate::analysis::types::{Chorus, Classification, HarmonicStats, NoteFunction, RhythmicStats};

/// A gap longer than this between one note's end and the next note's start
/// reads as a rest separating two phrases.
const REST_GAP_MS: i64 = 500;

/// Notes whose beat sits within this distance of an integer count as
/// downbeat notes.
const DOWNBEAT_TOLERANCE: f64 = 0.1;

pub fn harmonic_stats(chorus: &Chorus) -> HarmonicStats {
    let total_notes = chorus.notes.len();
    if total_notes == 0 {
        return HarmonicStats {
            chord_tone_ratio: 0.0,
            tension_ratio: 0.0,
            outside_ratio: 0.0,
            guide_tone_hits: 0,
            root_usage: 0.0,
        };
    }

    let count_class = |class: Classification| {
        chorus
            .notes
            .iter()
            .filter(|n| n.classification == Some(class))
            .count()
    };
    let chord_tone_count = count_class(Classification::ChordTone);
    let tension_count = count_class(Classification::Tension);
    let outside_count = count_class(Classification::Outside);
    let root_count = chorus
        .notes
        .iter()
        .filter(|n| n.note_function == Some(NoteFunction::Root))
        .count();

    let pct = |count: usize| (count as f64 / total_notes as f64) * 100.0;

    HarmonicStats {
        chord_tone_ratio: pct(chord_tone_count),
        tension_ratio: pct(tension_count),
        outside_ratio: pct(outside_count),
        guide_tone_hits: count_guide_tones(chorus),
        root_usage: pct(root_count),
    }
}

pub fn rhythmic_stats(chorus: &Chorus) -> RhythmicStats {
    let total_notes = chorus.notes.len();
    if total_notes == 0 {
        return RhythmicStats {
            downbeat_percentage: 0.0,
            offbeat_percentage: 0.0,
            average_phrase_length: 0.0,
            longest_phrase: 0,
            total_rests: 0,
        };
    }

    let downbeat_count = chorus
        .notes
        .iter()
        .filter(|n| (n.beat - n.beat.round()).abs() < DOWNBEAT_TOLERANCE)
        .count();
    let downbeat_percentage = (downbeat_count as f64 / total_notes as f64) * 100.0;

    let phrases = phrase_lengths(chorus);
    let average_phrase_length = if phrases.is_empty() {
        0.0
    } else {
        phrases.iter().sum::<u32>() as f64 / phrases.len() as f64
    };
    let longest_phrase = phrases.iter().copied().max().unwrap_or(0);
    let total_rests = phrases.len().saturating_sub(1) as u32;

    RhythmicStats {
        downbeat_percentage,
        offbeat_percentage: 100.0 - downbeat_percentage,
        average_phrase_length,
        longest_phrase,
        total_rests,
    }
}

/// Walk the notes in time order and split them into phrases wherever the
/// gap since the previous note's end exceeds the rest threshold. Returns
/// the note count of each phrase.
fn phrase_lengths(chorus: &Chorus) -> Vec<u32> {
    let mut ordered: Vec<_> = chorus.notes.iter().collect();
    ordered.sort_by_key(|n| n.start_time_ms);

    let mut phrases = Vec::new();
    let mut current_len: u32 = 0;
    let mut last_note_end: Option<i64> = None;

    for note in ordered {
        if let Some(end) = last_note_end {
            if note.start_time_ms - end > REST_GAP_MS && current_len > 0 {
                phrases.push(current_len);
                current_len = 0;
            }
        }
        current_len += 1;
        last_note_end = Some(note.end_time_ms());
    }

    if current_len > 0 {
        phrases.push(current_len);
    }

    phrases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::{ChordChange, NoteEvent, TimeSignature, Tune};

    fn test_tune() -> Tune {
        Tune {
            title: "Test Rhythm".to_string(),
            key: "C".to_string(),
            tempo_bpm: 120.0,
            time_signature: TimeSignature {
                beats_per_bar: 4,
                beat_unit: 4,
            },
            chorus_length_bars: 4,
            chord_grid: vec![ChordChange {
                bar: 0,
                beat: 1.0,
                chord_symbol: "C7".to_string(),
                duration_beats: 16.0,
            }],
        }
    }

    fn note_at(start_time_ms: i64, duration_ms: i64, beat: f64) -> NoteEvent {
        NoteEvent {
            pitch: 60,
            start_time_ms,
            duration_ms,
            velocity: 80,
            bar: 0,
            beat,
            chord_at_time: Some("C7".to_string()),
            classification: Some(Classification::ChordTone),
            note_function: Some(NoteFunction::Root),
        }
    }

    fn chorus_with(notes: Vec<NoteEvent>) -> Chorus {
        Chorus {
            chorus_number: 1,
            tune: test_tune(),
            notes,
            start_time_ms: 0,
            end_time_ms: 8000,
        }
    }

    #[test]
    fn test_empty_chorus_reports_zeros() {
        let chorus = chorus_with(vec![]);
        let harmonic = harmonic_stats(&chorus);
        assert_eq!(harmonic.chord_tone_ratio, 0.0);
        assert_eq!(harmonic.guide_tone_hits, 0);

        let rhythmic = rhythmic_stats(&chorus);
        assert_eq!(rhythmic.downbeat_percentage, 0.0);
        assert_eq!(rhythmic.average_phrase_length, 0.0);
        assert_eq!(rhythmic.longest_phrase, 0);
        assert_eq!(rhythmic.total_rests, 0);
    }

    #[test]
    fn test_harmonic_ratios() {
        let mut notes = vec![
            note_at(0, 150, 1.0),
            note_at(200, 150, 1.5),
            note_at(400, 150, 2.0),
            note_at(600, 150, 2.5),
        ];
        notes[1].classification = Some(Classification::Tension);
        notes[1].note_function = Some(NoteFunction::Ninth);
        notes[2].classification = Some(Classification::Outside);
        notes[2].note_function = Some(NoteFunction::Chromatic);

        let harmonic = harmonic_stats(&chorus_with(notes));
        assert_eq!(harmonic.chord_tone_ratio, 50.0);
        assert_eq!(harmonic.tension_ratio, 25.0);
        assert_eq!(harmonic.outside_ratio, 25.0);
        assert_eq!(harmonic.root_usage, 50.0);
    }

    #[test]
    fn test_unclassified_notes_count_toward_total() {
        let mut notes = vec![note_at(0, 150, 1.0), note_at(200, 150, 1.5)];
        // A note the grid did not cover: no chord, no classification
        notes[1].chord_at_time = None;
        notes[1].classification = None;
        notes[1].note_function = None;

        let harmonic = harmonic_stats(&chorus_with(notes));
        // One chord tone out of two total notes
        assert_eq!(harmonic.chord_tone_ratio, 50.0);
        assert_eq!(harmonic.root_usage, 50.0);
    }

    #[test]
    fn test_all_downbeats() {
        let notes = (0..4)
            .map(|i| note_at(i * 500, 400, (i + 1) as f64))
            .collect();
        let rhythmic = rhythmic_stats(&chorus_with(notes));
        assert_eq!(rhythmic.downbeat_percentage, 100.0);
        assert_eq!(rhythmic.offbeat_percentage, 0.0);
    }

    #[test]
    fn test_offbeat_detection() {
        let notes = vec![
            note_at(0, 150, 1.0),
            note_at(250, 150, 1.5),
            note_at(500, 150, 2.0),
            note_at(750, 150, 2.5),
        ];
        let rhythmic = rhythmic_stats(&chorus_with(notes));
        assert_eq!(rhythmic.downbeat_percentage, 50.0);
        assert_eq!(rhythmic.offbeat_percentage, 50.0);
    }

    #[test]
    fn test_phrase_segmentation() {
        let mut notes = Vec::new();
        // Phrase 1: three notes ending at 550 ms
        for i in 0..3 {
            notes.push(note_at(i * 200, 150, 1.0 + i as f64 * 0.5));
        }
        // 650 ms gap, then phrase 2: four notes
        for i in 0..4 {
            notes.push(note_at(1200 + i * 200, 150, 2.0 + i as f64 * 0.5));
        }

        let rhythmic = rhythmic_stats(&chorus_with(notes));
        assert_eq!(rhythmic.total_rests, 1);
        assert_eq!(rhythmic.average_phrase_length, 3.5);
        assert_eq!(rhythmic.longest_phrase, 4);
    }

    #[test]
    fn test_gap_at_threshold_does_not_split() {
        // First note ends at 150; second starts at 650 -> gap exactly 500 ms
        let notes = vec![note_at(0, 150, 1.0), note_at(650, 150, 2.0)];
        let rhythmic = rhythmic_stats(&chorus_with(notes));
        assert_eq!(rhythmic.total_rests, 0);
        assert_eq!(rhythmic.longest_phrase, 2);
    }

    #[test]
    fn test_unsorted_notes_are_ordered_before_phrasing() {
        let notes = vec![
            note_at(1200, 150, 3.0),
            note_at(0, 150, 1.0),
            note_at(200, 150, 1.5),
        ];
        let rhythmic = rhythmic_stats(&chorus_with(notes));
        // Sorted order: 0, 200 | gap 850 ms | 1200
        assert_eq!(rhythmic.total_rests, 1);
        assert_eq!(rhythmic.longest_phrase, 2);
        assert_eq!(rhythmic.average_phrase_length, 1.5);
    }

    #[test]
    fn test_single_note_single_phrase() {
        let rhythmic = rhythmic_stats(&chorus_with(vec![note_at(0, 300, 1.0)]));
        assert_eq!(rhythmic.total_rests, 0);
        assert_eq!(rhythmic.average_phrase_length, 1.0);
        assert_eq!(rhythmic.longest_phrase, 1);
    }
}
