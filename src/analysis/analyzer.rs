//! Top-level analysis of an improvised chorus.
//!
//! `analyze` first resolves each note against the tune's chord grid and
//! classifies it, then aggregates statistics and runs the feedback rules.
//! Notes that fall outside the grid's coverage keep `None` in the harmonic
//! fields but still count toward every total.

use crate::analysis::feedback::{generate_feedback, Assessment};
use crate::analysis::stats::{harmonic_stats, rhythmic_stats};
use crate::analysis::types::{AnalysisResult, Chorus, Classification, MetricMap};
use crate::theory::classify::classify_note;

/// Run the full analysis pipeline on a chorus, annotating its notes in place.
pub fn analyze(chorus: &mut Chorus) -> AnalysisResult {
    classify_chorus(chorus);

    let harmonic = harmonic_stats(chorus);
    let rhythmic = rhythmic_stats(chorus);

    let by_class = |class: Classification| {
        chorus
            .notes
            .iter()
            .filter(|n| n.classification == Some(class))
            .cloned()
            .collect::<Vec<_>>()
    };
    let chord_tone_notes = by_class(Classification::ChordTone);
    let tension_notes = by_class(Classification::Tension);
    let outside_notes = by_class(Classification::Outside);

    let total_notes = chorus.note_count() as u32;
    let (feedback, strengths, suggestions, overall_score) = generate_feedback(&Assessment {
        harmonic: &harmonic,
        rhythmic: &rhythmic,
        guide_tone_hits: harmonic.guide_tone_hits,
        total_notes,
    });

    AnalysisResult {
        tune_title: chorus.tune.title.clone(),
        chorus_number: chorus.chorus_number,
        total_notes,
        harmonic_stats: harmonic,
        rhythmic_stats: rhythmic,
        chord_tone_notes,
        tension_notes,
        outside_notes,
        feedback,
        strengths,
        suggestions,
        overall_score,
    }
}

/// Flattened numeric view of the analysis, for dashboards and trend plots.
pub fn calculate_metrics(chorus: &mut Chorus) -> MetricMap {
    let result = analyze(chorus);

    let mut metrics = MetricMap::new();
    metrics.insert(
        "chord_tone_ratio".to_string(),
        result.harmonic_stats.chord_tone_ratio,
    );
    metrics.insert(
        "tension_ratio".to_string(),
        result.harmonic_stats.tension_ratio,
    );
    metrics.insert(
        "outside_ratio".to_string(),
        result.harmonic_stats.outside_ratio,
    );
    metrics.insert(
        "guide_tone_hits".to_string(),
        f64::from(result.harmonic_stats.guide_tone_hits),
    );
    metrics.insert(
        "downbeat_percentage".to_string(),
        result.rhythmic_stats.downbeat_percentage,
    );
    metrics.insert(
        "average_phrase_length".to_string(),
        result.rhythmic_stats.average_phrase_length,
    );
    metrics.insert("overall_score".to_string(), result.overall_score);
    metrics
}

fn classify_chorus(chorus: &mut Chorus) {
    let Chorus { tune, notes, .. } = chorus;
    for note in notes.iter_mut() {
        match tune.chord_at(note.bar, note.beat) {
            Some(chord) => {
                let (classification, function) = classify_note(note.pitch, chord);
                note.chord_at_time = Some(chord.to_string());
                note.classification = Some(classification);
                note.note_function = Some(function);
            }
            None => {
                note.chord_at_time = None;
                note.classification = None;
                note.note_function = None;
            }
        }
    }
}
