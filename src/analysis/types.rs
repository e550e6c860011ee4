use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::pitch::notes::{cents_between, midi_to_name};

/// One frame of pitch-tracker output. `pitch` is None during silence or
/// unvoiced segments.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PitchObservation {
    pub frequency_hz: f64,
    pub pitch: Option<i32>,
    pub confidence: f64,
    pub timestamp_ms: i64,
}

impl PitchObservation {
    /// Cents deviation of the raw frequency from its tempered MIDI pitch.
    pub fn cents_offset(&self) -> Option<f64> {
        let pitch = self.pitch?;
        if self.frequency_hz <= 0.0 {
            return None;
        }
        Some(cents_between(self.frequency_hz, pitch))
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    ChordTone,
    Tension,
    Outside,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoteFunction {
    #[serde(rename = "root")]
    Root,
    #[serde(rename = "3rd")]
    Third,
    #[serde(rename = "5th")]
    Fifth,
    #[serde(rename = "7th")]
    Seventh,
    #[serde(rename = "9th")]
    Ninth,
    #[serde(rename = "11th")]
    Eleventh,
    #[serde(rename = "13th")]
    Thirteenth,
    #[serde(rename = "chord_tone")]
    ChordTone,
    #[serde(rename = "chromatic")]
    Chromatic,
}

/// A single note in an improvised solo. Position in the form is filled in
/// when the note is built; the harmonic fields are filled in by the analyzer.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NoteEvent {
    pub pitch: i32,
    pub start_time_ms: i64,
    pub duration_ms: i64,
    pub velocity: i32,
    pub bar: i32,
    pub beat: f64,
    pub chord_at_time: Option<String>,
    pub classification: Option<Classification>,
    pub note_function: Option<NoteFunction>,
}

impl NoteEvent {
    pub fn end_time_ms(&self) -> i64 {
        self.start_time_ms + self.duration_ms
    }

    /// Display name with octave, e.g. "E4" for MIDI 64.
    pub fn note_name(&self) -> String {
        midi_to_name(self.pitch)
    }
}

/// A single chord change at a specific position in the form.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ChordChange {
    pub bar: i32,
    pub beat: f64,
    pub chord_symbol: String,
    pub duration_beats: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    pub beats_per_bar: u8,
    pub beat_unit: u8,
}

/// A tune's metadata and chord grid. Read-only input to the engine; the
/// chord grid is ordered ascending by (bar, beat).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tune {
    pub title: String,
    pub key: String,
    pub tempo_bpm: f64,
    pub time_signature: TimeSignature,
    pub chorus_length_bars: u32,
    pub chord_grid: Vec<ChordChange>,
}

/// One complete pass through a tune's form.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Chorus {
    pub chorus_number: u32,
    pub tune: Tune,
    pub notes: Vec<NoteEvent>,
    pub start_time_ms: i64,
    pub end_time_ms: i64,
}

impl Chorus {
    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn total_duration_ms(&self) -> i64 {
        self.end_time_ms - self.start_time_ms
    }

    pub fn notes_in_bar(&self, bar: i32) -> Vec<&NoteEvent> {
        self.notes.iter().filter(|n| n.bar == bar).collect()
    }

    pub fn notes_on_chord(&self, chord_symbol: &str) -> Vec<&NoteEvent> {
        self.notes
            .iter()
            .filter(|n| n.chord_at_time.as_deref() == Some(chord_symbol))
            .collect()
    }
}

/// Harmonic characteristics of a solo. Ratios are percentages of the total
/// note count; guide-tone hits are an absolute count.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HarmonicStats {
    pub chord_tone_ratio: f64,
    pub tension_ratio: f64,
    pub outside_ratio: f64,
    pub guide_tone_hits: u32,
    pub root_usage: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RhythmicStats {
    pub downbeat_percentage: f64,
    pub offbeat_percentage: f64,
    pub average_phrase_length: f64,
    pub longest_phrase: u32,
    pub total_rests: u32,
}

/// Complete analysis of one improvised chorus.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisResult {
    pub tune_title: String,
    pub chorus_number: u32,
    pub total_notes: u32,
    pub harmonic_stats: HarmonicStats,
    pub rhythmic_stats: RhythmicStats,
    pub chord_tone_notes: Vec<NoteEvent>,
    pub tension_notes: Vec<NoteEvent>,
    pub outside_notes: Vec<NoteEvent>,
    pub feedback: String,
    pub strengths: Vec<String>,
    pub suggestions: Vec<String>,
    pub overall_score: f64,
}

impl AnalysisResult {
    /// Human-readable report of the analysis, suitable for direct display.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let rule = "=".repeat(60);

        out.push_str(&format!("{}\n", rule));
        out.push_str(&format!("IMPROVISATION ANALYSIS: {}\n", self.tune_title));
        out.push_str(&format!("Chorus #{}\n", self.chorus_number));
        out.push_str(&format!("{}\n\n", rule));

        out.push_str("HARMONIC ANALYSIS:\n");
        out.push_str(&format!(
            "   Chord tones (1/3/5/7): {:.1}%\n",
            self.harmonic_stats.chord_tone_ratio
        ));
        out.push_str(&format!(
            "   Tensions (9/11/13):    {:.1}%\n",
            self.harmonic_stats.tension_ratio
        ));
        out.push_str(&format!(
            "   Outside notes:         {:.1}%\n",
            self.harmonic_stats.outside_ratio
        ));
        out.push_str(&format!(
            "   Guide-tone hits:       {}\n\n",
            self.harmonic_stats.guide_tone_hits
        ));

        out.push_str("RHYTHMIC ANALYSIS:\n");
        out.push_str(&format!(
            "   Downbeat notes:        {:.1}%\n",
            self.rhythmic_stats.downbeat_percentage
        ));
        out.push_str(&format!(
            "   Offbeat notes:         {:.1}%\n",
            self.rhythmic_stats.offbeat_percentage
        ));
        out.push_str(&format!(
            "   Avg phrase length:     {:.1} notes\n",
            self.rhythmic_stats.average_phrase_length
        ));
        out.push_str(&format!(
            "   Longest phrase:        {} notes\n\n",
            self.rhythmic_stats.longest_phrase
        ));

        out.push_str(&format!("OVERALL SCORE: {:.0}/100\n\n", self.overall_score));

        if !self.strengths.is_empty() {
            out.push_str("STRENGTHS:\n");
            for strength in &self.strengths {
                out.push_str(&format!("   - {}\n", strength));
            }
            out.push('\n');
        }

        if !self.suggestions.is_empty() {
            out.push_str("SUGGESTIONS:\n");
            for suggestion in &self.suggestions {
                out.push_str(&format!("   - {}\n", suggestion));
            }
            out.push('\n');
        }

        if !self.feedback.is_empty() {
            out.push_str(&format!("FEEDBACK:\n   {}\n", self.feedback));
        }

        out
    }
}

/// Flattened metric view of an [`AnalysisResult`] for progress tracking.
pub type MetricMap = HashMap<String, f64>;
