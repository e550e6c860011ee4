//! Groups raw pitch observations into discrete note events.
//!
//! Consecutive observations at the same MIDI pitch merge into one note;
//! a silent observation or a pitch change closes the open note. Notes
//! shorter than the minimum duration are dropped as tracker noise.

use crate::analysis::timing::time_to_position;
use crate::analysis::types::{NoteEvent, PitchObservation, Tune};

pub const DEFAULT_MIN_DURATION_MS: i64 = 100;

/// A note boundary found in the observation stream, before it is placed
/// in the form. Confidence and cents offset are averaged over the run.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentedNote {
    pub pitch: i32,
    pub start_time_ms: i64,
    pub duration_ms: i64,
    pub cents_offset: f64,
    pub confidence: f64,
}

/// Accumulates one in-progress run of equal-pitch observations.
struct OpenNote {
    pitch: i32,
    start_time_ms: i64,
    end_time_ms: i64,
    cents_samples: Vec<f64>,
    confidence_samples: Vec<f64>,
}

impl OpenNote {
    fn start(obs: &PitchObservation, pitch: i32) -> Self {
        OpenNote {
            pitch,
            start_time_ms: obs.timestamp_ms,
            end_time_ms: obs.timestamp_ms,
            cents_samples: obs.cents_offset().into_iter().collect(),
            confidence_samples: vec![obs.confidence],
        }
    }

    fn extend(&mut self, obs: &PitchObservation) {
        self.end_time_ms = obs.timestamp_ms;
        if let Some(cents) = obs.cents_offset() {
            self.cents_samples.push(cents);
        }
        self.confidence_samples.push(obs.confidence);
    }

    /// Emit the run as a note if it spans at least `min_duration_ms`.
    fn close(self, min_duration_ms: i64) -> Option<SegmentedNote> {
        let duration_ms = self.end_time_ms - self.start_time_ms;
        if duration_ms < min_duration_ms {
            return None;
        }

        let cents_offset = if self.cents_samples.is_empty() {
            0.0
        } else {
            self.cents_samples.iter().sum::<f64>() / self.cents_samples.len() as f64
        };
        let confidence =
            self.confidence_samples.iter().sum::<f64>() / self.confidence_samples.len() as f64;

        Some(SegmentedNote {
            pitch: self.pitch,
            start_time_ms: self.start_time_ms,
            duration_ms,
            cents_offset,
            confidence,
        })
    }
}

/// Segment an ordered observation stream into notes.
///
/// Continuation requires exact MIDI-pitch equality between consecutive
/// observations; sub-semitone wobble has already been absorbed by the
/// tracker's rounding.
pub fn segment_observations(
    observations: &[PitchObservation],
    min_duration_ms: i64,
) -> Vec<SegmentedNote> {
    let mut notes = Vec::new();
    let mut open: Option<OpenNote> = None;

    for obs in observations {
        let pitch = match obs.pitch {
            Some(p) => p,
            None => {
                // Silence closes the open note
                if let Some(note) = open.take() {
                    notes.extend(note.close(min_duration_ms));
                }
                continue;
            }
        };

        match open {
            Some(ref mut note) if note.pitch == pitch => note.extend(obs),
            _ => {
                // Pitch change: close whatever was open, start fresh
                if let Some(note) = open.take() {
                    notes.extend(note.close(min_duration_ms));
                }
                open = Some(OpenNote::start(obs, pitch));
            }
        }
    }

    if let Some(note) = open {
        notes.extend(note.close(min_duration_ms));
    }

    notes
}

/// Segment observations and place each note in the tune's form: velocity is
/// mapped from averaged confidence, bar/beat from the tune's tempo and time
/// signature, and the sounding chord from its grid.
pub fn observations_to_notes(
    observations: &[PitchObservation],
    tune: &Tune,
    min_duration_ms: i64,
) -> Vec<NoteEvent> {
    segment_observations(observations, min_duration_ms)
        .into_iter()
        .map(|seg| {
            let (bar, beat) =
                time_to_position(seg.start_time_ms, tune.tempo_bpm, tune.time_signature);
            let chord_at_time = tune.chord_at(bar, beat).map(str::to_string);

            NoteEvent {
                pitch: seg.pitch,
                start_time_ms: seg.start_time_ms,
                duration_ms: seg.duration_ms,
                velocity: (seg.confidence * 127.0).round() as i32,
                bar,
                beat,
                chord_at_time,
                classification: None,
                note_function: None,
            }
        })
        .collect()
}
