use crate::analysis::types::{TimeSignature, Tune};

/// Convert an elapsed-time offset into a position in the form.
///
/// `bar` is 0-indexed; `beat` is 1-indexed and fractional (2.5 is the "and"
/// of beat 2). Tempo is assumed constant over the span analyzed.
pub fn time_to_position(time_ms: i64, tempo_bpm: f64, time_signature: TimeSignature) -> (i32, f64) {
    let beats_per_bar = time_signature.beats_per_bar as f64;
    let beats_elapsed = (time_ms as f64 / 1000.0) * (tempo_bpm / 60.0);

    let bar = (beats_elapsed / beats_per_bar).floor() as i32;
    let beat = beats_elapsed.rem_euclid(beats_per_bar) + 1.0;

    (bar, beat)
}

impl Tune {
    /// Resolve the chord sounding at a (bar, beat) position.
    ///
    /// The grid is ordered ascending by (bar, beat); the active chord is the
    /// last entry at or before the query. None if the query precedes the
    /// first entry or the grid is empty.
    pub fn chord_at(&self, bar: i32, beat: f64) -> Option<&str> {
        let mut current: Option<&str> = None;
        for change in &self.chord_grid {
            if change.bar > bar {
                break;
            }
            if change.bar == bar && change.beat > beat {
                break;
            }
            current = Some(&change.chord_symbol);
        }
        current
    }
}
