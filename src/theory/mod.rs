pub mod chords;
pub mod classify;
