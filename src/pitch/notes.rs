const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// MIDI note number with octave, e.g. 64 -> "E4".
pub fn midi_to_name(midi: i32) -> String {
    let name = NOTE_NAMES[(midi.rem_euclid(12)) as usize];
    let octave = midi / 12 - 1;
    format!("{}{}", name, octave)
}

/// Nearest MIDI note number for a frequency, clamped to 0-127.
/// Returns 0 for non-positive frequencies.
pub fn frequency_to_midi(frequency_hz: f64) -> i32 {
    if frequency_hz <= 0.0 {
        return 0;
    }
    let midi = 69.0 + 12.0 * (frequency_hz / 440.0).log2();
    (midi.round() as i32).clamp(0, 127)
}

pub fn midi_to_frequency(midi: i32) -> f64 {
    440.0 * 2.0_f64.powf((midi - 69) as f64 / 12.0)
}

/// Cents deviation of a frequency from a tempered MIDI pitch.
pub fn cents_between(frequency_hz: f64, midi: i32) -> f64 {
    1200.0 * (frequency_hz / midi_to_frequency(midi)).log2()
}
