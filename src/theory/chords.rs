//! Chord-symbol parsing and the interval tables that define chord tones.

const MAJ: &[i32] = &[0, 4, 7];
const MIN: &[i32] = &[0, 3, 7];
const DIM: &[i32] = &[0, 3, 6];
const AUG: &[i32] = &[0, 4, 8];
const MAJ7: &[i32] = &[0, 4, 7, 11];
const MIN7: &[i32] = &[0, 3, 7, 10];
const DOM7: &[i32] = &[0, 4, 7, 10];
const M7B5: &[i32] = &[0, 3, 6, 10];
const DIM7: &[i32] = &[0, 3, 6, 9];
const MAJ9: &[i32] = &[0, 4, 7, 11, 14];
const MIN9: &[i32] = &[0, 3, 7, 10, 14];
const DOM9: &[i32] = &[0, 4, 7, 10, 14];
const DOM13: &[i32] = &[0, 4, 7, 10, 14, 21];

/// Parse a chord symbol like "Cmaj7", "Dm7", "G7", "F#m7b5" into its root
/// pitch class (0-11, C=0) and a normalized quality string.
///
/// Malformed symbols never fail: an empty string or unknown root letter
/// degrades to pitch class 0 and quality "maj" so one bad chord in a grid
/// cannot abort a whole analysis.
pub fn parse_chord_symbol(chord_symbol: &str) -> (i32, String) {
    let mut chars = chord_symbol.chars();
    let root_letter = match chars.next() {
        Some(c) => c.to_ascii_uppercase(),
        None => return (0, "maj".to_string()),
    };

    let root = match root_letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => 0,
    };

    let rest: &str = chars.as_str();
    let (root, quality_raw) = match rest.chars().next() {
        Some('#') => ((root + 1) % 12, &rest[1..]),
        Some('b') => ((root + 11) % 12, &rest[1..]),
        _ => (root, rest),
    };

    (root, normalize_quality(quality_raw))
}

/// First-match normalization of the raw quality string. The check order is
/// significant: "maj7" must win before the bare "7" check turns it dominant.
fn normalize_quality(raw: &str) -> String {
    let q = raw.to_lowercase();

    if q.is_empty() {
        "maj".to_string()
    } else if q.contains("maj7") || q.contains('δ') {
        "maj7".to_string()
    } else if q.contains("m7b5") || q.contains('ø') {
        "m7b5".to_string()
    } else if q.contains("dim7") || q.contains("°7") {
        "dim7".to_string()
    } else if q.contains("m7") || q.contains("min7") || q.contains("-7") {
        "min7".to_string()
    } else if q == "m" || q == "min" || q == "-" {
        "min".to_string()
    } else if q.contains('7') {
        "7".to_string()
    } else {
        q
    }
}

/// Semitone offsets from the root defining a chord's tones,
/// e.g. "Cmaj7" -> [0, 4, 7, 11].
pub fn chord_intervals(chord_symbol: &str) -> &'static [i32] {
    let (_, quality) = parse_chord_symbol(chord_symbol);

    match quality.as_str() {
        "maj" => MAJ,
        "min" => MIN,
        "dim" => DIM,
        "aug" => AUG,
        "maj7" => MAJ7,
        "min7" => MIN7,
        "7" => DOM7,
        "m7b5" => M7B5,
        "dim7" => DIM7,
        "maj9" => MAJ9,
        "min9" => MIN9,
        "9" => DOM9,
        "13" => DOM13,
        // Unrecognized qualities fall back by substring
        other => {
            if other.contains("maj") {
                MAJ7
            } else if other.contains('m') {
                MIN7
            } else if other.contains('7') {
                DOM7
            } else {
                MAJ
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_major_chords() {
        assert_eq!(parse_chord_symbol("Cmaj7"), (0, "maj7".to_string()));
        assert_eq!(parse_chord_symbol("Dbmaj7"), (1, "maj7".to_string()));
        assert_eq!(parse_chord_symbol("F#maj7"), (6, "maj7".to_string()));
        assert_eq!(parse_chord_symbol("CΔ"), (0, "maj7".to_string()));
        assert_eq!(parse_chord_symbol("C"), (0, "maj".to_string()));
    }

    #[test]
    fn test_parse_minor_chords() {
        assert_eq!(parse_chord_symbol("Dm7"), (2, "min7".to_string()));
        assert_eq!(parse_chord_symbol("Am7"), (9, "min7".to_string()));
        assert_eq!(parse_chord_symbol("Em"), (4, "min".to_string()));
        assert_eq!(parse_chord_symbol("C-7"), (0, "min7".to_string()));
    }

    #[test]
    fn test_parse_dominant_chords() {
        assert_eq!(parse_chord_symbol("G7"), (7, "7".to_string()));
        assert_eq!(parse_chord_symbol("C7"), (0, "7".to_string()));
        assert_eq!(parse_chord_symbol("Bb7"), (10, "7".to_string()));
    }

    #[test]
    fn test_parse_half_diminished() {
        assert_eq!(parse_chord_symbol("Bm7b5"), (11, "m7b5".to_string()));
    }

    #[test]
    fn test_parse_diminished() {
        assert_eq!(parse_chord_symbol("Cdim7"), (0, "dim7".to_string()));
    }

    #[test]
    fn test_maj7_not_misread_as_dominant() {
        // The bare "7" check must not fire before the "maj7" check
        let (_, quality) = parse_chord_symbol("Cmaj7");
        assert_eq!(quality, "maj7");
        assert_eq!(chord_intervals("Cmaj7"), &[0, 4, 7, 11]);
    }

    #[test]
    fn test_parse_malformed() {
        assert_eq!(parse_chord_symbol(""), (0, "maj".to_string()));
        assert_eq!(parse_chord_symbol("?"), (0, "maj".to_string()));
        // Unknown root letter degrades to C, quality still parsed
        assert_eq!(parse_chord_symbol("X7"), (0, "7".to_string()));
    }

    #[test]
    fn test_chord_intervals() {
        assert_eq!(chord_intervals("Cmaj7"), &[0, 4, 7, 11]);
        assert_eq!(chord_intervals("Dm7"), &[0, 3, 7, 10]);
        assert_eq!(chord_intervals("G7"), &[0, 4, 7, 10]);
        assert_eq!(chord_intervals("Bm7b5"), &[0, 3, 6, 10]);
        assert_eq!(chord_intervals("Cdim7"), &[0, 3, 6, 9]);
        assert_eq!(chord_intervals("C"), &[0, 4, 7]);
        assert_eq!(chord_intervals("Cm"), &[0, 3, 7]);
        assert_eq!(chord_intervals("C9"), &[0, 4, 7, 10, 14]);
        assert_eq!(chord_intervals("C13"), &[0, 4, 7, 10, 14, 21]);
    }

    #[test]
    fn test_chord_intervals_fallbacks() {
        // "maj13" is not in the table; substring fallback lands on maj7
        assert_eq!(chord_intervals("Cmaj13"), &[0, 4, 7, 11]);
        // "m11" falls back to min7
        assert_eq!(chord_intervals("Cm11"), &[0, 3, 7, 10]);
        // "sus" matches nothing and defaults to the major triad
        assert_eq!(chord_intervals("Csus"), &[0, 4, 7]);
    }
}
