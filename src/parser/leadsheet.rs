use quick_xml::events::Event;
use quick_xml::Reader;

use crate::analysis::types::{ChordChange, TimeSignature, Tune};

/// MusicXML `kind` values mapped to chord-symbol suffixes.
fn kind_to_suffix(kind: &str) -> &'static str {
    match kind {
        "major" => "",
        "minor" => "m",
        "dominant" => "7",
        "major-seventh" => "maj7",
        "minor-seventh" => "m7",
        "half-diminished" => "m7b5",
        "diminished-seventh" => "dim7",
        "diminished" => "dim",
        "augmented" => "aug",
        "dominant-ninth" => "9",
        "major-ninth" => "maj9",
        "minor-ninth" => "m9",
        "dominant-13th" => "13",
        _ => "",
    }
}

fn key_from_fifths(fifths: i32) -> &'static str {
    match fifths {
        -7 => "Cb",
        -6 => "Gb",
        -5 => "Db",
        -4 => "Ab",
        -3 => "Eb",
        -2 => "Bb",
        -1 => "F",
        1 => "G",
        2 => "D",
        3 => "A",
        4 => "E",
        5 => "B",
        6 => "F#",
        7 => "C#",
        _ => "C",
    }
}

fn root_name(step: char, alter: i32) -> String {
    let mut name = step.to_string();
    match alter {
        a if a > 0 => name.push_str(&"#".repeat(a as usize)),
        a if a < 0 => name.push_str(&"b".repeat((-a) as usize)),
        _ => {}
    }
    name
}

/// Parse a MusicXML lead sheet into a tune: chord changes from `<harmony>`
/// elements positioned by the measure and beat cursor, plus tempo, key, and
/// time-signature metadata. Melody notes in the file only advance the cursor.
pub fn parse_leadsheet(xml: &str) -> Result<Tune, String> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();

    let mut divisions: f64 = 1.0;
    let mut tempo: f64 = 120.0;

    // (bar, beat, symbol); durations are derived afterwards
    let mut raw_changes: Vec<(i32, f64, String)> = Vec::new();

    let mut current_beat: f64 = 0.0;
    let mut measure_start_beat: f64 = 0.0;
    let mut current_measure_number: u32 = 0;
    let mut measure_count: u32 = 0;

    let mut key_fifths: i32 = 0;
    let mut time_sig_num: u8 = 4;
    let mut time_sig_den: u8 = 4;
    let mut title: Option<String> = None;

    let mut current_tag: Option<&'static str> = None;

    // Note state: only the duration matters for the beat cursor
    let mut in_note = false;
    let mut note_is_chord = false;
    let mut note_duration_divs: Option<f64> = None;

    // Harmony state
    let mut in_harmony = false;
    let mut harmony_step: Option<char> = None;
    let mut harmony_alter: i32 = 0;
    let mut harmony_kind: String = String::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"measure" => {
                        if let Some(attr) = e
                            .attributes()
                            .flatten()
                            .find(|a| a.key.as_ref() == b"number")
                        {
                            if let Ok(val) = std::str::from_utf8(&attr.value) {
                                if let Ok(n) = val.parse::<u32>() {
                                    current_measure_number = n;
                                }
                            }
                        }
                        measure_count += 1;
                        measure_start_beat = current_beat;
                    }
                    b"note" => {
                        in_note = true;
                        note_is_chord = false;
                        note_duration_divs = None;
                    }
                    b"chord" => {
                        if in_note {
                            note_is_chord = true;
                        }
                    }
                    b"harmony" => {
                        in_harmony = true;
                        harmony_step = None;
                        harmony_alter = 0;
                        harmony_kind.clear();
                    }
                    b"divisions" => current_tag = Some("divisions"),
                    b"duration" => current_tag = Some("duration"),
                    b"per-minute" => current_tag = Some("per-minute"),
                    b"fifths" => current_tag = Some("fifths"),
                    b"beats" => current_tag = Some("beats"),
                    b"beat-type" => current_tag = Some("beat-type"),
                    b"root-step" => current_tag = Some("root-step"),
                    b"root-alter" => current_tag = Some("root-alter"),
                    b"kind" => current_tag = Some("kind"),
                    b"movement-title" => current_tag = Some("movement-title"),
                    b"work-title" => current_tag = Some("work-title"),
                    b"sound" => {
                        if let Some(attr) =
                            e.attributes().flatten().find(|a| a.key.as_ref() == b"tempo")
                        {
                            if let Ok(val) = std::str::from_utf8(&attr.value) {
                                if let Ok(t) = val.parse::<f64>() {
                                    tempo = t;
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                let name = e.name();
                if name.as_ref() == b"sound" {
                    if let Some(attr) =
                        e.attributes().flatten().find(|a| a.key.as_ref() == b"tempo")
                    {
                        if let Ok(val) = std::str::from_utf8(&attr.value) {
                            if let Ok(t) = val.parse::<f64>() {
                                tempo = t;
                            }
                        }
                    }
                }
                if name.as_ref() == b"chord" && in_note {
                    note_is_chord = true;
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(tag) = current_tag.take() {
                    let text = e.unescape().map_err(|e| e.to_string())?;
                    match tag {
                        "divisions" => {
                            if let Ok(v) = text.parse::<f64>() {
                                if v > 0.0 {
                                    divisions = v;
                                }
                            }
                        }
                        "per-minute" => {
                            if let Ok(v) = text.parse::<f64>() {
                                tempo = v;
                            }
                        }
                        "duration" => {
                            if let Ok(v) = text.parse::<f64>() {
                                note_duration_divs = Some(v);
                            }
                        }
                        "fifths" => {
                            if let Ok(v) = text.parse::<i32>() {
                                key_fifths = v;
                            }
                        }
                        "beats" => {
                            if let Ok(v) = text.parse::<u8>() {
                                time_sig_num = v;
                            }
                        }
                        "beat-type" => {
                            if let Ok(v) = text.parse::<u8>() {
                                time_sig_den = v;
                            }
                        }
                        "root-step" => {
                            if in_harmony {
                                harmony_step = text.chars().next();
                            }
                        }
                        "root-alter" => {
                            if in_harmony {
                                if let Ok(v) = text.parse::<i32>() {
                                    harmony_alter = v;
                                }
                            }
                        }
                        "kind" => {
                            if in_harmony {
                                harmony_kind = text.to_string();
                            }
                        }
                        "movement-title" | "work-title" => {
                            if title.is_none() {
                                title = Some(text.to_string());
                            }
                        }
                        _ => {}
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                match name.as_ref() {
                    b"note" if in_note => {
                        let duration_divs = note_duration_divs.unwrap_or(0.0);
                        if !note_is_chord {
                            current_beat += duration_divs / divisions;
                        }
                        in_note = false;
                    }
                    b"harmony" if in_harmony => {
                        if let Some(step) = harmony_step {
                            let symbol = format!(
                                "{}{}",
                                root_name(step, harmony_alter),
                                kind_to_suffix(&harmony_kind)
                            );
                            let bar = current_measure_number.saturating_sub(1) as i32;
                            let beat = current_beat - measure_start_beat + 1.0;
                            raw_changes.push((bar, beat, symbol));
                        }
                        in_harmony = false;
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML parse error: {}", e)),
            _ => {}
        }
        buf.clear();
    }

    if measure_count == 0 {
        return Err("No measures found in lead sheet".to_string());
    }

    let beats_per_bar = f64::from(time_sig_num);
    let form_beats = f64::from(measure_count) * beats_per_bar;

    // Each change lasts until the next one; the last runs to the end of the
    // form.
    let positions: Vec<f64> = raw_changes
        .iter()
        .map(|(bar, beat, _)| f64::from(*bar) * beats_per_bar + (beat - 1.0))
        .collect();
    let chord_grid = raw_changes
        .iter()
        .enumerate()
        .map(|(i, (bar, beat, symbol))| {
            let end = positions.get(i + 1).copied().unwrap_or(form_beats);
            ChordChange {
                bar: *bar,
                beat: *beat,
                chord_symbol: symbol.clone(),
                duration_beats: end - positions[i],
            }
        })
        .collect();

    Ok(Tune {
        title: title.unwrap_or_else(|| "Untitled".to_string()),
        key: key_from_fifths(key_fifths).to_string(),
        tempo_bpm: tempo,
        time_signature: TimeSignature {
            beats_per_bar: time_sig_num,
            beat_unit: time_sig_den,
        },
        chorus_length_bars: measure_count,
        chord_grid,
    })
}
