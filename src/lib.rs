use wasm_bindgen::prelude::*;

pub mod analysis;
mod parser;
pub mod pitch;
pub mod theory;

use analysis::types::{Chorus, PitchObservation, Tune};

use std::cell::RefCell;

thread_local! {
    static DETECTOR: RefCell<Option<pitch::yin::PitchDetector>> = RefCell::new(None);
}

/// Parse a MusicXML lead sheet into a Tune (title, key, tempo, chord grid).
#[wasm_bindgen]
pub fn parse_leadsheet(xml: &str) -> Result<JsValue, JsValue> {
    let tune = parser::leadsheet::parse_leadsheet(xml).map_err(|e| JsValue::from_str(&e))?;
    serde_wasm_bindgen::to_value(&tune).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// YIN-based pitch detection returning Float64Array [hz, confidence, midi_float].
/// Uses a thread-local pre-allocated PitchDetector to avoid per-call allocations.
#[wasm_bindgen]
pub fn detect_pitch(samples: &[f32], sample_rate: f32) -> js_sys::Float64Array {
    let result = DETECTOR.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let detector = borrow.get_or_insert_with(|| {
            pitch::yin::PitchDetector::new(
                sample_rate,
                pitch::yin::DEFAULT_MIN_FREQ,
                pitch::yin::DEFAULT_MAX_FREQ,
                2048,
            )
        });
        detector.detect(samples)
    });

    let arr = js_sys::Float64Array::new_with_length(3);
    arr.set_index(0, result.hz as f64);
    arr.set_index(1, result.confidence as f64);
    arr.set_index(2, result.midi_float as f64);
    arr
}

/// Run pitch tracking over a whole recording, returning one observation per
/// analysis frame (unvoiced frames have a null pitch).
#[wasm_bindgen]
pub fn track_pitch(
    samples: &[f32],
    sample_rate: f32,
    window: usize,
    hop: usize,
    min_confidence: f64,
) -> Result<JsValue, JsValue> {
    let observations = pitch::yin::track_pitch(samples, sample_rate, window, hop, min_confidence);
    serde_wasm_bindgen::to_value(&observations).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Segment pitch observations into note events positioned against a tune's
/// form. `min_duration_ms <= 0` selects the default minimum note length.
#[wasm_bindgen]
pub fn segment_solo(
    observations_js: JsValue,
    tune_js: JsValue,
    min_duration_ms: i64,
) -> Result<JsValue, JsValue> {
    let observations: Vec<PitchObservation> = serde_wasm_bindgen::from_value(observations_js)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    let tune: Tune =
        serde_wasm_bindgen::from_value(tune_js).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let min_duration = if min_duration_ms > 0 {
        min_duration_ms
    } else {
        analysis::segmenter::DEFAULT_MIN_DURATION_MS
    };
    let notes = analysis::segmenter::observations_to_notes(&observations, &tune, min_duration);
    serde_wasm_bindgen::to_value(&notes).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Full analysis of one chorus: classification, statistics, and feedback.
#[wasm_bindgen]
pub fn analyze_chorus(chorus_js: JsValue) -> Result<JsValue, JsValue> {
    let mut chorus: Chorus =
        serde_wasm_bindgen::from_value(chorus_js).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let result = analysis::analyzer::analyze(&mut chorus);
    serde_wasm_bindgen::to_value(&result).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Flattened metric map for one chorus, for dashboards and trend plots.
#[wasm_bindgen]
pub fn chorus_metrics(chorus_js: JsValue) -> Result<JsValue, JsValue> {
    let mut chorus: Chorus =
        serde_wasm_bindgen::from_value(chorus_js).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let metrics = analysis::analyzer::calculate_metrics(&mut chorus);
    serde_wasm_bindgen::to_value(&metrics).map_err(|e| JsValue::from_str(&e.to_string()))
}
