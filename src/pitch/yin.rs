use serde::Serialize;

use crate::analysis::types::PitchObservation;
use crate::pitch::notes::frequency_to_midi;

#[derive(Serialize, Clone, Debug)]
pub struct PitchResult {
    pub hz: f32,
    pub confidence: f32,
    pub midi_float: f32,
}

impl PitchResult {
    pub fn silence() -> Self {
        PitchResult {
            hz: 0.0,
            confidence: 0.0,
            midi_float: 0.0,
        }
    }
}

const YIN_THRESHOLD: f32 = 0.15;
const RMS_GATE: f32 = 0.02;

/// Default analysis range: low C on a baritone sax up past the top of a
/// trumpet's practical register.
pub const DEFAULT_MIN_FREQ: f32 = 60.0;
pub const DEFAULT_MAX_FREQ: f32 = 1400.0;

/// YIN pitch detector with reusable scratch buffers, sized once for the
/// largest window it will see.
pub struct PitchDetector {
    sample_rate: f32,
    min_freq: f32,
    max_freq: f32,
    diff: Vec<f32>,
    cmnd: Vec<f32>,
}

impl PitchDetector {
    pub fn new(sample_rate: f32, min_freq: f32, max_freq: f32, max_window: usize) -> Self {
        let max_lag = if min_freq > 0.0 {
            ((sample_rate / min_freq).floor() as usize).min(max_window / 2)
        } else {
            max_window / 2
        };
        PitchDetector {
            sample_rate,
            min_freq,
            max_freq,
            diff: vec![0.0; max_lag + 2],
            cmnd: vec![0.0; max_lag + 2],
        }
    }

    /// Detect the pitch of one analysis window.
    pub fn detect(&mut self, samples: &[f32]) -> PitchResult {
        if samples.len() < 2 || self.sample_rate <= 0.0 {
            return PitchResult::silence();
        }

        // RMS gate: skip the lag search entirely during silence
        let mean = samples.iter().sum::<f32>() / samples.len() as f32;
        let mut energy = 0.0f32;
        for &s in samples {
            let v = s - mean;
            energy += v * v;
        }
        let rms = (energy / samples.len() as f32).sqrt();
        if rms < RMS_GATE {
            return PitchResult::silence();
        }

        let min_lag = (self.sample_rate / self.max_freq).ceil() as usize;
        let max_lag = (self.sample_rate / self.min_freq).floor() as usize;

        let half_len = samples.len() / 2;
        let max_lag = max_lag.min(half_len).min(self.diff.len() - 1);

        if min_lag >= max_lag || max_lag < 2 {
            return PitchResult::silence();
        }

        // Difference function
        for tau in 1..=max_lag {
            let mut sum = 0.0f32;
            for j in 0..half_len {
                let d = samples[j] - samples[j + tau];
                sum += d * d;
            }
            self.diff[tau] = sum;
        }

        // Cumulative mean normalized difference
        self.cmnd[0] = 1.0;
        let mut running_sum = 0.0f32;
        for tau in 1..=max_lag {
            running_sum += self.diff[tau];
            if running_sum > 0.0 {
                self.cmnd[tau] = self.diff[tau] * tau as f32 / running_sum;
            } else {
                self.cmnd[tau] = 1.0;
            }
        }

        // Absolute threshold: first dip below threshold starting from
        // min_lag, then walk forward to the bottom of that valley
        let mut best_tau = 0usize;
        for tau in min_lag..=max_lag {
            if self.cmnd[tau] < YIN_THRESHOLD {
                let mut t = tau;
                while t + 1 <= max_lag && self.cmnd[t + 1] < self.cmnd[t] {
                    t += 1;
                }
                best_tau = t;
                break;
            }
        }

        // No dip below threshold: fall back to the global minimum
        if best_tau == 0 {
            let mut min_val = f32::MAX;
            for tau in min_lag..=max_lag {
                if self.cmnd[tau] < min_val {
                    min_val = self.cmnd[tau];
                    best_tau = tau;
                }
            }
            if min_val > 0.5 {
                return PitchResult::silence();
            }
        }

        // Parabolic interpolation for sub-sample accuracy
        let tau_refined = if best_tau > 0 && best_tau < max_lag {
            let alpha = self.cmnd[best_tau - 1];
            let beta = self.cmnd[best_tau];
            let gamma = self.cmnd[best_tau + 1];
            let denom = 2.0 * (2.0 * beta - alpha - gamma);
            if denom.abs() > 1e-10 {
                best_tau as f32 + (alpha - gamma) / denom
            } else {
                best_tau as f32
            }
        } else {
            best_tau as f32
        };

        if tau_refined <= 0.0 {
            return PitchResult::silence();
        }

        let hz = self.sample_rate / tau_refined;
        let confidence = 1.0 - self.cmnd[best_tau].min(1.0);
        let midi_float = 69.0 + 12.0 * (hz / 440.0).log2();

        PitchResult {
            hz,
            confidence,
            midi_float,
        }
    }
}

/// Run the detector over a whole recording with a hopping window, producing
/// one observation per frame. Frames below `min_confidence` (and silent
/// frames) come out with `pitch: None` so downstream segmentation sees the
/// rests.
pub fn track_pitch(
    samples: &[f32],
    sample_rate: f32,
    window: usize,
    hop: usize,
    min_confidence: f64,
) -> Vec<PitchObservation> {
    let mut observations = Vec::new();
    if samples.len() < window || window < 2 || hop == 0 || sample_rate <= 0.0 {
        return observations;
    }

    let mut detector = PitchDetector::new(sample_rate, DEFAULT_MIN_FREQ, DEFAULT_MAX_FREQ, window);

    let mut start = 0usize;
    while start + window <= samples.len() {
        let result = detector.detect(&samples[start..start + window]);
        let timestamp_ms = (start as f64 / f64::from(sample_rate) * 1000.0).round() as i64;

        let voiced = result.hz > 0.0 && f64::from(result.confidence) >= min_confidence;
        observations.push(PitchObservation {
            frequency_hz: f64::from(result.hz),
            pitch: if voiced {
                Some(frequency_to_midi(f64::from(result.hz)))
            } else {
                None
            },
            confidence: f64::from(result.confidence),
            timestamp_ms,
        });

        start += hop;
    }

    observations
}
