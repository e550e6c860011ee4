//! Rule-based scoring and qualitative feedback.
//!
//! The assessment is a fixed decision table: each rule tests the aggregated
//! statistics, adjusts the score, and files a message as a strength or a
//! suggestion. Rule order fixes the message order; the score itself is
//! order-independent because every delta is an independent addition.

use crate::analysis::types::{HarmonicStats, RhythmicStats};

const BASE_SCORE: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Bucket {
    Strength,
    Suggestion,
}

/// Inputs the rule predicates read.
pub struct Assessment<'a> {
    pub harmonic: &'a HarmonicStats,
    pub rhythmic: &'a RhythmicStats,
    pub guide_tone_hits: u32,
    pub total_notes: u32,
}

struct Rule {
    applies: fn(&Assessment) -> bool,
    delta: f64,
    bucket: Bucket,
    message: fn(&Assessment) -> String,
}

fn rules() -> Vec<Rule> {
    vec![
        Rule {
            applies: |a| a.harmonic.chord_tone_ratio > 70.0,
            delta: 15.0,
            bucket: Bucket::Strength,
            message: |_| "Strong harmonic awareness - excellent use of chord tones".to_string(),
        },
        Rule {
            applies: |a| a.harmonic.chord_tone_ratio < 40.0,
            delta: -10.0,
            bucket: Bucket::Suggestion,
            message: |_| {
                "Try targeting more chord tones (1/3/5/7) to strengthen harmonic foundation"
                    .to_string()
            },
        },
        Rule {
            applies: |a| a.harmonic.tension_ratio > 20.0,
            delta: 10.0,
            bucket: Bucket::Strength,
            message: |_| "Good use of tensions (9/11/13) for color".to_string(),
        },
        Rule {
            applies: |a| a.harmonic.tension_ratio < 5.0,
            delta: 0.0,
            bucket: Bucket::Suggestion,
            message: |_| {
                "Experiment with more tensions (9ths, 11ths, 13ths) to add sophistication"
                    .to_string()
            },
        },
        Rule {
            applies: |a| a.harmonic.outside_ratio > 30.0,
            delta: -5.0,
            bucket: Bucket::Suggestion,
            message: |_| {
                "High percentage of outside notes - consider resolving chromaticism more"
                    .to_string()
            },
        },
        Rule {
            applies: |a| a.harmonic.outside_ratio > 5.0 && a.harmonic.outside_ratio < 20.0,
            delta: 5.0,
            bucket: Bucket::Strength,
            message: |_| "Tasteful use of chromatic approaches".to_string(),
        },
        Rule {
            applies: |a| a.guide_tone_hits > 4,
            delta: 15.0,
            bucket: Bucket::Strength,
            message: |a| format!("Excellent guide-tone targeting ({} hits)", a.guide_tone_hits),
        },
        Rule {
            applies: |a| a.guide_tone_hits == 0,
            delta: -5.0,
            bucket: Bucket::Suggestion,
            message: |_| {
                "Focus on hitting 3rds and 7ths on strong beats at chord changes".to_string()
            },
        },
        Rule {
            applies: |a| {
                a.rhythmic.downbeat_percentage > 40.0 && a.rhythmic.downbeat_percentage < 70.0
            },
            delta: 10.0,
            bucket: Bucket::Strength,
            message: |_| "Good balance between downbeat and offbeat phrases".to_string(),
        },
        Rule {
            applies: |a| a.rhythmic.downbeat_percentage > 80.0,
            delta: -5.0,
            bucket: Bucket::Suggestion,
            message: |_| {
                "Try more syncopation and offbeat accents for rhythmic interest".to_string()
            },
        },
        Rule {
            applies: |a| a.rhythmic.average_phrase_length > 3.0,
            delta: 5.0,
            bucket: Bucket::Strength,
            message: |_| "Confident phrase lengths".to_string(),
        },
        Rule {
            applies: |a| a.rhythmic.average_phrase_length < 2.0,
            delta: 0.0,
            bucket: Bucket::Suggestion,
            message: |_| "Try building longer phrases - connect your musical ideas".to_string(),
        },
        Rule {
            applies: |a| a.rhythmic.total_rests > 2,
            delta: 5.0,
            bucket: Bucket::Strength,
            message: |_| "Good use of space and phrasing".to_string(),
        },
        Rule {
            applies: |a| a.rhythmic.total_rests == 0 && a.total_notes > 20,
            delta: 0.0,
            bucket: Bucket::Suggestion,
            message: |_| "Leave more space - rests are musical too!".to_string(),
        },
    ]
}

/// Evaluate the rule table: returns (summary line, strengths, suggestions,
/// overall score clamped to 0-100).
pub fn generate_feedback(assessment: &Assessment) -> (String, Vec<String>, Vec<String>, f64) {
    let mut strengths = Vec::new();
    let mut suggestions = Vec::new();
    let mut score = BASE_SCORE;

    for rule in rules() {
        if !(rule.applies)(assessment) {
            continue;
        }
        score += rule.delta;
        let message = (rule.message)(assessment);
        match rule.bucket {
            Bucket::Strength => strengths.push(message),
            Bucket::Suggestion => suggestions.push(message),
        }
    }

    let score = score.clamp(0.0, 100.0);

    let summary = if score >= 80.0 {
        "Excellent improvisation! Your harmonic choices and phrasing show strong musicality."
    } else if score >= 65.0 {
        "Solid solo with good moments. Keep developing your harmonic vocabulary."
    } else if score >= 50.0 {
        "Good foundation. Focus on chord-tone targeting and rhythmic variety."
    } else {
        "Keep practicing! Work on hitting chord tones and outlining the changes."
    }
    .to_string();

    (summary, strengths, suggestions, score)
}
