pub mod analyzer;
pub mod feedback;
pub mod guide_tones;
pub mod segmenter;
pub mod stats;
pub mod timing;
pub mod types;
