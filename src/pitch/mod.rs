pub mod notes;
pub mod yin;
