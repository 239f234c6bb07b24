pub mod content;
pub mod preferences;
pub mod recaps;
pub mod seed;
