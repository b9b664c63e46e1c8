//! wardrobe-core: Garment color classification and outfit recommendation.
//!
//! Classifies garment photos into a small set of color labels, aggregates
//! undertone quiz answers, and ranks garments into a top/bottom outfit for
//! an occasion and weather.

pub mod classifier;
pub mod scoring;
pub mod tables;
pub mod tone;
pub mod types;

pub use classifier::{classify_path, ColorLabel};
pub use scoring::{choose_bottom, recommend, score, score_and_rank};
pub use tone::{ToneSignal, ToneTally};
pub use types::{
    Garment, NewGarment, Occasion, Outfit, RecommendCriteria, ScoredCandidate, Undertone, Weather,
};
