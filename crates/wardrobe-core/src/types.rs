use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// A stored garment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garment {
    pub id: i64,
    /// Category label, e.g. "Kurta" or "Jeans". Key into the scoring tables.
    pub garment_type: String,
    /// Label produced by the color classifier.
    pub color: String,
    pub undertone: String,
    pub weather: String,
    pub occasion: String,
    /// File name relative to the upload directory.
    pub image_path: String,
    /// Times the garment has been worn. Only ever incremented.
    pub wear_count: u32,
    pub created_at: String,
}

/// Fields for inserting a new garment. `id`, `wear_count` and `created_at`
/// are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGarment {
    pub garment_type: String,
    pub color: String,
    pub undertone: String,
    pub weather: String,
    pub occasion: String,
    pub image_path: String,
}

/// Tri-state skin undertone derived from quiz answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Undertone {
    Cool,
    Warm,
    #[default]
    Neutral,
}

impl Undertone {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cool => "Cool",
            Self::Warm => "Warm",
            Self::Neutral => "Neutral",
        }
    }

    /// Exact, case-sensitive match against the canonical label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Cool" => Some(Self::Cool),
            "Warm" => Some(Self::Warm),
            "Neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

impl fmt::Display for Undertone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occasion {
    Festive,
    Casual,
    Formal,
    Party,
    Sports,
}

impl Occasion {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Festive" => Some(Self::Festive),
            "Casual" => Some(Self::Casual),
            "Formal" => Some(Self::Formal),
            "Party" => Some(Self::Party),
            "Sports" => Some(Self::Sports),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weather {
    Summer,
    Winter,
    Monsoon,
}

impl Weather {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Summer" => Some(Self::Summer),
            "Winter" => Some(Self::Winter),
            "Monsoon" => Some(Self::Monsoon),
            _ => None,
        }
    }
}

/// What the caller wants an outfit for.
///
/// Labels are kept as raw strings: unrecognized values are valid and simply
/// earn no table bonus, and the bottom matcher compares them verbatim
/// against each garment's own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendCriteria {
    pub occasion: String,
    pub weather: String,
    pub undertone: String,
    #[serde(default = "default_true")]
    pub use_weather: bool,
    #[serde(default = "default_true")]
    pub use_undertone: bool,
}

fn default_true() -> bool {
    true
}

impl RecommendCriteria {
    pub fn new(occasion: &str, weather: &str, undertone: &str) -> Self {
        Self {
            occasion: occasion.to_string(),
            weather: weather.to_string(),
            undertone: undertone.to_string(),
            use_weather: true,
            use_undertone: true,
        }
    }
}

/// A garment paired with its raw score. Only lives for one ranking pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredCandidate<'a> {
    pub score: i64,
    pub garment: &'a Garment,
}

/// A recommended top/bottom pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outfit {
    pub top_id: i64,
    pub top_type: String,
    #[serde(serialize_with = "none_as_label")]
    pub bottom_type: Option<String>,
    #[serde(serialize_with = "none_as_label")]
    pub bottom_color: Option<String>,
    pub top_image: String,
    pub score: i64,
    /// `floor(score * 100 / 55)`. Not clamped, so it can exceed 100.
    pub match_percent: i64,
}

/// Shown in place of a missing bottom, e.g. for one-piece garments.
pub const NO_BOTTOM: &str = "None";

fn none_as_label<S: Serializer>(value: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(value.as_deref().unwrap_or(NO_BOTTOM))
}

impl Outfit {
    pub fn bottom_type_label(&self) -> &str {
        self.bottom_type.as_deref().unwrap_or(NO_BOTTOM)
    }

    pub fn bottom_color_label(&self) -> &str {
        self.bottom_color.as_deref().unwrap_or(NO_BOTTOM)
    }

    /// Display form, e.g. `"136% match"`.
    pub fn match_label(&self) -> String {
        format!("{}% match", self.match_percent)
    }
}
