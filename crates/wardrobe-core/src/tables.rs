//! Static lookup tables that drive scoring and outfit matching.
//!
//! Every rule lives here as data. Lookups on a missing key return an empty
//! list, never an error.

use crate::types::{Occasion, Undertone, Weather};

type Table<K> = &'static [(K, &'static [&'static str])];

/// Garment types favoured for each occasion.
pub const OCCASION_PRIORITY: Table<Occasion> = &[
    (Occasion::Festive, &["Ethnic Wear", "Kurta", "Palazzo", "Dress"]),
    (Occasion::Casual, &["Jeans", "Tshirt", "Shorts", "Skirt"]),
    (Occasion::Formal, &["Blazer", "Coat", "Formal Trousers"]),
    (Occasion::Party, &["Dress", "Skirt", "Blouse"]),
    (Occasion::Sports, &["Tracksuit", "Shorts"]),
];

/// Garment types favoured for each weather.
pub const WEATHER_PRIORITY: Table<Weather> = &[
    (Weather::Summer, &["Dress", "Skirt", "Shorts", "Blouse"]),
    (Weather::Winter, &["Coat", "Jacket", "Sweater", "Cardigan"]),
    (Weather::Monsoon, &["Jeans", "Kurta", "Palazzo"]),
];

/// Colors that flatter each undertone.
pub const UNDERTONE_PRIORITY: Table<Undertone> = &[
    (Undertone::Warm, &["yellow", "orange", "red"]),
    (Undertone::Cool, &["blue", "green", "black"]),
    (Undertone::Neutral, &["white", "black", "blue", "gray"]),
];

/// Bottom colors that pair with a given top color.
pub const COLOR_COMPATIBILITY: Table<&'static str> = &[
    ("black", &["white", "blue", "red", "green", "yellow"]),
    ("white", &["black", "blue", "red", "green"]),
    ("blue", &["white", "black", "gray"]),
    ("red", &["black", "white", "blue"]),
    ("green", &["white", "black"]),
    ("yellow", &["black", "blue", "white"]),
    ("orange", &["white", "black", "blue"]),
    ("gray", &["black", "white", "blue"]),
    ("purple", &["white", "black", "gray"]),
];

/// How a top is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BottomRule {
    /// The top needs one of these bottom types.
    Separates(&'static [&'static str]),
    /// One-piece garment; no bottom is ever matched.
    OnePiece,
}

pub const BOTTOM_MATCHING: &[(&str, BottomRule)] = &[
    ("Kurta", BottomRule::Separates(&["Palazzo", "Jeans", "Churidar"])),
    ("Tshirt", BottomRule::Separates(&["Jeans", "Shorts"])),
    ("Blouse", BottomRule::Separates(&["Skirt", "Palazzo"])),
    ("Blazer", BottomRule::Separates(&["Formal Trousers"])),
    ("Coat", BottomRule::Separates(&["Formal Trousers"])),
    ("Sweater", BottomRule::Separates(&["Jeans"])),
    ("Jacket", BottomRule::Separates(&["Jeans"])),
    ("Dress", BottomRule::OnePiece),
];

fn lookup<K, Q>(table: Table<K>, key: &Q) -> &'static [&'static str]
where
    K: PartialEq<Q>,
{
    table
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, values)| *values)
        .unwrap_or(&[])
}

/// Preferred garment types for an occasion label. Unknown labels yield `[]`.
pub fn occasion_types(occasion: &str) -> &'static [&'static str] {
    Occasion::from_label(occasion)
        .map(|o| lookup(OCCASION_PRIORITY, &o))
        .unwrap_or_default()
}

pub fn weather_types(weather: &str) -> &'static [&'static str] {
    Weather::from_label(weather)
        .map(|w| lookup(WEATHER_PRIORITY, &w))
        .unwrap_or_default()
}

pub fn undertone_colors(undertone: &str) -> &'static [&'static str] {
    Undertone::from_label(undertone)
        .map(|u| lookup(UNDERTONE_PRIORITY, &u))
        .unwrap_or_default()
}

pub fn compatible_colors(top_color: &str) -> &'static [&'static str] {
    lookup(COLOR_COMPATIBILITY, &top_color)
}

/// Bottom rule for a top type, or `None` if the type has no entry.
pub fn bottom_rule(top_type: &str) -> Option<BottomRule> {
    BOTTOM_MATCHING
        .iter()
        .find(|(t, _)| *t == top_type)
        .map(|(_, rule)| *rule)
}
