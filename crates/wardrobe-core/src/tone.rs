//! Undertone quiz aggregation.
//!
//! Each quiz answer is a token that votes for either a cool or a warm
//! undertone. The tally is an explicit session object: callers own it,
//! pass it around, and reset it at session boundaries.

use crate::types::Undertone;
use serde::{Deserialize, Serialize};

/// Answers that count towards a cool undertone.
pub const COOL_SIGNALS: [&str; 12] = [
    "hazeleye",
    "ambereye",
    "browneye",
    "blackeye",
    "greenvein",
    "suntan",
    "whiteyellow",
    "caramelhair",
    "richbrownhair",
    "redhair",
    "yellowhair",
    "goldjewellery",
];

/// Answers that count towards a warm undertone.
pub const WARM_SIGNALS: [&str; 12] = [
    "grayeye",
    "greeneye",
    "blueeye",
    "bluevein",
    "notan",
    "whitepink",
    "whiteblue",
    "whitered",
    "blackhair",
    "grayhair",
    "ashybrownhair",
    "silverjewellery",
];

/// Which counter a quiz answer increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneSignal {
    Cool,
    Warm,
}

impl ToneSignal {
    /// Key used when persisting the counter.
    pub fn key(self) -> &'static str {
        match self {
            Self::Cool => "cool",
            Self::Warm => "warm",
        }
    }
}

/// Map a quiz token to the signal it carries. Unrecognized tokens carry none.
pub fn classify_answer(answer: &str) -> Option<ToneSignal> {
    let cool = COOL_SIGNALS.contains(&answer);
    let warm = WARM_SIGNALS.contains(&answer);
    match (cool, warm) {
        (true, false) => Some(ToneSignal::Cool),
        (false, true) => Some(ToneSignal::Warm),
        _ => None,
    }
}

/// Running cool/warm vote count for one quiz session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToneTally {
    pub cool: u32,
    pub warm: u32,
}

impl ToneTally {
    pub fn new(cool: u32, warm: u32) -> Self {
        Self { cool, warm }
    }

    /// Count one quiz answer. Returns the signal that was counted, or `None`
    /// if the token is not a recognized answer (not an error).
    pub fn record_answer(&mut self, answer: &str) -> Option<ToneSignal> {
        let signal = classify_answer(answer)?;
        self.record(signal);
        Some(signal)
    }

    pub fn record(&mut self, signal: ToneSignal) {
        match signal {
            ToneSignal::Cool => self.cool = self.cool.saturating_add(1),
            ToneSignal::Warm => self.warm = self.warm.saturating_add(1),
        }
    }

    /// Strict majority wins; a tie (including 0:0) is `Neutral`.
    pub fn finalize(&self) -> Undertone {
        match self.cool.cmp(&self.warm) {
            std::cmp::Ordering::Greater => Undertone::Cool,
            std::cmp::Ordering::Less => Undertone::Warm,
            std::cmp::Ordering::Equal => Undertone::Neutral,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
