//! Outfit recommendation: per-garment scoring, top ranking and the
//! top→bottom compatibility search.

use crate::tables::{self, BottomRule};
use crate::types::{Garment, Outfit, RecommendCriteria, ScoredCandidate};

// --- Top scoring weights ---
pub const BASE_SCORE: i64 = 15;
pub const OCCASION_BONUS: i64 = 30;
pub const WEATHER_BONUS: i64 = 20;
pub const UNDERTONE_BONUS: i64 = 10;
pub const TOP_WEAR_PENALTY: i64 = 10;

/// Divisor for the match percentage. Smaller than the full-bonus score, so
/// a fresh full-bonus garment reports 136%.
pub const MATCH_NORMALIZER: i64 = 55;

// --- Bottom scoring weights ---
pub const BOTTOM_OCCASION_BONUS: i64 = 30;
pub const BOTTOM_WEATHER_BONUS: i64 = 20;
pub const BOTTOM_COLOR_BONUS: i64 = 25;
pub const BOTTOM_WEAR_PENALTY: i64 = 5;

/// Desirability of a garment for the given criteria. May be negative.
pub fn score(garment: &Garment, criteria: &RecommendCriteria) -> i64 {
    let kind = garment.garment_type.as_str();
    let mut score = BASE_SCORE;

    if tables::occasion_types(&criteria.occasion).contains(&kind) {
        score += OCCASION_BONUS;
    }
    if criteria.use_weather && tables::weather_types(&criteria.weather).contains(&kind) {
        score += WEATHER_BONUS;
    }
    if criteria.use_undertone
        && tables::undertone_colors(&criteria.undertone).contains(&garment.color.as_str())
    {
        score += UNDERTONE_BONUS;
    }

    score - i64::from(garment.wear_count) * TOP_WEAR_PENALTY
}

/// Score every garment and sort best first.
///
/// The sort is stable, so garments with equal scores keep storage order.
pub fn score_and_rank<'a>(
    garments: &'a [Garment],
    criteria: &RecommendCriteria,
) -> Vec<ScoredCandidate<'a>> {
    let mut ranked: Vec<ScoredCandidate<'a>> = garments
        .iter()
        .map(|garment| ScoredCandidate {
            score: score(garment, criteria),
            garment,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Score a bottom candidate against the chosen top and the request.
pub fn score_bottom(bottom: &Garment, top_color: &str, occasion: &str, weather: &str) -> i64 {
    let mut score = 0;
    if bottom.occasion == occasion {
        score += BOTTOM_OCCASION_BONUS;
    }
    if bottom.weather == weather {
        score += BOTTOM_WEATHER_BONUS;
    }
    if tables::compatible_colors(top_color).contains(&bottom.color.as_str()) {
        score += BOTTOM_COLOR_BONUS;
    }
    score - i64::from(bottom.wear_count) * BOTTOM_WEAR_PENALTY
}

/// Pick the best bottom from `wardrobe` for a top of `top_type`/`top_color`.
///
/// Returns `None` for one-piece or unmapped tops and when no garment of an
/// allowed bottom type exists. Ties go to the first candidate in `wardrobe`.
pub fn choose_bottom<'a>(
    top_type: &str,
    top_color: &str,
    occasion: &str,
    weather: &str,
    wardrobe: &'a [Garment],
) -> Option<ScoredCandidate<'a>> {
    let allowed = match tables::bottom_rule(top_type)? {
        BottomRule::OnePiece => return None,
        BottomRule::Separates(types) => types,
    };

    let mut candidates: Vec<ScoredCandidate<'a>> = wardrobe
        .iter()
        .filter(|g| allowed.contains(&g.garment_type.as_str()))
        .map(|garment| ScoredCandidate {
            score: score_bottom(garment, top_color, occasion, weather),
            garment,
        })
        .collect();

    tracing::debug!(top_type, candidates = candidates.len(), "bottom candidates");

    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.into_iter().next()
}

/// `floor(score * 100 / 55)`, flooring towards negative infinity.
///
/// Not clamped: wear penalties push it below zero and scores above 55 push
/// it over 100.
pub fn match_percent(score: i64) -> i64 {
    (score * 100).div_euclid(MATCH_NORMALIZER)
}

/// Recommend an outfit from `wardrobe`.
///
/// Always returns at most one outfit: the single best-scoring top with its
/// best bottom. An empty wardrobe yields an empty list.
pub fn recommend(wardrobe: &[Garment], criteria: &RecommendCriteria) -> Vec<Outfit> {
    let ranked = score_and_rank(wardrobe, criteria);
    let Some(best) = ranked.first() else {
        tracing::debug!("no garments to recommend from");
        return Vec::new();
    };

    let top = best.garment;
    let bottom = choose_bottom(
        &top.garment_type,
        &top.color,
        &criteria.occasion,
        &criteria.weather,
        wardrobe,
    );

    tracing::debug!(
        top_id = top.id,
        score = best.score,
        bottom_id = bottom.map(|b| b.garment.id),
        "outfit selected"
    );

    vec![Outfit {
        top_id: top.id,
        top_type: top.garment_type.clone(),
        bottom_type: bottom.map(|b| b.garment.garment_type.clone()),
        bottom_color: bottom.map(|b| b.garment.color.clone()),
        top_image: top.image_path.clone(),
        score: best.score,
        match_percent: match_percent(best.score),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn garment(id: i64, kind: &str, color: &str, wear_count: u32) -> Garment {
        Garment {
            id,
            garment_type: kind.into(),
            color: color.into(),
            undertone: "Neutral".into(),
            weather: String::new(),
            occasion: String::new(),
            image_path: format!("{id}.jpg"),
            wear_count,
            created_at: String::new(),
        }
    }

    fn bottom(id: i64, kind: &str, color: &str, occasion: &str, weather: &str, wear: u32) -> Garment {
        Garment {
            occasion: occasion.into(),
            weather: weather.into(),
            ..garment(id, kind, color, wear)
        }
    }

    fn festive_monsoon_warm() -> RecommendCriteria {
        RecommendCriteria::new("Festive", "Monsoon", "Warm")
    }

    #[test]
    fn test_full_bonus_scenario() {
        let kurta = garment(1, "Kurta", "red", 0);
        let s = score(&kurta, &festive_monsoon_warm());
        assert_eq!(s, 75);
        assert_eq!(match_percent(s), 136);
    }

    #[test]
    fn test_wear_penalty_scenario() {
        let kurta = garment(1, "Kurta", "red", 5);
        let s = score(&kurta, &festive_monsoon_warm());
        assert_eq!(s, 25);
        assert_eq!(match_percent(s), 45);
    }

    #[test]
    fn test_score_strictly_decreasing_in_wear_count() {
        let criteria = festive_monsoon_warm();
        let mut prev = i64::MAX;
        for wear in 0..20 {
            let s = score(&garment(1, "Kurta", "red", wear), &criteria);
            assert!(s < prev, "wear={wear} score={s} prev={prev}");
            prev = s;
        }
    }

    #[test]
    fn test_unknown_occasion_loses_exactly_occasion_bonus() {
        let kurta = garment(1, "Kurta", "red", 0);
        let known = score(&kurta, &festive_monsoon_warm());
        let unknown = score(&kurta, &RecommendCriteria::new("Unknown", "Monsoon", "Warm"));
        assert_eq!(known - unknown, OCCASION_BONUS);
    }

    #[test]
    fn test_flags_disable_weather_and_undertone_bonuses() {
        let kurta = garment(1, "Kurta", "red", 0);
        let criteria = RecommendCriteria {
            use_weather: false,
            use_undertone: false,
            ..festive_monsoon_warm()
        };
        assert_eq!(score(&kurta, &criteria), BASE_SCORE + OCCASION_BONUS);
    }

    #[test]
    fn test_score_can_go_negative() {
        let worn = garment(1, "Sock", "teal", 9);
        assert_eq!(score(&worn, &festive_monsoon_warm()), 15 - 90);
        assert_eq!(match_percent(-75), -137);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let wardrobe = vec![
            garment(1, "Jeans", "blue", 0),
            garment(2, "Kurta", "red", 0),
            garment(3, "Jeans", "blue", 0),
        ];
        let ranked = score_and_rank(&wardrobe, &RecommendCriteria::new("Casual", "", ""));
        let ids: Vec<i64> = ranked.iter().map(|c| c.garment.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_choose_bottom_one_piece_returns_none() {
        let wardrobe = vec![bottom(2, "Jeans", "blue", "Party", "Summer", 0)];
        assert!(choose_bottom("Dress", "black", "Party", "Summer", &wardrobe).is_none());
    }

    #[test]
    fn test_choose_bottom_unmapped_top_returns_none() {
        let wardrobe = vec![bottom(2, "Jeans", "blue", "Casual", "Summer", 0)];
        assert!(choose_bottom("Shorts", "black", "Casual", "Summer", &wardrobe).is_none());
    }

    #[test]
    fn test_choose_bottom_full_match_scenario() {
        let wardrobe = vec![
            garment(1, "Tshirt", "blue", 0),
            bottom(2, "Jeans", "white", "Casual", "Summer", 1),
        ];
        let pick = choose_bottom("Tshirt", "blue", "Casual", "Summer", &wardrobe).unwrap();
        assert_eq!(pick.garment.id, 2);
        assert_eq!(pick.score, 30 + 20 + 25 - 5);
    }

    #[test]
    fn test_choose_bottom_no_candidates() {
        let wardrobe = vec![garment(1, "Tshirt", "blue", 0)];
        assert!(choose_bottom("Tshirt", "blue", "Casual", "Summer", &wardrobe).is_none());
    }

    #[test]
    fn test_choose_bottom_first_seen_wins_ties() {
        let wardrobe = vec![
            bottom(5, "Shorts", "black", "Casual", "", 0),
            bottom(6, "Jeans", "black", "Casual", "", 0),
        ];
        let pick = choose_bottom("Tshirt", "blue", "Casual", "Summer", &wardrobe).unwrap();
        assert_eq!(pick.garment.id, 5);
    }

    #[test]
    fn test_choose_bottom_uses_half_wear_penalty() {
        let wardrobe = vec![
            bottom(1, "Jeans", "white", "Casual", "Summer", 4),
            bottom(2, "Jeans", "white", "Casual", "Summer", 3),
        ];
        let pick = choose_bottom("Tshirt", "blue", "Casual", "Summer", &wardrobe).unwrap();
        assert_eq!(pick.garment.id, 2);
        assert_eq!(pick.score, 75 - 15);
    }

    #[test]
    fn test_recommend_empty_wardrobe() {
        assert!(recommend(&[], &festive_monsoon_warm()).is_empty());
    }

    #[test]
    fn test_recommend_returns_single_best_outfit() {
        let wardrobe = vec![
            garment(1, "Blazer", "black", 0),
            garment(2, "Kurta", "red", 0),
            bottom(3, "Palazzo", "black", "Festive", "Monsoon", 0),
            bottom(4, "Jeans", "blue", "Casual", "Summer", 0),
        ];
        let outfits = recommend(&wardrobe, &festive_monsoon_warm());
        assert_eq!(outfits.len(), 1);
        let outfit = &outfits[0];
        assert_eq!(outfit.top_id, 2);
        assert_eq!(outfit.top_type, "Kurta");
        assert_eq!(outfit.bottom_type.as_deref(), Some("Palazzo"));
        assert_eq!(outfit.bottom_color.as_deref(), Some("black"));
        assert_eq!(outfit.top_image, "2.jpg");
        assert_eq!(outfit.match_percent, 136);
    }

    #[test]
    fn test_recommend_dress_has_no_bottom() {
        let wardrobe = vec![
            garment(1, "Dress", "red", 0),
            bottom(2, "Skirt", "black", "Party", "Summer", 0),
        ];
        let outfits = recommend(&wardrobe, &RecommendCriteria::new("Party", "Summer", "Warm"));
        assert_eq!(outfits[0].top_type, "Dress");
        assert_eq!(outfits[0].bottom_type_label(), "None");
        assert_eq!(outfits[0].bottom_color_label(), "None");
    }
}
