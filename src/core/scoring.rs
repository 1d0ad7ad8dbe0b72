use crate::core::filters::count_style_matches;
use crate::core::mapping::SemanticMappingTable;
use crate::models::{OpeningRecord, QueryIntent, ScoredOpening, ScoringWeights};
use std::cmp::Ordering;

/// Calculate a relevance score (0-1) for an opening that passed filtering
///
/// Scoring formula:
/// score = min(1.0,
///     base +
///     style_matches * style_match +      # requested style keys found in tags
///     complexity +                       # exact complexity match
///     move_matches * move_pattern +      # requested moves found in the line
///     name +                             # opening name contains the requested name
///     min(popularity_cap, popularity_count / popularity_divisor)
/// )
pub fn calculate_search_score(
    opening: &OpeningRecord,
    intent: &QueryIntent,
    table: &SemanticMappingTable,
    weights: &ScoringWeights,
) -> f64 {
    let style_matches = count_style_matches(opening, intent.requested_styles(), table);
    let style_score = style_matches as f64 * weights.style_match;

    let complexity_score = match intent.complexity() {
        Some(level) if opening.complexity == Some(level) => weights.complexity,
        _ => 0.0,
    };

    let move_matches = intent
        .target_moves()
        .iter()
        .filter(|target| opening.moves.contains(target.as_str()))
        .count();
    let move_score = move_matches as f64 * weights.move_pattern;

    let name_score = match intent.opening_name() {
        Some(name) if opening.name.to_lowercase().contains(&name.to_lowercase()) => weights.name,
        _ => 0.0,
    };

    let total = weights.base
        + style_score
        + complexity_score
        + move_score
        + name_score
        + calculate_popularity_score(opening.popularity_count, weights);

    clamp_score(total)
}

/// Popularity contribution, damped and capped
///
/// Raw game counts are divided down so popularity only separates otherwise
/// similar results.
#[inline]
pub fn calculate_popularity_score(popularity_count: u64, weights: &ScoringWeights) -> f64 {
    if weights.popularity_divisor <= 0.0 || weights.popularity_cap <= 0.0 {
        return 0.0;
    }
    (popularity_count as f64 / weights.popularity_divisor).min(weights.popularity_cap)
}

#[inline]
fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 1.0)
}

/// Score filtered openings and sort them best first
///
/// Equal scores are ordered by name, then by position key.
pub fn score_openings(
    openings: Vec<&OpeningRecord>,
    intent: &QueryIntent,
    table: &SemanticMappingTable,
    weights: &ScoringWeights,
) -> Vec<ScoredOpening> {
    let mut scored: Vec<ScoredOpening> = openings
        .into_iter()
        .map(|opening| ScoredOpening {
            search_score: calculate_search_score(opening, intent, table, weights),
            opening: opening.clone(),
        })
        .collect();

    scored.sort_by(|a, b| {
        b.search_score
            .partial_cmp(&a.search_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.opening.name.cmp(&b.opening.name))
            .then_with(|| a.opening.fen.cmp(&b.opening.fen))
    });

    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Complexity, IntentKind};

    fn create_test_opening(name: &str, style_tags: &[&str], popularity_count: u64) -> OpeningRecord {
        OpeningRecord {
            fen: format!("fen-{}", name),
            name: name.to_string(),
            eco: "C00".to_string(),
            moves: "1. e4 e6 2. d4 d5".to_string(),
            style_tags: style_tags.iter().map(|t| t.to_string()).collect(),
            popularity_count,
            ..Default::default()
        }
    }

    fn style_intent(styles: &[&str]) -> QueryIntent {
        QueryIntent::new(
            IntentKind::StyleSearch {
                style: styles.iter().map(|s| s.to_string()).collect(),
            },
            "test",
        )
    }

    #[test]
    fn test_base_score_only() {
        let table = SemanticMappingTable::standard();
        let weights = ScoringWeights::default();
        let opening = create_test_opening("French", &[], 0);

        let score = calculate_search_score(&opening, &style_intent(&[]), &table, &weights);
        assert!((score - weights.base).abs() < 1e-9);
    }

    #[test]
    fn test_style_bonus_per_matched_key() {
        let table = SemanticMappingTable::standard();
        let weights = ScoringWeights::default();
        let opening = create_test_opening("King's Gambit", &["Sharp", "Solid"], 0);

        let one = calculate_search_score(&opening, &style_intent(&["aggressive"]), &table, &weights);
        let two = calculate_search_score(&opening, &style_intent(&["aggressive", "solid"]), &table, &weights);
        assert!((two - one - weights.style_match).abs() < 1e-9);
    }

    #[test]
    fn test_complexity_bonus() {
        let table = SemanticMappingTable::standard();
        let weights = ScoringWeights::default();
        let mut opening = create_test_opening("Italian", &[], 0);
        opening.complexity = Some(Complexity::Beginner);

        let intent = QueryIntent::new(
            IntentKind::ComplexitySearch {
                complexity: Complexity::Beginner,
                style: vec![],
            },
            "beginner",
        );
        let score = calculate_search_score(&opening, &intent, &table, &weights);
        assert!((score - (weights.base + weights.complexity)).abs() < 1e-9);
    }

    #[test]
    fn test_move_and_name_bonus() {
        let table = SemanticMappingTable::standard();
        let weights = ScoringWeights::default();
        let opening = create_test_opening("French Defense", &[], 0);

        let response = QueryIntent::new(
            IntentKind::ResponseSearch {
                target_moves: vec!["e4".to_string(), "d4".to_string()],
                modifiers: vec![],
            },
            "response to e4",
        );
        let score = calculate_search_score(&opening, &response, &table, &weights);
        assert!((score - (weights.base + 2.0 * weights.move_pattern)).abs() < 1e-9);

        let named = QueryIntent::new(
            IntentKind::ModifiedOpening {
                opening_name: "french".to_string(),
                style: vec![],
            },
            "solid french",
        );
        let score = calculate_search_score(&opening, &named, &table, &weights);
        assert!((score - (weights.base + weights.name)).abs() < 1e-9);
    }

    #[test]
    fn test_popularity_is_capped() {
        let weights = ScoringWeights::default();
        assert_eq!(calculate_popularity_score(0, &weights), 0.0);
        assert_eq!(calculate_popularity_score(u64::MAX, &weights), weights.popularity_cap);
        assert!(calculate_popularity_score(10, &weights) < 0.001);
    }

    #[test]
    fn test_score_never_exceeds_one() {
        let table = SemanticMappingTable::standard();
        let weights = ScoringWeights::default();
        let opening = create_test_opening(
            "Everything",
            &["Aggressive", "Solid", "Positional", "Tactical", "Classical", "Hypermodern", "Gambit"],
            u64::MAX,
        );
        let intent = style_intent(&["aggressive", "solid", "positional", "tactical", "classical", "hypermodern", "gambit"]);

        let score = calculate_search_score(&opening, &intent, &table, &weights);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_negative_weights_clamp_to_zero() {
        let table = SemanticMappingTable::standard();
        let weights = ScoringWeights {
            base: -5.0,
            ..ScoringWeights::default()
        };
        let opening = create_test_opening("French", &[], 0);
        let score = calculate_search_score(&opening, &style_intent(&[]), &table, &weights);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_sorted_descending_with_name_tiebreak() {
        let table = SemanticMappingTable::standard();
        let weights = ScoringWeights::default();
        let zeta = create_test_opening("Zeta", &["Sharp"], 0);
        let alpha = create_test_opening("Alpha", &["Sharp"], 0);
        let plain = create_test_opening("Beta", &[], 0);

        let scored = score_openings(
            vec![&plain, &zeta, &alpha],
            &style_intent(&["aggressive"]),
            &table,
            &weights,
        );
        let names: Vec<&str> = scored.iter().map(|s| s.opening.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Zeta", "Beta"]);
    }
}
