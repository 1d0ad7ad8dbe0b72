use crate::core::{filters::matches_category, normalize_query, SearchEngine, SearchError, MIN_QUERY_CHARS};
use crate::models::{OpeningRecord, QueryIntent, ScoredOpening, SearchOptions, SearchResponse};
use std::cmp::Ordering;

/// `searchType` reported by the plain text search
pub const TEXT_FALLBACK: &str = "text_fallback";

const PHRASE_POINTS: f64 = 3.0;
const ALIAS_PHRASE_POINTS: f64 = 2.0;
const NAME_TOKEN_POINTS: f64 = 1.0;
const ALIAS_TOKEN_POINTS: f64 = 0.5;
const MOVE_TOKEN_POINTS: f64 = 0.5;

fn tokenize(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-')
                .to_string()
        })
        .filter(|word| word.chars().count() >= MIN_QUERY_CHARS)
        .collect()
}

/// Raw points for one opening against the query phrase and its tokens
fn text_points(opening: &OpeningRecord, phrase: &str, tokens: &[String]) -> f64 {
    let name = opening.name.to_lowercase();
    let aliases: Vec<String> = opening.alias_names().map(str::to_lowercase).collect();
    let moves = opening.moves.to_lowercase();

    let mut points = 0.0;

    if opening.eco.eq_ignore_ascii_case(phrase) || name.contains(phrase) {
        points += PHRASE_POINTS;
    } else if aliases.iter().any(|alias| alias.contains(phrase)) {
        points += ALIAS_PHRASE_POINTS;
    }

    for token in tokens {
        if name.contains(token.as_str()) || opening.eco.eq_ignore_ascii_case(token) {
            points += NAME_TOKEN_POINTS;
        } else if aliases.iter().any(|alias| alias.contains(token.as_str())) {
            points += ALIAS_TOKEN_POINTS;
        } else if moves.contains(token.as_str()) {
            points += MOVE_TOKEN_POINTS;
        }
    }

    points
}

/// Plain substring search over names, aliases, ECO codes and moves
///
/// Used when the semantic engine reports no intent. Scores are normalized
/// into [0, 1] and ordered the same way as semantic results.
pub fn text_search(
    raw_query: &str,
    openings: &[OpeningRecord],
    options: &SearchOptions,
    category_tags: Option<&[String]>,
) -> SearchResponse {
    let phrase = normalize_query(raw_query);
    let intent = QueryIntent::unknown(phrase.clone());

    if phrase.chars().count() < MIN_QUERY_CHARS {
        let mut response = SearchResponse::no_semantic_match(intent);
        response.search_type = TEXT_FALLBACK.to_string();
        return response;
    }

    let tokens = tokenize(&phrase);
    let max_points = PHRASE_POINTS + tokens.len() as f64 * NAME_TOKEN_POINTS;

    let mut scored: Vec<ScoredOpening> = openings
        .iter()
        .filter(|opening| category_tags.map_or(true, |tags| matches_category(opening, tags)))
        .filter_map(|opening| {
            let points = text_points(opening, &phrase, &tokens);
            (points > 0.0).then(|| ScoredOpening {
                opening: opening.clone(),
                search_score: (points / max_points).clamp(0.0, 1.0),
            })
        })
        .collect();

    scored.sort_by(|a, b| {
        b.search_score
            .partial_cmp(&a.search_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.opening.name.cmp(&b.opening.name))
            .then_with(|| a.opening.fen.cmp(&b.opening.fen))
    });

    let total_results = scored.len();
    let results = scored
        .into_iter()
        .skip(options.offset)
        .take(options.limit)
        .collect();

    SearchResponse {
        results,
        total_results,
        has_more: options.offset.saturating_add(options.limit) < total_results,
        search_type: TEXT_FALLBACK.to_string(),
        intent,
    }
}

/// Semantic search first, plain text search when no intent is found
pub fn search_with_fallback(
    engine: &SearchEngine,
    raw_query: &str,
    openings: &[OpeningRecord],
    options: &SearchOptions,
) -> Result<SearchResponse, SearchError> {
    let response = engine.search(raw_query, openings, options)?;
    if !response.is_semantic_miss() {
        return Ok(response);
    }

    tracing::debug!("Falling back to text search for '{}'", response.intent.original_query);
    let category_tags = engine.validate(raw_query, options)?;
    Ok(text_search(raw_query, openings, options, category_tags.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_opening(name: &str, eco: &str, moves: &str) -> OpeningRecord {
        OpeningRecord {
            fen: format!("fen-{}", name),
            name: name.to_string(),
            eco: eco.to_string(),
            moves: moves.to_string(),
            ..Default::default()
        }
    }

    fn catalog() -> Vec<OpeningRecord> {
        vec![
            create_opening("Queen's Gambit Declined", "D30", "1. d4 d5 2. c4 e6"),
            create_opening("Queen's Gambit Accepted", "D20", "1. d4 d5 2. c4 dxc4"),
            create_opening("Sicilian Defense", "B20", "1. e4 c5"),
        ]
    }

    #[test]
    fn test_phrase_in_name() {
        let response = text_search("Queen's Gambit", &catalog(), &SearchOptions::new(10, 0), None);
        assert_eq!(response.total_results, 2);
        assert_eq!(response.search_type, TEXT_FALLBACK);
        assert_eq!(response.results[0].opening.name, "Queen's Gambit Accepted");
        for result in &response.results {
            assert!(result.search_score > 0.0 && result.search_score <= 1.0);
        }
    }

    #[test]
    fn test_eco_code_lookup() {
        let response = text_search("b20", &catalog(), &SearchOptions::new(10, 0), None);
        assert_eq!(response.total_results, 1);
        assert_eq!(response.results[0].opening.name, "Sicilian Defense");
    }

    #[test]
    fn test_alias_match() {
        let mut openings = catalog();
        openings[2]
            .aliases
            .insert("scid".to_string(), "Sicilian: Open".to_string());
        let response = text_search("open sicilian", &openings, &SearchOptions::new(10, 0), None);
        assert_eq!(response.results[0].opening.name, "Sicilian Defense");
    }

    #[test]
    fn test_no_hits() {
        let response = text_search("xyzzy12345", &catalog(), &SearchOptions::new(10, 0), None);
        assert_eq!(response.total_results, 0);
        assert!(response.results.is_empty());
        assert!(!response.has_more);
    }

    #[test]
    fn test_short_query_returns_nothing() {
        let response = text_search("q", &catalog(), &SearchOptions::new(10, 0), None);
        assert!(response.results.is_empty());
        assert_eq!(response.search_type, TEXT_FALLBACK);
    }

    #[test]
    fn test_chain_prefers_semantic() {
        let mut openings = catalog();
        openings[2].style_tags = vec!["Sharp".to_string()];
        let engine = SearchEngine::with_defaults();

        let response =
            search_with_fallback(&engine, "aggressive openings", &openings, &SearchOptions::new(10, 0))
                .unwrap();
        assert_eq!(response.search_type, "semantic_style_search");
        assert_eq!(response.results[0].opening.name, "Sicilian Defense");
    }

    #[test]
    fn test_chain_falls_back_to_text() {
        let engine = SearchEngine::with_defaults();
        let response =
            search_with_fallback(&engine, "Queen's Gambit Declined", &catalog(), &SearchOptions::new(10, 0))
                .unwrap();
        assert_eq!(response.search_type, TEXT_FALLBACK);
        assert_eq!(response.results[0].opening.name, "Queen's Gambit Declined");
    }

    #[test]
    fn test_chain_propagates_invalid_input() {
        let engine = SearchEngine::with_defaults();
        let options = SearchOptions::new(10, 0).with_category("nonsense");
        assert!(search_with_fallback(&engine, "qgd", &catalog(), &options).is_err());
    }
}
