use crate::core::mapping::SemanticMappingTable;
use crate::models::{Color, Complexity, IntentKind, OpeningRecord, QueryIntent};

/// Check whether an opening's tags match one canonical style key
///
/// A key missing from the table is matched literally.
#[inline]
pub fn matches_style_key(
    tags: &[String],
    key: &str,
    table: &SemanticMappingTable,
) -> bool {
    match table.style_group(key) {
        Some(group) => group.matches_tags(tags),
        None => {
            let key = key.to_lowercase();
            tags.iter().any(|tag| tag.contains(key.as_str()))
        }
    }
}

/// Number of requested style keys an opening's tags satisfy
pub fn count_style_matches(
    opening: &OpeningRecord,
    styles: &[String],
    table: &SemanticMappingTable,
) -> usize {
    let tags = opening.combined_tags();
    styles
        .iter()
        .filter(|key| matches_style_key(&tags, key, table))
        .count()
}

/// Check whether an opening matches any of the requested style keys
#[inline]
pub fn matches_any_style(
    opening: &OpeningRecord,
    styles: &[String],
    table: &SemanticMappingTable,
) -> bool {
    let tags = opening.combined_tags();
    styles.iter().any(|key| matches_style_key(&tags, key, table))
}

/// Check whether an opening answers `target` rather than being it
///
/// The opening consisting of exactly the target move is the source opening
/// and is never its own response.
#[inline]
pub fn is_response_to(opening: &OpeningRecord, target: &str) -> bool {
    let moves = opening.moves.trim();
    moves.contains(target) && moves != format!("1. {}", target)
}

/// Number of plies in a move string, move numbers excluded
fn ply_count(moves: &str) -> usize {
    moves
        .split_whitespace()
        .filter_map(|token| {
            let stripped = token.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
            (!stripped.is_empty()).then_some(stripped)
        })
        .count()
}

/// Move-string heuristic for which side an opening belongs to
///
/// White owns single half-move entries; Black owns entries that start with
/// two plies or carry a black move marker.
#[inline]
pub fn matches_color(opening: &OpeningRecord, color: Color) -> bool {
    let moves = opening.moves.trim();
    match color {
        Color::White => !moves.contains("...") && ply_count(moves) == 1,
        Color::Black => moves.contains("...") || ply_count(moves) >= 2,
    }
}

#[inline]
pub fn matches_complexity(opening: &OpeningRecord, complexity: Complexity) -> bool {
    opening.complexity == Some(complexity)
}

/// Check whether the opening's name or any alias contains `name`
#[inline]
pub fn matches_opening_name(opening: &OpeningRecord, name: &str) -> bool {
    let wanted = name.to_lowercase();
    opening.name.to_lowercase().contains(&wanted)
        || opening
            .alias_names()
            .any(|alias| alias.to_lowercase().contains(&wanted))
}

/// Check whether any combined tag contains any of the category's tags
#[inline]
pub fn matches_category(opening: &OpeningRecord, category_tags: &[String]) -> bool {
    let tags = opening.combined_tags();
    tags.iter().any(|tag| {
        category_tags
            .iter()
            .any(|wanted| tag.contains(wanted.to_lowercase().as_str()))
    })
}

fn narrow_by_style<'a>(
    openings: Vec<&'a OpeningRecord>,
    styles: &[String],
    table: &SemanticMappingTable,
) -> Vec<&'a OpeningRecord> {
    if styles.is_empty() {
        return openings;
    }
    openings
        .into_iter()
        .filter(|opening| matches_any_style(opening, styles, table))
        .collect()
}

/// Filter the catalog by a classified intent
///
/// Returns references into `openings` in their original order. An intent
/// without a strategy keeps every opening.
pub fn filter_openings<'a>(
    openings: &'a [OpeningRecord],
    intent: &QueryIntent,
    table: &SemanticMappingTable,
) -> Vec<&'a OpeningRecord> {
    let all = openings.iter();

    match &intent.kind {
        IntentKind::StyleSearch { style } | IntentKind::SemanticMatch { style } => all
            .filter(|opening| matches_any_style(opening, style, table))
            .collect(),
        IntentKind::ResponseSearch {
            target_moves,
            modifiers,
        } => {
            let responses = all
                .filter(|opening| {
                    target_moves
                        .iter()
                        .any(|target| is_response_to(opening, target))
                })
                .collect();
            narrow_by_style(responses, modifiers, table)
        }
        IntentKind::ColorSpecific { color, style } => {
            let by_color = all.filter(|opening| matches_color(opening, *color)).collect();
            narrow_by_style(by_color, style, table)
        }
        IntentKind::ComplexitySearch { complexity, style } => {
            let by_level = all
                .filter(|opening| matches_complexity(opening, *complexity))
                .collect();
            narrow_by_style(by_level, style, table)
        }
        IntentKind::ModifiedOpening {
            opening_name,
            style,
        } => {
            let named = all
                .filter(|opening| matches_opening_name(opening, opening_name))
                .collect();
            narrow_by_style(named, style, table)
        }
        IntentKind::Unknown => all.collect(),
    }
}

/// Narrow filtered openings to a named category's tag set
pub fn filter_by_category<'a>(
    openings: Vec<&'a OpeningRecord>,
    category_tags: &[String],
) -> Vec<&'a OpeningRecord> {
    openings
        .into_iter()
        .filter(|opening| matches_category(opening, category_tags))
        .collect()
}
