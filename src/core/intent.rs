use crate::core::mapping::{PatternFamilyKind, SemanticMappingTable};
use crate::models::{Color, IntentKind, QueryIntent};
use regex::{Captures, Regex};

/// Queries shorter than this many characters carry no intent
pub const MIN_QUERY_CHARS: usize = 2;

/// Builds the variant for a family once its pattern matched.
///
/// Returning `None` means the family does not apply after all and the next
/// rule is tried.
pub type Extractor = fn(&Captures<'_>, &str, &SemanticMappingTable) -> Option<IntentKind>;

/// One (matcher, extractor) pair of the classification table
pub struct IntentRule<'t> {
    pub family: PatternFamilyKind,
    pub pattern: &'t Regex,
    pub extract: Extractor,
}

/// The classification table in priority order
pub fn intent_rules(table: &SemanticMappingTable) -> Vec<IntentRule<'_>> {
    table
        .families()
        .iter()
        .flat_map(|family| {
            let extract = extractor_for(family.kind);
            family.patterns.iter().map(move |pattern| IntentRule {
                family: family.kind,
                pattern,
                extract,
            })
        })
        .collect()
}

fn extractor_for(kind: PatternFamilyKind) -> Extractor {
    match kind {
        PatternFamilyKind::StyleOpenings => extract_style_openings,
        PatternFamilyKind::ResponseTo => extract_response,
        PatternFamilyKind::ColorSpecific => extract_color,
        PatternFamilyKind::ComplexitySpecific => extract_complexity,
        PatternFamilyKind::ModifiedOpening => extract_modified_opening,
    }
}

/// Classify a normalized query
///
/// The first rule whose pattern matches and whose extractor succeeds wins.
/// Without a winning rule the whole query is scanned for style synonyms;
/// if none are found the intent is `Unknown`.
pub fn parse_intent(normalized: &str, table: &SemanticMappingTable) -> QueryIntent {
    if normalized.trim().chars().count() < MIN_QUERY_CHARS {
        return QueryIntent::unknown(normalized);
    }

    for rule in intent_rules(table) {
        if let Some(caps) = rule.pattern.captures(normalized) {
            if let Some(kind) = (rule.extract)(&caps, normalized, table) {
                tracing::trace!("Query '{}' classified by {:?} rule", normalized, rule.family);
                return QueryIntent::new(kind, normalized);
            }
        }
    }

    match table.semantic_styles(normalized) {
        Some(style) => QueryIntent::new(IntentKind::SemanticMatch { style }, normalized),
        None => QueryIntent::unknown(normalized),
    }
}

fn extract_style_openings(
    caps: &Captures<'_>,
    _query: &str,
    table: &SemanticMappingTable,
) -> Option<IntentKind> {
    let desc = caps.name("desc")?.as_str();
    // A named opening with descriptors is a modified-opening query
    if table.find_proper_name(desc).is_some() {
        return None;
    }
    let style = table.semantic_styles(desc)?;
    Some(IntentKind::StyleSearch { style })
}

fn extract_response(
    caps: &Captures<'_>,
    _query: &str,
    table: &SemanticMappingTable,
) -> Option<IntentKind> {
    let target = caps.name("target")?.as_str();
    let target_moves = table.extract_moves(target);
    if target_moves.is_empty() {
        return None;
    }

    let modifiers = caps
        .name("mods")
        .and_then(|mods| table.semantic_styles(mods.as_str()))
        .unwrap_or_default();

    Some(IntentKind::ResponseSearch {
        target_moves,
        modifiers,
    })
}

fn extract_color(
    caps: &Captures<'_>,
    query: &str,
    table: &SemanticMappingTable,
) -> Option<IntentKind> {
    let color = Color::parse(caps.name("color")?.as_str())?;
    let style = table
        .semantic_styles(&without_match(query, caps))
        .unwrap_or_default();
    Some(IntentKind::ColorSpecific { color, style })
}

fn extract_complexity(
    caps: &Captures<'_>,
    query: &str,
    table: &SemanticMappingTable,
) -> Option<IntentKind> {
    let complexity = table.complexity_for(caps.name("level")?.as_str())?;
    let style = table
        .semantic_styles(&without_match(query, caps))
        .unwrap_or_default();
    Some(IntentKind::ComplexitySearch { complexity, style })
}

fn extract_modified_opening(
    caps: &Captures<'_>,
    _query: &str,
    table: &SemanticMappingTable,
) -> Option<IntentKind> {
    let opening_name = caps.name("name")?.as_str().trim().to_string();
    let style = table.semantic_styles(caps.name("mods")?.as_str())?;
    Some(IntentKind::ModifiedOpening {
        opening_name,
        style,
    })
}

/// The query with the whole pattern match cut out
fn without_match(query: &str, caps: &Captures<'_>) -> String {
    match caps.get(0) {
        Some(m) => format!("{} {}", &query[..m.start()], &query[m.end()..])
            .trim()
            .to_string(),
        None => query.to_string(),
    }
}
