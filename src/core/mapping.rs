use crate::models::Complexity;
use regex::{Regex, RegexBuilder};

/// Canonical style keys with the natural-language terms that map to them.
///
/// Order matters: extracted style lists follow this order.
const STYLE_SYNONYMS: &[(&str, &[&str])] = &[
    (
        "aggressive",
        &["aggressive", "attacking", "tactical", "sharp", "gambit", "sacrifice", "risky", "dynamic"],
    ),
    (
        "solid",
        &["solid", "safe", "reliable", "sound", "stable", "defensive", "secure", "drawish"],
    ),
    (
        "positional",
        &["positional", "strategic", "maneuvering", "manoeuvring", "quiet", "slow", "closed", "structural"],
    ),
    (
        "tactical",
        &["tactical", "combinative", "complicated", "tricky", "concrete", "forcing"],
    ),
    (
        "classical",
        &["classical", "traditional", "central", "principled"],
    ),
    (
        "hypermodern",
        &["hypermodern", "flexible", "fianchetto", "indirect"],
    ),
    (
        "gambit",
        &["gambit", "pawn sacrifice", "speculative"],
    ),
    (
        "counterattacking",
        &["counterattacking", "counter-attacking", "counterattack", "counterplay"],
    ),
];

/// Opening names that must be read as names, never as descriptors
const PROPER_NAMES: &[&str] = &[
    "king's indian attack", "kings indian attack", "king's indian", "kings indian",
    "queen's indian", "queens indian", "nimzo-indian", "nimzo indian", "bogo-indian",
    "queen's gambit", "queens gambit", "king's gambit", "kings gambit", "evans gambit",
    "danish gambit", "budapest gambit", "benko gambit", "smith-morra gambit", "morra gambit",
    "scotch gambit", "vienna gambit", "englund gambit", "albin countergambit",
    "king's pawn", "kings pawn", "queen's pawn", "queens pawn",
    "sicilian", "french", "caro-kann", "caro kann", "italian", "giuoco piano", "ruy lopez",
    "spanish", "london system", "london", "english", "dutch", "semi-slav", "slav",
    "grunfeld", "grünfeld", "scandinavian", "pirc", "alekhine", "benoni", "catalan",
    "scotch", "vienna", "petrov", "petroff", "russian game", "philidor", "two knights",
    "four knights", "stonewall", "torre attack", "colle", "trompowsky", "bird", "reti",
    "réti", "najdorf", "dragon", "modern defense", "modern defence", "center game",
    "centre game", "bishop's opening", "larsen", "polish", "owen",
];

/// Opening names whose identity is their first move
const NAMED_FIRST_MOVES: &[(&str, &str)] = &[
    ("king's pawn", "e4"),
    ("kings pawn", "e4"),
    ("queen's pawn", "d4"),
    ("queens pawn", "d4"),
    ("english", "c4"),
    ("reti", "Nf3"),
    ("réti", "Nf3"),
    ("bird", "f4"),
    ("larsen", "b3"),
    ("polish", "b4"),
];

/// Terms that are both descriptors and parts of proper opening names
const AMBIGUOUS_TERMS: &[&str] = &[
    "gambit", "attack", "defense", "defence", "classical", "closed", "open", "system",
    "modern", "dragon", "accelerated", "exchange", "countergambit",
];

const COMPLEXITY_TERMS: &[(&str, Complexity)] = &[
    ("beginner", Complexity::Beginner),
    ("beginners", Complexity::Beginner),
    ("novice", Complexity::Beginner),
    ("novices", Complexity::Beginner),
    ("easy", Complexity::Beginner),
    ("simple", Complexity::Beginner),
    ("basic", Complexity::Beginner),
    ("intermediate", Complexity::Intermediate),
    ("club", Complexity::Intermediate),
    ("advanced", Complexity::Advanced),
    ("expert", Complexity::Advanced),
    ("experts", Complexity::Advanced),
    ("master", Complexity::Advanced),
    ("masters", Complexity::Advanced),
    ("complex", Complexity::Advanced),
    ("difficult", Complexity::Advanced),
];

const FILLER_WORDS: &[&str] = &[
    "a", "an", "the", "for", "to", "of", "in", "with", "and", "or", "me", "my", "i", "some",
    "good", "best", "top", "popular", "play", "playing", "show", "find", "want", "like",
    "that", "are", "is", "which", "opening", "openings", "line", "lines", "variation",
    "variations", "repertoire", "ideas", "setup", "setups", "choices", "options",
];

const CATEGORIES: &[(&str, &[&str])] = &[
    ("aggressive", &["aggressive", "sharp", "attacking", "tactical", "gambit", "dynamic"]),
    ("positional", &["positional", "strategic", "maneuvering", "closed", "structural", "space"]),
    ("solid", &["solid", "safe", "sound", "reliable", "defensive", "stable"]),
    ("tactical", &["tactical", "combinative", "sharp", "tricky", "forcing"]),
    ("gambits", &["gambit", "sacrifice"]),
    ("hypermodern", &["hypermodern", "fianchetto", "flexible"]),
    ("classical", &["classical", "central", "traditional", "principled"]),
];

/// Pawn moves, piece moves, captures and castling, optionally move-numbered
const MOVE_TOKEN_PATTERN: &str = r"\b(?:\d+\.(?:\.\.)?\s*)?(?P<mv>o-o-o|o-o|0-0-0|0-0|[kqrn]x?[a-h][1-8]|bx?[a-h][1-8]|[a-h]x[a-h][1-8]|[a-h][1-8])(?:[+#]|\b)";

/// Intent-detection pattern families, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternFamilyKind {
    StyleOpenings,
    ResponseTo,
    ColorSpecific,
    ComplexitySpecific,
    ModifiedOpening,
}

#[derive(Debug, Clone)]
pub struct PatternFamily {
    pub kind: PatternFamilyKind,
    pub patterns: Vec<Regex>,
}

#[derive(Debug, Clone)]
pub struct StyleGroup {
    pub key: String,
    pub synonyms: Vec<String>,
    matcher: Regex,
}

impl StyleGroup {
    fn new(key: &str, synonyms: &[&str]) -> Self {
        let alternatives = synonyms
            .iter()
            .map(|s| regex::escape(s))
            .collect::<Vec<_>>()
            .join("|");
        Self {
            key: key.to_string(),
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            matcher: compile_regex(&format!(r"\b(?:{})(?:s|es)?\b", alternatives)),
        }
    }

    /// Whether any synonym appears as a word in `text`
    pub fn mentioned_in(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Whether any lowercased tag contains any synonym
    pub fn matches_tags(&self, tags: &[String]) -> bool {
        tags.iter()
            .any(|tag| self.synonyms.iter().any(|syn| tag.contains(syn.as_str())))
    }
}

/// Compile a hardcoded pattern, degrading to a pattern that never matches
fn compile_regex(pattern: &str) -> Regex {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(regex) => regex,
        Err(compile_err) => {
            tracing::error!("Pattern failed to compile ({}): {}", pattern, compile_err);
            match Regex::new(r"$^") {
                Ok(fallback) => fallback,
                Err(fallback_err) => panic!("hardcoded fallback regex must compile: {fallback_err}"),
            }
        }
    }
}

/// Read-only lookup data for query understanding
///
/// Built once at startup and shared by the parser, filters and scorer.
#[derive(Debug, Clone)]
pub struct SemanticMappingTable {
    style_groups: Vec<StyleGroup>,
    families: Vec<PatternFamily>,
    move_token: Regex,
    proper_names: Regex,
    named_first_moves: Vec<(String, String)>,
    ambiguous_terms: Vec<String>,
    complexity_terms: Vec<(String, Complexity)>,
    filler_words: Vec<String>,
    categories: Vec<(String, Vec<String>)>,
}

impl SemanticMappingTable {
    pub fn standard() -> Self {
        let style_groups = STYLE_SYNONYMS
            .iter()
            .map(|(key, synonyms)| StyleGroup::new(key, synonyms))
            .collect();

        let name_alternatives = PROPER_NAMES
            .iter()
            .map(|name| regex::escape(name))
            .collect::<Vec<_>>()
            .join("|");
        let proper_names = compile_regex(&format!(r"\b(?:{})(?:s)?\b", name_alternatives));

        let families = vec![
            PatternFamily {
                kind: PatternFamilyKind::StyleOpenings,
                patterns: vec![
                    compile_regex(r"^(?P<desc>.+?)\s+(?:openings?|lines?|systems?|repertoires?|setups?|variations?|choices?|ideas?|options?)$"),
                    compile_regex(r"^(?:openings?|lines?|systems?)\s+(?:that\s+(?:are|is)|which\s+(?:are|is)|with|for)\s+(?P<desc>.+)$"),
                ],
            },
            PatternFamily {
                kind: PatternFamilyKind::ResponseTo,
                patterns: vec![
                    compile_regex(r"^(?P<mods>.*?)\s*\b(?:responses?|replies|reply|answers?|defen[cs]es?|counters?)\s+(?:to|against|vs\.?|versus|for)\s+(?P<target>.+)$"),
                    compile_regex(r"^(?P<mods>.*?)\s*\b(?:how|ways?)\s+to\s+(?:meet|face|answer|handle|play\s+against)\s+(?P<target>.+)$"),
                    compile_regex(r"^(?P<mods>.*?)\s*\b(?:against|vs\.?|versus)\s+(?P<target>.+)$"),
                ],
            },
            PatternFamily {
                kind: PatternFamilyKind::ColorSpecific,
                patterns: vec![
                    compile_regex(r"\b(?:for|as|with|playing)\s+(?P<color>white|black)\b"),
                    compile_regex(r"\b(?P<color>white|black)\s+(?:openings?|repertoires?|systems?|lines?|setups?)\b"),
                    compile_regex(r"^(?P<color>white|black)\b"),
                ],
            },
            PatternFamily {
                kind: PatternFamilyKind::ComplexitySpecific,
                patterns: vec![compile_regex(
                    r"\b(?P<level>beginners?|novices?|easy|simple|basic|intermediate|club|advanced|experts?|masters?|complex|difficult)\b",
                )],
            },
            PatternFamily {
                kind: PatternFamilyKind::ModifiedOpening,
                patterns: vec![
                    compile_regex(&format!(
                        r"^(?P<mods>.+?)\s+(?:(?:lines?|variations?|versions?)\s+(?:in|of)\s+)?(?:(?:in|of)\s+)?(?:the\s+)?(?P<name>{})\b.*$",
                        name_alternatives
                    )),
                    compile_regex(&format!(
                        r"^(?:the\s+)?(?P<name>{})\s+(?P<mods>.+)$",
                        name_alternatives
                    )),
                ],
            },
        ];

        Self {
            style_groups,
            families,
            move_token: compile_regex(MOVE_TOKEN_PATTERN),
            proper_names,
            named_first_moves: NAMED_FIRST_MOVES
                .iter()
                .map(|(name, mv)| (name.to_string(), mv.to_string()))
                .collect(),
            ambiguous_terms: AMBIGUOUS_TERMS.iter().map(|t| t.to_string()).collect(),
            complexity_terms: COMPLEXITY_TERMS
                .iter()
                .map(|(term, level)| (term.to_string(), *level))
                .collect(),
            filler_words: FILLER_WORDS.iter().map(|w| w.to_string()).collect(),
            categories: CATEGORIES
                .iter()
                .map(|(name, tags)| {
                    (name.to_string(), tags.iter().map(|t| t.to_string()).collect())
                })
                .collect(),
        }
    }

    pub fn style_groups(&self) -> &[StyleGroup] {
        &self.style_groups
    }

    pub fn style_group(&self, key: &str) -> Option<&StyleGroup> {
        self.style_groups.iter().find(|group| group.key == key)
    }

    pub fn synonyms(&self, key: &str) -> Option<&[String]> {
        self.style_group(key).map(|group| group.synonyms.as_slice())
    }

    pub fn families(&self) -> &[PatternFamily] {
        &self.families
    }

    /// Priority order of the pattern families
    pub fn family_order(&self) -> Vec<PatternFamilyKind> {
        self.families.iter().map(|family| family.kind).collect()
    }

    /// Canonical keys mentioned in `text`, in table order
    pub fn extract_styles(&self, text: &str) -> Vec<String> {
        self.style_groups
            .iter()
            .filter(|group| group.mentioned_in(text))
            .map(|group| group.key.clone())
            .collect()
    }

    /// Style keys for a free-text fragment, read with proper names removed
    ///
    /// Returns `None` when the only descriptors left are ambiguous terms sitting
    /// next to unrecognised words: such fragments are treated as names.
    pub fn semantic_styles(&self, text: &str) -> Option<Vec<String>> {
        let stripped = self.strip_proper_names(text);
        let styles = self.extract_styles(&stripped);
        if styles.is_empty() {
            return None;
        }

        let significant: Vec<&str> = stripped
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '-'))
            .filter(|word| !word.is_empty() && !self.is_filler(word))
            .collect();

        let has_ambiguous = significant.iter().any(|word| self.is_ambiguous(word));
        let has_unexplained = significant.iter().any(|word| {
            !self.is_ambiguous(word) && !self.is_style_word(word) && self.complexity_for(word).is_none()
        });

        if has_ambiguous && has_unexplained {
            return None;
        }

        Some(styles)
    }

    /// First proper opening name found in `text`
    pub fn find_proper_name<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.proper_names.find(text).map(|m| m.as_str())
    }

    pub fn strip_proper_names(&self, text: &str) -> String {
        self.proper_names
            .replace_all(text, " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Move tokens written in `text`, normalized to SAN casing
    ///
    /// Opening names identified by their first move contribute that move.
    pub fn extract_moves(&self, text: &str) -> Vec<String> {
        let mut moves: Vec<String> = Vec::new();

        for caps in self.move_token.captures_iter(text) {
            if let Some(token) = caps.name("mv") {
                let normalized = normalize_move_token(token.as_str());
                if !moves.contains(&normalized) {
                    moves.push(normalized);
                }
            }
        }

        for (name, first_move) in &self.named_first_moves {
            if contains_phrase(text, name) && !moves.contains(first_move) {
                moves.push(first_move.clone());
            }
        }

        moves
    }

    pub fn complexity_for(&self, term: &str) -> Option<Complexity> {
        self.complexity_terms
            .iter()
            .find(|(known, _)| known == term)
            .map(|(_, level)| *level)
    }

    pub fn is_ambiguous(&self, word: &str) -> bool {
        let singular = word.strip_suffix('s').unwrap_or(word);
        self.ambiguous_terms
            .iter()
            .any(|term| term == word || term == singular)
    }

    pub fn ambiguous_terms(&self) -> &[String] {
        &self.ambiguous_terms
    }

    pub fn is_filler(&self, word: &str) -> bool {
        self.filler_words.iter().any(|filler| filler == word)
    }

    /// Whether `word` is one of the words of some synonym
    fn is_style_word(&self, word: &str) -> bool {
        self.style_groups.iter().any(|group| {
            group.synonyms.iter().any(|syn| {
                syn.split_whitespace().any(|part| {
                    part == word
                        || word.strip_suffix('s') == Some(part)
                        || word.strip_suffix("es") == Some(part)
                })
            })
        })
    }

    pub fn category(&self, name: &str) -> Option<&[String]> {
        let wanted = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|(known, _)| *known == wanted)
            .map(|(_, tags)| tags.as_slice())
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, tags)| (name.as_str(), tags.as_slice()))
    }
}

impl Default for SemanticMappingTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize_move_token(token: &str) -> String {
    let lower = token.to_lowercase();
    match lower.as_str() {
        "o-o" | "0-0" => return "O-O".to_string(),
        "o-o-o" | "0-0-0" => return "O-O-O".to_string(),
        _ => {}
    }

    let mut chars = lower.chars();
    match chars.next() {
        Some(first @ ('k' | 'q' | 'r' | 'n')) => {
            format!("{}{}", first.to_ascii_uppercase(), chars.as_str())
        }
        // b followed by a file is a bishop move, b followed by a rank is a pawn move
        Some('b') if lower.len() > 2 => format!("B{}", chars.as_str()),
        _ => lower,
    }
}

fn contains_phrase(text: &str, phrase: &str) -> bool {
    text.match_indices(phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
