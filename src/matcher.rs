//! Fuzzy ingredient matching between a recipe and the pantry.
//!
//! The heuristic is permissive and will produce false positives. An ingredient
//! counts as available when any of these hold (all comparisons are
//! case-insensitive):
//!
//! 1. It contains, or is contained by, one of the [`COMMON_STAPLES`].
//! 2. It equals a pantry name.
//! 3. It is a substring of a pantry name, or a pantry name is a substring of it.
//! 4. It shares a whole word longer than three characters with a pantry name.
//!
//! ## Example
//!
//! ```
//! use pantry_match::matcher::match_ingredients;
//!
//! let result = match_ingredients(
//!     &["chicken breast", "salt", "kale"],
//!     &["Chicken Thighs", "Olive Oil"],
//! );
//!
//! assert_eq!(result.matched, vec!["chicken breast", "salt"]);
//! assert_eq!(result.missing, vec!["kale"]);
//! assert_eq!(result.match_score, 67);
//! ```

use serde::{Deserialize, Serialize};

/// Kitchen basics that are always assumed to be on hand.
pub const COMMON_STAPLES: &[&str] = &[
    "salt",
    "pepper",
    "water",
    "oil",
    "olive oil",
    "vegetable oil",
    "sugar",
    "flour",
];

/// Words at or below this length never count towards word overlap, so
/// connectors like "of" or "and" can't match on their own.
const MIN_OVERLAP_WORD_LEN: usize = 3;

/// Outcome of matching one recipe against the pantry.
///
/// Derived data only. Anything stored alongside a saved recipe is a snapshot
/// and gets recomputed against the live pantry before it is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    /// Ingredients judged available, in recipe order
    pub matched: Vec<String>,
    /// Ingredients judged missing, in recipe order
    pub missing: Vec<String>,
    /// Percentage of ingredients matched, 0-100
    pub match_score: u8,
    pub stats: MatchStats,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStats {
    pub total: usize,
    pub matched: usize,
    pub missing: usize,
}

impl MatchResult {
    pub fn is_complete(&self) -> bool {
        self.stats.missing == 0
    }
}

/// Classifies every ingredient as matched or missing against `pantry_names`.
///
/// Total over all inputs; empty lists produce an empty result with a score of 0.
pub fn match_ingredients<I, P>(ingredients: &[I], pantry_names: &[P]) -> MatchResult
where
    I: AsRef<str>,
    P: AsRef<str>,
{
    let pantry: Vec<String> = pantry_names
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();

    let (matched, missing): (Vec<String>, Vec<String>) = ingredients
        .iter()
        .map(|ingredient| ingredient.as_ref().to_string())
        .partition(|ingredient| available_in(&ingredient.to_lowercase(), &pantry));

    let stats = MatchStats {
        total: matched.len() + missing.len(),
        matched: matched.len(),
        missing: missing.len(),
    };

    MatchResult {
        match_score: match_score(stats.matched, stats.total),
        matched,
        missing,
        stats,
    }
}

/// Checks a single ingredient against the pantry.
pub fn is_available<P: AsRef<str>>(ingredient: &str, pantry_names: &[P]) -> bool {
    let pantry: Vec<String> = pantry_names
        .iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect();
    available_in(&ingredient.to_lowercase(), &pantry)
}

/// True when the ingredient contains, or is contained by, a common staple.
pub fn is_staple(ingredient: &str) -> bool {
    let ingredient = ingredient.to_lowercase();
    staple_match(&ingredient)
}

/// `round(100 * matched / total)` with halves rounding up; 0 when `total` is 0.
pub fn match_score(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let matched = matched.min(total);
    // integer form of floor(100 * m / t + 0.5)
    ((200 * matched + total) / (2 * total)) as u8
}

// Both arguments are already lowercased.
fn available_in(ingredient: &str, pantry: &[String]) -> bool {
    if staple_match(ingredient) {
        return true;
    }

    pantry.iter().any(|item| {
        item == ingredient
            || item.contains(ingredient)
            || ingredient.contains(item.as_str())
            || shares_long_word(ingredient, item)
    })
}

fn staple_match(ingredient: &str) -> bool {
    COMMON_STAPLES
        .iter()
        .any(|staple| ingredient.contains(staple) || staple.contains(ingredient))
}

fn shares_long_word(ingredient: &str, item: &str) -> bool {
    ingredient
        .split_whitespace()
        .filter(|word| word.chars().count() > MIN_OVERLAP_WORD_LEN)
        .any(|word| item.split_whitespace().any(|other| other == word))
}
