//! Recipe discovery and the saved-recipe book.
//!
//! Discovery seeds recipe lookups with what is about to expire, then scores
//! every candidate against the whole pantry and sorts best match first.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::client::{Recipe, RecipeClient};
use crate::matcher::{match_ingredients, MatchResult};
use crate::pantry::Pantry;

/// A recipe summary paired with its match against the pantry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecipe {
    pub id: String,
    pub name: String,
    pub thumbnail: Option<String>,
    pub category: Option<String>,
    pub area: Option<String>,
    #[serde(flatten)]
    pub match_result: MatchResult,
}

impl RankedRecipe {
    pub fn new(recipe: &Recipe, pantry_names: &[String]) -> Self {
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            thumbnail: recipe.thumbnail.clone(),
            category: recipe.category.clone(),
            area: recipe.area.clone(),
            match_result: match_ingredients(&recipe.ingredient_names(), pantry_names),
        }
    }

    /// Uses the saved recipe's current snapshot instead of matching again.
    pub fn from_saved(saved: &SavedRecipe) -> Self {
        let recipe = &saved.recipe;
        Self {
            id: recipe.id.clone(),
            name: recipe.name.clone(),
            thumbnail: recipe.thumbnail.clone(),
            category: recipe.category.clone(),
            area: recipe.area.clone(),
            match_result: saved.cached_match.clone(),
        }
    }
}

/// Best match first. Stable, so ties keep their current order.
pub fn sort_by_score(ranked: &mut [RankedRecipe]) {
    ranked.sort_by(|a, b| b.match_result.match_score.cmp(&a.match_result.match_score));
}

/// Matches every recipe and sorts by descending score. Ties keep input order.
pub fn rank_recipes(recipes: &[Recipe], pantry_names: &[String]) -> Vec<RankedRecipe> {
    let mut ranked: Vec<RankedRecipe> = recipes
        .iter()
        .map(|recipe| RankedRecipe::new(recipe, pantry_names))
        .collect();
    sort_by_score(&mut ranked);
    ranked
}

/// Ingredients to seed a recipe search with.
///
/// Names of items expiring within `days`, soonest first. Falls back to the
/// whole pantry when nothing is close to expiring. Case-insensitive duplicates
/// are dropped.
pub fn discovery_ingredients(pantry: &Pantry, days: i64, today: NaiveDate) -> Vec<String> {
    let expiring = pantry.expiring_within(days, today);
    let candidates: Vec<&str> = if expiring.is_empty() {
        pantry.items().iter().map(|item| item.name.as_str()).collect()
    } else {
        expiring.iter().map(|item| item.name.as_str()).collect()
    };

    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(String::from)
        .collect()
}

/// Fetches recipes for each seed ingredient and ranks them against the pantry.
///
/// Never fails as a whole: a seed whose lookup fails is logged and skipped,
/// as is a recipe whose details can't be loaded, so an unreachable database
/// yields an empty list. Recipe ids are deduplicated in first-seen order.
pub async fn discover(
    client: &RecipeClient,
    seeds: &[String],
    pantry_names: &[String],
    limit: usize,
) -> Vec<RankedRecipe> {
    let mut ids = Vec::new();
    let mut seen = HashSet::new();

    for seed in seeds {
        match client.filter_by_ingredient(seed).await {
            Ok(summaries) => {
                tracing::debug!("{} recipes use {}", summaries.len(), seed);
                for summary in summaries {
                    if seen.insert(summary.id.clone()) {
                        ids.push(summary.id);
                    }
                }
            }
            Err(e) => tracing::warn!("Skipping seed ingredient {}: {}", seed, e),
        }
    }

    let mut recipes = Vec::with_capacity(ids.len());
    for id in &ids {
        match client.get_recipe(id).await {
            Ok(Some(recipe)) => recipes.push(recipe),
            Ok(None) => tracing::debug!("Recipe {} vanished between filter and lookup", id),
            Err(e) => tracing::warn!("Skipping recipe {}: {}", id, e),
        }
    }

    let mut ranked = rank_recipes(&recipes, pantry_names);
    ranked.truncate(limit);
    tracing::info!(
        "Discovered {} recipes from {} seed ingredients ({} candidates)",
        ranked.len(),
        seeds.len(),
        ids.len()
    );
    ranked
}

/// A recipe the user kept, with the match computed when it was last shown.
#[derive(Debug, Clone, Serialize)]
pub struct SavedRecipe {
    pub recipe: Recipe,
    /// Snapshot only; call [`SavedRecipe::refresh`] before displaying
    pub cached_match: MatchResult,
    pub saved_at: DateTime<Utc>,
}

impl SavedRecipe {
    /// Recomputes the match against the live pantry and updates the snapshot.
    pub fn refresh(&mut self, pantry_names: &[String]) -> &MatchResult {
        self.cached_match = match_ingredients(&self.recipe.ingredient_names(), pantry_names);
        &self.cached_match
    }
}

/// Saved recipes in the order they were saved.
#[derive(Debug, Default)]
pub struct RecipeBook {
    recipes: Vec<SavedRecipe>,
}

impl RecipeBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Saves a recipe, replacing any earlier copy with the same id.
    pub fn save(&mut self, recipe: Recipe, pantry_names: &[String]) -> &SavedRecipe {
        let cached_match = match_ingredients(&recipe.ingredient_names(), pantry_names);
        let saved = SavedRecipe {
            recipe,
            cached_match,
            saved_at: Utc::now(),
        };

        let index = match self.position(&saved.recipe.id) {
            Some(index) => {
                self.recipes[index] = saved;
                index
            }
            None => {
                self.recipes.push(saved);
                self.recipes.len() - 1
            }
        };
        &self.recipes[index]
    }

    /// Looks up a saved recipe with its match recomputed from `pantry_names`.
    pub fn get(&mut self, id: &str, pantry_names: &[String]) -> Option<&SavedRecipe> {
        let index = self.position(id)?;
        let saved = &mut self.recipes[index];
        saved.refresh(pantry_names);
        Some(&*saved)
    }

    /// All saved recipes, each recomputed from `pantry_names`.
    pub fn list(&mut self, pantry_names: &[String]) -> &[SavedRecipe] {
        for saved in &mut self.recipes {
            saved.refresh(pantry_names);
        }
        &self.recipes
    }

    pub fn remove(&mut self, id: &str) -> Result<SavedRecipe> {
        let index = self
            .position(id)
            .ok_or_else(|| anyhow::anyhow!("No saved recipe with id {}", id))?;
        Ok(self.recipes.remove(index))
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.recipes.iter().position(|saved| saved.recipe.id == id)
    }
}
