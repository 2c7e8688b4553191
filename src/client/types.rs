//! Type definitions for the recipe database API.
//!
//! The upstream is TheMealDB's JSON API. Every endpoint wraps its payload in a
//! `{"meals": [...]}` envelope, and uses `{"meals": null}` for "nothing found".
//!
//! ## Key Types
//!
//! - [`Recipe`] - Full recipe with an ordered ingredient list (custom deserializer
//!   for the flattened `strIngredientN` / `strMeasureN` slots)
//! - [`RecipeSummary`] - Id, name and thumbnail, as returned by ingredient filters
//! - [`MealsResponse`] - The `meals` envelope shared by all endpoints

use serde::{Deserialize, Serialize};

/// Highest ingredient slot number the API populates.
pub const MAX_INGREDIENT_SLOTS: usize = 20;

/// Envelope around every API response.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct MealsResponse<T> {
    /// `None` when the API found nothing
    #[serde(default)]
    pub meals: Option<Vec<T>>,
}

impl<T> MealsResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        self.meals.unwrap_or_default()
    }
}

/// Lightweight recipe reference returned by the ingredient filter endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

/// One line of a recipe's ingredient list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    /// Free-text amount such as "2 tbsp"; empty when the API gives none
    pub measure: String,
}

/// A complete recipe.
///
/// Serializes with plain field names; deserialization reads the upstream
/// `strXxx` layout and folds `strIngredient1..20` and `strMeasure1..20` into
/// [`Recipe::ingredients`], dropping blank slots but keeping slot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub thumbnail: Option<String>,
    pub tags: Vec<String>,
    pub youtube: Option<String>,
    pub source: Option<String>,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    /// Ingredient names in recipe order, the input the matcher works from.
    pub fn ingredient_names(&self) -> Vec<String> {
        self.ingredients.iter().map(|i| i.name.clone()).collect()
    }

    pub fn summary(&self) -> RecipeSummary {
        RecipeSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            thumbnail: self.thumbnail.clone(),
        }
    }
}

impl<'de> serde::Deserialize<'de> for Recipe {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};
        use std::fmt;

        struct RecipeVisitor;

        impl<'de> Visitor<'de> for RecipeVisitor {
            type Value = Recipe;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a meal object")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut id: Option<String> = None;
                let mut name: Option<String> = None;
                let mut category = None;
                let mut area = None;
                let mut instructions = None;
                let mut thumbnail = None;
                let mut tags: Option<String> = None;
                let mut youtube = None;
                let mut source = None;
                let mut names: [Option<String>; MAX_INGREDIENT_SLOTS] = Default::default();
                let mut measures: [Option<String>; MAX_INGREDIENT_SLOTS] = Default::default();

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "idMeal" => id = map.next_value()?,
                        "strMeal" => name = map.next_value()?,
                        "strCategory" => category = map.next_value()?,
                        "strArea" => area = map.next_value()?,
                        "strInstructions" => instructions = map.next_value()?,
                        "strMealThumb" => thumbnail = map.next_value()?,
                        "strTags" => tags = map.next_value()?,
                        "strYoutube" => youtube = map.next_value()?,
                        "strSource" => source = map.next_value()?,
                        other => {
                            if let Some(slot) = slot_index(other, "strIngredient") {
                                names[slot] = map.next_value()?;
                            } else if let Some(slot) = slot_index(other, "strMeasure") {
                                measures[slot] = map.next_value()?;
                            } else {
                                let _ = map.next_value::<serde_json::Value>()?;
                            }
                        }
                    }
                }

                let id = id.ok_or_else(|| de::Error::missing_field("idMeal"))?;
                let name = name.ok_or_else(|| de::Error::missing_field("strMeal"))?;

                // The API pads unused slots with "", " " or null
                let ingredients = names
                    .into_iter()
                    .zip(measures)
                    .filter_map(|(name, measure)| {
                        let name = non_blank(name)?;
                        Some(RecipeIngredient {
                            name,
                            measure: non_blank(measure).unwrap_or_default(),
                        })
                    })
                    .collect();

                let tags = tags
                    .map(|t| {
                        t.split(',')
                            .map(str::trim)
                            .filter(|t| !t.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();

                Ok(Recipe {
                    id,
                    name,
                    category: non_blank(category),
                    area: non_blank(area),
                    instructions: non_blank(instructions),
                    thumbnail: non_blank(thumbnail),
                    tags,
                    youtube: non_blank(youtube),
                    source: non_blank(source),
                    ingredients,
                })
            }
        }

        deserializer.deserialize_map(RecipeVisitor)
    }
}

/// Maps `strIngredient7` to slot 6; `None` for other keys or out-of-range slots.
fn slot_index(key: &str, prefix: &str) -> Option<usize> {
    let number: usize = key.strip_prefix(prefix)?.parse().ok()?;
    (1..=MAX_INGREDIENT_SLOTS).contains(&number).then(|| number - 1)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
