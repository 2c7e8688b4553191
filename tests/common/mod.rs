#![allow(dead_code)]

use chrono::NaiveDate;
use pantry_match::client::{Recipe, RecipeClient, RecipeIngredient};
use pantry_match::pantry::{Category, NewPantryItem};

pub struct TestEnvironment {
    pub base_url: String,
    pub api_key: String,
    pub client: RecipeClient,
}

impl TestEnvironment {
    pub fn new() -> Self {
        let base_url = std::env::var("RECIPE_API_BASE_URL")
            .unwrap_or_else(|_| "https://www.themealdb.com/api/json/v1".to_string());
        let api_key = std::env::var("RECIPE_API_KEY")
            .unwrap_or_else(|_| "1".to_string());

        let client = RecipeClient::new(base_url.clone(), api_key.clone());
        Self {
            base_url,
            api_key,
            client,
        }
    }
}

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

pub fn item(name: &str, expiration_days: u32) -> NewPantryItem {
    NewPantryItem {
        expiration_days,
        ..NewPantryItem::new(name, today())
    }
}

pub fn item_in(name: &str, category: Category, quantity: f64, unit: &str) -> NewPantryItem {
    NewPantryItem {
        category,
        quantity,
        unit: unit.to_string(),
        ..NewPantryItem::new(name, today())
    }
}

pub fn recipe(id: &str, name: &str, ingredients: &[&str]) -> Recipe {
    Recipe {
        id: id.to_string(),
        name: name.to_string(),
        category: None,
        area: None,
        instructions: None,
        thumbnail: None,
        tags: vec![],
        youtube: None,
        source: None,
        ingredients: ingredients
            .iter()
            .map(|name| RecipeIngredient {
                name: name.to_string(),
                measure: String::new(),
            })
            .collect(),
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Routes `tracing` output through the test harness so it is only shown for failures.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .try_init();
}
