use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use serde::de::DeserializeOwned;
use crate::client::types::*;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub struct RecipeClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RecipeClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Masked key for log output.
    pub fn get_key_preview(&self) -> String {
        let prefix: String = self.api_key.chars().take(4).collect();
        format!("{}...", prefix)
    }

    async fn get_meals<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
    ) -> Result<Vec<T>> {
        tracing::debug!("{}: GET {}/{}", operation, self.base_url, path);
        let url = format!("{}/{}/{}", self.base_url, self.api_key, path);

        let response = self
            .client
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Network error during {}: {}", operation, e);
                anyhow::anyhow!("Failed to reach recipe database at {}: {}", self.base_url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            tracing::error!("{} failed with status {}: {}", operation, status, error_body);

            match status.as_u16() {
                401 | 403 => anyhow::bail!(
                    "Failed to {}: recipe database rejected API key {}",
                    operation,
                    self.get_key_preview()
                ),
                404 => anyhow::bail!(
                    "Failed to {}: endpoint not found, check the base URL: {}",
                    operation,
                    self.base_url
                ),
                429 => anyhow::bail!("Failed to {}: rate limited by recipe database", operation),
                _ => anyhow::bail!("Failed to {}: {}", operation, status),
            }
        }

        let meals: MealsResponse<T> = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse {} response: {}", operation, e);
            anyhow::anyhow!("Invalid response from recipe database: {}", e)
        })?;

        Ok(meals.into_vec())
    }

    // Recipe operations
    pub async fn search_recipes(&self, query: &str) -> Result<Vec<Recipe>> {
        let path = format!("search.php?s={}", urlencoding::encode(query));
        self.get_meals("search recipes", &path).await
    }

    /// Recipes that use `ingredient` as a main ingredient.
    pub async fn filter_by_ingredient(&self, ingredient: &str) -> Result<Vec<RecipeSummary>> {
        let path = format!("filter.php?i={}", urlencoding::encode(ingredient));
        self.get_meals("filter recipes by ingredient", &path).await
    }

    pub async fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        let path = format!("lookup.php?i={}", urlencoding::encode(id));
        let recipes: Vec<Recipe> = self.get_meals("get recipe", &path).await?;
        Ok(recipes.into_iter().next())
    }

    pub async fn random_recipe(&self) -> Result<Option<Recipe>> {
        let recipes: Vec<Recipe> = self
            .get_meals("get random recipe", "random.php")
            .await?;
        Ok(recipes.into_iter().next())
    }
}
