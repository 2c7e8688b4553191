use std::sync::Arc;
use std::future::Future;
use chrono::{Local, NaiveDate};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::*,
    schemars,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::json;
use tokio::sync::Mutex;

use crate::client::RecipeClient;
use crate::discovery::{self, RankedRecipe, RecipeBook};
use crate::matcher::match_ingredients;
use crate::pantry::{Category, NewPantryItem, Pantry, PantryItem};

// Parameter structs for tools
#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct MatchIngredientsParams {
    pub ingredients: Vec<String>,
    /// Pantry names to match against; defaults to the current pantry
    #[serde(default)]
    pub pantry: Option<Vec<String>>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddPantryItemParams {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default = "default_expires_in_days")]
    pub expires_in_days: u32,
}

fn default_quantity() -> f64 {
    1.0
}

fn default_expires_in_days() -> u32 {
    7
}

impl AddPantryItemParams {
    fn into_new_item(self, today: NaiveDate) -> NewPantryItem {
        NewPantryItem {
            category: self
                .category
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(Category::Other),
            quantity: self.quantity,
            unit: self.unit.unwrap_or_else(|| "item".to_string()),
            expiration_days: self.expires_in_days,
            ..NewPantryItem::new(self.name, today)
        }
    }
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct AddScannedItemsParams {
    pub items: Vec<AddPantryItemParams>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct ListPantryParams {
    #[serde(default)]
    pub expiring_within_days: Option<i64>,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct LogConsumptionParams {
    pub id: String,
    #[serde(default = "default_quantity")]
    pub amount: f64,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct PantryItemIdParams {
    pub id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SearchRecipesParams {
    pub query: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct RecipeIdParams {
    pub id: String,
}

#[derive(Debug, serde::Deserialize, schemars::JsonSchema)]
pub struct SuggestRecipesParams {
    #[serde(default = "default_days_until_expiry")]
    pub days_until_expiry: i64,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Seed ingredients to search with instead of the expiring pantry items
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
}

fn default_days_until_expiry() -> i64 {
    3
}

fn default_limit() -> usize {
    10
}

/// State shared by every connection to the server.
#[derive(Clone, Default)]
pub struct SharedState {
    pub pantry: Arc<Mutex<Pantry>>,
    pub recipes: Arc<Mutex<RecipeBook>>,
}

#[derive(Clone)]
pub struct PantryMcpServer {
    client: Arc<RecipeClient>,
    state: SharedState,
    tool_router: ToolRouter<PantryMcpServer>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn item_json(item: &PantryItem, today: NaiveDate) -> serde_json::Value {
    json!({
        "id": item.id,
        "name": item.name,
        "category": item.category,
        "quantity": item.quantity,
        "unit": item.unit,
        "added_on": item.added_on,
        "expires_on": item.expires_on(),
        "days_until_expiry": item.days_until_expiry(today),
        "expired": item.is_expired(today)
    })
}

fn success(result: serde_json::Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string());
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

fn failure(message: &str, details: impl std::fmt::Display) -> Result<CallToolResult, McpError> {
    tracing::warn!("{}: {}", message, details);
    let error = json!({
        "error": message,
        "details": details.to_string()
    });
    Ok(CallToolResult::error(vec![Content::text(error.to_string())]))
}

#[tool_router]
impl PantryMcpServer {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self::with_state(
            Arc::new(RecipeClient::new(base_url, api_key)),
            SharedState::default(),
        )
    }

    pub fn with_state(client: Arc<RecipeClient>, state: SharedState) -> Self {
        Self {
            client,
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub async fn test_api_access(&self) -> Result<(), anyhow::Error> {
        tracing::debug!("Testing recipe database access with a random recipe...");
        match self.client.random_recipe().await {
            Ok(Some(recipe)) => {
                tracing::info!("Recipe database reachable - sample recipe: {}", recipe.name);
                Ok(())
            }
            Ok(None) => anyhow::bail!("Recipe database returned no recipes"),
            Err(e) => {
                tracing::error!("Recipe database access test failed: {}", e);
                Err(e)
            }
        }
    }

    // Matching tools
    #[tool(description = "Score recipe ingredients as available or missing against the pantry")]
    async fn match_ingredients(
        &self,
        Parameters(params): Parameters<MatchIngredientsParams>,
    ) -> Result<CallToolResult, McpError> {
        let pantry_names = match params.pantry {
            Some(names) => names,
            None => self.state.pantry.lock().await.names(),
        };

        let result = match_ingredients(&params.ingredients, &pantry_names);
        success(json!({
            "result": result,
            "pantry_size": pantry_names.len()
        }))
    }

    // Pantry tools
    #[tool(description = "Add a single item to the pantry")]
    async fn add_pantry_item(
        &self,
        Parameters(params): Parameters<AddPantryItemParams>,
    ) -> Result<CallToolResult, McpError> {
        let today = today();
        let mut pantry = self.state.pantry.lock().await;

        match pantry.add(params.into_new_item(today)) {
            Ok(item) => success(json!({
                "item": item_json(&item, today),
                "success": true,
                "message": format!("Added {} to pantry", item.name)
            })),
            Err(e) => failure("Failed to add pantry item", e),
        }
    }

    #[tool(description = "Add confirmed items from a scanned receipt to the pantry")]
    async fn add_scanned_items(
        &self,
        Parameters(params): Parameters<AddScannedItemsParams>,
    ) -> Result<CallToolResult, McpError> {
        let today = today();
        let items = params
            .items
            .into_iter()
            .map(|item| item.into_new_item(today))
            .collect();

        let mut pantry = self.state.pantry.lock().await;
        match pantry.add_many(items) {
            Ok(added) => success(json!({
                "items": added.iter().map(|item| item_json(item, today)).collect::<Vec<_>>(),
                "added": added.len(),
                "pantry_size": pantry.len(),
                "success": true
            })),
            Err(e) => failure("Failed to add scanned items", e),
        }
    }

    #[tool(description = "List pantry items, optionally only those expiring soon")]
    async fn list_pantry(
        &self,
        Parameters(params): Parameters<ListPantryParams>,
    ) -> Result<CallToolResult, McpError> {
        let today = today();
        let pantry = self.state.pantry.lock().await;

        let items: Vec<serde_json::Value> = match params.expiring_within_days {
            Some(days) => pantry
                .expiring_within(days, today)
                .into_iter()
                .map(|item| item_json(item, today))
                .collect(),
            None => pantry
                .items()
                .iter()
                .map(|item| item_json(item, today))
                .collect(),
        };

        success(json!({
            "items": items,
            "count": items.len(),
            "total_in_pantry": pantry.len(),
            "filter": params.expiring_within_days.map(|d| format!("expiring within {} days", d))
        }))
    }

    #[tool(description = "Log consumption of a pantry item; fully consumed items are removed")]
    async fn log_consumption(
        &self,
        Parameters(params): Parameters<LogConsumptionParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut pantry = self.state.pantry.lock().await;

        match pantry.consume(&params.id, params.amount) {
            Ok(consumption) => {
                let message = if consumption.removed {
                    format!("{} used up and removed from pantry", consumption.name)
                } else {
                    format!(
                        "Logged {} of {}, {} remaining",
                        consumption.consumed, consumption.name, consumption.remaining
                    )
                };
                success(json!({
                    "consumption": consumption,
                    "success": true,
                    "message": message
                }))
            }
            Err(e) => failure("Failed to log consumption", e),
        }
    }

    #[tool(description = "Discard a pantry item")]
    async fn remove_pantry_item(
        &self,
        Parameters(params): Parameters<PantryItemIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut pantry = self.state.pantry.lock().await;

        match pantry.remove(&params.id) {
            Ok(item) => success(json!({
                "id": item.id,
                "name": item.name,
                "success": true,
                "message": format!("Removed {} from pantry", item.name)
            })),
            Err(e) => failure("Failed to remove pantry item", e),
        }
    }

    // Recipe tools
    #[tool(description = "Search the recipe database by name, ranked by pantry match")]
    async fn search_recipes(
        &self,
        Parameters(params): Parameters<SearchRecipesParams>,
    ) -> Result<CallToolResult, McpError> {
        let pantry_names = self.state.pantry.lock().await.names();

        match self.client.search_recipes(&params.query).await {
            Ok(recipes) => {
                let ranked = discovery::rank_recipes(&recipes, &pantry_names);
                let interpretation =
                    format!("Found {} recipes matching '{}'", ranked.len(), params.query);
                success(json!({
                    "recipes": ranked,
                    "total_count": ranked.len(),
                    "search_interpretation": interpretation
                }))
            }
            Err(e) => failure("Failed to search recipes", e),
        }
    }

    #[tool(description = "Get full recipe information matched against the current pantry")]
    async fn get_recipe_details(
        &self,
        Parameters(params): Parameters<RecipeIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let pantry_names = self.state.pantry.lock().await.names();

        match self.client.get_recipe(&params.id).await {
            Ok(Some(recipe)) => {
                let result = match_ingredients(&recipe.ingredient_names(), &pantry_names);
                success(json!({
                    "recipe": recipe,
                    "match": result
                }))
            }
            Ok(None) => failure(
                "Failed to get recipe details",
                format!("No recipe with id {}", params.id),
            ),
            Err(e) => failure("Failed to get recipe details", e),
        }
    }

    #[tool(description = "Suggest recipes that use pantry items which are about to expire")]
    async fn suggest_recipes(
        &self,
        Parameters(params): Parameters<SuggestRecipesParams>,
    ) -> Result<CallToolResult, McpError> {
        let explicit_seeds = params.ingredients.is_some();
        let (seeds, pantry_names) = {
            let pantry = self.state.pantry.lock().await;
            let seeds = match params.ingredients {
                Some(ingredients) => ingredients,
                None => {
                    discovery::discovery_ingredients(&pantry, params.days_until_expiry, today())
                }
            };
            (seeds, pantry.names())
        };

        if seeds.is_empty() {
            let message = if explicit_seeds {
                "No seed ingredients given. Pass at least one, \
                 or omit the list to use expiring pantry items."
            } else {
                "No ingredients found in pantry. Add some items first."
            };
            return success(json!({
                "suggestions": [],
                "message": message,
                "days_until_expiry": params.days_until_expiry
            }));
        }

        let suggestions =
            discovery::discover(&self.client, &seeds, &pantry_names, params.limit).await;
        let message = format!(
            "Found {} recipe suggestions using {}",
            suggestions.len(),
            seeds.join(", ")
        );
        success(json!({
            "suggestions": suggestions,
            "seed_ingredients": seeds,
            "days_until_expiry": params.days_until_expiry,
            "message": message
        }))
    }

    // Saved recipe tools
    #[tool(description = "Save a recipe to the recipe book")]
    async fn save_recipe(
        &self,
        Parameters(params): Parameters<RecipeIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let recipe = match self.client.get_recipe(&params.id).await {
            Ok(Some(recipe)) => recipe,
            Ok(None) => {
                return failure(
                    "Failed to save recipe",
                    format!("No recipe with id {}", params.id),
                )
            }
            Err(e) => return failure("Failed to save recipe", e),
        };

        let pantry_names = self.state.pantry.lock().await.names();
        let mut book = self.state.recipes.lock().await;
        let saved = book.save(recipe, &pantry_names);

        success(json!({
            "id": saved.recipe.id,
            "name": saved.recipe.name,
            "match": saved.cached_match,
            "saved_at": saved.saved_at,
            "success": true,
            "message": format!("Saved {}", saved.recipe.name)
        }))
    }

    #[tool(description = "Open a saved recipe, re-matched against the current pantry")]
    async fn get_saved_recipe(
        &self,
        Parameters(params): Parameters<RecipeIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let pantry_names = self.state.pantry.lock().await.names();
        let mut book = self.state.recipes.lock().await;

        match book.get(&params.id, &pantry_names) {
            Some(saved) => success(json!({
                "recipe": saved.recipe,
                "match": saved.cached_match,
                "saved_at": saved.saved_at
            })),
            None => failure(
                "Failed to get saved recipe",
                format!("No saved recipe with id {}", params.id),
            ),
        }
    }

    #[tool(description = "List saved recipes with up-to-date pantry matches, best match first")]
    async fn list_saved_recipes(&self) -> Result<CallToolResult, McpError> {
        let pantry_names = self.state.pantry.lock().await.names();
        let mut book = self.state.recipes.lock().await;

        let mut recipes: Vec<RankedRecipe> = book
            .list(&pantry_names)
            .iter()
            .map(RankedRecipe::from_saved)
            .collect();
        discovery::sort_by_score(&mut recipes);

        success(json!({
            "recipes": recipes,
            "count": recipes.len()
        }))
    }

    #[tool(description = "Remove a recipe from the recipe book")]
    async fn remove_saved_recipe(
        &self,
        Parameters(params): Parameters<RecipeIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let mut book = self.state.recipes.lock().await;

        match book.remove(&params.id) {
            Ok(saved) => success(json!({
                "id": saved.recipe.id,
                "name": saved.recipe.name,
                "success": true
            })),
            Err(e) => failure("Failed to remove saved recipe", e),
        }
    }
}

const INSTRUCTIONS: &str = "This server tracks a grocery pantry and suggests recipes from a \
public recipe database. Available tools include: pantry management (add, scanned-receipt \
confirmation, consumption logging, expiry listing), fuzzy ingredient matching of recipes \
against the pantry, recipe search and details, suggestions based on expiring items, and a \
saved recipe book whose matches are recomputed against the live pantry.";

#[tool_handler]
impl ServerHandler for PantryMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn initialize(
        &self,
        _request: InitializeRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<InitializeResult, McpError> {
        Ok(self.get_info())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Recipe, RecipeIngredient};
    use serde_json::Value;

    // Nothing listens on the discard port, so these tests never reach a recipe database.
    fn server() -> PantryMcpServer {
        let client = RecipeClient::new("http://127.0.0.1:9".to_string(), "1".to_string());
        PantryMcpServer::with_state(Arc::new(client), SharedState::default())
    }

    /// The error flag and the JSON body of a tool result.
    fn payload(result: &CallToolResult) -> (bool, Value) {
        let value = serde_json::to_value(result).unwrap();
        let is_error = value["isError"].as_bool().unwrap_or(false);
        let text = value["content"][0]["text"].as_str().unwrap();
        (is_error, serde_json::from_str(text).unwrap())
    }

    fn recipe(id: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: id.to_string(),
            name: format!("Recipe {}", id),
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

    async fn stock(server: &PantryMcpServer, names: &[&str]) -> Vec<String> {
        let mut pantry = server.state().pantry.lock().await;
        let mut ids = Vec::new();
        for name in names {
            let item = pantry.add(NewPantryItem::new(*name, today())).unwrap();
            ids.push(item.id);
        }
        ids
    }

    #[test_log::test(tokio::test)]
    async fn test_match_ingredients_uses_live_pantry_by_default() {
        let server = server();
        stock(&server, &["Chicken Thighs", "Olive Oil"]).await;

        let result = server
            .match_ingredients(Parameters(MatchIngredientsParams {
                ingredients: vec!["chicken breast".into(), "salt".into(), "kale".into()],
                pantry: None,
            }))
            .await
            .unwrap();

        let (is_error, body) = payload(&result);
        assert!(!is_error);
        assert_eq!(body["pantry_size"], 2);
        assert_eq!(body["result"]["matchScore"], 67);
        assert_eq!(body["result"]["missing"], serde_json::json!(["kale"]));
    }

    #[tokio::test]
    async fn test_match_ingredients_explicit_pantry_wins() {
        let server = server();
        stock(&server, &["Kale"]).await;

        let result = server
            .match_ingredients(Parameters(MatchIngredientsParams {
                ingredients: vec!["kale".into()],
                pantry: Some(vec![]),
            }))
            .await
            .unwrap();

        let (_, body) = payload(&result);
        assert_eq!(body["pantry_size"], 0);
        assert_eq!(body["result"]["matchScore"], 0);
    }

    #[tokio::test]
    async fn test_suggest_recipes_with_empty_pantry() {
        let server = server();

        let result = server
            .suggest_recipes(Parameters(SuggestRecipesParams {
                days_until_expiry: 3,
                limit: 10,
                ingredients: None,
            }))
            .await
            .unwrap();

        let (is_error, body) = payload(&result);
        assert!(!is_error);
        assert_eq!(body["suggestions"], serde_json::json!([]));
        assert_eq!(body["message"], "No ingredients found in pantry. Add some items first.");
    }

    #[tokio::test]
    async fn test_suggest_recipes_with_empty_seed_list() {
        let server = server();
        stock(&server, &["Spinach"]).await;

        let result = server
            .suggest_recipes(Parameters(SuggestRecipesParams {
                days_until_expiry: 3,
                limit: 10,
                ingredients: Some(vec![]),
            }))
            .await
            .unwrap();

        let (is_error, body) = payload(&result);
        assert!(!is_error);
        assert_eq!(body["suggestions"], serde_json::json!([]));
        assert!(body["message"]
            .as_str()
            .is_some_and(|m| m.starts_with("No seed ingredients given")));
    }

    #[tokio::test]
    async fn test_suggest_recipes_survives_unreachable_database() {
        let server = server();
        stock(&server, &["Spinach"]).await;

        let result = server
            .suggest_recipes(Parameters(SuggestRecipesParams {
                days_until_expiry: 3,
                limit: 10,
                ingredients: None,
            }))
            .await
            .unwrap();

        let (is_error, body) = payload(&result);
        assert!(!is_error);
        assert_eq!(body["seed_ingredients"], serde_json::json!(["Spinach"]));
        assert_eq!(body["suggestions"], serde_json::json!([]));
    }

    #[test_log::test(tokio::test)]
    async fn test_list_saved_recipes_best_match_first() {
        let server = server();
        stock(&server, &["Rice", "Garlic"]).await;
        {
            let pantry_names = server.state().pantry.lock().await.names();
            let mut book = server.state().recipes.lock().await;
            book.save(recipe("1", &["kale", "tofu"]), &pantry_names);
            book.save(recipe("2", &["rice", "kale"]), &pantry_names);
            book.save(recipe("3", &["rice", "garlic"]), &pantry_names);
        }

        let result = server.list_saved_recipes().await.unwrap();

        let (is_error, body) = payload(&result);
        assert!(!is_error);
        assert_eq!(body["count"], 3);
        let ids: Vec<&str> = body["recipes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
        assert_eq!(body["recipes"][0]["matchScore"], 100);
    }

    #[tokio::test]
    async fn test_saved_recipe_follows_pantry_changes() {
        let server = server();
        let ids = stock(&server, &["Rice"]).await;
        {
            let pantry_names = server.state().pantry.lock().await.names();
            server
                .state()
                .recipes
                .lock()
                .await
                .save(recipe("7", &["rice"]), &pantry_names);
        }

        server
            .remove_pantry_item(Parameters(PantryItemIdParams { id: ids[0].clone() }))
            .await
            .unwrap();
        let result = server
            .get_saved_recipe(Parameters(RecipeIdParams { id: "7".into() }))
            .await
            .unwrap();

        let (_, body) = payload(&result);
        assert_eq!(body["match"]["matchScore"], 0);
    }

    #[tokio::test]
    async fn test_log_consumption_unknown_id_is_error() {
        let server = server();

        let result = server
            .log_consumption(Parameters(LogConsumptionParams {
                id: "no-such-id".into(),
                amount: 1.0,
            }))
            .await
            .unwrap();

        let (is_error, body) = payload(&result);
        assert!(is_error);
        assert_eq!(body["error"], "Failed to log consumption");
        assert!(body["details"]
            .as_str()
            .is_some_and(|d| d.contains("no-such-id")));
    }

    #[tokio::test]
    async fn test_log_consumption_removes_used_up_item() {
        let server = server();
        let ids = stock(&server, &["Yogurt"]).await;

        let result = server
            .log_consumption(Parameters(LogConsumptionParams {
                id: ids[0].clone(),
                amount: 1.0,
            }))
            .await
            .unwrap();

        let (is_error, body) = payload(&result);
        assert!(!is_error);
        assert_eq!(body["consumption"]["removed"], true);
        assert!(server.state().pantry.lock().await.is_empty());
    }
}
