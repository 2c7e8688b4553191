//! # Recipe Database Client
//!
//! This module provides an HTTP client for the public recipe database
//! (TheMealDB JSON API), used to look up recipes by name, by main ingredient,
//! or by id.
//!
//! ## Modules
//!
//! - [`client`] - HTTP client implementation with all API methods
//! - [`types`] - Type definitions for API responses
//!
//! ## Quick Start
//!
//! ```no_run
//! use pantry_match::client::RecipeClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RecipeClient::new(
//!     "https://www.themealdb.com/api/json/v1".to_string(),
//!     "1".to_string(),
//! );
//!
//! // Find recipes built around an ingredient
//! let recipes = client.filter_by_ingredient("chicken").await?;
//! println!("Found {} recipes", recipes.len());
//! # Ok(())
//! # }
//! ```

#[allow(clippy::module_inception)]
pub mod client;
pub mod types;

pub use client::RecipeClient;
pub use types::*;
