//! # Pantry Match Library
//!
//! Tracks a grocery pantry and suggests recipes that make use of what is about
//! to expire. At its core is a fuzzy ingredient matcher that decides which of a
//! recipe's ingredients the pantry can cover.
//!
//! ## Matcher Module
//!
//! The [`matcher`] module classifies recipe ingredients as matched or missing
//! and computes a match score. It is a pure function with no I/O.
//!
//! ## Pantry and Discovery
//!
//! [`pantry`] holds pantry items and their expiration, [`client`] talks to the
//! public recipe database, and [`discovery`] ranks fetched recipes against the
//! pantry and keeps the saved-recipe book.
//!
//! ## Server Module
//!
//! The [`server`] module exposes all of the above as MCP tools.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pantry_match::{match_ingredients, PantryMcpServer};
//!
//! // Use the matcher directly
//! let result = match_ingredients(&["garlic", "salt"], &["Garlic Bulb"]);
//! assert_eq!(result.match_score, 100);
//!
//! // Or create an MCP server
//! let server = PantryMcpServer::new(
//!     "https://www.themealdb.com/api/json/v1".to_string(),
//!     "1".to_string(),
//! );
//! ```

pub mod client;
pub mod discovery;
pub mod matcher;
pub mod pantry;
pub mod server;

pub use client::RecipeClient;
pub use matcher::{match_ingredients, MatchResult, MatchStats};
pub use pantry::Pantry;
pub use server::PantryMcpServer;
