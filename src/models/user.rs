use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Recipe;

/// Document in the "users" collection
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct User {
    /// Identity-provider subject id - PRIMARY IDENTIFIER
    #[serde(rename = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub recipes: Vec<Recipe>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
}

impl User {
    pub fn new(id: &str, email: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: id.to_string(),
            email: email.to_string(),
            recipes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn recipe_index(&self, recipe_id: &str) -> Option<usize> {
        self.recipes.iter().position(|r| r.id == recipe_id)
    }
}
