// ==================== RECIPE STORE ====================
// Per-user recipe persistence. Recipes live embedded in the user document,
// so every operation is scoped by the user id.

use async_trait::async_trait;

use crate::{
    models::{Recipe, RecipePatch, User},
    utils::error::{AppError, AppResult},
};

pub const MSG_EMAIL_EXISTS: &str = "User with this email already exists.";
pub const MSG_USER_EXISTS: &str = "User already exists.";
pub const MSG_USER_NOT_FOUND: &str = "User not found.";
pub const MSG_RECIPE_NOT_FOUND: &str = "Recipe not found.";
pub const MSG_RECIPE_ALREADY_SAVED: &str = "This recipe has already been saved.";

/// Storage for users and their embedded recipes.
///
/// Implementations must make `save_recipe`, `update_recipe` and
/// `delete_recipe` atomic per user: two concurrent saves of distinct recipes
/// both survive.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Conflict when the email (or id) is already registered.
    async fn create_user(&self, id: &str, email: &str) -> AppResult<User>;

    /// Recipes in insertion order.
    async fn list_recipes(&self, user_id: &str) -> AppResult<Vec<Recipe>>;

    /// Appends `recipe`. Conflict when its id is already in the list.
    async fn save_recipe(&self, user_id: &str, recipe: Recipe) -> AppResult<Recipe>;

    /// Field-level merge of `patch`, returning the updated recipe.
    async fn update_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
        patch: &RecipePatch,
    ) -> AppResult<Recipe>;

    async fn delete_recipe(&self, user_id: &str, recipe_id: &str) -> AppResult<()>;

    /// Cheap reachability check for /health.
    async fn ping(&self) -> AppResult<()>;
}

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound(MSG_USER_NOT_FOUND.to_string())
}

pub(crate) fn recipe_not_found() -> AppError {
    AppError::NotFound(MSG_RECIPE_NOT_FOUND.to_string())
}

pub(crate) fn recipe_already_saved() -> AppError {
    AppError::Conflict(MSG_RECIPE_ALREADY_SAVED.to_string())
}
