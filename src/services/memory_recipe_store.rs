use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::{
    models::{Recipe, RecipePatch, User},
    services::recipe_store::{
        recipe_already_saved, recipe_not_found, user_not_found, RecipeStore, MSG_EMAIL_EXISTS,
        MSG_USER_EXISTS,
    },
    utils::error::{AppError, AppResult},
};

/// In-process store for local development (`STORE_BACKEND=memory`) and tests.
///
/// Each operation holds the write lock across its whole read-modify-write.
#[derive(Default)]
pub struct MemoryRecipeStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn get_user(&self, user_id: &str) -> Option<User> {
        self.users.read().await.get(user_id).cloned()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn create_user(&self, id: &str, email: &str) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict(MSG_EMAIL_EXISTS.to_string()));
        }
        if users.contains_key(id) {
            return Err(AppError::Conflict(MSG_USER_EXISTS.to_string()));
        }

        let user = User::new(id, email);
        users.insert(id.to_string(), user.clone());
        Ok(user)
    }

    async fn list_recipes(&self, user_id: &str) -> AppResult<Vec<Recipe>> {
        let users = self.users.read().await;
        users
            .get(user_id)
            .map(|u| u.recipes.clone())
            .ok_or_else(user_not_found)
    }

    async fn save_recipe(&self, user_id: &str, recipe: Recipe) -> AppResult<Recipe> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or_else(user_not_found)?;

        if user.recipe_index(&recipe.id).is_some() {
            return Err(recipe_already_saved());
        }

        user.recipes.push(recipe.clone());
        user.updated_at = chrono::Utc::now().timestamp();
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
        patch: &RecipePatch,
    ) -> AppResult<Recipe> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or_else(user_not_found)?;
        let index = user.recipe_index(recipe_id).ok_or_else(recipe_not_found)?;

        if !patch.is_empty() {
            patch.apply(&mut user.recipes[index]);
            user.updated_at = chrono::Utc::now().timestamp();
        }
        Ok(user.recipes[index].clone())
    }

    async fn delete_recipe(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or_else(user_not_found)?;
        let index = user.recipe_index(recipe_id).ok_or_else(recipe_not_found)?;

        user.recipes.remove(index);
        user.updated_at = chrono::Utc::now().timestamp();
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
