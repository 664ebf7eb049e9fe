// ==================== MONGODB RECIPE STORE ====================
// Atomic array operators instead of read-modify-write on the whole user
// document: $push guarded by $ne, $pull, and positional $set.

use async_trait::async_trait;
use mongodb::{
    bson::{self, doc},
    error::{ErrorKind, WriteFailure},
    options::ReturnDocument,
    Collection,
};
use serde::Deserialize;

use crate::{
    database::MongoDB,
    models::{Recipe, RecipePatch, User},
    services::recipe_store::{
        recipe_already_saved, recipe_not_found, user_not_found, RecipeStore, MSG_EMAIL_EXISTS,
        MSG_USER_EXISTS,
    },
    utils::error::{AppError, AppResult},
};

const COLLECTION: &str = "users";
const DUPLICATE_KEY: i32 = 11000;

/// Projection of a user document down to its recipes
#[derive(Debug, Deserialize)]
struct UserRecipes {
    #[serde(default)]
    recipes: Vec<Recipe>,
}

pub struct MongoRecipeStore {
    db: MongoDB,
}

impl MongoRecipeStore {
    pub fn new(db: MongoDB) -> Self {
        Self { db }
    }

    fn users(&self) -> Collection<User> {
        self.db.collection::<User>(COLLECTION)
    }

    fn user_recipes(&self) -> Collection<UserRecipes> {
        self.db.collection::<UserRecipes>(COLLECTION)
    }

    async fn user_exists(&self, user_id: &str) -> AppResult<bool> {
        let count = self
            .db
            .collection::<bson::Document>(COLLECTION)
            .count_documents(doc! { "_id": user_id })
            .limit(1)
            .await?;
        Ok(count > 0)
    }

    /// When a guarded update matched nothing, tell a missing user apart from
    /// a failed recipe guard.
    async fn miss(&self, user_id: &str, recipe_miss: fn() -> AppError) -> AppError {
        match self.user_exists(user_id).await {
            Ok(true) => recipe_miss(),
            Ok(false) => user_not_found(),
            Err(e) => e,
        }
    }
}

fn is_duplicate_key(e: &mongodb::error::Error) -> bool {
    matches!(
        e.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl RecipeStore for MongoRecipeStore {
    async fn create_user(&self, id: &str, email: &str) -> AppResult<User> {
        log::info!("📝 Creating user {}", id);

        let users = self.users();
        if users.find_one(doc! { "email": email }).await?.is_some() {
            return Err(AppError::Conflict(MSG_EMAIL_EXISTS.to_string()));
        }

        let user = User::new(id, email);
        match users.insert_one(&user).await {
            Ok(_) => Ok(user),
            // The unique email index closes the race between the check and the insert
            Err(e) if is_duplicate_key(&e) => {
                let email_taken = users.find_one(doc! { "email": email }).await?.is_some();
                let msg = if email_taken { MSG_EMAIL_EXISTS } else { MSG_USER_EXISTS };
                Err(AppError::Conflict(msg.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list_recipes(&self, user_id: &str) -> AppResult<Vec<Recipe>> {
        self.user_recipes()
            .find_one(doc! { "_id": user_id })
            .projection(doc! { "recipes": 1 })
            .await?
            .map(|u| u.recipes)
            .ok_or_else(user_not_found)
    }

    async fn save_recipe(&self, user_id: &str, recipe: Recipe) -> AppResult<Recipe> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": user_id, "recipes._id": { "$ne": recipe.id.as_str() } },
                doc! {
                    "$push": { "recipes": bson::to_bson(&recipe)? },
                    "$set": { "updated_at": chrono::Utc::now().timestamp() },
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(self.miss(user_id, recipe_already_saved).await);
        }
        Ok(recipe)
    }

    async fn update_recipe(
        &self,
        user_id: &str,
        recipe_id: &str,
        patch: &RecipePatch,
    ) -> AppResult<Recipe> {
        let filter = doc! { "_id": user_id, "recipes._id": recipe_id };
        let projection = doc! { "recipes": { "$elemMatch": { "_id": recipe_id } } };

        let updated = if patch.is_empty() {
            // Nothing to write; leave updated_at alone
            self.user_recipes()
                .find_one(filter)
                .projection(projection)
                .await?
        } else {
            let mut set = patch.to_set_document("recipes.$")?;
            set.insert("updated_at", chrono::Utc::now().timestamp());

            self.user_recipes()
                .find_one_and_update(filter, doc! { "$set": set })
                .projection(projection)
                .return_document(ReturnDocument::After)
                .await?
        };

        match updated.and_then(|u| u.recipes.into_iter().next()) {
            Some(recipe) => Ok(recipe),
            None => Err(self.miss(user_id, recipe_not_found).await),
        }
    }

    async fn delete_recipe(&self, user_id: &str, recipe_id: &str) -> AppResult<()> {
        let result = self
            .users()
            .update_one(
                doc! { "_id": user_id, "recipes._id": recipe_id },
                doc! {
                    "$pull": { "recipes": { "_id": recipe_id } },
                    "$set": { "updated_at": chrono::Utc::now().timestamp() },
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(self.miss(user_id, recipe_not_found).await);
        }
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.database().run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
