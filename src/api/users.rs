use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::{Recipe, RecipePatch, User},
    services::RecipeStore,
    utils::error::{AppError, AppResult, ErrorBody},
};

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: Option<String>,
    /// Identity-provider subject id
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveRecipeRequest {
    pub uid: Option<String>,
    pub recipe: Option<Recipe>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRecipeRequest {
    pub uid: Option<String>,
    pub recipe_id: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipeRequest {
    pub uid: Option<String>,
    pub recipe_id: Option<String>,
    pub updated_recipe: Option<RecipePatch>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecipeResponse {
    pub message: String,
    pub recipe: Recipe,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// The value unchanged, or `None` when absent or blank. Ids are matched
/// exactly, so surrounding whitespace is kept.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

// ==================== HANDLERS ====================

#[utoipa::path(
    post,
    path = "/user/create",
    tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Missing fields or email already registered", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_user(
    store: web::Data<dyn RecipeStore>,
    request: web::Json<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let (Some(email), Some(user_id)) = (present(request.email), present(request.user_id)) else {
        return Err(AppError::Validation("Email and user ID are required.".to_string()));
    };

    log::info!("📝 POST /user/create - user {}", user_id);

    let user = store.create_user(&user_id, &email).await?;

    log::info!("✅ User created: {}", user.id);
    Ok(HttpResponse::Created().json(CreateUserResponse {
        message: "User created successfully".to_string(),
        user,
    }))
}

#[utoipa::path(
    post,
    path = "/user/save",
    tag = "Users",
    request_body = SaveRecipeRequest,
    responses(
        (status = 200, description = "Recipe saved", body = RecipeResponse),
        (status = 400, description = "Missing fields or recipe already saved", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn save_recipe(
    store: web::Data<dyn RecipeStore>,
    request: web::Json<SaveRecipeRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let (Some(uid), Some(recipe)) = (present(request.uid), request.recipe) else {
        return Err(AppError::Validation("User ID and recipe are required.".to_string()));
    };
    if recipe.id.trim().is_empty() {
        return Err(AppError::Validation("Recipe ID is required.".to_string()));
    }

    log::info!("📝 POST /user/save - recipe {} for user {}", recipe.id, uid);

    let recipe = store.save_recipe(&uid, recipe).await?;

    log::info!("✅ Recipe {} saved", recipe.id);
    Ok(HttpResponse::Ok().json(RecipeResponse {
        message: "Recipe saved successfully!".to_string(),
        recipe,
    }))
}

#[utoipa::path(
    post,
    path = "/user/delete-recipe",
    tag = "Users",
    request_body = DeleteRecipeRequest,
    responses(
        (status = 200, description = "Recipe deleted", body = MessageResponse),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 404, description = "User or recipe not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_recipe(
    store: web::Data<dyn RecipeStore>,
    request: web::Json<DeleteRecipeRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let (Some(uid), Some(recipe_id)) = (present(request.uid), present(request.recipe_id)) else {
        return Err(AppError::Validation("User ID and recipe ID are required.".to_string()));
    };

    log::info!("🗑️  POST /user/delete-recipe - recipe {} for user {}", recipe_id, uid);

    store.delete_recipe(&uid, &recipe_id).await?;

    log::info!("✅ Recipe {} deleted", recipe_id);
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Recipe deleted successfully".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/user/recipes",
    tag = "Users",
    params(
        ("uid" = String, Header, description = "Identity-provider user id")
    ),
    responses(
        (status = 200, description = "Saved recipes in insertion order", body = [Recipe]),
        (status = 400, description = "Missing uid header", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_recipes(
    store: web::Data<dyn RecipeStore>,
    req: HttpRequest,
) -> AppResult<HttpResponse> {
    let uid = present(
        req.headers()
            .get("uid")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    )
    .ok_or_else(|| AppError::Validation("User ID is required.".to_string()))?;

    log::info!("📋 GET /user/recipes - user {}", uid);

    let recipes = store.list_recipes(&uid).await?;

    log::info!("✅ Listed {} recipes", recipes.len());
    Ok(HttpResponse::Ok().json(recipes))
}

#[utoipa::path(
    post,
    path = "/user/update-recipe",
    tag = "Users",
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 400, description = "Missing fields", body = ErrorBody),
        (status = 404, description = "User or recipe not found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_recipe(
    store: web::Data<dyn RecipeStore>,
    request: web::Json<UpdateRecipeRequest>,
) -> AppResult<HttpResponse> {
    let request = request.into_inner();
    let (Some(uid), Some(recipe_id), Some(patch)) = (
        present(request.uid),
        present(request.recipe_id),
        request.updated_recipe,
    ) else {
        return Err(AppError::Validation(
            "User ID, Recipe ID, and Updated Recipe are required.".to_string(),
        ));
    };

    log::info!("🔧 POST /user/update-recipe - recipe {} for user {}", recipe_id, uid);

    let recipe = store.update_recipe(&uid, &recipe_id, &patch).await?;

    log::info!("✅ Recipe {} updated", recipe_id);
    Ok(HttpResponse::Ok().json(RecipeResponse {
        message: "Recipe updated successfully".to_string(),
        recipe,
    }))
}
