use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    api::users::{present, RecipeResponse},
    services::RecipeGenerator,
    utils::error::{AppError, AppResult, ErrorBody},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRecipeRequest {
    /// Dish name, short description, or list of available ingredients
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/recipe/generate",
    tag = "Recipes",
    request_body = GenerateRecipeRequest,
    responses(
        (status = 200, description = "Generated recipe (not saved)", body = RecipeResponse),
        (status = 400, description = "Missing description", body = ErrorBody),
        (status = 500, description = "LLM failure or malformed output", body = ErrorBody),
        (status = 503, description = "Generation not configured", body = ErrorBody)
    )
)]
pub async fn generate_recipe(
    generator: web::Data<dyn RecipeGenerator>,
    request: web::Json<GenerateRecipeRequest>,
) -> AppResult<HttpResponse> {
    let description = present(request.into_inner().description)
        .ok_or_else(|| AppError::Validation("Recipe description is required.".to_string()))?;

    log::info!("🍳 POST /recipe/generate - {}", description);

    let recipe = generator.generate(&description).await?;

    Ok(HttpResponse::Ok().json(RecipeResponse {
        message: "Recipe generated successfully".to_string(),
        recipe,
    }))
}
