use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Recipe Service API",
        version = "1.0.0",
        description = "Backend for the recipe generator. \n\n**Identity:** user ids are issued by the external identity provider and passed as `uid` (body or header).\n\n**Features:**\n- Per-user saved recipes (create, list, save, update, delete)\n- LLM recipe generation\n- Health monitoring and metrics"
    ),
    paths(
        crate::api::users::create_user,
        crate::api::users::save_recipe,
        crate::api::users::delete_recipe,
        crate::api::users::list_recipes,
        crate::api::users::update_recipe,
        crate::api::recipes::generate_recipe,
        crate::api::health::health_check,
        crate::api::metrics::get_metrics,
    ),
    components(
        schemas(
            crate::models::User,
            crate::models::Recipe,
            crate::models::Ingredient,
            crate::models::Step,
            crate::models::RecipePatch,
            crate::api::users::CreateUserRequest,
            crate::api::users::SaveRecipeRequest,
            crate::api::users::DeleteRecipeRequest,
            crate::api::users::UpdateRecipeRequest,
            crate::api::users::CreateUserResponse,
            crate::api::users::RecipeResponse,
            crate::api::users::MessageResponse,
            crate::api::recipes::GenerateRecipeRequest,
            crate::api::health::HealthResponse,
            crate::utils::error::ErrorBody,
        )
    ),
    tags(
        (name = "Users", description = "User registration and saved recipes. Recipes are embedded in the user document."),
        (name = "Recipes", description = "Recipe generation through the LLM completion API."),
        (name = "Health", description = "Health check and metrics endpoints."),
    )
)]
pub struct ApiDoc;
