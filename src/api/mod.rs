pub mod health;
pub mod metrics;
pub mod recipes;
pub mod swagger;
pub mod users;

use actix_web::web;

use crate::utils::error::AppError;

/// Routes shared by the server and the route tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/metrics", web::get().to(metrics::get_metrics))
        .service(
            web::scope("/user")
                .route("/create", web::post().to(users::create_user))
                .route("/save", web::post().to(users::save_recipe))
                .route("/delete-recipe", web::post().to(users::delete_recipe))
                .route("/recipes", web::get().to(users::list_recipes))
                .route("/update-recipe", web::post().to(users::update_recipe)),
        )
        .service(
            web::scope("/recipe").route("/generate", web::post().to(recipes::generate_recipe)),
        );
}

/// Malformed or oversized JSON bodies answer with the same 400 envelope as
/// missing fields.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| AppError::Validation(format!("Invalid request body: {}", err)).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        middleware::RequestMetrics,
        models::{Ingredient, Recipe, RecipePatch, Step, User},
        services::{DisabledGenerator, MemoryRecipeStore, RecipeGenerator, RecipeStore},
        utils::error::AppResult,
    };
    use actix_web::{http::StatusCode, test, App};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct FixedGenerator;

    #[async_trait]
    impl RecipeGenerator for FixedGenerator {
        async fn generate(&self, description: &str) -> AppResult<Recipe> {
            Ok(Recipe {
                id: "chatcmpl-1".to_string(),
                title: description.to_string(),
                servings: 1,
                ingredients: vec![Ingredient {
                    name: "Salt".to_string(),
                    amount: "To taste".to_string(),
                }],
                steps: vec![Step {
                    title: "Cook".to_string(),
                    description: "Cook it".to_string(),
                }],
            })
        }
    }

    /// Store whose backend is down: every call fails with a database error.
    struct UnreachableStore;

    #[async_trait]
    impl RecipeStore for UnreachableStore {
        async fn create_user(&self, _id: &str, _email: &str) -> AppResult<User> {
            Err(AppError::Database("connection refused".to_string()))
        }
        async fn list_recipes(&self, _user_id: &str) -> AppResult<Vec<Recipe>> {
            Err(AppError::Database("connection refused".to_string()))
        }
        async fn save_recipe(&self, _user_id: &str, _recipe: Recipe) -> AppResult<Recipe> {
            Err(AppError::Database("connection refused".to_string()))
        }
        async fn update_recipe(
            &self,
            _user_id: &str,
            _recipe_id: &str,
            _patch: &RecipePatch,
        ) -> AppResult<Recipe> {
            Err(AppError::Database("connection refused".to_string()))
        }
        async fn delete_recipe(&self, _user_id: &str, _recipe_id: &str) -> AppResult<()> {
            Err(AppError::Database("connection refused".to_string()))
        }
        async fn ping(&self) -> AppResult<()> {
            Err(AppError::Database("connection refused".to_string()))
        }
    }

    struct BrokenGenerator;

    #[async_trait]
    impl RecipeGenerator for BrokenGenerator {
        async fn generate(&self, _description: &str) -> AppResult<Recipe> {
            crate::services::recipe_generator::parse_recipe("x", "I don't recognize this dish")
        }
    }

    macro_rules! app {
        () => {
            app!(DisabledGenerator)
        };
        ($generator:expr) => {{
            let store: Arc<dyn RecipeStore> = Arc::new(MemoryRecipeStore::new());
            let generator: Arc<dyn RecipeGenerator> = Arc::new($generator);
            test::init_service(
                App::new()
                    .app_data(web::Data::from(store))
                    .app_data(web::Data::from(generator))
                    .app_data(json_config(1024 * 1024))
                    .configure(configure),
            )
            .await
        }};
    }

    fn post(uri: &str, body: Value) -> test::TestRequest {
        test::TestRequest::post().uri(uri).set_json(body)
    }

    fn soup() -> Value {
        json!({
            "_id": "r1",
            "title": "Soup",
            "servings": 4,
            "ingredients": [{ "ingredient": "Leek", "amount": "2" }],
            "steps": [{ "title": "Chop", "description": "Chop the leeks" }]
        })
    }

    #[actix_web::test]
    async fn test_end_to_end_create_save_list_delete() {
        let app = app!();

        let resp = test::call_service(
            &app,
            post("/user/create", json!({ "email": "a@x.com", "userId": "u1" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User created successfully");
        assert_eq!(body["user"]["_id"], "u1");
        assert_eq!(body["user"]["recipes"], json!([]));

        let resp = test::call_service(
            &app,
            post("/user/save", json!({ "uid": "u1", "recipe": soup() })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Recipe saved successfully!");
        assert_eq!(body["recipe"]["_id"], "r1");

        let req = test::TestRequest::get()
            .uri("/user/recipes")
            .insert_header(("uid", "u1"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["_id"], "r1");
        assert_eq!(body[0]["title"], "Soup");

        let resp = test::call_service(
            &app,
            post("/user/delete-recipe", json!({ "uid": "u1", "recipeId": "r1" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Recipe deleted successfully");

        let req = test::TestRequest::get()
            .uri("/user/recipes")
            .insert_header(("uid", "u1"))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }

    #[actix_web::test]
    async fn test_duplicate_email_is_bad_request() {
        let app = app!();
        let first = post("/user/create", json!({ "email": "a@x.com", "userId": "u1" }));
        assert_eq!(test::call_service(&app, first.to_request()).await.status(), StatusCode::CREATED);

        let resp = test::call_service(
            &app,
            post("/user/create", json!({ "email": "a@x.com", "userId": "u2" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User with this email already exists.");
        assert_eq!(body["error"], "conflict");
    }

    #[actix_web::test]
    async fn test_duplicate_recipe_is_bad_request() {
        let app = app!();
        test::call_service(&app, post("/user/create", json!({ "email": "a@x.com", "userId": "u1" })).to_request()).await;
        test::call_service(&app, post("/user/save", json!({ "uid": "u1", "recipe": soup() })).to_request()).await;

        let resp = test::call_service(
            &app,
            post("/user/save", json!({ "uid": "u1", "recipe": soup() })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "This recipe has already been saved.");

        let req = test::TestRequest::get().uri("/user/recipes").insert_header(("uid", "u1")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_update_recipe_partial_merge() {
        let app = app!();
        test::call_service(&app, post("/user/create", json!({ "email": "a@x.com", "userId": "u1" })).to_request()).await;
        test::call_service(&app, post("/user/save", json!({ "uid": "u1", "recipe": soup() })).to_request()).await;

        let resp = test::call_service(
            &app,
            post(
                "/user/update-recipe",
                json!({ "uid": "u1", "recipeId": "r1", "updatedRecipe": { "title": "New Name" } }),
            )
            .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Recipe updated successfully");
        assert_eq!(body["recipe"]["title"], "New Name");
        assert_eq!(body["recipe"]["servings"], 4);
        assert_eq!(body["recipe"]["ingredients"], soup()["ingredients"]);
        assert_eq!(body["recipe"]["steps"], soup()["steps"]);

        // Zero is a real value now; the truthiness merge used to drop it.
        let resp = test::call_service(
            &app,
            post(
                "/user/update-recipe",
                json!({ "uid": "u1", "recipeId": "r1", "updatedRecipe": { "servings": 0 } }),
            )
            .to_request(),
        )
        .await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["recipe"]["servings"], 0);
        assert_eq!(body["recipe"]["title"], "New Name");
    }

    #[actix_web::test]
    async fn test_missing_fields_are_bad_request() {
        let app = app!();
        let cases = [
            ("/user/create", json!({ "email": "a@x.com" }), "Email and user ID are required."),
            ("/user/save", json!({ "uid": "u1" }), "User ID and recipe are required."),
            ("/user/save", json!({ "uid": "", "recipe": soup() }), "User ID and recipe are required."),
            ("/user/delete-recipe", json!({ "uid": "u1" }), "User ID and recipe ID are required."),
            (
                "/user/update-recipe",
                json!({ "uid": "u1", "recipeId": "r1" }),
                "User ID, Recipe ID, and Updated Recipe are required.",
            ),
            ("/recipe/generate", json!({}), "Recipe description is required."),
        ];

        for (uri, body, message) in cases {
            let resp = test::call_service(&app, post(uri, body).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], message);
            assert_eq!(body["error"], "validation_error");
        }

        let resp = test::call_service(&app, test::TestRequest::get().uri("/user/recipes").to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "User ID is required.");
    }

    #[actix_web::test]
    async fn test_malformed_json_is_bad_request() {
        let app = app!();
        let req = test::TestRequest::post()
            .uri("/user/save")
            .insert_header(("content-type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
    }

    #[actix_web::test]
    async fn test_unknown_user_is_not_found() {
        let app = app!();
        let requests = vec![
            post("/user/save", json!({ "uid": "ghost", "recipe": soup() })).to_request(),
            post("/user/delete-recipe", json!({ "uid": "ghost", "recipeId": "r1" })).to_request(),
            post(
                "/user/update-recipe",
                json!({ "uid": "ghost", "recipeId": "r1", "updatedRecipe": { "title": "x" } }),
            )
            .to_request(),
            test::TestRequest::get().uri("/user/recipes").insert_header(("uid", "ghost")).to_request(),
        ];

        for req in requests {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "User not found.");
        }
    }

    #[actix_web::test]
    async fn test_unknown_recipe_is_not_found() {
        let app = app!();
        test::call_service(&app, post("/user/create", json!({ "email": "a@x.com", "userId": "u1" })).to_request()).await;

        let resp = test::call_service(
            &app,
            post("/user/delete-recipe", json!({ "uid": "u1", "recipeId": "r9" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Recipe not found.");
    }

    #[actix_web::test]
    async fn test_generate_recipe() {
        let app = app!(FixedGenerator);
        let resp = test::call_service(
            &app,
            post("/recipe/generate", json!({ "description": "Pea soup" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["recipe"]["_id"], "chatcmpl-1");
        assert_eq!(body["recipe"]["title"], "Pea soup");
    }

    #[actix_web::test]
    async fn test_generate_malformed_output_hides_detail() {
        let app = app!(BrokenGenerator);
        let resp = test::call_service(
            &app,
            post("/recipe/generate", json!({ "description": "???" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Failed to generate recipe.");
        assert_eq!(body["error"], "internal_error");
    }

    #[actix_web::test]
    async fn test_generate_without_provider_is_unavailable() {
        let app = app!();
        let resp = test::call_service(
            &app,
            post("/recipe/generate", json!({ "description": "Pea soup" })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[actix_web::test]
    async fn test_health_and_metrics() {
        let app = app!();
        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "ok");

        let resp = test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let text = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&text).contains("http_requests_total"));
    }

    #[actix_web::test]
    async fn test_health_degraded_when_store_unreachable() {
        let store: Arc<dyn RecipeStore> = Arc::new(UnreachableStore);
        let generator: Arc<dyn RecipeGenerator> = Arc::new(DisabledGenerator);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::from(generator))
                .configure(configure),
        )
        .await;

        let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["store"], "unreachable");
    }

    #[actix_web::test]
    async fn test_request_metrics_count_requests_and_server_errors() {
        let store: Arc<dyn RecipeStore> = Arc::new(UnreachableStore);
        let generator: Arc<dyn RecipeGenerator> = Arc::new(DisabledGenerator);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::from(store))
                .app_data(web::Data::from(generator))
                .wrap(RequestMetrics)
                .configure(configure),
        )
        .await;

        // Counters are process-wide and other tests run concurrently, so
        // compare lower bounds only.
        let (requests_before, errors_before) = metrics::snapshot();

        let req = test::TestRequest::get().uri("/user/recipes").insert_header(("uid", "u1")).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Internal server error.");

        let resp = test::call_service(&app, post("/user/save", json!({ "uid": "u1" })).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let (requests_after, errors_after) = metrics::snapshot();
        assert!(requests_after >= requests_before + 2);
        assert!(errors_after >= errors_before + 1);
    }

    #[actix_web::test]
    async fn test_padded_uid_is_not_trimmed() {
        let app = app!();
        test::call_service(&app, post("/user/create", json!({ "email": "a@x.com", "userId": "u1" })).to_request()).await;

        let resp = test::call_service(
            &app,
            post("/user/save", json!({ "uid": " u1", "recipe": soup() })).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get().uri("/user/recipes").insert_header(("uid", "u1")).to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!([]));
    }
}
