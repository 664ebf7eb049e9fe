// ==================== RECIPE GENERATION ====================
// Chat-completions client that turns a dish description into a Recipe.
// The model output is validated against the Recipe shape; nothing is repaired.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::OpenAiConfig,
    models::Recipe,
    utils::error::{AppError, AppResult},
};

pub const SYSTEM_PROMPT: &str = r#"You are a recipe generating assistant. You will be given the name of a dish, a brief description of a dish, or a list of ingredients that the person has available.
Your job is to help someone with minimal cooking experience to make the dish they have described or to suggest a recipe for a dish they could make with their ingredients + basic household items.
You should include a list of ingredients and ingredient amounts.
You should then list out step-by-step instructions starting with food prep and then actual cooking. Your instructions should be clear and not overly technical, so a beginner could understand them. Try to be succinct, as people don't want to read too much. Get to the point but be clear. Include how many servings the recipe makes in "servings".
Include the title of the dish in "title".
Default the simpler version of a dish. For example, if you are asked for a pasta recipe, assume they are using store-bought pasta, not making their own.
Your output is to be purely well-formatted JSON. Do not output anything except JSON. Do not start your output with any text, just JSON.
For example, if I gave you a recipe titled "Seafood Pasta", your output would be something like the following:
{"title":"Seafood Pasta","servings":2,"ingredients":[{"ingredient":"Spaghetti","amount":"400g"},{"ingredient":"Shrimp","amount":"200g"},{"ingredient":"Garlic cloves","amount":"3 cloves"},{"ingredient":"Salt","amount":"To taste"}],"steps":[{"title":"Example Step Title","description":"Detailed description of the step"}]}"#;

#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    async fn generate(&self, description: &str) -> AppResult<Recipe>;
}

// ==================== WIRE TYPES ====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Model output before validation. Everything is optional so that missing
/// fields surface as validation errors rather than serde noise.
#[derive(Debug, Deserialize)]
struct GeneratedRecipe {
    title: Option<String>,
    #[serde(default, deserialize_with = "crate::models::recipe::deserialize_optional_servings")]
    servings: Option<u32>,
    #[serde(default)]
    ingredients: Vec<crate::models::Ingredient>,
    #[serde(default)]
    steps: Vec<crate::models::Step>,
}

pub fn build_messages(description: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: "system".to_string(),
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user".to_string(),
            content: format!(
                "This is the dish/dish description for which you are to generate a recipe for: {}. Generate a recipe and output only JSON.",
                description
            ),
        },
    ]
}

/// Turns a chat completion into a Recipe, using the completion id as the
/// recipe id (UUID v4 when the provider sends none).
pub fn recipe_from_completion(completion: ChatCompletionResponse) -> AppResult<Recipe> {
    let content = completion
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| AppError::Generation("completion has no choices".to_string()))?;

    let id = completion
        .id
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    parse_recipe(&id, &content)
}

pub fn parse_recipe(id: &str, content: &str) -> AppResult<Recipe> {
    let value: serde_json::Value = serde_json::from_str(content.trim())
        .map_err(|e| AppError::Generation(format!("model output is not JSON: {}", e)))?;
    if !value.is_object() {
        return Err(AppError::Generation("model output is not a JSON object".to_string()));
    }

    let generated: GeneratedRecipe = serde_json::from_value(value)
        .map_err(|e| AppError::Generation(format!("model output has the wrong shape: {}", e)))?;

    let title = generated
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Generation("model output has no title".to_string()))?;
    if generated.ingredients.is_empty() {
        return Err(AppError::Generation("model output has no ingredients".to_string()));
    }
    if generated.steps.is_empty() {
        return Err(AppError::Generation("model output has no steps".to_string()));
    }

    Ok(Recipe {
        id: id.to_string(),
        title,
        servings: generated.servings.unwrap_or_default(),
        ingredients: generated.ingredients,
        steps: generated.steps,
    })
}

// ==================== PROVIDERS ====================

pub struct OpenAiRecipeGenerator {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiRecipeGenerator {
    pub fn new(config: OpenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl RecipeGenerator for OpenAiRecipeGenerator {
    async fn generate(&self, description: &str) -> AppResult<Recipe> {
        log::info!("🤖 Generating recipe with {} for: {}", self.config.model, description);

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: build_messages(description),
        };

        let response = self
            .client
            .post(&self.config.api_base)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Generation(format!("LLM API error {}: {}", status, body)));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::Generation(format!("Failed to parse LLM response: {}", e)))?;

        let recipe = recipe_from_completion(completion)?;
        log::info!("✅ Generated recipe {} ({})", recipe.id, recipe.title);
        Ok(recipe)
    }
}

/// Installed when no API key is configured
pub struct DisabledGenerator;

#[async_trait]
impl RecipeGenerator for DisabledGenerator {
    async fn generate(&self, _description: &str) -> AppResult<Recipe> {
        Err(AppError::Unavailable(
            "Recipe generation is not configured.".to_string(),
        ))
    }
}
