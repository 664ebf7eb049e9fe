use mongodb::bson::{self, Bson, Document};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Recipe embedded in the `recipes` array of a user document
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Recipe {
    /// Assigned by the generation call (completion id)
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_servings")]
    pub servings: u32,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Ingredient {
    #[serde(rename = "ingredient", default)]
    pub name: String,
    /// Free text, e.g. "2 tablespoons (chopped)"
    #[serde(default)]
    pub amount: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
pub struct Step {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Servings may arrive as an integer or as a whole-number double (documents
/// written through mongoose store `Number` as a double). Negative and
/// fractional values are rejected.
fn servings_from_bson(value: Bson) -> Result<Option<u32>, String> {
    let whole = match value {
        Bson::Null => return Ok(None),
        Bson::Int32(n) => i64::from(n),
        Bson::Int64(n) => n,
        Bson::Double(f) if f.fract() == 0.0 && f >= 0.0 && f <= f64::from(u32::MAX) => f as i64,
        Bson::Double(f) => return Err(format!("servings must be a whole number, got {}", f)),
        other => return Err(format!("servings must be a number, got {}", other)),
    };
    u32::try_from(whole)
        .map(Some)
        .map_err(|_| format!("servings out of range: {}", whole))
}

pub(crate) fn deserialize_servings<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserialize_optional_servings(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn deserialize_optional_servings<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let bson_value = Bson::deserialize(deserializer)?;
    servings_from_bson(bson_value).map_err(serde::de::Error::custom)
}

/// Partial update for a saved recipe.
///
/// `None` (absent or `null` on the wire) leaves the field untouched. Any
/// present value is written as-is, so `servings: 0` and `title: ""` are
/// real updates.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
pub struct RecipePatch {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub title: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        deserialize_with = "deserialize_optional_servings"
    )]
    pub servings: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub ingredients: Option<Vec<Ingredient>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub steps: Option<Vec<Step>>,
}

impl RecipePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.servings.is_none()
            && self.ingredients.is_none()
            && self.steps.is_none()
    }

    /// Merges the present fields into `recipe`.
    pub fn apply(&self, recipe: &mut Recipe) {
        if let Some(title) = &self.title {
            recipe.title = title.clone();
        }
        if let Some(servings) = self.servings {
            recipe.servings = servings;
        }
        if let Some(ingredients) = &self.ingredients {
            recipe.ingredients = ingredients.clone();
        }
        if let Some(steps) = &self.steps {
            recipe.steps = steps.clone();
        }
    }

    /// Builds the `$set` body for the present fields, each key prefixed
    /// with `prefix` (e.g. `recipes.$`).
    pub fn to_set_document(&self, prefix: &str) -> Result<Document, bson::ser::Error> {
        let mut set = Document::new();
        if let Some(title) = &self.title {
            set.insert(format!("{}.title", prefix), title.as_str());
        }
        if let Some(servings) = self.servings {
            set.insert(format!("{}.servings", prefix), i64::from(servings));
        }
        if let Some(ingredients) = &self.ingredients {
            set.insert(format!("{}.ingredients", prefix), bson::to_bson(ingredients)?);
        }
        if let Some(steps) = &self.steps {
            set.insert(format!("{}.steps", prefix), bson::to_bson(steps)?);
        }
        Ok(set)
    }
}
