pub mod memory_recipe_store;
pub mod mongo_recipe_store;
pub mod recipe_generator;
pub mod recipe_store;

pub use memory_recipe_store::MemoryRecipeStore;
pub use mongo_recipe_store::MongoRecipeStore;
pub use recipe_generator::{DisabledGenerator, OpenAiRecipeGenerator, RecipeGenerator};
pub use recipe_store::RecipeStore;
