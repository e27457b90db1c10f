use serde::{Deserialize, Serialize};

use crate::types::{CascadeOutcome, IngredientCascadeOutcome};

#[derive(Debug, Deserialize)]
pub struct CascadeRequest {
    pub collection_id: i64,
    pub recipe_id: i64,
    #[serde(default)]
    pub ingredient_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CascadeResponse {
    Ingredient(IngredientCascadeOutcome),
    Recipe(CascadeOutcome),
}

#[derive(Debug, Serialize)]
pub struct RecipeCleanupResponse {
    pub deleted_ingredient_ids: Vec<i64>,
    pub deleted_count: usize,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub collection_id: i64,
    pub changed: bool,
}
