use std::fmt;

use serde::{Deserialize, Serialize};

/// One step a cascade actually performed. The set is closed so callers can
/// match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeAction {
    CollectionCopied,
    RecipeCopied,
    IngredientCopied,
    UnsubscribedFromOriginal,
}

impl CascadeAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CascadeAction::CollectionCopied => "collection_copied",
            CascadeAction::RecipeCopied => "recipe_copied",
            CascadeAction::IngredientCopied => "ingredient_copied",
            CascadeAction::UnsubscribedFromOriginal => "unsubscribed_from_original",
        }
    }
}

impl fmt::Display for CascadeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a single-entity copy-for-edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOutcome {
    pub copied: bool,
    pub new_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeOutcome {
    pub new_collection_id: i64,
    pub new_recipe_id: i64,
    pub actions_taken: Vec<CascadeAction>,
}

impl CascadeOutcome {
    #[must_use]
    pub fn copied_anything(&self) -> bool {
        !self.actions_taken.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCascadeOutcome {
    #[serde(flatten)]
    pub cascade: CascadeOutcome,
    pub new_ingredient_id: i64,
}

/// What the orphan reaper removed after a recipe deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReapOutcome {
    pub deleted_ingredient_ids: Vec<i64>,
    pub deleted_recipe_ingredient_rows: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientCleanup {
    pub deleted_ingredient_ids: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredientCleanup {
    pub deleted_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDeleteCleanup {
    pub deleted_recipe_ingredients: usize,
    pub deleted_orphaned_ingredients: Vec<i64>,
}

impl From<ReapOutcome> for RecipeDeleteCleanup {
    fn from(outcome: ReapOutcome) -> Self {
        Self {
            deleted_recipe_ingredients: outcome.deleted_recipe_ingredient_rows,
            deleted_orphaned_ingredients: outcome.deleted_ingredient_ids,
        }
    }
}
