pub(crate) mod rows;
mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
///
/// Create methods insert the row's `id` as given, or let the database assign
/// one when it is zero, and return the stored id.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // Household operations
    fn create_household(&self, household: &Household) -> Result<i64>;
    fn get_household(&self, id: i64) -> Result<Option<Household>>;

    // Collection operations
    fn create_collection(&self, collection: &Collection) -> Result<i64>;
    fn get_collection(&self, id: i64) -> Result<Option<Collection>>;
    fn list_household_collections(&self, household_id: i64) -> Result<Vec<Collection>>;
    fn delete_collection(&self, id: i64) -> Result<bool>;

    // Recipe operations
    fn create_recipe(&self, recipe: &Recipe) -> Result<i64>;
    fn get_recipe(&self, id: i64) -> Result<Option<Recipe>>;
    fn list_household_recipes(&self, household_id: i64) -> Result<Vec<Recipe>>;
    fn delete_recipe(&self, id: i64) -> Result<bool>;

    // Ingredient operations
    fn create_ingredient(&self, ingredient: &Ingredient) -> Result<i64>;
    fn get_ingredient(&self, id: i64) -> Result<Option<Ingredient>>;
    fn list_household_ingredients(&self, household_id: i64) -> Result<Vec<Ingredient>>;

    // Private copy lookup: the household's copy of `parent_id`, if one exists
    fn find_copy(&self, kind: ResourceKind, household_id: i64, parent_id: i64)
    -> Result<Option<i64>>;

    // Collection-Recipe M2M operations
    fn add_collection_recipe(&self, collection_id: i64, recipe_id: i64) -> Result<()>;
    fn remove_collection_recipe(&self, collection_id: i64, recipe_id: i64) -> Result<bool>;
    fn list_collection_recipes(&self, collection_id: i64) -> Result<Vec<CollectionRecipe>>;

    // Recipe ingredient list operations
    fn add_recipe_ingredient(&self, line: &RecipeIngredient) -> Result<i64>;
    fn list_recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>>;

    // Subscription operations
    fn subscribe(&self, household_id: i64, collection_id: i64) -> Result<bool>;
    fn unsubscribe(&self, household_id: i64, collection_id: i64) -> Result<bool>;
    fn is_subscribed(&self, household_id: i64, collection_id: i64) -> Result<bool>;
    fn list_subscriptions(&self, household_id: i64) -> Result<Vec<Subscription>>;

    fn close(&self) -> Result<()>;
}
