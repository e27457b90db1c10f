//! Copy-on-write engine.
//!
//! Households write only to rows they own. When a household edits a shared
//! collection, recipe or ingredient, the engine makes a private copy of the
//! chain down to the edited row, repoints the household's junction rows at the
//! copies and retires any subscription the copy replaces. Each public method
//! below is one transaction.

mod cascade;
mod copy;
#[cfg(test)]
pub(crate) mod fixtures;
mod junction;
mod ownership;
mod reaper;
mod subscription;

pub use copy::copy_resource;
pub use junction::{Junction, references, rewrite_membership};
pub use ownership::{Resolution, is_owned};
pub use subscription::{add_subscription, remove_subscription};

use std::sync::Arc;

use rusqlite::{Transaction, TransactionBehavior};

use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::store::SqliteStore;
use crate::types::*;

pub struct CowEngine {
    store: Arc<SqliteStore>,
    config: EngineConfig,
}

impl CowEngine {
    #[must_use]
    pub fn new(store: Arc<SqliteStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    /// Runs `op` in one immediate transaction, committing on success.
    ///
    /// `BEGIN IMMEDIATE` takes the write lock before the first ownership read.
    /// A unique-index violation means another writer produced the copy first;
    /// the whole transaction is then re-run so the resolver picks that copy up.
    /// Other constraint failures are returned as they are.
    fn transact<T, F>(&self, name: &'static str, op: F) -> Result<T>
    where
        F: Fn(&Transaction<'_>) -> Result<T>,
    {
        let mut attempt = 0;
        loop {
            match self.run_once(&op) {
                Err(e) if e.is_conflict() && attempt < self.config.copy_conflict_retries => {
                    attempt += 1;
                    tracing::warn!(operation = name, attempt, "copy conflict, retrying: {e}");
                }
                Err(Error::NotFound) => {
                    tracing::debug!(operation = name, "rolled back: not found");
                    return Err(Error::NotFound);
                }
                Err(e) => {
                    tracing::warn!(operation = name, "rolled back: {e}");
                    return Err(e);
                }
                ok => return ok,
            }
        }
    }

    fn run_once<T, F>(&self, op: &F) -> Result<T>
    where
        F: Fn(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.store.connection();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        // Dropping `tx` on the error path rolls it back.
        let value = op(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    pub fn copy_recipe_for_edit(&self, household_id: i64, recipe_id: i64) -> Result<CopyOutcome> {
        let outcome = self.transact("copy_recipe_for_edit", |tx| {
            cascade::copy_for_edit::<Recipe>(tx, household_id, recipe_id)
        })?;
        log_copy("recipe", household_id, recipe_id, outcome);
        Ok(outcome)
    }

    pub fn copy_ingredient_for_edit(
        &self,
        household_id: i64,
        ingredient_id: i64,
    ) -> Result<CopyOutcome> {
        let outcome = self.transact("copy_ingredient_for_edit", |tx| {
            cascade::copy_for_edit::<Ingredient>(tx, household_id, ingredient_id)
        })?;
        log_copy("ingredient", household_id, ingredient_id, outcome);
        Ok(outcome)
    }

    pub fn copy_collection_for_edit(
        &self,
        household_id: i64,
        collection_id: i64,
    ) -> Result<CopyOutcome> {
        let (outcome, actions) = self.transact("copy_collection_for_edit", |tx| {
            cascade::copy_collection_for_edit(tx, household_id, collection_id)
        })?;
        log_copy("collection", household_id, collection_id, outcome);
        if !actions.is_empty() {
            tracing::info!(household_id, collection_id, ?actions, "collection cascade");
        }
        Ok(outcome)
    }

    pub fn cascade_copy_with_context(
        &self,
        household_id: i64,
        collection_id: i64,
        recipe_id: i64,
    ) -> Result<CascadeOutcome> {
        let outcome = self.transact("cascade_copy_with_context", |tx| {
            cascade::cascade_copy_with_context(tx, household_id, collection_id, recipe_id)
        })?;

        tracing::info!(
            household_id,
            collection_id,
            recipe_id,
            new_collection_id = outcome.new_collection_id,
            new_recipe_id = outcome.new_recipe_id,
            actions = ?outcome.actions_taken,
            "cascade complete"
        );
        Ok(outcome)
    }

    pub fn cascade_copy_ingredient_with_context(
        &self,
        household_id: i64,
        collection_id: i64,
        recipe_id: i64,
        ingredient_id: i64,
    ) -> Result<IngredientCascadeOutcome> {
        let outcome = self.transact("cascade_copy_ingredient_with_context", |tx| {
            cascade::cascade_copy_ingredient_with_context(
                tx,
                household_id,
                collection_id,
                recipe_id,
                ingredient_id,
            )
        })?;

        tracing::info!(
            household_id,
            collection_id,
            recipe_id,
            ingredient_id,
            new_collection_id = outcome.cascade.new_collection_id,
            new_recipe_id = outcome.cascade.new_recipe_id,
            new_ingredient_id = outcome.new_ingredient_id,
            actions = ?outcome.cascade.actions_taken,
            "ingredient cascade complete"
        );
        Ok(outcome)
    }

    /// Deletes the household's now-unreferenced ingredients that
    /// `deleted_recipe_id` listed. An empty result is normal.
    pub fn cleanup_orphaned_ingredients(
        &self,
        household_id: i64,
        deleted_recipe_id: i64,
    ) -> Result<IngredientCleanup> {
        let deleted_ingredient_ids = self.transact("cleanup_orphaned_ingredients", |tx| {
            reaper::delete_orphaned_ingredients(tx, household_id, deleted_recipe_id)
        })?;

        tracing::info!(
            household_id,
            deleted_recipe_id,
            deleted = deleted_ingredient_ids.len(),
            "orphaned ingredients cleaned up"
        );
        Ok(IngredientCleanup {
            deleted_ingredient_ids,
        })
    }

    /// Drops the ingredient list of a deleted recipe.
    pub fn cleanup_orphaned_recipe_ingredients(
        &self,
        recipe_id: i64,
    ) -> Result<RecipeIngredientCleanup> {
        let deleted_count = self.transact("cleanup_orphaned_recipe_ingredients", |tx| {
            reaper::delete_recipe_ingredients(tx, recipe_id)
        })?;

        tracing::info!(recipe_id, deleted_count, "recipe ingredient rows cleaned up");
        Ok(RecipeIngredientCleanup { deleted_count })
    }

    /// Reaps after a recipe deletion. Fails with `NotFound` only for a recipe
    /// id that was never issued.
    pub fn reap_after_recipe_deletion(
        &self,
        household_id: i64,
        deleted_recipe_id: i64,
    ) -> Result<ReapOutcome> {
        let outcome = self.transact("reap_after_recipe_deletion", |tx| {
            reaper::reap_after_recipe_deletion(tx, household_id, deleted_recipe_id)
        })?;
        log_reap(household_id, deleted_recipe_id, &outcome);
        Ok(outcome)
    }

    /// Reaps after a recipe deletion; never fails on the recipe id itself.
    pub fn perform_complete_cleanup_after_recipe_delete(
        &self,
        recipe_id: i64,
        household_id: i64,
    ) -> Result<RecipeDeleteCleanup> {
        let outcome = self.transact("perform_complete_cleanup_after_recipe_delete", |tx| {
            reaper::reap(tx, household_id, recipe_id)
        })?;
        log_reap(household_id, recipe_id, &outcome);
        Ok(outcome.into())
    }

    /// Deletes one of the household's own recipes, then reaps what it leaves
    /// behind. The two steps are separate transactions.
    pub fn delete_recipe(&self, household_id: i64, recipe_id: i64) -> Result<RecipeDeleteCleanup> {
        self.transact("delete_recipe", |tx| {
            let recipe: Recipe = ownership::load(tx, recipe_id)?;
            if !is_owned(&recipe, household_id) {
                return Err(Error::Forbidden);
            }
            tx.execute("DELETE FROM recipes WHERE id = ?1", [recipe_id])?;
            Ok(())
        })?;
        tracing::info!(household_id, recipe_id, "recipe deleted");

        self.perform_complete_cleanup_after_recipe_delete(recipe_id, household_id)
    }

    pub fn subscribe(&self, household_id: i64, collection_id: i64) -> Result<bool> {
        self.transact("subscribe", |tx| {
            let collection: Collection = ownership::load(tx, collection_id)?;
            if is_owned(&collection, household_id) {
                return Ok(false);
            }
            add_subscription(tx, household_id, collection_id)
        })
    }

    pub fn remove_subscription(&self, household_id: i64, collection_id: i64) -> Result<bool> {
        self.transact("remove_subscription", |tx| {
            remove_subscription(tx, household_id, collection_id)
        })
    }
}

fn log_copy(kind: &str, household_id: i64, source_id: i64, outcome: CopyOutcome) {
    tracing::info!(
        kind,
        household_id,
        source_id,
        new_id = outcome.new_id,
        copied = outcome.copied,
        "copy for edit"
    );
}

fn log_reap(household_id: i64, recipe_id: i64, outcome: &ReapOutcome) {
    tracing::info!(
        household_id,
        recipe_id,
        deleted_rows = outcome.deleted_recipe_ingredient_rows,
        deleted_ingredients = ?outcome.deleted_ingredient_ids,
        "reaped after recipe deletion"
    );
}
