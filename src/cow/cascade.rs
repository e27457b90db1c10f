//! Transactional core of the cascade. Every function here runs on the
//! caller's open transaction and never commits; a failure anywhere leaves the
//! rollback to the caller.

use rusqlite::Connection;

use super::copy::copy_resource;
use super::junction::{Junction, references, rewrite_membership};
use super::ownership::{Resolution, load, resolve};
use super::subscription::remove_subscription;
use crate::error::{Error, Result};
use crate::store::rows::StoredResource;
use crate::types::*;

/// Resolves a single resource for writing, copying it if needed.
pub(crate) fn copy_for_edit<R: StoredResource>(
    conn: &Connection,
    household_id: i64,
    id: i64,
) -> Result<CopyOutcome> {
    let resource: R = load(conn, id)?;

    match resolve(conn, &resource, household_id)? {
        Resolution::Owned(new_id) | Resolution::ExistingCopy(new_id) => Ok(CopyOutcome {
            copied: false,
            new_id,
        }),
        Resolution::NeedsCopy => Ok(CopyOutcome {
            copied: true,
            new_id: copy_resource(conn, &resource, household_id)?,
        }),
    }
}

/// Like [`copy_for_edit`], but a fresh collection copy also retires the
/// household's subscription to the original.
pub(crate) fn copy_collection_for_edit(
    conn: &Connection,
    household_id: i64,
    collection_id: i64,
) -> Result<(CopyOutcome, Vec<CascadeAction>)> {
    let collection: Collection = load(conn, collection_id)?;
    let mut actions = Vec::new();
    let new_id = ensure_collection(conn, household_id, &collection, &mut actions)?;

    let outcome = CopyOutcome {
        copied: actions.contains(&CascadeAction::CollectionCopied),
        new_id,
    };
    Ok((outcome, actions))
}

pub(crate) fn cascade_copy_with_context(
    conn: &Connection,
    household_id: i64,
    collection_id: i64,
    recipe_id: i64,
) -> Result<CascadeOutcome> {
    let collection: Collection = load(conn, collection_id)?;
    let recipe: Recipe = load(conn, recipe_id)?;

    cascade_loaded(conn, household_id, &collection, &recipe)
}

pub(crate) fn cascade_copy_ingredient_with_context(
    conn: &Connection,
    household_id: i64,
    collection_id: i64,
    recipe_id: i64,
    ingredient_id: i64,
) -> Result<IngredientCascadeOutcome> {
    let collection: Collection = load(conn, collection_id)?;
    let recipe: Recipe = load(conn, recipe_id)?;
    let ingredient: Ingredient = load(conn, ingredient_id)?;
    require_member(
        conn,
        Junction::RecipeIngredients,
        household_id,
        recipe.id,
        ingredient.id,
    )?;

    let mut cascade = cascade_loaded(conn, household_id, &collection, &recipe)?;

    // Runs after the recipe step so the rewrite lands on the effective recipe.
    let new_ingredient_id = ensure_ingredient(
        conn,
        household_id,
        &ingredient,
        cascade.new_recipe_id,
        &mut cascade.actions_taken,
    )?;

    Ok(IngredientCascadeOutcome {
        cascade,
        new_ingredient_id,
    })
}

fn cascade_loaded(
    conn: &Connection,
    household_id: i64,
    collection: &Collection,
    recipe: &Recipe,
) -> Result<CascadeOutcome> {
    require_member(
        conn,
        Junction::CollectionRecipes,
        household_id,
        collection.id,
        recipe.id,
    )?;

    let mut actions = Vec::new();

    // Container first: the recipe rewrite has to target the effective collection.
    let new_collection_id = ensure_collection(conn, household_id, collection, &mut actions)?;
    let new_recipe_id = ensure_recipe(conn, household_id, recipe, new_collection_id, &mut actions)?;

    Ok(CascadeOutcome {
        new_collection_id,
        new_recipe_id,
        actions_taken: actions,
    })
}

fn ensure_collection(
    conn: &Connection,
    household_id: i64,
    collection: &Collection,
    actions: &mut Vec<CascadeAction>,
) -> Result<i64> {
    if let Some(id) = resolve(conn, collection, household_id)?.effective_id() {
        return Ok(id);
    }

    let copy_id = copy_resource(conn, collection, household_id)?;
    actions.push(CascadeAction::CollectionCopied);

    if remove_subscription(conn, household_id, collection.id)? {
        actions.push(CascadeAction::UnsubscribedFromOriginal);
    }

    Ok(copy_id)
}

fn ensure_recipe(
    conn: &Connection,
    household_id: i64,
    recipe: &Recipe,
    collection_id: i64,
    actions: &mut Vec<CascadeAction>,
) -> Result<i64> {
    // An existing collection copy may have dropped the recipe since.
    require_member(
        conn,
        Junction::CollectionRecipes,
        household_id,
        collection_id,
        recipe.id,
    )?;

    let recipe_id = match resolve(conn, recipe, household_id)? {
        Resolution::Owned(id) => return Ok(id),
        Resolution::ExistingCopy(id) => id,
        Resolution::NeedsCopy => {
            let id = copy_resource(conn, recipe, household_id)?;
            actions.push(CascadeAction::RecipeCopied);
            id
        }
    };

    rewrite_membership(
        conn,
        Junction::CollectionRecipes,
        household_id,
        recipe.id,
        recipe_id,
        collection_id,
    )?;
    Ok(recipe_id)
}

fn ensure_ingredient(
    conn: &Connection,
    household_id: i64,
    ingredient: &Ingredient,
    recipe_id: i64,
    actions: &mut Vec<CascadeAction>,
) -> Result<i64> {
    require_member(
        conn,
        Junction::RecipeIngredients,
        household_id,
        recipe_id,
        ingredient.id,
    )?;

    let ingredient_id = match resolve(conn, ingredient, household_id)? {
        Resolution::Owned(id) => return Ok(id),
        Resolution::ExistingCopy(id) => id,
        Resolution::NeedsCopy => {
            let id = copy_resource(conn, ingredient, household_id)?;
            actions.push(CascadeAction::IngredientCopied);
            id
        }
    };

    rewrite_membership(
        conn,
        Junction::RecipeIngredients,
        household_id,
        ingredient.id,
        ingredient_id,
        recipe_id,
    )?;
    Ok(ingredient_id)
}

/// Fails with `NotFound` unless `container_id` lists `child_id` or the
/// household's copy of it. Checked before copying so that no copy is made
/// that its container would not reference.
fn require_member(
    conn: &Connection,
    junction: Junction,
    household_id: i64,
    container_id: i64,
    child_id: i64,
) -> Result<()> {
    if references(conn, junction, household_id, container_id, child_id)? {
        return Ok(());
    }
    tracing::debug!(
        ?junction,
        household_id,
        container_id,
        child_id,
        "child not listed by container"
    );
    Err(Error::NotFound)
}
