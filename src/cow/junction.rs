use rusqlite::{Connection, params};

use crate::error::Result;

/// Many-to-many tables whose child references can be repointed at a copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Junction {
    /// `collection_recipes`: collection contains recipe.
    CollectionRecipes,
    /// `recipe_ingredients`: recipe lists ingredient.
    RecipeIngredients,
}

impl Junction {
    const fn table(self) -> &'static str {
        match self {
            Junction::CollectionRecipes => "collection_recipes",
            Junction::RecipeIngredients => "recipe_ingredients",
        }
    }

    const fn container_table(self) -> &'static str {
        match self {
            Junction::CollectionRecipes => "collections",
            Junction::RecipeIngredients => "recipes",
        }
    }

    const fn container_column(self) -> &'static str {
        match self {
            Junction::CollectionRecipes => "collection_id",
            Junction::RecipeIngredients => "recipe_id",
        }
    }

    const fn child_column(self) -> &'static str {
        match self {
            Junction::CollectionRecipes => "recipe_id",
            Junction::RecipeIngredients => "ingredient_id",
        }
    }

    const fn child_table(self) -> &'static str {
        match self {
            Junction::CollectionRecipes => "recipes",
            Junction::RecipeIngredients => "ingredients",
        }
    }
}

/// Whether `container_id` references `child_id`, or the household's private
/// copy of it.
pub fn references(
    conn: &Connection,
    junction: Junction,
    household_id: i64,
    container_id: i64,
    child_id: i64,
) -> Result<bool> {
    let sql = format!(
        "SELECT EXISTS(
             SELECT 1 FROM {table}
             WHERE {container} = ?1
               AND ({child} = ?2 OR {child} IN (
                   SELECT id FROM {children} WHERE household_id = ?3 AND parent_id = ?2))
         )",
        table = junction.table(),
        container = junction.container_column(),
        child = junction.child_column(),
        children = junction.child_table(),
    );
    let found = conn.query_row(&sql, params![container_id, child_id, household_id], |row| {
        row.get(0)
    })?;
    Ok(found)
}

/// Repoints the junction rows under `container_id` that reference
/// `old_child_id` so they reference `new_child_id` instead.
///
/// Only rows whose container is owned by `household_id` are touched. If the
/// container already references `new_child_id` (possible for the unique
/// collection membership pair), the stale row is dropped rather than
/// duplicated. Returns the number of rows rewritten or dropped; a second run
/// with the same arguments finds nothing to do.
pub fn rewrite_membership(
    conn: &Connection,
    junction: Junction,
    household_id: i64,
    old_child_id: i64,
    new_child_id: i64,
    container_id: i64,
) -> Result<usize> {
    if old_child_id == new_child_id {
        return Ok(0);
    }

    let table = junction.table();
    let container = junction.container_column();
    let child = junction.child_column();
    let scope = format!(
        "{container} = ?2 AND {child} = ?3
         AND {container} IN (SELECT id FROM {owners} WHERE id = ?2 AND household_id = ?4)",
        owners = junction.container_table(),
    );

    let updated = conn.execute(
        &format!("UPDATE OR IGNORE {table} SET {child} = ?1 WHERE {scope}"),
        params![new_child_id, container_id, old_child_id, household_id],
    )?;

    // Rows skipped above collided with an existing (container, new child) pair.
    let merged = conn.execute(
        &format!("DELETE FROM {table} WHERE {scope}"),
        params![new_child_id, container_id, old_child_id, household_id],
    )?;

    tracing::debug!(
        table,
        household_id,
        container_id,
        old_child_id,
        new_child_id,
        updated,
        merged,
        "rewrote junction rows"
    );

    Ok(updated + merged)
}
