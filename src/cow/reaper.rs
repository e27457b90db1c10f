use rusqlite::{Connection, params};

use crate::error::{Error, Result};
use crate::store::rows::sequence_high_water;
use crate::types::ReapOutcome;

/// Full cleanup after `household_id` deleted `recipe_id`: drops the recipe's
/// ingredient list, then deletes the household's private ingredient copies
/// that nothing references any more. Rows the household created itself are
/// never reaped.
///
/// Fails with `NotFound` only for an id the recipes table never issued.
pub(crate) fn reap_after_recipe_deletion(
    conn: &Connection,
    household_id: i64,
    recipe_id: i64,
) -> Result<ReapOutcome> {
    if !recipe_id_issued(conn, recipe_id)? {
        return Err(Error::NotFound);
    }
    reap(conn, household_id, recipe_id)
}

/// Same as [`reap_after_recipe_deletion`] without the id check.
pub(crate) fn reap(conn: &Connection, household_id: i64, recipe_id: i64) -> Result<ReapOutcome> {
    // Collected before the ingredient list goes away.
    let candidates = candidate_ingredients(conn, household_id, recipe_id)?;
    let deleted_recipe_ingredient_rows = delete_recipe_ingredients(conn, recipe_id)?;
    let deleted_ingredient_ids = delete_unreferenced(conn, household_id, &candidates)?;

    Ok(ReapOutcome {
        deleted_ingredient_ids,
        deleted_recipe_ingredient_rows,
    })
}

/// Deletes the household's ingredient copies listed by `recipe_id` that no
/// live recipe references, along with their dangling ingredient-list rows.
pub(crate) fn delete_orphaned_ingredients(
    conn: &Connection,
    household_id: i64,
    recipe_id: i64,
) -> Result<Vec<i64>> {
    let candidates = candidate_ingredients(conn, household_id, recipe_id)?;
    delete_unreferenced(conn, household_id, &candidates)
}

/// Deletes the ingredient list of a recipe that no longer exists. A live
/// recipe keeps its list.
pub(crate) fn delete_recipe_ingredients(conn: &Connection, recipe_id: i64) -> Result<usize> {
    let rows = conn.execute(
        "DELETE FROM recipe_ingredients
         WHERE recipe_id = ?1 AND NOT EXISTS (SELECT 1 FROM recipes WHERE id = ?1)",
        params![recipe_id],
    )?;
    Ok(rows)
}

pub(crate) fn recipe_id_issued(conn: &Connection, recipe_id: i64) -> Result<bool> {
    Ok(recipe_id > 0 && recipe_id <= sequence_high_water(conn, "recipes")?)
}

fn candidate_ingredients(conn: &Connection, household_id: i64, recipe_id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT ri.ingredient_id
         FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?1 AND i.household_id = ?2 AND i.parent_id IS NOT NULL
         ORDER BY ri.ingredient_id",
    )?;

    let rows = stmt.query_map(params![recipe_id, household_id], |row| row.get(0))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn delete_unreferenced(conn: &Connection, household_id: i64, candidates: &[i64]) -> Result<Vec<i64>> {
    let mut deleted = Vec::new();

    for &ingredient_id in candidates {
        let referenced: bool = conn.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM recipe_ingredients ri
                 JOIN recipes r ON r.id = ri.recipe_id
                 WHERE ri.ingredient_id = ?1
             )",
            params![ingredient_id],
            |row| row.get(0),
        )?;
        if referenced {
            continue;
        }

        // Only lines of deleted recipes can still point here.
        let dangling = conn.execute(
            "DELETE FROM recipe_ingredients WHERE ingredient_id = ?1",
            params![ingredient_id],
        )?;
        let rows = conn.execute(
            "DELETE FROM ingredients
             WHERE id = ?1 AND household_id = ?2 AND parent_id IS NOT NULL",
            params![ingredient_id, household_id],
        )?;

        if rows > 0 {
            tracing::debug!(household_id, ingredient_id, dangling, "deleted orphaned ingredient");
            deleted.push(ingredient_id);
        }
    }

    Ok(deleted)
}
