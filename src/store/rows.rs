//! Row mapping and connection-level queries shared by [`SqliteStore`] and the
//! copy-on-write engine, which runs them inside its own transactions.
//!
//! [`SqliteStore`]: super::SqliteStore

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::error::{Error, Result};
use crate::types::*;

pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Zero means "let SQLite assign the id".
pub(crate) fn explicit_id(id: i64) -> Option<i64> {
    (id > 0).then_some(id)
}

/// A resource table that can be loaded by id.
pub(crate) trait StoredResource: Resource + Sized {
    const COLUMNS: &'static str;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

impl StoredResource for Collection {
    const COLUMNS: &'static str =
        "id, household_id, parent_id, name, description, is_public, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Collection {
            id: row.get(0)?,
            household_id: row.get(1)?,
            parent_id: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            is_public: row.get(5)?,
            created_at: parse_datetime(&row.get::<_, String>(6)?),
            updated_at: parse_datetime(&row.get::<_, String>(7)?),
        })
    }
}

impl StoredResource for Recipe {
    const COLUMNS: &'static str = "id, household_id, parent_id, name, description, instructions,
        servings, prep_minutes, cook_minutes, cost_cents, is_public, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Recipe {
            id: row.get(0)?,
            household_id: row.get(1)?,
            parent_id: row.get(2)?,
            name: row.get(3)?,
            description: row.get(4)?,
            instructions: row.get(5)?,
            servings: row.get(6)?,
            prep_minutes: row.get(7)?,
            cook_minutes: row.get(8)?,
            cost_cents: row.get(9)?,
            is_public: row.get(10)?,
            created_at: parse_datetime(&row.get::<_, String>(11)?),
            updated_at: parse_datetime(&row.get::<_, String>(12)?),
        })
    }
}

impl StoredResource for Ingredient {
    const COLUMNS: &'static str = "id, household_id, parent_id, name, category, default_unit,
        price_cents, is_public, created_at, updated_at";

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Ingredient {
            id: row.get(0)?,
            household_id: row.get(1)?,
            parent_id: row.get(2)?,
            name: row.get(3)?,
            category: row.get(4)?,
            default_unit: row.get(5)?,
            price_cents: row.get(6)?,
            is_public: row.get(7)?,
            created_at: parse_datetime(&row.get::<_, String>(8)?),
            updated_at: parse_datetime(&row.get::<_, String>(9)?),
        })
    }
}

pub(crate) fn fetch_resource<R: StoredResource>(conn: &Connection, id: i64) -> Result<Option<R>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE id = ?1",
        R::COLUMNS,
        R::KIND.table()
    );
    conn.query_row(&sql, params![id], R::from_row)
        .optional()
        .map_err(Error::from)
}

pub(crate) fn list_household_resources<R: StoredResource>(
    conn: &Connection,
    household_id: i64,
) -> Result<Vec<R>> {
    let sql = format!(
        "SELECT {} FROM {} WHERE household_id = ?1 ORDER BY id",
        R::COLUMNS,
        R::KIND.table()
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![household_id], R::from_row)?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Id of the household's existing private copy of `parent_id`, if any.
pub(crate) fn find_copy_id(
    conn: &Connection,
    kind: ResourceKind,
    household_id: i64,
    parent_id: i64,
) -> Result<Option<i64>> {
    let sql = format!(
        "SELECT id FROM {} WHERE household_id = ?1 AND parent_id = ?2",
        kind.table()
    );
    conn.query_row(&sql, params![household_id, parent_id], |row| row.get(0))
        .optional()
        .map_err(Error::from)
}

pub(crate) fn list_collection_recipes(
    conn: &Connection,
    collection_id: i64,
) -> Result<Vec<CollectionRecipe>> {
    let mut stmt = conn.prepare(
        "SELECT collection_id, recipe_id, added_at
         FROM collection_recipes WHERE collection_id = ?1 ORDER BY recipe_id",
    )?;

    let rows = stmt.query_map(params![collection_id], |row| {
        Ok(CollectionRecipe {
            collection_id: row.get(0)?,
            recipe_id: row.get(1)?,
            added_at: parse_datetime(&row.get::<_, String>(2)?),
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

pub(crate) fn list_recipe_ingredients(
    conn: &Connection,
    recipe_id: i64,
) -> Result<Vec<RecipeIngredient>> {
    let mut stmt = conn.prepare(
        "SELECT id, recipe_id, ingredient_id, quantity, unit, note, position
         FROM recipe_ingredients WHERE recipe_id = ?1 ORDER BY position, id",
    )?;

    let rows = stmt.query_map(params![recipe_id], |row| {
        Ok(RecipeIngredient {
            id: row.get(0)?,
            recipe_id: row.get(1)?,
            ingredient_id: row.get(2)?,
            quantity: row.get(3)?,
            unit: row.get(4)?,
            note: row.get(5)?,
            position: row.get(6)?,
        })
    })?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(Error::from)
}

/// Highest id ever assigned in an AUTOINCREMENT table, or 0 if none was.
pub(crate) fn sequence_high_water(conn: &Connection, table: &str) -> Result<i64> {
    let seq: Option<i64> = conn
        .query_row(
            "SELECT seq FROM sqlite_sequence WHERE name = ?1",
            params![table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(seq.unwrap_or(0))
}

pub(crate) fn insert_subscription(
    conn: &Connection,
    household_id: i64,
    collection_id: i64,
) -> Result<bool> {
    let rows = conn.execute(
        "INSERT OR IGNORE INTO subscriptions (household_id, collection_id, created_at)
         VALUES (?1, ?2, ?3)",
        params![household_id, collection_id, format_datetime(&Utc::now())],
    )?;
    Ok(rows > 0)
}

pub(crate) fn delete_subscription(
    conn: &Connection,
    household_id: i64,
    collection_id: i64,
) -> Result<bool> {
    let rows = conn.execute(
        "DELETE FROM subscriptions WHERE household_id = ?1 AND collection_id = ?2",
        params![household_id, collection_id],
    )?;
    Ok(rows > 0)
}
