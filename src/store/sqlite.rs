use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::rows::{
    self, StoredResource, explicit_id, fetch_resource, format_datetime, list_household_resources,
    parse_datetime,
};
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Sets how long a statement waits on a locked database before failing.
    pub fn with_busy_timeout(self, timeout: Duration) -> Result<Self> {
        self.conn().busy_timeout(timeout)?;
        Ok(self)
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// The copy-on-write engine opens its transactions through this guard;
    /// consuming applications can use it to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }

    fn get<R: StoredResource>(&self, id: i64) -> Result<Option<R>> {
        fetch_resource(&self.conn(), id)
    }

    fn delete_by_id(&self, table: &str, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id])?;
        Ok(rows > 0)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // Household operations

    fn create_household(&self, household: &Household) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO households (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![
                explicit_id(household.id),
                household.name,
                format_datetime(&household.created_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_household(&self, id: i64) -> Result<Option<Household>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name, created_at FROM households WHERE id = ?1",
            params![id],
            |row| {
                Ok(Household {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    // Collection operations

    fn create_collection(&self, collection: &Collection) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO collections (id, household_id, parent_id, name, description, is_public, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                explicit_id(collection.id),
                collection.household_id,
                collection.parent_id,
                collection.name,
                collection.description,
                collection.is_public,
                format_datetime(&collection.created_at),
                format_datetime(&collection.updated_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_collection(&self, id: i64) -> Result<Option<Collection>> {
        self.get(id)
    }

    fn list_household_collections(&self, household_id: i64) -> Result<Vec<Collection>> {
        list_household_resources(&self.conn(), household_id)
    }

    fn delete_collection(&self, id: i64) -> Result<bool> {
        self.delete_by_id("collections", id)
    }

    // Recipe operations

    fn create_recipe(&self, recipe: &Recipe) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO recipes (id, household_id, parent_id, name, description, instructions,
                servings, prep_minutes, cook_minutes, cost_cents, is_public, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                explicit_id(recipe.id),
                recipe.household_id,
                recipe.parent_id,
                recipe.name,
                recipe.description,
                recipe.instructions,
                recipe.servings,
                recipe.prep_minutes,
                recipe.cook_minutes,
                recipe.cost_cents,
                recipe.is_public,
                format_datetime(&recipe.created_at),
                format_datetime(&recipe.updated_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_recipe(&self, id: i64) -> Result<Option<Recipe>> {
        self.get(id)
    }

    fn list_household_recipes(&self, household_id: i64) -> Result<Vec<Recipe>> {
        list_household_resources(&self.conn(), household_id)
    }

    // Ingredient list rows are left in place for the orphan reaper.
    fn delete_recipe(&self, id: i64) -> Result<bool> {
        self.delete_by_id("recipes", id)
    }

    // Ingredient operations

    fn create_ingredient(&self, ingredient: &Ingredient) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO ingredients (id, household_id, parent_id, name, category, default_unit,
                price_cents, is_public, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                explicit_id(ingredient.id),
                ingredient.household_id,
                ingredient.parent_id,
                ingredient.name,
                ingredient.category,
                ingredient.default_unit,
                ingredient.price_cents,
                ingredient.is_public,
                format_datetime(&ingredient.created_at),
                format_datetime(&ingredient.updated_at),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_ingredient(&self, id: i64) -> Result<Option<Ingredient>> {
        self.get(id)
    }

    fn list_household_ingredients(&self, household_id: i64) -> Result<Vec<Ingredient>> {
        list_household_resources(&self.conn(), household_id)
    }

    fn find_copy(
        &self,
        kind: ResourceKind,
        household_id: i64,
        parent_id: i64,
    ) -> Result<Option<i64>> {
        rows::find_copy_id(&self.conn(), kind, household_id, parent_id)
    }

    // Collection-Recipe M2M operations

    fn add_collection_recipe(&self, collection_id: i64, recipe_id: i64) -> Result<()> {
        self.conn().execute(
            "INSERT OR IGNORE INTO collection_recipes (collection_id, recipe_id, added_at)
             VALUES (?1, ?2, ?3)",
            params![collection_id, recipe_id, format_datetime(&Utc::now())],
        )?;
        Ok(())
    }

    fn remove_collection_recipe(&self, collection_id: i64, recipe_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM collection_recipes WHERE collection_id = ?1 AND recipe_id = ?2",
            params![collection_id, recipe_id],
        )?;
        Ok(rows > 0)
    }

    fn list_collection_recipes(&self, collection_id: i64) -> Result<Vec<CollectionRecipe>> {
        rows::list_collection_recipes(&self.conn(), collection_id)
    }

    // Recipe ingredient list operations

    fn add_recipe_ingredient(&self, line: &RecipeIngredient) -> Result<i64> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO recipe_ingredients (id, recipe_id, ingredient_id, quantity, unit, note, position)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                explicit_id(line.id),
                line.recipe_id,
                line.ingredient_id,
                line.quantity,
                line.unit,
                line.note,
                line.position,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn list_recipe_ingredients(&self, recipe_id: i64) -> Result<Vec<RecipeIngredient>> {
        rows::list_recipe_ingredients(&self.conn(), recipe_id)
    }

    // Subscription operations

    fn subscribe(&self, household_id: i64, collection_id: i64) -> Result<bool> {
        rows::insert_subscription(&self.conn(), household_id, collection_id)
    }

    fn unsubscribe(&self, household_id: i64, collection_id: i64) -> Result<bool> {
        rows::delete_subscription(&self.conn(), household_id, collection_id)
    }

    fn is_subscribed(&self, household_id: i64, collection_id: i64) -> Result<bool> {
        let conn = self.conn();
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM subscriptions WHERE household_id = ?1 AND collection_id = ?2)",
            params![household_id, collection_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn list_subscriptions(&self, household_id: i64) -> Result<Vec<Subscription>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT household_id, collection_id, created_at
             FROM subscriptions WHERE household_id = ?1 ORDER BY collection_id",
        )?;

        let rows = stmt.query_map(params![household_id], |row| {
            Ok(Subscription {
                household_id: row.get(0)?,
                collection_id: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
