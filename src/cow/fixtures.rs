//! A small shared graph for engine tests.
//!
//! HOST owns public collection COLLECTION holding RECIPE, which lists EGGS and
//! FLOUR. MEMBER and OTHER both subscribe to COLLECTION, and each also files
//! RECIPE in a collection of their own.

use chrono::Utc;
use rusqlite::{Connection, params};
use tempfile::TempDir;

use crate::store::{SqliteStore, Store};
use crate::types::*;

pub const MEMBER: i64 = 1;
pub const OTHER: i64 = 2;
pub const HOST: i64 = 99;

pub const COLLECTION: i64 = 10;
pub const RECIPE: i64 = 20;
pub const EGGS: i64 = 30;
pub const FLOUR: i64 = 31;
pub const MEMBER_COLLECTION: i64 = 40;
pub const OTHER_COLLECTION: i64 = 41;

pub fn empty_store() -> (TempDir, SqliteStore) {
    let temp = TempDir::new().unwrap();
    let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
    store.initialize().unwrap();
    (temp, store)
}

pub fn shared_store() -> (TempDir, SqliteStore) {
    let (temp, store) = empty_store();
    let now = Utc::now();

    for (id, name) in [(MEMBER, "Member"), (OTHER, "Other"), (HOST, "Host")] {
        store
            .create_household(&Household {
                id,
                name: name.to_string(),
                created_at: now,
            })
            .unwrap();
    }

    for (id, household_id, name, is_public) in [
        (COLLECTION, HOST, "Sunday brunch", true),
        (MEMBER_COLLECTION, MEMBER, "Favourites", false),
        (OTHER_COLLECTION, OTHER, "To try", false),
    ] {
        store
            .create_collection(&Collection {
                id,
                household_id,
                parent_id: None,
                name: name.to_string(),
                description: None,
                is_public,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
    }

    store
        .create_recipe(&Recipe {
            id: RECIPE,
            household_id: HOST,
            parent_id: None,
            name: "Pancakes".to_string(),
            description: Some("Fluffy".to_string()),
            instructions: Some("Whisk, rest, fry.".to_string()),
            servings: Some(4),
            prep_minutes: Some(10),
            cook_minutes: Some(15),
            cost_cents: Some(320),
            is_public: true,
            created_at: now,
            updated_at: now,
        })
        .unwrap();

    for (id, name, price) in [(EGGS, "Eggs", 30), (FLOUR, "Flour", 12)] {
        store
            .create_ingredient(&Ingredient {
                id,
                household_id: HOST,
                parent_id: None,
                name: name.to_string(),
                category: None,
                default_unit: None,
                price_cents: Some(price),
                is_public: true,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
    }

    for (position, (ingredient_id, quantity, unit)) in
        [(EGGS, 2.0, "pcs"), (FLOUR, 250.0, "g")].into_iter().enumerate()
    {
        store
            .add_recipe_ingredient(&RecipeIngredient {
                id: 0,
                recipe_id: RECIPE,
                ingredient_id,
                quantity: Some(quantity),
                unit: Some(unit.to_string()),
                note: None,
                position: position as i32,
            })
            .unwrap();
    }

    for collection_id in [COLLECTION, MEMBER_COLLECTION, OTHER_COLLECTION] {
        store.add_collection_recipe(collection_id, RECIPE).unwrap();
    }
    store.subscribe(MEMBER, COLLECTION).unwrap();
    store.subscribe(OTHER, COLLECTION).unwrap();

    (temp, store)
}

pub fn insert_recipe(conn: &Connection, household_id: i64, parent_id: Option<i64>) -> i64 {
    conn.execute(
        "INSERT INTO recipes (household_id, parent_id, name, created_at, updated_at)
         VALUES (?1, ?2, 'Scratch recipe', datetime('now'), datetime('now'))",
        params![household_id, parent_id],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_ingredient(conn: &Connection, household_id: i64, parent_id: Option<i64>) -> i64 {
    conn.execute(
        "INSERT INTO ingredients (household_id, parent_id, name, created_at, updated_at)
         VALUES (?1, ?2, 'Scratch ingredient', datetime('now'), datetime('now'))",
        params![household_id, parent_id],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn insert_line(conn: &Connection, recipe_id: i64, ingredient_id: i64) -> i64 {
    conn.execute(
        "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, position)
         VALUES (?1, ?2, (SELECT COUNT(*) FROM recipe_ingredients WHERE recipe_id = ?1))",
        params![recipe_id, ingredient_id],
    )
    .unwrap();
    conn.last_insert_rowid()
}

pub fn count(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> i64 {
    conn.query_row(sql, params, |row| row.get(0)).unwrap()
}
