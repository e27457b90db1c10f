#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use tempfile::TempDir;

use larder::config::EngineConfig;
use larder::cow::CowEngine;
use larder::store::{SqliteStore, Store};
use larder::types::*;

pub const T1: i64 = 1;
pub const T2: i64 = 2;
pub const OWNER: i64 = 99;

pub const C1: i64 = 10;
pub const R1: i64 = 20;
pub const I1: i64 = 30;
pub const I2: i64 = 31;
pub const T2_COLLECTION: i64 = 41;

pub struct Fixture {
    pub temp_dir: TempDir,
    pub store: Arc<SqliteStore>,
    pub engine: CowEngine,
}

impl Fixture {
    /// Households 1 and 2 subscribe to public collection 10, owned by
    /// household 99, which holds recipe 20 listing ingredients 30 and 31.
    /// Household 2 also files recipe 20 in its own collection 41.
    pub fn scenario() -> Self {
        let fixture = Self::empty();
        let store = &fixture.store;

        for (id, name) in [(T1, "Tenant one"), (T2, "Tenant two"), (OWNER, "Owner")] {
            store.create_household(&household(id, name)).expect("create household");
        }

        store
            .create_collection(&collection(C1, OWNER, "Weeknight dinners", true))
            .expect("create collection");
        store
            .create_collection(&collection(T2_COLLECTION, T2, "Saved", false))
            .expect("create collection");
        store.create_recipe(&recipe(R1, OWNER, "Shakshuka")).expect("create recipe");
        store
            .create_ingredient(&ingredient(I1, OWNER, "Eggs"))
            .expect("create ingredient");
        store
            .create_ingredient(&ingredient(I2, OWNER, "Tomatoes"))
            .expect("create ingredient");

        add_line(store, R1, I1, 0);
        add_line(store, R1, I2, 1);

        store.add_collection_recipe(C1, R1).expect("file recipe");
        store.add_collection_recipe(T2_COLLECTION, R1).expect("file recipe");
        store.subscribe(T1, C1).expect("subscribe");
        store.subscribe(T2, C1).expect("subscribe");

        fixture
    }

    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let store = SqliteStore::new(temp_dir.path().join("larder.db")).expect("open store");
        store.initialize().expect("initialize store");

        let store = Arc::new(store);
        let engine = CowEngine::new(store.clone(), EngineConfig::default());

        Self {
            temp_dir,
            store,
            engine,
        }
    }
}

pub fn household(id: i64, name: &str) -> Household {
    Household {
        id,
        name: name.to_string(),
        created_at: Utc::now(),
    }
}

pub fn collection(id: i64, household_id: i64, name: &str, is_public: bool) -> Collection {
    let now = Utc::now();
    Collection {
        id,
        household_id,
        parent_id: None,
        name: name.to_string(),
        description: None,
        is_public,
        created_at: now,
        updated_at: now,
    }
}

pub fn recipe(id: i64, household_id: i64, name: &str) -> Recipe {
    let now = Utc::now();
    Recipe {
        id,
        household_id,
        parent_id: None,
        name: name.to_string(),
        description: None,
        instructions: Some("Simmer, crack eggs in, cover.".to_string()),
        servings: Some(2),
        prep_minutes: Some(5),
        cook_minutes: Some(20),
        cost_cents: None,
        is_public: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn ingredient(id: i64, household_id: i64, name: &str) -> Ingredient {
    let now = Utc::now();
    Ingredient {
        id,
        household_id,
        parent_id: None,
        name: name.to_string(),
        category: None,
        default_unit: None,
        price_cents: None,
        is_public: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn add_line(store: &SqliteStore, recipe_id: i64, ingredient_id: i64, position: i32) -> i64 {
    store
        .add_recipe_ingredient(&RecipeIngredient {
            id: 0,
            recipe_id,
            ingredient_id,
            quantity: Some(1.0),
            unit: None,
            note: None,
            position,
        })
        .expect("add recipe ingredient")
}

pub fn ingredient_ids(store: &SqliteStore, recipe_id: i64) -> Vec<i64> {
    store
        .list_recipe_ingredients(recipe_id)
        .expect("list recipe ingredients")
        .into_iter()
        .map(|line| line.ingredient_id)
        .collect()
}

pub fn recipe_ids(store: &SqliteStore, collection_id: i64) -> Vec<i64> {
    store
        .list_collection_recipes(collection_id)
        .expect("list collection recipes")
        .into_iter()
        .map(|row| row.recipe_id)
        .collect()
}
