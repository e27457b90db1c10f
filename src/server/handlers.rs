use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::server::AppState;
use crate::server::dto::{
    CascadeRequest, CascadeResponse, RecipeCleanupResponse, SubscriptionResponse,
};
use crate::server::household::ActingHousehold;
use crate::server::response::{ApiError, ApiResponse};

pub async fn copy_recipe_for_edit(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let outcome = state.engine.copy_recipe_for_edit(household_id, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(outcome)))
}

pub async fn copy_ingredient_for_edit(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let outcome = state.engine.copy_ingredient_for_edit(household_id, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(outcome)))
}

pub async fn copy_collection_for_edit(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let outcome = state.engine.copy_collection_for_edit(household_id, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(outcome)))
}

pub async fn cascade(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CascadeRequest>,
) -> impl IntoResponse {
    let engine = &state.engine;

    let response = match req.ingredient_id {
        Some(ingredient_id) => CascadeResponse::Ingredient(
            engine.cascade_copy_ingredient_with_context(
                household_id,
                req.collection_id,
                req.recipe_id,
                ingredient_id,
            )?,
        ),
        None => CascadeResponse::Recipe(engine.cascade_copy_with_context(
            household_id,
            req.collection_id,
            req.recipe_id,
        )?),
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(response)))
}

pub async fn delete_recipe(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let cleanup = state.engine.delete_recipe(household_id, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(cleanup)))
}

/// Cleanup for a recipe deleted outside this service.
pub async fn cleanup_recipe(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let engine = &state.engine;

    // Orphans are found through the ingredient list, so they go first.
    let orphans = engine.cleanup_orphaned_ingredients(household_id, id)?;
    let lines = engine.cleanup_orphaned_recipe_ingredients(id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(RecipeCleanupResponse {
        deleted_ingredient_ids: orphans.deleted_ingredient_ids,
        deleted_count: lines.deleted_count,
    })))
}

pub async fn subscribe(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let changed = state.engine.subscribe(household_id, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(SubscriptionResponse {
        collection_id: id,
        changed,
    })))
}

pub async fn unsubscribe(
    ActingHousehold(household_id): ActingHousehold,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let changed = state.engine.remove_subscription(household_id, id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(SubscriptionResponse {
        collection_id: id,
        changed,
    })))
}
