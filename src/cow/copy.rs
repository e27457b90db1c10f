use chrono::Utc;
use rusqlite::{Connection, params};

use crate::error::{Error, Result};
use crate::store::rows::format_datetime;
use crate::types::{Resource, ResourceKind};

/// Duplicates `resource` into a new row owned by `household_id` whose
/// `parent_id` points back at the source, together with the source's direct
/// child rows. Returns the new id.
///
/// Fails with `NotFound` if the source row is gone, and with
/// `ConstraintViolation` if the household already holds a copy of it.
pub fn copy_resource<R: Resource>(
    conn: &Connection,
    resource: &R,
    household_id: i64,
) -> Result<i64> {
    let kind = R::KIND;
    let columns = kind.domain_columns().join(", ");
    let now = format_datetime(&Utc::now());

    let inserted = conn.execute(
        &format!(
            "INSERT INTO {table} (household_id, parent_id, {columns}, created_at, updated_at)
             SELECT ?1, id, {columns}, ?2, ?2 FROM {table} WHERE id = ?3",
            table = kind.table(),
        ),
        params![household_id, now, resource.id()],
    )?;

    if inserted == 0 {
        return Err(Error::NotFound);
    }

    let copy_id = conn.last_insert_rowid();
    let children = copy_children(conn, kind, resource.id(), copy_id)?;

    tracing::debug!(
        kind = %kind,
        household_id,
        source_id = resource.id(),
        copy_id,
        children,
        "copied resource"
    );

    Ok(copy_id)
}

fn copy_children(conn: &Connection, kind: ResourceKind, source_id: i64, copy_id: i64) -> Result<usize> {
    let rows = match kind {
        ResourceKind::Collection => conn.execute(
            "INSERT INTO collection_recipes (collection_id, recipe_id, added_at)
             SELECT ?1, recipe_id, added_at FROM collection_recipes WHERE collection_id = ?2",
            params![copy_id, source_id],
        )?,
        ResourceKind::Recipe => conn.execute(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, quantity, unit, note, position)
             SELECT ?1, ingredient_id, quantity, unit, note, position
             FROM recipe_ingredients WHERE recipe_id = ?2 ORDER BY position, id",
            params![copy_id, source_id],
        )?,
        // Ingredients are leaves.
        ResourceKind::Ingredient => 0,
    };
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cow::fixtures::{self, MEMBER};
    use crate::cow::ownership::load;
    use crate::store::rows::{list_collection_recipes, list_recipe_ingredients};
    use crate::types::{Collection, Ingredient, Recipe};

    #[test]
    fn test_copy_recipe_duplicates_fields_and_ingredient_list() {
        let (_temp, store) = fixtures::shared_store();
        let conn = store.connection();

        let source: Recipe = load(&conn, fixtures::RECIPE).unwrap();
        let copy_id = copy_resource(&conn, &source, MEMBER).unwrap();
        assert_ne!(copy_id, source.id);

        let copy: Recipe = load(&conn, copy_id).unwrap();
        assert_eq!(copy.household_id, MEMBER);
        assert_eq!(copy.parent_id, Some(source.id));
        assert_eq!(copy.name, source.name);
        assert_eq!(copy.servings, source.servings);
        assert_eq!(copy.cost_cents, source.cost_cents);
        assert_eq!(copy.is_public, source.is_public);

        let original_lines = list_recipe_ingredients(&conn, source.id).unwrap();
        let copied_lines = list_recipe_ingredients(&conn, copy_id).unwrap();
        assert_eq!(copied_lines.len(), original_lines.len());
        for (copied, original) in copied_lines.iter().zip(&original_lines) {
            assert_eq!(copied.ingredient_id, original.ingredient_id);
            assert_eq!(copied.quantity, original.quantity);
            assert_eq!(copied.unit, original.unit);
            assert_eq!(copied.position, original.position);
            assert_ne!(copied.id, original.id);
        }
    }

    #[test]
    fn test_copy_collection_duplicates_membership() {
        let (_temp, store) = fixtures::shared_store();
        let conn = store.connection();

        let source: Collection = load(&conn, fixtures::COLLECTION).unwrap();
        let copy_id = copy_resource(&conn, &source, MEMBER).unwrap();

        let members: Vec<i64> = list_collection_recipes(&conn, copy_id)
            .unwrap()
            .into_iter()
            .map(|m| m.recipe_id)
            .collect();
        assert_eq!(members, vec![fixtures::RECIPE]);
        assert_eq!(list_collection_recipes(&conn, source.id).unwrap().len(), 1);
    }

    #[test]
    fn test_copy_ingredient_is_a_leaf() {
        let (_temp, store) = fixtures::shared_store();
        let conn = store.connection();

        let source: Ingredient = load(&conn, fixtures::EGGS).unwrap();
        let copy_id = copy_resource(&conn, &source, MEMBER).unwrap();

        let copy: Ingredient = load(&conn, copy_id).unwrap();
        assert_eq!(copy.parent_id, Some(fixtures::EGGS));
        assert_eq!(copy.price_cents, source.price_cents);
        assert_eq!(copy.household_id, MEMBER);
    }

    #[test]
    fn test_second_copy_for_same_household_is_rejected() {
        let (_temp, store) = fixtures::shared_store();
        let conn = store.connection();

        let source: Ingredient = load(&conn, fixtures::EGGS).unwrap();
        copy_resource(&conn, &source, MEMBER).unwrap();

        let err = copy_resource(&conn, &source, MEMBER).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation { .. }));
        assert!(err.is_conflict());

        // Another household can still take its own copy.
        copy_resource(&conn, &source, fixtures::OTHER).unwrap();
    }

    #[test]
    fn test_copy_of_deleted_source_is_not_found() {
        let (_temp, store) = fixtures::shared_store();
        let conn = store.connection();

        let source: Ingredient = load(&conn, fixtures::FLOUR).unwrap();
        conn.execute("DELETE FROM recipe_ingredients WHERE ingredient_id = ?1", params![source.id])
            .unwrap();
        conn.execute("DELETE FROM ingredients WHERE id = ?1", params![source.id])
            .unwrap();

        let result = copy_resource(&conn, &source, MEMBER);
        assert!(matches!(result, Err(Error::NotFound)));
    }
}
