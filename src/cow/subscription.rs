use rusqlite::Connection;

use crate::error::Result;
use crate::store::rows::{delete_subscription, insert_subscription};

/// Drops the household's subscription to `collection_id`. Returns whether a
/// row was removed; a missing subscription is not an error.
pub fn remove_subscription(conn: &Connection, household_id: i64, collection_id: i64) -> Result<bool> {
    let removed = delete_subscription(conn, household_id, collection_id)?;
    if removed {
        tracing::debug!(household_id, collection_id, "removed subscription");
    }
    Ok(removed)
}

/// Subscribes the household to `collection_id`. Returns whether a new row was
/// created.
pub fn add_subscription(conn: &Connection, household_id: i64, collection_id: i64) -> Result<bool> {
    let added = insert_subscription(conn, household_id, collection_id)?;
    if added {
        tracing::debug!(household_id, collection_id, "added subscription");
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cow::fixtures::{self, COLLECTION, MEMBER, OTHER};

    #[test]
    fn test_remove_subscription_is_idempotent() {
        let (_temp, store) = fixtures::shared_store();
        let conn = store.connection();

        assert!(remove_subscription(&conn, MEMBER, COLLECTION).unwrap());
        assert!(!remove_subscription(&conn, MEMBER, COLLECTION).unwrap());

        let remaining = fixtures::count(
            &conn,
            "SELECT COUNT(*) FROM subscriptions WHERE household_id = ?1 AND collection_id = ?2",
            [OTHER, COLLECTION],
        );
        assert_eq!(remaining, 1);
    }

    #[test]
    fn test_add_subscription_once() {
        let (_temp, store) = fixtures::shared_store();
        let conn = store.connection();
        remove_subscription(&conn, MEMBER, COLLECTION).unwrap();

        assert!(add_subscription(&conn, MEMBER, COLLECTION).unwrap());
        assert!(!add_subscription(&conn, MEMBER, COLLECTION).unwrap());
    }
}
