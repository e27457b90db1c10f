use rusqlite::Connection;

use crate::error::{Error, Result};
use crate::store::rows::{StoredResource, fetch_resource, find_copy_id};
use crate::types::Resource;

/// Where a household stands with respect to a resource it wants to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The household owns the row itself.
    Owned(i64),
    /// The household already holds a private copy of the row.
    ExistingCopy(i64),
    /// A private copy has to be made before writing.
    NeedsCopy,
}

impl Resolution {
    /// The id the household can write to, if it has one already.
    #[must_use]
    pub fn effective_id(self) -> Option<i64> {
        match self {
            Resolution::Owned(id) | Resolution::ExistingCopy(id) => Some(id),
            Resolution::NeedsCopy => None,
        }
    }
}

#[must_use]
pub fn is_owned<R: Resource>(resource: &R, household_id: i64) -> bool {
    resource.household_id() == household_id
}

/// Loads a row inside the caller's transaction, failing with `NotFound`.
pub(crate) fn load<R: StoredResource>(conn: &Connection, id: i64) -> Result<R> {
    fetch_resource(conn, id)?.ok_or(Error::NotFound)
}

/// Must be called with a row read inside the active transaction.
pub(crate) fn resolve<R: Resource>(
    conn: &Connection,
    resource: &R,
    household_id: i64,
) -> Result<Resolution> {
    if is_owned(resource, household_id) {
        return Ok(Resolution::Owned(resource.id()));
    }

    match find_copy_id(conn, R::KIND, household_id, resource.id())? {
        Some(copy_id) => Ok(Resolution::ExistingCopy(copy_id)),
        None => Ok(Resolution::NeedsCopy),
    }
}
