use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Collection, Ingredient, Recipe};

/// The three levels of the ownership chain: collection, recipe, ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Collection,
    Recipe,
    Ingredient,
}

impl ResourceKind {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            ResourceKind::Collection => "collections",
            ResourceKind::Recipe => "recipes",
            ResourceKind::Ingredient => "ingredients",
        }
    }

    /// Columns copied verbatim into a private copy. Identity, ownership,
    /// parent pointer and timestamps are excluded.
    #[must_use]
    pub const fn domain_columns(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Collection => &["name", "description", "is_public"],
            ResourceKind::Recipe => &[
                "name",
                "description",
                "instructions",
                "servings",
                "prep_minutes",
                "cook_minutes",
                "cost_cents",
                "is_public",
            ],
            ResourceKind::Ingredient => &[
                "name",
                "category",
                "default_unit",
                "price_cents",
                "is_public",
            ],
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Collection => "collection",
            ResourceKind::Recipe => "recipe",
            ResourceKind::Ingredient => "ingredient",
        };
        f.write_str(name)
    }
}

/// A household-owned row that can be copied on write.
pub trait Resource {
    const KIND: ResourceKind;

    fn id(&self) -> i64;
    fn household_id(&self) -> i64;
}

macro_rules! impl_resource {
    ($ty:ty, $kind:expr) => {
        impl Resource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> i64 {
                self.id
            }

            fn household_id(&self) -> i64 {
                self.household_id
            }
        }
    };
}

impl_resource!(Collection, ResourceKind::Collection);
impl_resource!(Recipe, ResourceKind::Recipe);
impl_resource!(Ingredient, ResourceKind::Ingredient);
