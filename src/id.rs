//! Code for handling IDs
use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::collections::HashMap;

/// A trait alias for ID types
pub trait IDLike:
    Eq + std::hash::Hash + std::borrow::Borrow<str> + Clone + std::fmt::Display + From<String>
{
}
impl<T> IDLike for T where
    T: Eq + std::hash::Hash + std::borrow::Borrow<str> + Clone + std::fmt::Display + From<String>
{
}

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone,
            std::hash::Hash,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            serde::Deserialize,
            Debug,
            serde::Serialize,
        )]
        /// An ID type (e.g. `AssetID`, `BuildingID`, etc.)
        pub struct $name(pub std::rc::Rc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl $name {
            /// Create a new ID from a string slice
            pub fn new(id: &str) -> Self {
                $name(std::rc::Rc::from(id))
            }
        }
    };
}
pub(crate) use define_id_type;

#[cfg(test)]
define_id_type!(GenericID);

/// A map keyed by ID which can be queried with a descriptive error for missing entries
pub trait IDMap<ID: IDLike, V> {
    /// Look up the value for the given ID.
    ///
    /// # Arguments
    ///
    /// * `id` - The string representation of the ID
    ///
    /// # Returns
    ///
    /// A reference to the value in `self`, or an error if not found.
    fn get_by_id(&self, id: &str) -> Result<&V>;
}

macro_rules! define_id_map_methods {
    () => {
        fn get_by_id(&self, id: &str) -> Result<&V> {
            self.get(id).with_context(|| format!("Unknown ID {id} found"))
        }
    };
}

impl<ID: IDLike, V> IDMap<ID, V> for HashMap<ID, V> {
    define_id_map_methods!();
}

impl<ID: IDLike, V> IDMap<ID, V> for IndexMap<ID, V> {
    define_id_map_methods!();
}
