//! Procedure allow-list

use std::collections::HashMap;

use crate::error::{ServiceError, ServiceResult};

/// Immutable set of procedure names that may be invoked.
///
/// Matching is case-insensitive. Each entry keeps the spelling it was
/// configured with, and that spelling is what gets executed.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    /// Lowercased name -> configured spelling
    entries: HashMap<String, String>,
}

impl AllowList {
    /// Build an allow-list from configured names.
    ///
    /// Names are trimmed. Blank entries are rejected; entries that differ
    /// only by case collapse to the first spelling.
    ///
    /// ```
    /// use procgate_services::AllowList;
    ///
    /// let list = AllowList::new(["sp_ConsultarBanco"]).unwrap();
    /// assert_eq!(list.resolve("SP_CONSULTARBANCO"), Some("sp_ConsultarBanco"));
    /// assert_eq!(list.resolve("sp_DropAllTables"), None);
    /// ```
    pub fn new<I, S>(names: I) -> ServiceResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashMap::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(ServiceError::Validation(
                    "allow-list entries must not be blank".to_string(),
                ));
            }
            entries
                .entry(name.to_lowercase())
                .or_insert_with(|| name.to_string());
        }
        Ok(Self { entries })
    }

    /// Return the configured spelling of `name` if it is allowed
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.trim().to_lowercase())
            .map(String::as_str)
    }

    /// Whether `name` is allowed, in any casing
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Allowed names in their configured spelling, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.values().cloned().collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
