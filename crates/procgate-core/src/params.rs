//! Procedure parameter names and the ordered parameter map

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use crate::{ProcValue, ProcgateError, Result};

/// Prefix that marks a name as a bound parameter
pub const PARAM_SIGIL: char = '@';

/// Normalize a parameter name so it carries exactly one leading `@`.
///
/// Surrounding whitespace is trimmed. The remaining identifier follows the
/// T-SQL rules for regular identifiers: it starts with a letter (any script)
/// or underscore, and continues with letters, digits, `_`, `@`, `#` or `$`.
/// It is written into the EXEC statement as a named argument, so nothing else
/// is accepted.
///
/// # Example
///
/// ```
/// use procgate_core::normalize_param_name;
///
/// assert_eq!(normalize_param_name("idBanco").unwrap(), "@idBanco");
/// assert_eq!(normalize_param_name("@idBanco").unwrap(), "@idBanco");
/// assert!(normalize_param_name("id; DROP TABLE x").is_err());
/// ```
pub fn normalize_param_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    let ident = trimmed.strip_prefix(PARAM_SIGIL).unwrap_or(trimmed);

    let mut chars = ident.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '@' | '#' | '$'));
    if !valid_start || !valid_rest {
        return Err(ProcgateError::InvalidParameter(format!(
            "'{}' is not a valid parameter name",
            name
        )));
    }

    Ok(format!("{}{}", PARAM_SIGIL, ident))
}

/// Ordered procedure parameters keyed by `@`-prefixed name.
///
/// Names are compared case-insensitively, matching how SQL Server resolves
/// procedure parameters; inserting a name that differs only by case from an
/// existing one is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamMap {
    /// Lowercased name -> (normalized name, value)
    entries: IndexMap<String, (String, ProcValue)>,
}

impl ParamMap {
    /// Create an empty parameter map
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a parameter map from a JSON object, coercing every value
    pub fn from_json_object(object: &Map<String, JsonValue>) -> Result<Self> {
        let mut params = Self::new();
        for (name, value) in object {
            params.insert(name, ProcValue::from_json(value)?)?;
        }
        Ok(params)
    }

    /// Insert a parameter, normalizing its name
    pub fn insert(&mut self, name: &str, value: impl Into<ProcValue>) -> Result<()> {
        let normalized = normalize_param_name(name)?;
        let key = normalized.to_lowercase();
        if self.entries.contains_key(&key) {
            return Err(ProcgateError::InvalidParameter(format!(
                "parameter '{}' supplied more than once",
                normalized
            )));
        }
        self.entries.insert(key, (normalized, value.into()));
        Ok(())
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<ProcValue>) -> Result<Self> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Look up a value by name (with or without `@`, any casing)
    pub fn get(&self, name: &str) -> Option<&ProcValue> {
        let trimmed = name.trim();
        let ident = trimmed.strip_prefix(PARAM_SIGIL).unwrap_or(trimmed);
        let key = format!("{}{}", PARAM_SIGIL, ident.to_lowercase());
        self.entries.get(&key).map(|(_, value)| value)
    }

    /// Iterate parameters in insertion order as (normalized name, value)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProcValue)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value))
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
