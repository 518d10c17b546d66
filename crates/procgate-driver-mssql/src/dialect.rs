//! T-SQL statement building for stored-procedure calls
//!
//! Procedure and schema names are bracket-quoted; parameter values never
//! appear in the statement text and are bound as `@P1..@Pn` instead.

use procgate_core::ParamMap;

/// T-SQL dialect helpers for MS SQL Server
///
/// # Example
///
/// ```
/// use procgate_driver_mssql::MssqlDialect;
///
/// let dialect = MssqlDialect::new();
/// assert_eq!(dialect.quote_identifier("sp_ConsultarBanco"), "[sp_ConsultarBanco]");
/// assert_eq!(dialect.qualified_procedure("dbo", "sp_ConsultarBanco"), "[dbo].[sp_ConsultarBanco]");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new MS SQL Server dialect instance
    pub fn new() -> Self {
        Self
    }

    /// Quote an identifier using SQL Server's square bracket syntax
    ///
    /// Closing brackets inside the identifier are doubled.
    ///
    /// ```
    /// use procgate_driver_mssql::MssqlDialect;
    ///
    /// let dialect = MssqlDialect::new();
    /// assert_eq!(dialect.quote_identifier("user[data]"), "[user[data]]]");
    /// ```
    pub fn quote_identifier(&self, ident: &str) -> String {
        let escaped = ident.replace(']', "]]");
        format!("[{}]", escaped)
    }

    /// Strip one level of bracket quoting, if present
    fn unquote<'a>(&self, ident: &'a str) -> std::borrow::Cow<'a, str> {
        match ident
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            Some(inner) => std::borrow::Cow::Owned(inner.replace("]]", "]")),
            None => std::borrow::Cow::Borrowed(ident),
        }
    }

    /// Build the quoted, schema-qualified name of a procedure.
    ///
    /// A name that already carries a schema (`ventas.sp_X`) or a database
    /// (`banca.dbo.sp_X`) keeps every part; otherwise `default_schema` is used.
    /// Dots inside a bracketed part do not split it.
    pub fn qualified_procedure(&self, default_schema: &str, procedure: &str) -> String {
        let mut parts = self.split_name(procedure.trim());
        if parts.len() == 1 {
            parts.insert(0, default_schema);
        }
        parts
            .iter()
            .map(|part| self.quote_identifier(&self.unquote(part.trim())))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Split a multi-part name on dots that are not inside brackets
    fn split_name<'a>(&self, name: &'a str) -> Vec<&'a str> {
        let mut parts = Vec::new();
        let mut in_brackets = false;
        let mut start = 0;
        for (idx, c) in name.char_indices() {
            match c {
                '[' if !in_brackets => in_brackets = true,
                ']' if in_brackets => in_brackets = false,
                '.' if !in_brackets => {
                    parts.push(&name[start..idx]);
                    start = idx + 1;
                }
                _ => {}
            }
        }
        parts.push(&name[start..]);
        parts
    }
}

/// Build the `EXEC` statement for a procedure call.
///
/// Each parameter is passed by name and bound to a positional placeholder in
/// map order, so `params.iter()` yields the values for `@P1..@Pn`.
///
/// ```
/// use procgate_core::ParamMap;
/// use procgate_driver_mssql::build_exec_statement;
///
/// let params = ParamMap::new().with("idBanco", 5i64).unwrap();
/// assert_eq!(
///     build_exec_statement("dbo", "sp_ConsultarBanco", &params),
///     "EXEC [dbo].[sp_ConsultarBanco] @idBanco = @P1"
/// );
/// ```
pub fn build_exec_statement(default_schema: &str, procedure: &str, params: &ParamMap) -> String {
    let target = MssqlDialect::new().qualified_procedure(default_schema, procedure);
    if params.is_empty() {
        return format!("EXEC {}", target);
    }

    let arguments = params
        .iter()
        .enumerate()
        .map(|(idx, (name, _))| format!("{} = @P{}", name, idx + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!("EXEC {} {}", target, arguments)
}
