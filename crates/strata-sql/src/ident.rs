use std::fmt;

/// Bracket-quoted identifier.
pub(crate) struct Ident<'a>(pub &'a str);

impl fmt::Display for Ident<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

/// Fully qualified `[schema].[table]` name.
pub(crate) struct TableIdent<'a> {
    pub schema: &'a str,
    pub table: &'a str,
}

impl fmt::Display for TableIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}].[{}]", self.schema, self.table)
    }
}

/// Fully qualified `[schema].[table].[column]` reference.
pub(crate) struct ColumnIdent<'a> {
    pub schema: &'a str,
    pub table: &'a str,
    pub column: &'a str,
}

impl fmt::Display for ColumnIdent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}].[{}].[{}]", self.schema, self.table, self.column)
    }
}
