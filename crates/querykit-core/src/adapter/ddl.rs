//! Schema-changing operations rendered by [`Adapter::generate_sql`].
//!
//! [`Adapter::generate_sql`]: super::Adapter::generate_sql

use serde::{Deserialize, Serialize};

/// Referential action for foreign keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignKeyAction {
    /// No action.
    #[default]
    NoAction,
    /// Restrict deletion/update.
    Restrict,
    /// Cascade deletion/update.
    Cascade,
    /// Set to NULL.
    SetNull,
    /// Set to default value.
    SetDefault,
}

impl ForeignKeyAction {
    /// Returns the SQL representation.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }
}

/// One line inside `CREATE TABLE (...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableElement {
    /// `name definition`. Abstract types such as `pk` or `string(64)` are
    /// mapped through [`Adapter::column_type`](super::Adapter::column_type).
    Column {
        /// Column name.
        name: String,
        /// Type and modifiers.
        definition: String,
    },
    /// A raw line, e.g. a table constraint.
    Constraint(String),
}

/// Body of a `CREATE TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableBody {
    /// Column definitions in order.
    Columns(Vec<TableElement>),
    /// Raw text such as `LIKE other` or `SELECT ...`.
    Raw(String),
}

impl From<&str> for TableBody {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_string())
    }
}

impl From<Vec<TableElement>> for TableBody {
    fn from(elements: Vec<TableElement>) -> Self {
        Self::Columns(elements)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for TableBody {
    fn from(columns: [(&str, &str); N]) -> Self {
        Self::Columns(
            columns
                .into_iter()
                .map(|(name, definition)| TableElement::Column {
                    name: name.to_string(),
                    definition: definition.to_string(),
                })
                .collect(),
        )
    }
}

impl From<Vec<(String, String)>> for TableBody {
    fn from(columns: Vec<(String, String)>) -> Self {
        Self::Columns(
            columns
                .into_iter()
                .map(|(name, definition)| TableElement::Column { name, definition })
                .collect(),
        )
    }
}

/// `CREATE TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableOp {
    /// Table name.
    pub name: String,
    /// Column list or raw body.
    pub body: TableBody,
    /// Render `IF NOT EXISTS`.
    pub if_not_exists: bool,
    /// Trailing table options, e.g. `ENGINE=InnoDB`.
    pub options: Option<String>,
}

impl CreateTableOp {
    /// Creates a new create-table operation.
    pub fn new(name: impl Into<String>, body: impl Into<TableBody>) -> Self {
        Self {
            name: name.into(),
            body: body.into(),
            if_not_exists: false,
            options: None,
        }
    }

    /// Adds `IF NOT EXISTS`.
    #[must_use]
    pub const fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Sets trailing table options. Blank options are ignored.
    #[must_use]
    pub fn options(mut self, options: impl Into<String>) -> Self {
        let options = options.into();
        self.options = if options.trim().is_empty() {
            None
        } else {
            Some(options)
        };
        self
    }
}

/// `DROP TABLE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableOp {
    /// Table name.
    pub name: String,
    /// Render `IF EXISTS`.
    pub if_exists: bool,
    /// Render `CASCADE`.
    pub cascade: bool,
}

/// Renames a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameTableOp {
    /// Current name.
    pub old_name: String,
    /// New name.
    pub new_name: String,
}

/// Removes every row of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateTableOp {
    /// Table name.
    pub name: String,
}

/// Adds a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnOp {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
    /// Type and modifiers.
    pub definition: String,
}

/// Drops a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropColumnOp {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

/// Renames a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumnOp {
    /// Table name.
    pub table: String,
    /// Current column name.
    pub old_name: String,
    /// New column name.
    pub new_name: String,
}

/// Changes a column's type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterColumnOp {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
    /// New type and modifiers.
    pub definition: String,
}

/// Adds a named primary key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPrimaryKeyOp {
    /// Constraint name.
    pub name: String,
    /// Table name.
    pub table: String,
    /// Key columns.
    pub columns: Vec<String>,
}

/// Drops a primary key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPrimaryKeyOp {
    /// Constraint name.
    pub name: String,
    /// Table name.
    pub table: String,
}

/// Adds a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForeignKeyOp {
    /// Constraint name.
    pub name: String,
    /// Table name.
    pub table: String,
    /// Referencing columns.
    pub columns: Vec<String>,
    /// Referenced table.
    pub ref_table: String,
    /// Referenced columns.
    pub ref_columns: Vec<String>,
    /// ON DELETE action.
    pub on_delete: Option<ForeignKeyAction>,
    /// ON UPDATE action.
    pub on_update: Option<ForeignKeyAction>,
}

impl AddForeignKeyOp {
    /// Creates a foreign key without referential actions.
    pub fn new(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: &[&str],
        ref_table: impl Into<String>,
        ref_columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.iter().map(ToString::to_string).collect(),
            ref_table: ref_table.into(),
            ref_columns: ref_columns.iter().map(ToString::to_string).collect(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the ON DELETE action.
    #[must_use]
    pub const fn on_delete(mut self, action: ForeignKeyAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    /// Sets the ON UPDATE action.
    #[must_use]
    pub const fn on_update(mut self, action: ForeignKeyAction) -> Self {
        self.on_update = Some(action);
        self
    }
}

/// Drops a foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropForeignKeyOp {
    /// Constraint name.
    pub name: String,
    /// Table name.
    pub table: String,
}

/// Creates an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexOp {
    /// Index name.
    pub name: String,
    /// Table name.
    pub table: String,
    /// Indexed columns or expressions.
    pub columns: Vec<String>,
    /// Render `UNIQUE`.
    pub unique: bool,
}

/// Drops an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndexOp {
    /// Index name.
    pub name: String,
    /// Table the index belongs to.
    pub table: String,
}

/// Sets the next value generated for a table's auto-increment key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetSequenceOp {
    /// Table name.
    pub table: String,
    /// Auto-increment column.
    pub column: String,
    /// Next value to generate.
    pub value: i64,
}

/// Enables or disables foreign key enforcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIntegrityOp {
    /// Turn checks on (`true`) or off.
    pub enable: bool,
    /// Schema of `table`, where the dialect scopes by schema.
    pub schema: Option<String>,
    /// Limit the toggle to one table, where the dialect allows it.
    pub table: Option<String>,
}

/// A schema-changing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdlOperation {
    /// Create a table.
    CreateTable(CreateTableOp),
    /// Drop a table.
    DropTable(DropTableOp),
    /// Rename a table.
    RenameTable(RenameTableOp),
    /// Empty a table.
    TruncateTable(TruncateTableOp),
    /// Add a column.
    AddColumn(AddColumnOp),
    /// Drop a column.
    DropColumn(DropColumnOp),
    /// Rename a column.
    RenameColumn(RenameColumnOp),
    /// Change a column type.
    AlterColumn(AlterColumnOp),
    /// Add a primary key.
    AddPrimaryKey(AddPrimaryKeyOp),
    /// Drop a primary key.
    DropPrimaryKey(DropPrimaryKeyOp),
    /// Add a foreign key.
    AddForeignKey(AddForeignKeyOp),
    /// Drop a foreign key.
    DropForeignKey(DropForeignKeyOp),
    /// Create an index.
    CreateIndex(CreateIndexOp),
    /// Drop an index.
    DropIndex(DropIndexOp),
    /// Reset an auto-increment sequence.
    ResetSequence(ResetSequenceOp),
    /// Toggle foreign key checks.
    CheckIntegrity(CheckIntegrityOp),
}

macro_rules! impl_from_op {
    ($($variant:ident($op:ty)),* $(,)?) => {
        $(
            impl From<$op> for DdlOperation {
                fn from(op: $op) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_from_op!(
    CreateTable(CreateTableOp),
    DropTable(DropTableOp),
    RenameTable(RenameTableOp),
    TruncateTable(TruncateTableOp),
    AddColumn(AddColumnOp),
    DropColumn(DropColumnOp),
    RenameColumn(RenameColumnOp),
    AlterColumn(AlterColumnOp),
    AddPrimaryKey(AddPrimaryKeyOp),
    DropPrimaryKey(DropPrimaryKeyOp),
    AddForeignKey(AddForeignKeyOp),
    DropForeignKey(DropForeignKeyOp),
    CreateIndex(CreateIndexOp),
    DropIndex(DropIndexOp),
    ResetSequence(ResetSequenceOp),
    CheckIntegrity(CheckIntegrityOp),
);
