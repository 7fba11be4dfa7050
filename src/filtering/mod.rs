//! Compilation of filter, search and sort descriptors into Sea-ORM expressions.

pub mod conditions;
pub mod operator;
pub mod pagination;
pub mod search;
pub mod sort;

pub use operator::Operator;

use sea_orm::Value;
use sea_orm::sea_query::{Alias, Expr};

/// A column addressed by table (or alias) and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedColumn {
    pub table: String,
    pub column: String,
}

impl QualifiedColumn {
    #[must_use]
    pub fn new(table: &str, column: &str) -> Self {
        Self {
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// `"table"."column"`
    #[must_use]
    pub fn expr(&self) -> Expr {
        Expr::col((Alias::new(self.table.as_str()), Alias::new(self.column.as_str())))
    }
}

/// Bind value for a JSON scalar; `None` for null. Containers bind as their JSON text.
#[must_use]
pub fn sql_value(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::Bool(flag) => Some((*flag).into()),
        serde_json::Value::Number(number) => Some(
            number
                .as_i64()
                .map(Value::from)
                .or_else(|| number.as_u64().map(Value::from))
                .unwrap_or_else(|| number.as_f64().unwrap_or_default().into()),
        ),
        serde_json::Value::String(text) => Some(text.clone().into()),
        other => Some(other.to_string().into()),
    }
}

/// `like` operand text: strings as-is, other scalars by their JSON spelling.
#[must_use]
pub fn pattern_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
