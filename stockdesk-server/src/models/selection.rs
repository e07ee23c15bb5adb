//! Typed row selection over a table chosen at request time.
//!
//! Identifiers never come from the request verbatim: the table name must be a
//! plain identifier and every attribute must appear in the table's column
//! list as read from `information_schema`. Values are always bound.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use sqlx::{Postgres, QueryBuilder};

use super::ValidationError;

/// Maximum length for a table identifier (Postgres NAMEDATALEN - 1)
const MAX_TABLE_NAME_LEN: usize = 63;

/// Postgres caps variadic function calls at 100 arguments
const MAX_ROW_BUILDER_ARGS: usize = 100;

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex"));

/// Table name as requested in the URL, folded to lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    /// Validate a table identifier.
    ///
    /// ```
    /// use stockdesk_server::models::TableName;
    ///
    /// assert_eq!(TableName::new("Investor1").unwrap().as_str(), "investor1");
    /// assert!(TableName::new("investor1; drop table user_table").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Required { field: "table name" });
        }

        if s.len() > MAX_TABLE_NAME_LEN || !IDENT_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "table name",
                reason: "must be a plain identifier of letters, digits and underscores",
            });
        }

        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One column as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

impl ColumnInfo {
    /// Type a bound text value is cast to before comparison.
    ///
    /// `None` means the column is compared as text.
    fn cast_target(&self) -> Option<CastTarget> {
        match self.data_type.as_str() {
            "smallint" | "integer" | "bigint" => Some(CastTarget::BigInt),
            "numeric" | "real" | "double precision" => Some(CastTarget::Numeric),
            "boolean" => Some(CastTarget::Boolean),
            "date" => Some(CastTarget::Date),
            "timestamp without time zone" => Some(CastTarget::Timestamp),
            "timestamp with time zone" => Some(CastTarget::TimestampTz),
            _ => None,
        }
    }
}

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("invalid numeric regex")
});

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// SQL type a condition value is cast to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CastTarget {
    BigInt,
    Numeric,
    Boolean,
    Date,
    Timestamp,
    TimestampTz,
}

impl CastTarget {
    fn as_sql(&self) -> &'static str {
        match self {
            Self::BigInt => "bigint",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
        }
    }

    /// Check that `value` casts cleanly, so a malformed filter is rejected
    /// before it reaches the database.
    fn check(&self, value: &str) -> Result<(), ValidationError> {
        let v = value.trim();
        let (ok, reason) = match self {
            Self::BigInt => (v.parse::<i64>().is_ok(), "must be an integer"),
            Self::Numeric => (NUMERIC_RE.is_match(v), "must be a number"),
            Self::Boolean => (
                matches!(
                    v.to_ascii_lowercase().as_str(),
                    "true" | "false" | "t" | "f" | "yes" | "no" | "on" | "off" | "1" | "0"
                ),
                "must be true or false",
            ),
            Self::Date => (
                NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok(),
                "must be a date (YYYY-MM-DD)",
            ),
            Self::Timestamp => (parses_as_timestamp(v), "must be a timestamp (YYYY-MM-DD HH:MM:SS)"),
            Self::TimestampTz => (
                DateTime::parse_from_rfc3339(v).is_ok() || parses_as_timestamp(v),
                "must be a timestamp (YYYY-MM-DD HH:MM:SS)",
            ),
        };

        if ok {
            Ok(())
        } else {
            Err(ValidationError::InvalidFormat {
                field: "value",
                reason,
            })
        }
    }
}

fn parses_as_timestamp(v: &str) -> bool {
    NaiveDate::parse_from_str(v, "%Y-%m-%d").is_ok()
        || TIMESTAMP_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(v, fmt).is_ok())
}

/// Column allow-list of one table.
#[derive(Debug, Clone)]
pub struct TableColumns {
    table: TableName,
    columns: Vec<ColumnInfo>,
}

impl TableColumns {
    pub fn new(table: TableName, columns: Vec<ColumnInfo>) -> Self {
        Self { table, columns }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Look up a column, ignoring ASCII case.
    pub fn resolve(&self, attribute: &str) -> Result<&ColumnInfo, ValidationError> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(attribute))
            .ok_or_else(|| ValidationError::UnknownColumn {
                table: self.table.as_str().to_owned(),
                column: attribute.to_owned(),
            })
    }
}

/// Comparison operators accepted in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
}

impl Operator {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "=" => Ok(Self::Eq),
            "<>" | "!=" => Ok(Self::NotEq),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::LtEq),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::GtEq),
            "LIKE" => Ok(Self::Like),
            _ => Err(ValidationError::InvalidVariant {
                field: "operator",
                value: s.to_owned(),
            }),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "<>",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
        }
    }
}

/// Connective joining a condition to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logic {
    And,
    Or,
}

impl Logic {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(Self::And),
            "OR" => Ok(Self::Or),
            _ => Err(ValidationError::InvalidVariant {
                field: "logic",
                value: s.to_owned(),
            }),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Condition as posted by the front end.
#[derive(Debug, Clone, Deserialize)]
pub struct ConditionRequest {
    #[serde(default)]
    pub logic: Option<String>,
    pub attribute: String,
    pub operator: String,
    pub value: Value,
}

/// Condition checked against a table's allow-list.
#[derive(Debug, Clone)]
pub struct Condition {
    logic: Option<Logic>,
    column: ColumnInfo,
    operator: Operator,
    cast: Option<CastTarget>,
    value: String,
}

impl Condition {
    /// Validate a condition. `first` marks the leading condition, whose
    /// logic token is ignored; later conditions must carry one.
    pub fn resolve(
        req: ConditionRequest,
        columns: &TableColumns,
        first: bool,
    ) -> Result<Self, ValidationError> {
        let logic = if first {
            None
        } else {
            let token = req
                .logic
                .as_deref()
                .filter(|l| !l.trim().is_empty())
                .ok_or(ValidationError::Required { field: "logic" })?;
            Some(Logic::parse(token)?)
        };

        let column = columns.resolve(&req.attribute)?.clone();
        let operator = Operator::parse(&req.operator)?;

        let value = match req.value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => {
                return Err(ValidationError::InvalidFormat {
                    field: "value",
                    reason: "must be a string, number or boolean",
                })
            }
        };

        let cast = match operator {
            Operator::Like => None,
            _ => column.cast_target(),
        };
        if let Some(target) = cast {
            target.check(&value)?;
        }

        Ok(Self {
            logic,
            column,
            operator,
            cast,
            value,
        })
    }

    fn push_sql(self, qb: &mut QueryBuilder<'static, Postgres>) {
        if let Some(logic) = self.logic {
            qb.push(" ").push(logic.as_sql()).push(" ");
        }

        match self.cast {
            Some(target) => {
                qb.push(quote_ident(&self.column.name))
                    .push(" ")
                    .push(self.operator.as_sql())
                    .push(" CAST(")
                    .push_bind(self.value)
                    .push(" AS ")
                    .push(target.as_sql())
                    .push(")");
            }
            None => {
                qb.push(quote_ident(&self.column.name))
                    .push("::text ")
                    .push(self.operator.as_sql())
                    .push(" ")
                    .push_bind(self.value);
            }
        }
    }
}

/// SELECT over one table, producing each row as a JSON array in
/// projection order.
#[derive(Debug, Clone)]
pub struct Selection {
    table: String,
    projection: Vec<String>,
    conditions: Vec<Condition>,
}

impl Selection {
    /// Select every column of the table.
    pub fn all(columns: &TableColumns) -> Self {
        Self {
            table: columns.table().as_str().to_owned(),
            projection: columns.names(),
            conditions: Vec::new(),
        }
    }

    /// Select only the named columns, in the given order.
    ///
    /// An empty list selects every column.
    pub fn project(columns: &TableColumns, cols: &[String]) -> Result<Self, ValidationError> {
        if cols.is_empty() {
            return Ok(Self::all(columns));
        }

        let projection = cols
            .iter()
            .map(|c| columns.resolve(c).map(|info| info.name.clone()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            table: columns.table().as_str().to_owned(),
            projection,
            conditions: Vec::new(),
        })
    }

    /// Attach the WHERE conditions, validated against the allow-list.
    pub fn filter(
        mut self,
        columns: &TableColumns,
        conditions: Vec<ConditionRequest>,
    ) -> Result<Self, ValidationError> {
        self.conditions = conditions
            .into_iter()
            .enumerate()
            .map(|(i, c)| Condition::resolve(c, columns, i == 0))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self)
    }

    pub fn projection(&self) -> &[String] {
        &self.projection
    }

    /// Build the parameterized statement.
    ///
    /// Projections wider than one row builder call are split into
    /// `jsonb_build_array` chunks joined with `||`.
    pub fn into_query(self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        let builder = if self.projection.len() > MAX_ROW_BUILDER_ARGS {
            "jsonb_build_array("
        } else {
            "json_build_array("
        };

        for (n, chunk) in self.projection.chunks(MAX_ROW_BUILDER_ARGS).enumerate() {
            if n > 0 {
                qb.push(" || ");
            }
            qb.push(builder);
            for (i, col) in chunk.iter().enumerate() {
                if i > 0 {
                    qb.push(", ");
                }
                qb.push(quote_ident(col));
            }
            qb.push(")");
        }
        qb.push(" AS row FROM ").push(quote_ident(&self.table));

        if !self.conditions.is_empty() {
            qb.push(" WHERE ");
            for condition in self.conditions {
                condition.push_sql(&mut qb);
            }
        }

        qb
    }
}

/// Double-quote an identifier taken from the catalog.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
