//! Fixed analytical queries selected by a string tag

use serde::Serialize;

use super::ValidationError;

/// Pre-written analytical query selectable through `/insights?type=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightKind {
    /// Industries whose average company net worth beats the overall average
    CompanyNetWorth,
    /// Investors with more transactions than the average investor
    ActiveInvestors,
    /// Companies whose report revenue beats their industry's average
    Revenue,
}

impl InsightKind {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "company-net-worth" => Ok(Self::CompanyNetWorth),
            "active-investors" => Ok(Self::ActiveInvestors),
            "revenue" => Ok(Self::Revenue),
            "" => Err(ValidationError::Required { field: "type" }),
            other => Err(ValidationError::InvalidVariant {
                field: "insight type",
                value: other.to_owned(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyNetWorth => "company-net-worth",
            Self::ActiveInvestors => "active-investors",
            Self::Revenue => "revenue",
        }
    }
}

/// Column header of a result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
}

/// Tabular payload: column headers plus positional rows.
#[derive(Debug, Clone, Serialize)]
pub struct ResultSet {
    #[serde(rename = "metaData")]
    pub meta_data: Vec<ColumnMeta>,
    pub rows: Vec<serde_json::Value>,
}

impl ResultSet {
    pub fn new(columns: &[&str], rows: Vec<serde_json::Value>) -> Self {
        Self {
            meta_data: columns
                .iter()
                .map(|name| ColumnMeta {
                    name: (*name).to_owned(),
                })
                .collect(),
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
