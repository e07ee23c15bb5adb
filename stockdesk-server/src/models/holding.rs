//! Rows returned by the transaction join and aggregate queries

use serde::Serialize;
use sqlx::FromRow;

use super::ValidationError;

/// Investor who bought shares of a given company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Buyer {
    pub investor_id: String,
    pub investor_name: String,
}

/// Total shares one investor holds in one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ShareTotal {
    pub company_name: String,
    pub total_shares: i64,
}

/// Investor holding shares in at least N distinct companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct DiversifiedInvestor {
    pub investor_id: String,
    pub number_of_companies: i64,
}

/// Minimum distinct-company count for `/list-Stock`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompanyThreshold(i64);

impl CompanyThreshold {
    pub fn parse(raw: Option<&str>) -> Result<Self, ValidationError> {
        let raw = raw
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ValidationError::Required { field: "number" })?;

        match raw.parse::<i64>() {
            Ok(n) if n >= 1 => Ok(Self(n)),
            _ => Err(ValidationError::InvalidFormat {
                field: "number",
                reason: "must be a positive integer",
            }),
        }
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_parsing() {
        assert_eq!(CompanyThreshold::parse(Some("3")).unwrap().get(), 3);
        assert_eq!(CompanyThreshold::parse(Some(" 7 ")).unwrap().get(), 7);
        assert_eq!(
            CompanyThreshold::parse(None),
            Err(ValidationError::Required { field: "number" })
        );
        assert!(CompanyThreshold::parse(Some("0")).is_err());
        assert!(CompanyThreshold::parse(Some("-2")).is_err());
        assert!(CompanyThreshold::parse(Some("three")).is_err());
    }

    #[test]
    fn share_total_keys_are_upper_case() {
        let row = ShareTotal {
            company_name: "Acme".into(),
            total_shares: 40,
        };
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["COMPANY_NAME"], "Acme");
        assert_eq!(value["TOTAL_SHARES"], 40);
    }
}
