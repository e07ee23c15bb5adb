//! Investor payloads and records
//!
//! An investor is spread over three tables: `user_table` holds the name,
//! `investor1` the profile row (postal code, address, country) and
//! `investor2` the location row keyed by `(country, postal_code)`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::validation::{present, required, ValidationError};

/// Province/city placeholder for location rows created by an update.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// Registration body as posted by the front end.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInvestorRequest {
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
}

/// Fully validated registration: every field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInvestor {
    pub id: String,
    pub name: String,
    pub postal_code: String,
    pub address: String,
    pub country: String,
    pub province: String,
    pub city: String,
}

impl TryFrom<RegisterInvestorRequest> for NewInvestor {
    type Error = ValidationError;

    fn try_from(req: RegisterInvestorRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required(req.user_id, "userID")?,
            name: required(req.name, "name")?,
            postal_code: required(req.postal_code, "postalCode")?,
            address: required(req.address, "address")?,
            country: required(req.country, "country")?,
            province: required(req.province, "province")?,
            city: required(req.city, "city")?,
        })
    }
}

/// Partial update body. Absent or blank fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInvestorRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
}

/// Validated partial update.
///
/// Construction enforces, in order: identifier present, at least one field
/// present, `postal_code` and `country` supplied together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorUpdate {
    id: String,
    name: Option<String>,
    location_key: Option<LocationKey>,
    address: Option<String>,
    province: Option<String>,
    city: Option<String>,
}

/// Composite key of a location row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationKey {
    pub postal_code: String,
    pub country: String,
}

impl TryFrom<UpdateInvestorRequest> for InvestorUpdate {
    type Error = ValidationError;

    fn try_from(req: UpdateInvestorRequest) -> Result<Self, Self::Error> {
        let id = required(req.id, "id")?;

        let name = present(req.name);
        let postal_code = present(req.postal_code);
        let address = present(req.address);
        let country = present(req.country);
        let province = present(req.province);
        let city = present(req.city);

        if name.is_none()
            && postal_code.is_none()
            && address.is_none()
            && country.is_none()
            && province.is_none()
            && city.is_none()
        {
            return Err(ValidationError::NothingToUpdate);
        }

        let location_key = match (postal_code, country) {
            (Some(postal_code), Some(country)) => Some(LocationKey {
                postal_code,
                country,
            }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ValidationError::Unpaired {
                    present: "postalCode",
                    missing: "country",
                })
            }
            (None, Some(_)) => {
                return Err(ValidationError::Unpaired {
                    present: "country",
                    missing: "postalCode",
                })
            }
        };

        Ok(Self {
            id,
            name,
            location_key,
            address,
            province,
            city,
        })
    }
}

impl InvestorUpdate {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn location_key(&self) -> Option<&LocationKey> {
        self.location_key.as_ref()
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    pub fn province(&self) -> Option<&str> {
        self.province.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    /// Province for a freshly created location row.
    pub fn province_or_unknown(&self) -> &str {
        self.province().unwrap_or(UNKNOWN_LOCATION)
    }

    /// City for a freshly created location row.
    pub fn city_or_unknown(&self) -> &str {
        self.city().unwrap_or(UNKNOWN_LOCATION)
    }

    /// Whether the profile row (`investor1`) has columns to change.
    pub fn touches_profile(&self) -> bool {
        self.location_key.is_some() || self.address.is_some()
    }

    /// Whether the location row (`investor2`) has columns to change.
    pub fn touches_location(&self) -> bool {
        self.province.is_some() || self.city.is_some()
    }
}

/// Joined investor row served by `GET /investors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Investor {
    pub id: String,
    pub name: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
}

/// Joined investor row served by `GET /show-AllInvestor`.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct InvestorListing {
    pub user_id: String,
    pub user_name: String,
    pub postal_code: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
}
