//! Domain models with validation at construction
//!
//! All request input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod investor;
pub mod selection;
pub mod holding;
pub mod insight;

pub use validation::ValidationError;
pub use investor::{
    Investor, InvestorListing, InvestorUpdate, LocationKey, NewInvestor, RegisterInvestorRequest,
    UpdateInvestorRequest, UNKNOWN_LOCATION,
};
pub use selection::{ColumnInfo, ConditionRequest, Selection, TableColumns, TableName};
pub use holding::{Buyer, CompanyThreshold, DiversifiedInvestor, ShareTotal};
pub use insight::{ColumnMeta, InsightKind, ResultSet};
