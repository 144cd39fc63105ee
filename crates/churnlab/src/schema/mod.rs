//! Canonical record schema and source field aliases.

mod aliases;
mod record;
mod types;

pub use aliases::{FIELD_ALIASES, FieldAliases, GROUPING_KEYS, aliases, is_known_alias};
pub use record::{Billing, CanonicalField, CanonicalRecord, Demographics, NumericField, Services};
pub use types::{ContractType, InternetServiceType, ServiceFlag};
