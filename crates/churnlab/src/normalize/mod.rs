//! Schema normalization: structure-aware field resolution, value coercion,
//! cleaning and merging of canonical datasets.

mod clean;
mod normalizer;
mod values;

pub use clean::{CleanOutcome, MergeStrategy, clean, merge};
pub use normalizer::{SchemaNormalizer, normalize};
pub(crate) use normalizer::FieldResolver;
pub use values::{
    normalize_bool, normalize_contract, normalize_internet, normalize_number,
    normalize_service_flag, normalize_tenure, normalize_text, parse_bool, parse_number,
};
