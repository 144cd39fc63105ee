//! Composable record filters with a non-destructive view.

mod engine;
mod spec;

pub use engine::{DataRange, FilterEngine, FilterPreset, FilterStats};
pub use spec::{
    CategoryField, FilterKey, FilterSpec, FilterState, Predicate, RangeField, matches_search,
};
