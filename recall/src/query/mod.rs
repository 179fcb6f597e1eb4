//! Query grammar parser.
//!
//! Turns a raw query such as `type:todo #work @alice has:link after:2024-01-01 notes`
//! into structured filters plus residual free text. Parsing never fails: text the
//! grammar does not recognise simply stays in the search terms.

pub mod parser;
pub mod types;

pub use parser::{QueryParser, strip_filter_tokens};
pub use types::{
    AutocompleteEntry, DateOperator, FilterSuggestion, FilterType, ParsedQuery, QueryFilter,
};
