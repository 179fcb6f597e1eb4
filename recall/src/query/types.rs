//! Types produced by the query grammar parser

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of structured filter extracted from a query
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// `type:<word>`
    Type,
    /// `#<tag>`
    Tag,
    /// `@<mention>`
    Mention,
    /// `has:link` / `has:code`
    Has,
    /// `in:session(<id>)`
    Session,
    /// `before:YYYY-MM-DD` / `after:YYYY-MM-DD`
    Date,
}

impl FilterType {
    /// Lowercase name used in counters and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Tag => "tag",
            Self::Mention => "mention",
            Self::Has => "has",
            Self::Session => "session",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Direction of a date filter
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DateOperator {
    Before,
    After,
}

impl fmt::Display for DateOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Before => write!(f, "before"),
            Self::After => write!(f, "after"),
        }
    }
}

/// A structured predicate extracted from the raw query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryFilter {
    /// Filter kind
    pub filter_type: FilterType,

    /// Extracted value (type name, tag, mention, has-value, session id or date)
    pub value: String,

    /// Human readable label, e.g. "Type: todo"
    pub display: String,

    /// Before/after, only for date filters
    pub operator: Option<DateOperator>,

    /// Whether the user can remove the filter chip
    pub removable: bool,
}

impl QueryFilter {
    /// Create a removable filter without an operator
    pub fn new(filter_type: FilterType, value: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            filter_type,
            value: value.into(),
            display: display.into(),
            operator: None,
            removable: true,
        }
    }

    /// Create a date filter
    pub fn date(operator: DateOperator, value: impl Into<String>) -> Self {
        let value = value.into();
        let display = match operator {
            DateOperator::Before => format!("Before {}", value),
            DateOperator::After => format!("After {}", value),
        };
        Self {
            filter_type: FilterType::Date,
            value,
            display,
            operator: Some(operator),
            removable: true,
        }
    }

    /// The calendar date of a date filter, or None when the value is not a real date
    pub fn date_value(&self) -> Option<NaiveDate> {
        if self.filter_type != FilterType::Date {
            return None;
        }
        NaiveDate::parse_from_str(&self.value, "%Y-%m-%d").ok()
    }

    /// Midnight UTC at the start of the filter's date
    pub fn date_bound(&self) -> Option<DateTime<Utc>> {
        self.date_value()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    /// Render the filter back into grammar syntax
    pub fn to_token(&self) -> String {
        match self.filter_type {
            FilterType::Type => format!("type:{}", self.value),
            FilterType::Tag => format!("#{}", self.value),
            FilterType::Mention => format!("@{}", self.value),
            FilterType::Has => format!("has:{}", self.value),
            FilterType::Session => format!("in:session({})", self.value),
            FilterType::Date => {
                let operator = self.operator.unwrap_or(DateOperator::After);
                format!("{}:{}", operator, self.value)
            }
        }
    }
}

/// A filter the user could add to narrow the query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterSuggestion {
    /// Filter kind the suggestion would add
    pub filter_type: FilterType,

    /// Token to append to the query, e.g. `type:todo`
    pub token: String,

    /// Human readable label
    pub display: String,
}

/// An autocomplete catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AutocompleteEntry {
    /// Filter kind the entry completes
    pub filter_type: FilterType,

    /// Token inserted on completion
    pub value: String,

    /// Label shown in the completion list
    pub display: String,

    /// Group the entry is listed under
    pub category: String,
}

/// Structured view of a raw query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ParsedQuery {
    /// The raw query as given
    pub original: String,

    /// Free text left after every filter token was removed
    pub search_terms: String,

    /// Extracted filters, grouped by kind in extraction order
    pub filters: Vec<QueryFilter>,

    /// Candidate filter additions
    pub suggestions: Vec<FilterSuggestion>,

    /// Completion catalog
    pub autocomplete: Vec<AutocompleteEntry>,
}

impl ParsedQuery {
    /// True when at least one filter of the given kind was extracted
    pub fn has_filter(&self, filter_type: FilterType) -> bool {
        self.filters.iter().any(|f| f.filter_type == filter_type)
    }

    /// All filters of the given kind
    pub fn filters_of(&self, filter_type: FilterType) -> impl Iterator<Item = &QueryFilter> {
        self.filters
            .iter()
            .filter(move |f| f.filter_type == filter_type)
    }

    /// First filter of the given kind
    pub fn first_filter(&self, filter_type: FilterType) -> Option<&QueryFilter> {
        self.filters_of(filter_type).next()
    }

    /// Date filter with the given operator
    pub fn date_filter(&self, operator: DateOperator) -> Option<&QueryFilter> {
        self.filters_of(FilterType::Date)
            .find(|f| f.operator == Some(operator))
    }

    /// Distinct filter kinds in first-seen order
    pub fn filter_types(&self) -> Vec<FilterType> {
        let mut types = Vec::new();
        for filter in &self.filters {
            if !types.contains(&filter.filter_type) {
                types.push(filter.filter_type);
            }
        }
        types
    }

    /// Lowercased whitespace-separated words of the residual search text
    pub fn search_words(&self) -> Vec<String> {
        self.search_terms
            .split_whitespace()
            .map(|w| w.to_lowercase())
            .collect()
    }

    /// Canonical query string: filter tokens followed by the free text
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = self.filters.iter().map(QueryFilter::to_token).collect();
        if !self.search_terms.is_empty() {
            parts.push(self.search_terms.clone());
        }
        parts.join(" ")
    }

    /// Canonical query string with the filter at `index` dropped.
    ///
    /// Returns None when the index is out of range or the filter is not removable.
    pub fn without_filter(&self, index: usize) -> Option<String> {
        let filter = self.filters.get(index)?;
        if !filter.removable {
            return None;
        }
        let mut reduced = self.clone();
        reduced.filters.remove(index);
        Some(reduced.to_query_string())
    }
}
