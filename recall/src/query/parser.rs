//! Query grammar parser.
//!
//! Each filter kind is extracted from the *original* query by its own pattern, so
//! kinds never interfere with each other's detection. A separate pass then strips
//! every recognized token from a copy of the query to produce the free text.

use chrono::{DateTime, Duration, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;

use super::types::{
    AutocompleteEntry, DateOperator, FilterSuggestion, FilterType, ParsedQuery, QueryFilter,
};
use crate::clock::{Clock, SystemClock};
use crate::config::ParserCatalog;

lazy_static! {
    static ref TYPE_REGEX: Regex = Regex::new(r"\btype:(\w+)").unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"#([\w-]+)").unwrap();
    static ref MENTION_REGEX: Regex = Regex::new(r"@([\w.-]+)").unwrap();
    static ref HAS_REGEX: Regex = Regex::new(r"\bhas:(link|code)\b").unwrap();
    static ref SESSION_REGEX: Regex = Regex::new(r"\bin:session\(([^()]+)\)").unwrap();
    static ref BEFORE_REGEX: Regex = Regex::new(r"\bbefore:([0-9]{4}-[0-9]{2}-[0-9]{2})\b").unwrap();
    static ref AFTER_REGEX: Regex = Regex::new(r"\bafter:([0-9]{4}-[0-9]{2}-[0-9]{2})\b").unwrap();
}

/// Every token pattern the grammar recognizes
fn token_patterns() -> [&'static Regex; 7] {
    [
        &TYPE_REGEX,
        &TAG_REGEX,
        &MENTION_REGEX,
        &HAS_REGEX,
        &SESSION_REGEX,
        &BEFORE_REGEX,
        &AFTER_REGEX,
    ]
}

/// True when `text` contains any recognized filter token
#[cfg(test)]
fn contains_filter_token(text: &str) -> bool {
    token_patterns().iter().any(|re| re.is_match(text))
}

/// Remove every recognized filter token, collapse whitespace and trim.
pub fn strip_filter_tokens(query: &str) -> String {
    let mut remaining = query.to_string();
    // Repeat until stable so that no pass leaves a token behind
    loop {
        let mut next = remaining.clone();
        for re in token_patterns() {
            next = re.replace_all(&next, " ").into_owned();
        }
        if next == remaining {
            break;
        }
        remaining = next;
    }
    remaining.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parser for the structured query grammar.
///
/// Parsing is pure and infallible: any input, including empty or garbage text,
/// produces a [`ParsedQuery`].
#[derive(Debug, Clone)]
pub struct QueryParser {
    catalog: ParserCatalog,
    clock: Arc<dyn Clock>,
}

impl Default for QueryParser {
    fn default() -> Self {
        Self::new(ParserCatalog::default(), Arc::new(SystemClock))
    }
}

impl QueryParser {
    /// Create a parser with the given catalog and clock
    pub fn new(catalog: ParserCatalog, clock: Arc<dyn Clock>) -> Self {
        Self { catalog, clock }
    }

    /// The catalog backing suggestions and autocomplete
    pub fn catalog(&self) -> &ParserCatalog {
        &self.catalog
    }

    /// Parse a raw query, using the parser's clock for relative dates
    pub fn parse(&self, query: &str) -> ParsedQuery {
        self.parse_at(query, self.clock.now())
    }

    /// Parse a raw query relative to `now`
    pub fn parse_at(&self, query: &str, now: DateTime<Utc>) -> ParsedQuery {
        let mut filters = Vec::new();

        if let Some(captures) = TYPE_REGEX.captures(query) {
            let value = &captures[1];
            filters.push(QueryFilter::new(
                FilterType::Type,
                value,
                format!("Type: {}", value),
            ));
        }

        for captures in TAG_REGEX.captures_iter(query) {
            let value = &captures[1];
            filters.push(QueryFilter::new(
                FilterType::Tag,
                value,
                format!("Tag: #{}", value),
            ));
        }

        for captures in MENTION_REGEX.captures_iter(query) {
            let value = &captures[1];
            filters.push(QueryFilter::new(
                FilterType::Mention,
                value,
                format!("Mention: @{}", value),
            ));
        }

        let has_values: Vec<String> = HAS_REGEX
            .captures_iter(query)
            .map(|c| c[1].to_string())
            .collect();
        for value in ["link", "code"] {
            if has_values.iter().any(|v| v == value) {
                filters.push(QueryFilter::new(
                    FilterType::Has,
                    value,
                    format!("Has: {}", value),
                ));
            }
        }

        if let Some(captures) = SESSION_REGEX.captures(query) {
            let value = &captures[1];
            filters.push(QueryFilter::new(
                FilterType::Session,
                value,
                format!("Session: {}", value),
            ));
        }

        if let Some(captures) = BEFORE_REGEX.captures(query) {
            filters.push(QueryFilter::date(DateOperator::Before, &captures[1]));
        }

        if let Some(captures) = AFTER_REGEX.captures(query) {
            filters.push(QueryFilter::date(DateOperator::After, &captures[1]));
        }

        let mut parsed = ParsedQuery {
            original: query.to_string(),
            search_terms: strip_filter_tokens(query),
            filters,
            suggestions: Vec::new(),
            autocomplete: Vec::new(),
        };
        parsed.suggestions = self.suggestions(&parsed, now);
        parsed.autocomplete = self.autocomplete(now);
        parsed
    }

    fn suggestions(&self, parsed: &ParsedQuery, now: DateTime<Utc>) -> Vec<FilterSuggestion> {
        let mut suggestions = Vec::new();

        if !parsed.has_filter(FilterType::Type) {
            let value = &self.catalog.suggested_type;
            suggestions.push(FilterSuggestion {
                filter_type: FilterType::Type,
                token: format!("type:{}", value),
                display: format!("Only {}s", value),
            });
        }

        if !parsed.has_filter(FilterType::Date) {
            let since = format_date(now - Duration::days(self.catalog.recent_days));
            suggestions.push(FilterSuggestion {
                filter_type: FilterType::Date,
                token: format!("after:{}", since),
                display: format!("Last {} days", self.catalog.recent_days),
            });
        }

        suggestions.push(FilterSuggestion {
            filter_type: FilterType::Tag,
            token: format!("#{}", self.catalog.suggested_tag),
            display: format!("Tagged #{}", self.catalog.suggested_tag),
        });
        suggestions.push(FilterSuggestion {
            filter_type: FilterType::Has,
            token: "has:link".to_string(),
            display: "With links".to_string(),
        });

        suggestions
    }

    fn autocomplete(&self, now: DateTime<Utc>) -> Vec<AutocompleteEntry> {
        let mut entries: Vec<AutocompleteEntry> = self
            .catalog
            .types
            .iter()
            .map(|t| AutocompleteEntry {
                filter_type: FilterType::Type,
                value: format!("type:{}", t),
                display: capitalize(t),
                category: "Types".to_string(),
            })
            .collect();

        entries.push(AutocompleteEntry {
            filter_type: FilterType::Has,
            value: "has:link".to_string(),
            display: "Has links".to_string(),
            category: "Content".to_string(),
        });
        entries.push(AutocompleteEntry {
            filter_type: FilterType::Has,
            value: "has:code".to_string(),
            display: "Has code".to_string(),
            category: "Content".to_string(),
        });

        let shortcuts = [
            ("Today", DateOperator::After, 1),
            ("This week", DateOperator::After, 7),
            ("This month", DateOperator::After, 30),
            ("Older than a month", DateOperator::Before, 30),
        ];
        for (label, operator, days) in shortcuts {
            entries.push(AutocompleteEntry {
                filter_type: FilterType::Date,
                value: format!("{}:{}", operator, format_date(now - Duration::days(days))),
                display: label.to_string(),
                category: "Dates".to_string(),
            });
        }

        entries
    }
}

fn format_date(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%d").to_string()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap()
    }

    fn parse(query: &str) -> ParsedQuery {
        QueryParser::default().parse_at(query, now())
    }

    #[test]
    fn test_full_grammar_example() {
        let parsed = parse("type:todo #work @alice has:link after:2024-01-01 meeting notes");

        assert_eq!(parsed.filters.len(), 5);
        let kinds: Vec<FilterType> = parsed.filters.iter().map(|f| f.filter_type).collect();
        assert_eq!(
            kinds,
            vec![
                FilterType::Type,
                FilterType::Tag,
                FilterType::Mention,
                FilterType::Has,
                FilterType::Date
            ]
        );
        assert_eq!(parsed.search_terms, "meeting notes");

        let date = parsed.first_filter(FilterType::Date).unwrap();
        assert_eq!(date.operator, Some(DateOperator::After));
        assert_eq!(date.value, "2024-01-01");
    }

    #[test]
    fn test_empty_and_garbage_input() {
        let empty = parse("");
        assert!(empty.filters.is_empty());
        assert_eq!(empty.search_terms, "");

        let garbage = parse("   ::: type: ## @ has:links   ");
        assert!(garbage.filters.is_empty());
        assert_eq!(garbage.search_terms, "::: type: ## @ has:links");
    }

    #[test]
    fn test_only_first_type_is_kept() {
        let parsed = parse("type:todo type:idea plan");
        let types: Vec<&str> = parsed
            .filters_of(FilterType::Type)
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(types, vec!["todo"]);
        assert_eq!(parsed.search_terms, "plan");
    }

    #[test]
    fn test_tags_are_not_deduplicated() {
        let parsed = parse("#work #work #side-project");
        let tags: Vec<&str> = parsed
            .filters_of(FilterType::Tag)
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(tags, vec!["work", "work", "side-project"]);
        assert_eq!(parsed.search_terms, "");
    }

    #[test]
    fn test_mentions_allow_dots_and_hyphens() {
        let parsed = parse("sync with @jane.doe and @bob-smith");
        let mentions: Vec<&str> = parsed
            .filters_of(FilterType::Mention)
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(mentions, vec!["jane.doe", "bob-smith"]);
        assert_eq!(parsed.search_terms, "sync with and");
    }

    #[test]
    fn test_has_filters_are_independent() {
        let parsed = parse("has:code snippets has:link has:code");
        let values: Vec<&str> = parsed
            .filters_of(FilterType::Has)
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(values, vec!["link", "code"]);
        assert_eq!(parsed.search_terms, "snippets");
    }

    #[test]
    fn test_session_filter() {
        let parsed = parse("in:session(abc-123) recap in:session(other)");
        let sessions: Vec<&str> = parsed
            .filters_of(FilterType::Session)
            .map(|f| f.value.as_str())
            .collect();
        assert_eq!(sessions, vec!["abc-123"]);
        assert_eq!(parsed.search_terms, "recap");
    }

    #[test]
    fn test_date_filters_are_not_calendar_validated() {
        let parsed = parse("before:2024-13-45 after:2023-02-30");
        assert_eq!(parsed.filters_of(FilterType::Date).count(), 2);
        let before = parsed.date_filter(DateOperator::Before).unwrap();
        assert_eq!(before.value, "2024-13-45");
        assert!(before.date_value().is_none());
        assert!(parsed.date_filter(DateOperator::After).unwrap().date_value().is_none());
    }

    #[test]
    fn test_malformed_date_token_stays_in_text() {
        let parsed = parse("after:2024-1-1 report");
        assert!(!parsed.has_filter(FilterType::Date));
        assert_eq!(parsed.search_terms, "after:2024-1-1 report");
    }

    #[test]
    fn test_date_tokens_require_ascii_digits() {
        let parsed = parse("after:٢٠٢٤-٠١-٠١ report");
        assert!(!parsed.has_filter(FilterType::Date));
        assert_eq!(parsed.search_terms, "after:٢٠٢٤-٠١-٠١ report");
    }

    #[test]
    fn test_suggestions() {
        let bare = parse("groceries");
        let tokens: Vec<&str> = bare.suggestions.iter().map(|s| s.token.as_str()).collect();
        assert_eq!(
            tokens,
            vec!["type:todo", "after:2024-06-08", "#urgent", "has:link"]
        );

        let filtered = parse("type:idea before:2024-01-01 groceries");
        let tokens: Vec<&str> = filtered
            .suggestions
            .iter()
            .map(|s| s.token.as_str())
            .collect();
        assert_eq!(tokens, vec!["#urgent", "has:link"]);
    }

    #[test]
    fn test_autocomplete_catalog() {
        let parsed = parse("");
        let types: Vec<&str> = parsed
            .autocomplete
            .iter()
            .filter(|e| e.filter_type == FilterType::Type)
            .map(|e| e.value.as_str())
            .collect();
        assert_eq!(
            types,
            vec![
                "type:note",
                "type:todo",
                "type:task",
                "type:meeting",
                "type:idea",
                "type:question",
                "type:insight"
            ]
        );
        assert_eq!(
            parsed
                .autocomplete
                .iter()
                .filter(|e| e.filter_type == FilterType::Has)
                .count(),
            2
        );
        let dates: Vec<&str> = parsed
            .autocomplete
            .iter()
            .filter(|e| e.filter_type == FilterType::Date)
            .map(|e| e.value.as_str())
            .collect();
        assert_eq!(
            dates,
            vec![
                "after:2024-06-14",
                "after:2024-06-08",
                "after:2024-05-16",
                "before:2024-05-16"
            ]
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let query = "type:todo #a @b has:code in:session(x) before:2024-01-01 hello";
        assert_eq!(parse(query), parse(query));
    }

    #[test]
    fn test_without_filter_rebuilds_query() {
        let parsed = parse("type:todo #work notes");
        assert_eq!(parsed.to_query_string(), "type:todo #work notes");
        assert_eq!(parsed.without_filter(0).as_deref(), Some("#work notes"));
        assert_eq!(parsed.without_filter(1).as_deref(), Some("type:todo notes"));
        assert!(parsed.without_filter(5).is_none());

        let reparsed = parse(&parsed.without_filter(0).unwrap());
        assert!(!reparsed.has_filter(FilterType::Type));
        assert_eq!(reparsed.search_terms, "notes");
    }

    #[test]
    fn test_filter_types_are_distinct() {
        let parsed = parse("#a #b @c #d");
        assert_eq!(
            parsed.filter_types(),
            vec![FilterType::Tag, FilterType::Mention]
        );
    }

    proptest! {
        #[test]
        fn search_terms_never_contain_filter_tokens(query in ".{0,80}") {
            let parsed = parse(&query);
            prop_assert!(!contains_filter_token(&parsed.search_terms));
        }

        #[test]
        fn search_terms_never_contain_filter_tokens_grammar_heavy(
            parts in proptest::collection::vec(
                prop_oneof![
                    Just("type:todo".to_string()),
                    Just("#tag".to_string()),
                    Just("@who".to_string()),
                    Just("has:link".to_string()),
                    Just("has:code".to_string()),
                    Just("in:session(s1)".to_string()),
                    Just("before:2024-01-01".to_string()),
                    Just("after:2024-02-02".to_string()),
                    "[a-z#@:()0-9-]{0,8}",
                ],
                0..10,
            )
        ) {
            let query = parts.join("");
            let parsed = parse(&query);
            prop_assert!(!contains_filter_token(&parsed.search_terms));
            prop_assert_eq!(parsed.search_terms.trim(), parsed.search_terms.as_str());
        }
    }
}
