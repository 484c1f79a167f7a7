use std::ops::Range;

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};

use crate::error::Result;
use crate::parsers::timestamps::{DateBound, parse_date_bound};

/// Compiled pattern: literal substring or regular expression, with uniform case handling.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
}

impl Matcher {
    /// Literal patterns are escaped, so both kinds go through the same engine and honour
    /// `case_sensitive` identically.
    pub fn new(pattern: &str, is_regex: bool, case_sensitive: bool) -> Result<Self> {
        let source = if is_regex { pattern.to_string() } else { regex::escape(pattern) };
        let regex = RegexBuilder::new(&source).case_insensitive(!case_sensitive).build()?;
        Ok(Self { regex })
    }

    /// Byte range of the first match.
    pub fn find(&self, haystack: &str) -> Option<Range<usize>> {
        self.regex.find(haystack).map(|m| m.range())
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

/// A validated, immutable search specification.
///
/// Built through [`QueryBuilder`], which compiles the pattern and parses the date bounds up
/// front, so an invalid query fails before any conversation is scanned.
#[derive(Debug, Clone)]
pub struct Query {
    pattern: String,
    is_regex: bool,
    case_sensitive: bool,
    search_titles: bool,
    search_messages: bool,
    title_contains: Option<String>,
    only_with_code: bool,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    matcher: Matcher,
    title_filter: Option<Matcher>,
}

impl Query {
    pub fn builder(pattern: impl Into<String>) -> QueryBuilder {
        QueryBuilder::new(pattern)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn is_regex(&self) -> bool {
        self.is_regex
    }

    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    pub fn search_titles(&self) -> bool {
        self.search_titles
    }

    pub fn search_messages(&self) -> bool {
        self.search_messages
    }

    pub fn title_contains(&self) -> Option<&str> {
        self.title_contains.as_deref()
    }

    pub fn only_with_code(&self) -> bool {
        self.only_with_code
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.end_date
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// True when the conversation title passes the `title_contains` filter (or none is set).
    pub fn accepts_title(&self, title: &str) -> bool {
        self.title_filter.as_ref().is_none_or(|filter| filter.is_match(title))
    }

    /// Inclusive date filter. Messages without a timestamp always pass.
    pub fn in_date_range(&self, timestamp: Option<DateTime<Utc>>) -> bool {
        let Some(ts) = timestamp else {
            return true;
        };
        self.start_date.is_none_or(|start| ts >= start) && self.end_date.is_none_or(|end| ts <= end)
    }
}

#[derive(Debug, Clone)]
enum DateSpec {
    Text(String),
    At(DateTime<Utc>),
}

impl DateSpec {
    fn resolve(self, bound: DateBound) -> Result<DateTime<Utc>> {
        match self {
            Self::Text(input) => parse_date_bound(&input, bound),
            Self::At(ts) => Ok(ts),
        }
    }
}

/// Builder for [`Query`]. Titles and messages are both searched by default.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    pattern: String,
    is_regex: bool,
    case_sensitive: bool,
    search_titles: bool,
    search_messages: bool,
    title_contains: Option<String>,
    only_with_code: bool,
    start_date: Option<DateSpec>,
    end_date: Option<DateSpec>,
}

impl QueryBuilder {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: false,
            case_sensitive: false,
            search_titles: true,
            search_messages: true,
            title_contains: None,
            only_with_code: false,
            start_date: None,
            end_date: None,
        }
    }

    pub fn regex(mut self, is_regex: bool) -> Self {
        self.is_regex = is_regex;
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn search_titles(mut self, search_titles: bool) -> Self {
        self.search_titles = search_titles;
        self
    }

    pub fn search_messages(mut self, search_messages: bool) -> Self {
        self.search_messages = search_messages;
        self
    }

    pub fn title_contains(mut self, needle: impl Into<String>) -> Self {
        self.title_contains = Some(needle.into());
        self
    }

    pub fn only_with_code(mut self, only_with_code: bool) -> Self {
        self.only_with_code = only_with_code;
        self
    }

    /// Inclusive lower bound, `YYYY-MM-DD` or ISO 8601. Parsed by [`build`](Self::build).
    pub fn start_date(mut self, input: impl Into<String>) -> Self {
        self.start_date = Some(DateSpec::Text(input.into()));
        self
    }

    /// Inclusive upper bound; a bare date covers that whole day.
    pub fn end_date(mut self, input: impl Into<String>) -> Self {
        self.end_date = Some(DateSpec::Text(input.into()));
        self
    }

    pub fn start_at(mut self, ts: DateTime<Utc>) -> Self {
        self.start_date = Some(DateSpec::At(ts));
        self
    }

    pub fn end_at(mut self, ts: DateTime<Utc>) -> Self {
        self.end_date = Some(DateSpec::At(ts));
        self
    }

    /// Validate and compile.
    ///
    /// # Errors
    ///
    /// [`VaultError::Pattern`](crate::VaultError::Pattern) for a regex that does not compile,
    /// [`VaultError::InvalidDate`](crate::VaultError::InvalidDate) for an unparsable bound.
    pub fn build(self) -> Result<Query> {
        let matcher = Matcher::new(&self.pattern, self.is_regex, self.case_sensitive)?;
        let title_filter = self
            .title_contains
            .as_deref()
            .map(|needle| Matcher::new(needle, false, self.case_sensitive))
            .transpose()?;
        let start_date = self.start_date.map(|d| d.resolve(DateBound::Start)).transpose()?;
        let end_date = self.end_date.map(|d| d.resolve(DateBound::End)).transpose()?;

        Ok(Query {
            pattern: self.pattern,
            is_regex: self.is_regex,
            case_sensitive: self.case_sensitive,
            search_titles: self.search_titles,
            search_messages: self.search_messages,
            title_contains: self.title_contains,
            only_with_code: self.only_with_code,
            start_date,
            end_date,
            matcher,
            title_filter,
        })
    }
}
