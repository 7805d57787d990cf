//! Query construction and the dynamic filter compiler.
//!
//! This module turns untrusted, loosely-typed filter tokens into a validated
//! [`Query`] that backends can translate into a safe, fully parameterized
//! engine query. Nothing here touches storage: every token is validated
//! before a backend ever sees it.
//!
//! # Token form
//!
//! A transport layer hands over tokens of the form
//! `filter__<field>__<operator>[__<type>]` with a raw string value:
//!
//! ```ignore
//! use silt::query::{Query, QueryOptions};
//!
//! let query = Query::compile(
//!     [("filter__age__gt__int", "5")],
//!     QueryOptions {
//!         sort_field: Some("id"),
//!         sort_direction: Some("DESC"),
//!         ..QueryOptions::default()
//!     },
//! )?;
//! ```
//!
//! Each validation failure maps to its own [`StoreError`] variant, checked in
//! a fixed order: token shape, operator, value presence, declared type, field
//! resolution. A declared numeric value must parse before it is accepted;
//! values are carried as the closed [`FilterValue`] variant from then on, so
//! no raw text is ever re-interpreted downstream.
//!
//! # Builder form
//!
//! Queries can also be constructed programmatically with the fluent API:
//!
//! ```ignore
//! use silt::query::{Query, Filter, SortDirection};
//!
//! let query = Query::builder()
//!     .filter(Filter::gt("age", 5)?)
//!     .sort("id", SortDirection::Desc)?
//!     .limit(10)
//!     .build();
//! ```
//!
//! # Fields
//!
//! `id` is the only real column. Every other field addresses into the stored
//! payload: a field starting with the `$.` path marker is taken as an
//! explicit payload path, and a bare field such as `age` is shorthand for
//! `$.age`. Path segments are restricted to plain identifiers.

use crate::error::{StoreError, StoreResult};

/// Leading part of every filter token name.
const TOKEN_PREFIX: &str = "filter";

/// Separator between the parts of a compound token name.
const TOKEN_SEPARATOR: &str = "__";

/// Marker introducing an explicit payload path.
const PATH_MARKER: &str = "$.";

/// Sort direction for query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    #[default]
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

impl SortDirection {
    /// Parses a caller-supplied direction, case-insensitively.
    ///
    /// # Errors
    ///
    /// Anything other than `ASC`/`DESC` is [`StoreError::InvalidSortDirection`].
    pub fn parse(raw: &str) -> StoreResult<Self> {
        if raw.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if raw.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(StoreError::InvalidSortDirection(raw.to_string()))
        }
    }
}

/// Sort specification for query results.
///
/// Specifies which field to sort by and in which direction. The field is
/// resolved with the same rules as filter fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    /// The resolved field reference to sort by.
    pub field: FieldRef,
    /// The sort direction.
    pub direction: SortDirection,
}

/// How the filters of one query are combined.
///
/// Applied uniformly across all filters of the query; there is no nested
/// boolean grouping beyond this single level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    /// Every filter must match.
    #[default]
    And,
    /// Any filter may match.
    Or,
}

impl Combinator {
    /// Parses a caller-supplied combination, case-insensitively.
    ///
    /// # Errors
    ///
    /// Anything other than `AND`/`OR` is [`StoreError::InvalidCombination`].
    pub fn parse(raw: &str) -> StoreResult<Self> {
        if raw.eq_ignore_ascii_case("and") {
            Ok(Combinator::And)
        } else if raw.eq_ignore_ascii_case("or") {
            Ok(Combinator::Or)
        } else {
            Err(StoreError::InvalidCombination(raw.to_string()))
        }
    }
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equal to (exact match).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal to.
    Gte,
    /// Less than or equal to.
    Lte,
}

impl FilterOp {
    fn parse(raw: &str) -> StoreResult<Self> {
        match raw {
            "eq" => Ok(FilterOp::Eq),
            "ne" => Ok(FilterOp::Ne),
            "gt" => Ok(FilterOp::Gt),
            "lt" => Ok(FilterOp::Lt),
            "gte" => Ok(FilterOp::Gte),
            "lte" => Ok(FilterOp::Lte),
            _ => Err(StoreError::UnknownOperator(raw.to_string())),
        }
    }
}

/// A filter value carrying its type.
///
/// The declared type of a token is resolved exactly once, during parsing;
/// backends dispatch on the variant and bind each value with its own engine
/// type, so a value can never escape its position in the compiled query.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// A string comparison value.
    Str(String),
    /// An integer comparison value.
    Int(i64),
    /// A floating-point comparison value.
    Float(f64),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Str(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Str(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        FilterValue::Float(value)
    }
}

/// A resolved field reference.
///
/// `id` is the only real column of a collection table; every other field
/// addresses into the stored payload by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRef {
    /// The identity column.
    Id,
    /// A path into the payload, in `$.a.b` form.
    Payload(String),
}

impl FieldRef {
    /// Resolves a raw field name into a column or payload-path reference.
    ///
    /// A field starting with `$.` is taken as an explicit payload path; a
    /// bare field `age` is shorthand for `$.age`. Path segments outside the
    /// identifier allow-list are rejected, so a field name can never smuggle
    /// query text.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] for empty paths or segments
    /// that are not plain identifiers.
    pub fn parse(raw: &str) -> StoreResult<Self> {
        if raw == "id" {
            return Ok(FieldRef::Id);
        }

        let path = raw.strip_prefix(PATH_MARKER).unwrap_or(raw);
        if path.is_empty() || !path.split('.').all(is_identifier) {
            return Err(StoreError::InvalidFieldName(raw.to_string()));
        }

        Ok(FieldRef::Payload(format!("{PATH_MARKER}{path}")))
    }

    /// Returns the payload path, if this reference addresses the payload.
    pub fn path(&self) -> Option<&str> {
        match self {
            FieldRef::Id => None,
            FieldRef::Payload(path) => Some(path),
        }
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// One validated filter: resolved field, operator, and typed value.
///
/// Filters are request-scoped: parsed from caller input, carried inside a
/// [`Query`], translated by a backend, and discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    /// The resolved field reference.
    pub field: FieldRef,
    /// The comparison operator.
    pub op: FilterOp,
    /// The typed comparison value.
    pub value: FilterValue,
}

impl Filter {
    /// Parses one raw transport token into a validated filter.
    ///
    /// `name` is the compound token name `filter__<field>__<op>[__<type>]`;
    /// `value` is the associated raw string value. Checks run in a fixed
    /// order and stop at the first failure: token shape, operator, value
    /// presence, declared type (with numeric parse), field resolution.
    ///
    /// # Errors
    ///
    /// Each check maps to its own [`StoreError`] variant; see the module
    /// documentation.
    pub fn parse_token(name: &str, value: &str) -> StoreResult<Self> {
        let parts: Vec<&str> = name.split(TOKEN_SEPARATOR).collect();
        if !(parts.len() == 3 || parts.len() == 4) || parts[0] != TOKEN_PREFIX {
            return Err(StoreError::MalformedFilter(name.to_string()));
        }

        let op = FilterOp::parse(parts[2])?;

        if value.is_empty() {
            return Err(StoreError::MissingValue(name.to_string()));
        }

        let value = match parts.get(3).copied() {
            None | Some("str") => FilterValue::Str(value.to_string()),
            Some("int") => FilterValue::Int(value.parse().map_err(|_| {
                StoreError::TypeMismatch { value: value.to_string(), expected: "int" }
            })?),
            Some("float") => FilterValue::Float(value.parse().map_err(|_| {
                StoreError::TypeMismatch { value: value.to_string(), expected: "float" }
            })?),
            Some(other) => return Err(StoreError::UnknownType(other.to_string())),
        };

        Ok(Filter { field: FieldRef::parse(parts[1])?, op, value })
    }

    fn build(field: &str, op: FilterOp, value: impl Into<FilterValue>) -> StoreResult<Self> {
        Ok(Filter { field: FieldRef::parse(field)?, op, value: value.into() })
    }

    /// Creates an equality filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] if the field does not resolve.
    pub fn eq(field: &str, value: impl Into<FilterValue>) -> StoreResult<Self> {
        Self::build(field, FilterOp::Eq, value)
    }

    /// Creates a not-equal filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] if the field does not resolve.
    pub fn ne(field: &str, value: impl Into<FilterValue>) -> StoreResult<Self> {
        Self::build(field, FilterOp::Ne, value)
    }

    /// Creates a greater-than filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] if the field does not resolve.
    pub fn gt(field: &str, value: impl Into<FilterValue>) -> StoreResult<Self> {
        Self::build(field, FilterOp::Gt, value)
    }

    /// Creates a less-than filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] if the field does not resolve.
    pub fn lt(field: &str, value: impl Into<FilterValue>) -> StoreResult<Self> {
        Self::build(field, FilterOp::Lt, value)
    }

    /// Creates a greater-or-equal filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] if the field does not resolve.
    pub fn gte(field: &str, value: impl Into<FilterValue>) -> StoreResult<Self> {
        Self::build(field, FilterOp::Gte, value)
    }

    /// Creates a less-or-equal filter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] if the field does not resolve.
    pub fn lte(field: &str, value: impl Into<FilterValue>) -> StoreResult<Self> {
        Self::build(field, FilterOp::Lte, value)
    }
}

/// A compiled query: one flat filter group, its combinator, an optional sort,
/// a row limit, and the soft-delete scope.
///
/// Use [`Query::compile`] for untrusted transport tokens or
/// [`Query::builder`] for programmatic construction.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Validated filters, combined by `combinator`.
    pub filters: Vec<Filter>,
    /// How the filters are combined (AND by default).
    pub combinator: Combinator,
    /// Optional sort specification.
    pub sort: Option<Sort>,
    /// Maximum number of documents to return; `None` means uncapped.
    pub limit: Option<u32>,
    /// Whether soft-deleted documents are included.
    pub include_deleted: bool,
}

impl Query {
    /// Row cap applied by [`Query::compile`] when the caller supplies none.
    pub const DEFAULT_LIMIT: u32 = 10;

    /// Creates a new empty query with no filters, sort, or limit.
    pub fn new() -> Self {
        Query::default()
    }

    /// Creates a new query builder for fluent construction.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// Compiles a set of raw transport tokens and global options.
    ///
    /// Every token must have the compound `filter__<field>__<op>[__<type>]`
    /// name. Compilation stops at the first invalid token or option; all
    /// validation happens here, before any storage is touched. A missing
    /// `limit` defaults to [`Query::DEFAULT_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns the variant matching the first failed check; see the module
    /// documentation for the full taxonomy.
    pub fn compile<'a, I>(tokens: I, options: QueryOptions<'a>) -> StoreResult<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filters = Vec::new();
        for (name, value) in tokens {
            filters.push(Filter::parse_token(name, value)?);
        }

        let combinator = match options.filter_combination {
            Some(raw) => Combinator::parse(raw)?,
            None => Combinator::default(),
        };

        let direction = match options.sort_direction {
            Some(raw) => SortDirection::parse(raw)?,
            None => SortDirection::default(),
        };
        let sort = match options.sort_field {
            Some(field) => Some(Sort { field: FieldRef::parse(field)?, direction }),
            None => None,
        };

        Ok(Query {
            filters,
            combinator,
            sort,
            limit: Some(options.limit.unwrap_or(Self::DEFAULT_LIMIT)),
            include_deleted: options.include_deleted,
        })
    }
}

/// Global options accompanying a raw token set.
///
/// All fields are caller input; everything except `limit` and
/// `include_deleted` is validated during [`Query::compile`].
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions<'a> {
    /// Field to sort by, resolved like a filter field.
    pub sort_field: Option<&'a str>,
    /// Sort direction, `ASC`/`DESC` (case-insensitive); defaults to `ASC`.
    pub sort_direction: Option<&'a str>,
    /// Filter combination, `AND`/`OR` (case-insensitive); defaults to `AND`.
    pub filter_combination: Option<&'a str>,
    /// Row cap; defaults to [`Query::DEFAULT_LIMIT`].
    pub limit: Option<u32>,
    /// Whether soft-deleted documents are included; defaults to `false`.
    pub include_deleted: bool,
}

/// Fluent builder for [`Query`].
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    query: Query,
}

impl QueryBuilder {
    /// Creates a new query builder.
    pub fn new() -> Self {
        QueryBuilder { query: Query::default() }
    }

    /// Appends a filter to the query's filter group.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filters.push(filter);
        self
    }

    /// Sets how the filter group is combined.
    pub fn combine_with(mut self, combinator: Combinator) -> Self {
        self.query.combinator = combinator;
        self
    }

    /// Sets the sort field and direction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidFieldName`] if the field does not resolve.
    pub fn sort(mut self, field: &str, direction: SortDirection) -> StoreResult<Self> {
        self.query.sort = Some(Sort { field: FieldRef::parse(field)?, direction });
        Ok(self)
    }

    /// Sets the maximum number of documents to return.
    pub fn limit(mut self, limit: u32) -> Self {
        self.query.limit = Some(limit);
        self
    }

    /// Includes soft-deleted documents in the results.
    pub fn include_deleted(mut self) -> Self {
        self.query.include_deleted = true;
        self
    }

    /// Builds and returns the final query.
    pub fn build(self) -> Query {
        self.query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_with_declared_int_parses() {
        let filter = Filter::parse_token("filter__age__gt__int", "5").unwrap();
        assert_eq!(filter.field, FieldRef::Payload("$.age".to_string()));
        assert_eq!(filter.op, FilterOp::Gt);
        assert_eq!(filter.value, FilterValue::Int(5));
    }

    #[test]
    fn token_without_declared_type_defaults_to_str() {
        let filter = Filter::parse_token("filter__name__eq", "Milo").unwrap();
        assert_eq!(filter.value, FilterValue::Str("Milo".to_string()));
    }

    #[test]
    fn token_with_explicit_path_marker_is_kept() {
        let filter = Filter::parse_token("filter__$.details.gender__eq", "F").unwrap();
        assert_eq!(filter.field, FieldRef::Payload("$.details.gender".to_string()));
    }

    #[test]
    fn id_field_resolves_to_the_identity_column() {
        let filter = Filter::parse_token("filter__id__gte__int", "2").unwrap();
        assert_eq!(filter.field, FieldRef::Id);
    }

    #[test]
    fn wrong_part_count_is_malformed() {
        for name in ["filter__age", "filter", "filter__a__eq__int__extra", ""] {
            assert!(matches!(
                Filter::parse_token(name, "1"),
                Err(StoreError::MalformedFilter(_))
            ));
        }
    }

    #[test]
    fn wrong_prefix_is_malformed() {
        assert!(matches!(
            Filter::parse_token("sort__age__eq", "1"),
            Err(StoreError::MalformedFilter(_))
        ));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        assert!(matches!(
            Filter::parse_token("filter__age__like", "5"),
            Err(StoreError::UnknownOperator(op)) if op == "like"
        ));
    }

    #[test]
    fn empty_value_is_missing() {
        assert!(matches!(
            Filter::parse_token("filter__age__gt__int", ""),
            Err(StoreError::MissingValue(_))
        ));
    }

    #[test]
    fn unknown_declared_type_is_rejected() {
        assert!(matches!(
            Filter::parse_token("filter__age__gt__decimal", "5"),
            Err(StoreError::UnknownType(t)) if t == "decimal"
        ));
    }

    #[test]
    fn non_numeric_value_for_int_is_a_type_mismatch() {
        assert!(matches!(
            Filter::parse_token("filter__age__gt__int", "abc"),
            Err(StoreError::TypeMismatch { expected: "int", .. })
        ));
    }

    #[test]
    fn float_values_parse_and_mismatch() {
        let filter = Filter::parse_token("filter__score__lte__float", "2.5").unwrap();
        assert_eq!(filter.value, FilterValue::Float(2.5));
        assert!(matches!(
            Filter::parse_token("filter__score__lte__float", "high"),
            Err(StoreError::TypeMismatch { expected: "float", .. })
        ));
    }

    #[test]
    fn hostile_field_names_are_rejected() {
        for name in [
            "filter__age; DROP TABLE pets__eq",
            "filter__a'b__eq",
            "filter__$.__eq",
            "filter__$.a..b__eq",
        ] {
            assert!(matches!(
                Filter::parse_token(name, "1"),
                Err(StoreError::InvalidFieldName(_))
            ));
        }
    }

    #[test]
    fn compile_collects_all_tokens_and_options() {
        let query = Query::compile(
            [("filter__age__gt__int", "5"), ("filter__name__eq", "Luna")],
            QueryOptions {
                sort_field: Some("id"),
                sort_direction: Some("DESC"),
                filter_combination: Some("OR"),
                limit: Some(25),
                include_deleted: true,
            },
        )
        .unwrap();

        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.combinator, Combinator::Or);
        let sort = query.sort.unwrap();
        assert_eq!(sort.field, FieldRef::Id);
        assert_eq!(sort.direction, SortDirection::Desc);
        assert_eq!(query.limit, Some(25));
        assert!(query.include_deleted);
    }

    #[test]
    fn compile_defaults() {
        let query = Query::compile([], QueryOptions::default()).unwrap();
        assert!(query.filters.is_empty());
        assert_eq!(query.combinator, Combinator::And);
        assert!(query.sort.is_none());
        assert_eq!(query.limit, Some(Query::DEFAULT_LIMIT));
        assert!(!query.include_deleted);
    }

    #[test]
    fn compile_rejects_bad_combination_and_direction() {
        let options = QueryOptions {
            filter_combination: Some("XOR"),
            ..QueryOptions::default()
        };
        assert!(matches!(
            Query::compile([], options),
            Err(StoreError::InvalidCombination(c)) if c == "XOR"
        ));

        let options = QueryOptions {
            sort_field: Some("id"),
            sort_direction: Some("UP"),
            ..QueryOptions::default()
        };
        assert!(matches!(
            Query::compile([], options),
            Err(StoreError::InvalidSortDirection(d)) if d == "UP"
        ));
    }

    #[test]
    fn combination_and_direction_parse_case_insensitively() {
        assert_eq!(Combinator::parse("or").unwrap(), Combinator::Or);
        assert_eq!(Combinator::parse("And").unwrap(), Combinator::And);
        assert_eq!(SortDirection::parse("desc").unwrap(), SortDirection::Desc);
        assert_eq!(SortDirection::parse("Asc").unwrap(), SortDirection::Asc);
    }

    #[test]
    fn builder_assembles_a_query() {
        let query = Query::builder()
            .filter(Filter::gt("age", 5).unwrap())
            .combine_with(Combinator::Or)
            .sort("age", SortDirection::Desc)
            .unwrap()
            .limit(3)
            .build();

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.combinator, Combinator::Or);
        assert_eq!(query.limit, Some(3));
        assert_eq!(query.sort.unwrap().field, FieldRef::Payload("$.age".to_string()));
    }
}
