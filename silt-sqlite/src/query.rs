//! Query translation from the filter DSL to parameterized SQL.
//!
//! This module translates compiled [`Query`] values into a single scoped
//! SELECT for the SQLite engine. Comparison values and payload extraction
//! paths travel exclusively as bind parameters; the only text spliced into
//! the statement comes from closed vocabularies (operator symbols, the
//! combinator, the sort direction) and the pre-validated, quoted table name.

use rusqlite::types::Value as SqlValue;

use silt_core::query::{Combinator, FieldRef, Filter, FilterOp, FilterValue, Query, SortDirection};

/// A compiled statement: SQL text plus its bind parameters in order.
pub(crate) struct SqlStatement {
    pub(crate) sql: String,
    pub(crate) params: Vec<SqlValue>,
}

/// Translates compiled queries into parameterized SQLite statements.
pub(crate) struct SqlQueryTranslator;

impl SqlQueryTranslator {
    /// Builds the scoped SELECT for one collection.
    ///
    /// `table` must already be validated and quoted. The statement reads the
    /// soft-delete scope (unless deleted documents are included), the filter
    /// group joined by the query's combinator, the optional ordering, and the
    /// row cap.
    pub(crate) fn select(table: &str, query: &Query) -> SqlStatement {
        let mut params = Vec::new();
        let mut sql = format!("SELECT id, deleted, payload FROM {table}");

        let mut conditions: Vec<String> = Vec::new();
        if !query.include_deleted {
            conditions.push("deleted = 0".to_string());
        }
        if !query.filters.is_empty() {
            let group = query
                .filters
                .iter()
                .map(|filter| Self::fragment(filter, &mut params))
                .collect::<Vec<_>>()
                .join(Self::combinator_sql(query.combinator));
            conditions.push(format!("({group})"));
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if let Some(sort) = &query.sort {
            sql.push_str(" ORDER BY ");
            sql.push_str(&Self::field_expr(&sort.field, &mut params));
            sql.push_str(match sort.direction {
                SortDirection::Asc => " ASC",
                SortDirection::Desc => " DESC",
            });
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            params.push(SqlValue::Integer(i64::from(limit)));
        }

        SqlStatement { sql, params }
    }

    /// Renders one filter as `<field-expression> <op> ?`, pushing its
    /// parameters in evaluation order.
    fn fragment(filter: &Filter, params: &mut Vec<SqlValue>) -> String {
        let expr = Self::field_expr(&filter.field, params);
        params.push(Self::bind(&filter.value));
        format!("{expr} {} ?", Self::op_sql(filter.op))
    }

    fn field_expr(field: &FieldRef, params: &mut Vec<SqlValue>) -> String {
        match field {
            FieldRef::Id => "id".to_string(),
            FieldRef::Payload(path) => {
                params.push(SqlValue::Text(path.clone()));
                "json_extract(payload, ?)".to_string()
            }
        }
    }

    fn bind(value: &FilterValue) -> SqlValue {
        match value {
            FilterValue::Str(s) => SqlValue::Text(s.clone()),
            FilterValue::Int(i) => SqlValue::Integer(*i),
            FilterValue::Float(f) => SqlValue::Real(*f),
        }
    }

    fn op_sql(op: FilterOp) -> &'static str {
        match op {
            FilterOp::Eq => "=",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Gte => ">=",
            FilterOp::Lte => "<=",
        }
    }

    fn combinator_sql(combinator: Combinator) -> &'static str {
        match combinator {
            Combinator::And => " AND ",
            Combinator::Or => " OR ",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use silt_core::query::{QueryOptions, SortDirection};

    fn compile(tokens: &[(&'static str, &'static str)], options: QueryOptions<'_>) -> Query {
        Query::compile(tokens.iter().copied(), options).unwrap()
    }

    #[test]
    fn bare_query_selects_the_live_scope() {
        let statement = SqlQueryTranslator::select("\"pets\"", &Query::new());
        assert_eq!(
            statement.sql,
            "SELECT id, deleted, payload FROM \"pets\" WHERE deleted = 0"
        );
        assert!(statement.params.is_empty());
    }

    #[test]
    fn include_deleted_drops_the_scope_condition() {
        let query = Query::builder().include_deleted().build();
        let statement = SqlQueryTranslator::select("\"pets\"", &query);
        assert_eq!(statement.sql, "SELECT id, deleted, payload FROM \"pets\"");
    }

    #[test]
    fn filters_become_bound_fragments() {
        let query = compile(
            &[("filter__age__gt__int", "5")],
            QueryOptions {
                sort_field: Some("id"),
                sort_direction: Some("DESC"),
                ..QueryOptions::default()
            },
        );
        let statement = SqlQueryTranslator::select("\"pets\"", &query);

        assert_eq!(
            statement.sql,
            "SELECT id, deleted, payload FROM \"pets\" WHERE deleted = 0 AND \
             (json_extract(payload, ?) > ?) ORDER BY id DESC LIMIT ?"
        );
        assert_eq!(
            statement.params,
            vec![
                SqlValue::Text("$.age".to_string()),
                SqlValue::Integer(5),
                SqlValue::Integer(10),
            ]
        );
    }

    #[test]
    fn combinator_joins_every_fragment() {
        let query = compile(
            &[("filter__age__gt__int", "5"), ("filter__name__eq", "Milo")],
            QueryOptions {
                filter_combination: Some("OR"),
                ..QueryOptions::default()
            },
        );
        let statement = SqlQueryTranslator::select("\"pets\"", &query);

        assert!(statement.sql.contains(
            "(json_extract(payload, ?) > ? OR json_extract(payload, ?) = ?)"
        ));
        assert_eq!(
            statement.params,
            vec![
                SqlValue::Text("$.age".to_string()),
                SqlValue::Integer(5),
                SqlValue::Text("$.name".to_string()),
                SqlValue::Text("Milo".to_string()),
                SqlValue::Integer(10),
            ]
        );
    }

    #[test]
    fn hostile_values_stay_parameters() {
        let query = compile(
            &[("filter__name__eq", "x' OR '1'='1")],
            QueryOptions { limit: Some(1), ..QueryOptions::default() },
        );
        let statement = SqlQueryTranslator::select("\"pets\"", &query);

        assert!(!statement.sql.contains('\''));
        assert_eq!(
            statement.params[1],
            SqlValue::Text("x' OR '1'='1".to_string())
        );
    }

    #[test]
    fn sorting_on_a_payload_path_binds_the_path() {
        let query = Query::builder()
            .sort("details.age", SortDirection::Asc)
            .unwrap()
            .build();
        let statement = SqlQueryTranslator::select("\"pets\"", &query);

        assert!(statement.sql.ends_with("ORDER BY json_extract(payload, ?) ASC"));
        assert_eq!(
            statement.params,
            vec![SqlValue::Text("$.details.age".to_string())]
        );
    }
}
