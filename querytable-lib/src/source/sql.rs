//! SQL text generation for composed queries.
//!
//! Values are never inlined: every operand becomes a `?` placeholder and is
//! appended to the parameter list in placeholder order.

use crate::model::Value;
use crate::query::Direction;
use crate::query::Filter;
use crate::query::OrderBy;
use crate::query::Query;

/// Escape character used in every generated `LIKE` clause.
pub const LIKE_ESCAPE: char = '\\';

/// Renders the `WHERE` body for a query, or `None` if it has no conditions.
pub fn render_where(query: &Query, params: &mut Vec<Value>) -> Option<String> {
    let parts: Vec<String> = query
        .filters()
        .iter()
        .filter_map(|filter| filter_to_sql(filter, params))
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

/// Converts a `Filter` to a SQL condition.
///
/// Returns `None` for empty groups, which match everything.
pub fn filter_to_sql(filter: &Filter, params: &mut Vec<Value>) -> Option<String> {
    let sql = match filter {
        Filter::Eq(field, value) => binary(field, "=", value, params),
        Filter::Ne(field, value) => binary(field, "<>", value, params),
        Filter::Gt(field, value) => binary(field, ">", value, params),
        Filter::Ge(field, value) => binary(field, ">=", value, params),
        Filter::Lt(field, value) => binary(field, "<", value, params),
        Filter::Le(field, value) => binary(field, "<=", value, params),
        Filter::Contains(field, value) => like(field, format!("%{}%", escape_like(value)), params),
        Filter::StartsWith(field, value) => like(field, format!("{}%", escape_like(value)), params),
        Filter::EndsWith(field, value) => like(field, format!("%{}", escape_like(value)), params),
        Filter::IsNull(field) => format!("{} IS NULL", quote_identifier(field)),
        Filter::IsNotNull(field) => format!("{} IS NOT NULL", quote_identifier(field)),
        Filter::And(filters) => group(filters, " AND ", params)?,
        Filter::Or(filters) => group(filters, " OR ", params)?,
    };
    Some(sql)
}

fn binary(field: &str, op: &str, value: &Value, params: &mut Vec<Value>) -> String {
    params.push(value.clone());
    format!("{} {} ?", quote_identifier(field), op)
}

fn like(field: &str, pattern: String, params: &mut Vec<Value>) -> String {
    params.push(Value::String(pattern));
    format!("{} LIKE ? ESCAPE '{}'", quote_identifier(field), LIKE_ESCAPE)
}

fn group(filters: &[Filter], joiner: &str, params: &mut Vec<Value>) -> Option<String> {
    let parts: Vec<String> = filters
        .iter()
        .filter_map(|f| filter_to_sql(f, params))
        .collect();
    if parts.is_empty() {
        return None;
    }
    Some(format!("({})", parts.join(joiner)))
}

/// Converts an `OrderBy` to an `ORDER BY` body, or `None` if it is empty.
pub fn render_order(order: &OrderBy) -> Option<String> {
    if order.is_empty() {
        return None;
    }
    Some(
        order
            .fields()
            .iter()
            .map(|(field, direction)| {
                let dir = match direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                format!("{} {}", quote_identifier(field), dir)
            })
            .collect::<Vec<_>>()
            .join(", "),
    )
}

/// Quotes an identifier, doubling any embedded double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Escapes `LIKE` wildcards so the value matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}
