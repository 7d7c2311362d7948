//! Dynamic WHERE-clause construction for list filters
//!
//! List endpoints combine optional filters (point of sale, user, status,
//! date window) with AND semantics. Conditions and bindings are collected
//! in lockstep, so the rendered placeholders always line up with the
//! values applied to the query.

use sqlx::{
    query::{QueryAs, QueryScalar},
    Sqlite,
};

pub struct QueryBuilder {
    conditions: Vec<String>,
    bindings: Vec<QueryValue>,
}

#[derive(Clone)]
pub enum QueryValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Add a condition; its placeholders must be matched by `bind_*`
    /// calls in the same order.
    pub fn add_condition(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    pub fn bind_text(&mut self, value: String) -> &mut Self {
        self.bindings.push(QueryValue::Text(value));
        self
    }

    pub fn bind_i64(&mut self, value: i64) -> &mut Self {
        self.bindings.push(QueryValue::Integer(value));
        self
    }

    pub fn bind_f64(&mut self, value: f64) -> &mut Self {
        self.bindings.push(QueryValue::Float(value));
        self
    }

    /// Render the WHERE clause (empty string when no conditions)
    pub fn build_where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Apply the collected bindings to a `query_as`
    pub fn apply_bindings<'a, 'b, O>(
        &'b self,
        mut query: QueryAs<'a, Sqlite, O, <Sqlite as sqlx::Database>::Arguments<'a>>,
    ) -> QueryAs<'a, Sqlite, O, <Sqlite as sqlx::Database>::Arguments<'a>>
    where
        'b: 'a,
    {
        for binding in &self.bindings {
            query = match binding {
                QueryValue::Text(s) => query.bind(s),
                QueryValue::Integer(i) => query.bind(*i),
                QueryValue::Float(f) => query.bind(*f),
            };
        }
        query
    }

    /// Apply the collected bindings to a `query_scalar`
    pub fn apply_bindings_scalar<'a, 'b, O>(
        &'b self,
        mut query: QueryScalar<'a, Sqlite, O, <Sqlite as sqlx::Database>::Arguments<'a>>,
    ) -> QueryScalar<'a, Sqlite, O, <Sqlite as sqlx::Database>::Arguments<'a>>
    where
        O: Send + Unpin,
        'b: 'a,
    {
        for binding in &self.bindings {
            query = match binding {
                QueryValue::Text(s) => query.bind(s),
                QueryValue::Integer(i) => query.bind(*i),
                QueryValue::Float(f) => query.bind(*f),
            };
        }
        query
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}
