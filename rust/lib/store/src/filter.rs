use scanguard_sql::Value;

/// A single `WHERE` condition. Conditions are joined with `AND`.
#[derive(Debug, Clone)]
pub enum Filter {
    /// `column = value`
    Eq(&'static str, Value),
    /// `column >= value`
    AtLeast(&'static str, Value),
    /// `column > value`
    GreaterThan(&'static str, Value),
}

impl Filter {
    fn render(&self, idx: usize) -> (String, &Value) {
        match self {
            Filter::Eq(col, v) => (format!("{col} = ?{idx}"), v),
            Filter::AtLeast(col, v) => (format!("{col} >= ?{idx}"), v),
            Filter::GreaterThan(col, v) => (format!("{col} > ?{idx}"), v),
        }
    }
}

/// Build a `WHERE ...` clause (or an empty string) and its parameters.
///
/// Placeholders are numbered from `?1`; callers append further
/// parameters starting at `params.len() + 1`.
pub(crate) fn where_clause(filters: &[Filter]) -> (String, Vec<Value>) {
    if filters.is_empty() {
        return (String::new(), Vec::new());
    }
    let mut clauses = Vec::with_capacity(filters.len());
    let mut params = Vec::with_capacity(filters.len());
    for (i, f) in filters.iter().enumerate() {
        let (sql, v) = f.render(i + 1);
        clauses.push(sql);
        params.push(v.clone());
    }
    (format!("WHERE {}", clauses.join(" AND ")), params)
}
