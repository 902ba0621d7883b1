use scanguard_core::ServiceError;
use scanguard_sql::{Row, Value};

/// Storage type of a client-writable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    /// Integer when the input is integral, real otherwise.
    Number,
    Text,
    /// Stored as 0/1.
    Bool,
}

/// A client-writable column: SQL name, JSON field name, type, rules.
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub field: &'static str,
    pub kind: ColumnKind,
    pub required: bool,
    pub range: Option<(f64, f64)>,
}

impl Column {
    pub const fn new(name: &'static str, field: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            field,
            kind,
            required: false,
            range: None,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Inclusive numeric range.
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.range = Some((min, max));
        self
    }
}

/// Table definition for one resource.
#[derive(Debug)]
pub struct ResourceDef {
    /// SQL table name.
    pub table: &'static str,
    /// Singular name used in messages.
    pub label: &'static str,
    /// Column that orders rows newest-first; ties break on `id`.
    pub order_by: &'static str,
    /// Columns accepted from request bodies.
    pub columns: &'static [Column],
}

impl ResourceDef {
    /// Validate a JSON request body into a [`Draft`].
    ///
    /// Fails with `Validation` when the body is not an object, a required
    /// field is missing or null, a field has the wrong type, or a numeric
    /// field is outside its range. Unknown fields are ignored.
    pub fn validate(&self, body: &serde_json::Value) -> Result<Draft, ServiceError> {
        let obj = body
            .as_object()
            .ok_or_else(|| ServiceError::Validation("request body must be a JSON object".into()))?;

        let missing: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| c.required && obj.get(c.field).is_none_or(|v| v.is_null()))
            .map(|c| c.field)
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut draft = Draft::default();
        for col in self.columns {
            let Some(raw) = obj.get(col.field).filter(|v| !v.is_null()) else {
                continue;
            };
            let value = coerce(col, raw)?;
            check_range(col, &value)?;
            draft.set(col.name, value);
        }
        Ok(draft)
    }
}

fn coerce(col: &Column, raw: &serde_json::Value) -> Result<Value, ServiceError> {
    let bad = |what: &str| ServiceError::Validation(format!("{} must be {}", col.field, what));

    match col.kind {
        ColumnKind::Integer => match raw {
            serde_json::Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(Value::Integer)
                .ok_or_else(|| bad("an integer")),
            _ => Err(bad("an integer")),
        },
        ColumnKind::Real => numeric(raw).map(Value::Real).ok_or_else(|| bad("a number")),
        ColumnKind::Number => match raw {
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Integer(i)),
                None => n.as_f64().map(Value::Real).ok_or_else(|| bad("a number")),
            },
            _ => Err(bad("a number")),
        },
        ColumnKind::Text => match raw {
            serde_json::Value::String(s) => Ok(Value::Text(s.clone())),
            serde_json::Value::Number(n) => Ok(Value::Text(n.to_string())),
            serde_json::Value::Bool(b) => Ok(Value::Text(b.to_string())),
            _ => Err(bad("a string")),
        },
        ColumnKind::Bool => match raw {
            serde_json::Value::Bool(b) => Ok(Value::from(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(Value::from(false)),
                Some(1) => Ok(Value::from(true)),
                _ => Err(bad("a boolean")),
            },
            serde_json::Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(Value::from(true)),
                "false" | "0" => Ok(Value::from(false)),
                _ => Err(bad("a boolean")),
            },
            _ => Err(bad("a boolean")),
        },
    }
}

/// Numbers, or strings holding a number (some firmware sends `"90"`).
fn numeric(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn check_range(col: &Column, value: &Value) -> Result<(), ServiceError> {
    let Some((min, max)) = col.range else {
        return Ok(());
    };
    let v = match value {
        Value::Integer(i) => *i as f64,
        Value::Real(f) => *f,
        _ => return Ok(()),
    };
    if v < min || v > max {
        return Err(ServiceError::Validation(format!(
            "{} must be between {} and {}",
            col.field, min, max
        )));
    }
    Ok(())
}

/// Column values for one record about to be inserted.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    values: Vec<(&'static str, Value)>,
}

impl Draft {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
    }

    /// Set a column, replacing any previous value.
    pub fn set(&mut self, column: &'static str, value: impl Into<Value>) {
        let value = value.into();
        match self.values.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.values.push((column, value)),
        }
    }

    /// Set a column only if the client did not supply it.
    pub fn set_default(&mut self, column: &'static str, value: impl Into<Value>) {
        if self.get(column).is_none_or(Value::is_null) {
            self.set(column, value);
        }
    }

    pub fn values(&self) -> &[(&'static str, Value)] {
        &self.values
    }

    /// Turn the draft into a row as if it had been read back with `id`.
    pub fn into_row(self, id: i64) -> Row {
        let mut columns = Vec::with_capacity(self.values.len() + 1);
        columns.push(("id".to_string(), Value::Integer(id)));
        columns.extend(self.values.into_iter().map(|(c, v)| (c.to_string(), v)));
        Row { columns }
    }
}
