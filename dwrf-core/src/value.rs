use std::ops::Index;

use serde::{Deserialize, Serialize};

use crate::types::DataType;

/// One decoded cell. Compound values nest.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    List(Vec<Value>),
    /// Entries in file order; keys are not deduplicated.
    Map(Vec<(Value, Value)>),
    Struct(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be stored in a column of `data_type`. Nulls fit
    /// anywhere.
    pub fn conforms_to(&self, data_type: &DataType) -> bool {
        match (self, data_type) {
            (Value::Null, _) => true,
            (Value::Boolean(_), DataType::Boolean)
            | (Value::Byte(_), DataType::Byte)
            | (Value::Short(_), DataType::Short)
            | (Value::Int(_), DataType::Int)
            | (Value::Long(_), DataType::Long)
            | (Value::Float(_), DataType::Float)
            | (Value::Double(_), DataType::Double)
            | (Value::String(_), DataType::String)
            | (Value::Binary(_), DataType::Binary) => true,
            (Value::List(items), DataType::List(item)) => items.iter().all(|v| v.conforms_to(item)),
            (Value::Map(entries), DataType::Map(key, value)) => entries
                .iter()
                .all(|(k, v)| k.conforms_to(key) && v.conforms_to(value)),
            (Value::Struct(values), DataType::Struct(fields)) => {
                values.len() == fields.len()
                    && values
                        .iter()
                        .zip(fields)
                        .all(|(v, f)| v.conforms_to(&f.data_type))
            }
            _ => false,
        }
    }
}

/// A row: one value per top-level column.
///
/// Readers overwrite a row in place on every advance, so its buffer is reused
/// across calls; clone it to keep a copy.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    values: Vec<Value>,
}

impl Row {
    pub fn new(width: usize) -> Self {
        Self {
            values: vec![Value::Null; width],
        }
    }

    pub fn from_values(values: Vec<Value>) -> Self {
        Self { values }
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, column: usize) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn set(&mut self, column: usize, value: Value) {
        self.values[column] = value;
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Null every column and resize to `width`, keeping the allocation.
    pub fn reset(&mut self, width: usize) {
        self.values.truncate(width);
        for v in &mut self.values {
            *v = Value::Null;
        }
        self.values.resize(width, Value::Null);
    }
}

impl Index<usize> for Row {
    type Output = Value;

    fn index(&self, column: usize) -> &Value {
        &self.values[column]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    #[test]
    fn reset_nulls_and_resizes() {
        let mut row = Row::from_values(vec![Value::Int(1), Value::String("a".into())]);
        row.reset(3);
        assert_eq!(row.values(), &[Value::Null, Value::Null, Value::Null]);
        row.set(2, Value::Long(7));
        row.reset(1);
        assert_eq!(row.width(), 1);
        assert!(row[0].is_null());
    }

    #[test]
    fn conformance_follows_nesting() {
        let inner = DataType::Struct(vec![
            Field::new("int1", DataType::Int),
            Field::new("string1", DataType::String),
        ]);
        let ok = Value::List(vec![
            Value::Struct(vec![Value::Int(1), Value::String("bye".into())]),
            Value::Struct(vec![Value::Null, Value::Null]),
        ]);
        assert!(ok.conforms_to(&DataType::list(inner.clone())));

        let wrong_arity = Value::List(vec![Value::Struct(vec![Value::Int(1)])]);
        assert!(!wrong_arity.conforms_to(&DataType::list(inner)));
        assert!(!Value::Long(1).conforms_to(&DataType::Int));
        assert!(Value::Null.conforms_to(&DataType::Binary));
    }
}
