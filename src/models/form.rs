use serde_json::{Map, Value};

use crate::error::SubmitError;

/// Column layout and presence rules for one deployment's booking form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    /// Field names in the order they are written as spreadsheet columns.
    pub columns: Vec<String>,
    /// Fields that must be present and non-empty, checked in this order.
    pub required: Vec<String>,
}

impl FormSchema {
    pub fn new(columns: Vec<String>, required: Vec<String>) -> Self {
        Self { columns, required }
    }
}

impl Default for FormSchema {
    fn default() -> Self {
        let columns: Vec<String> = ["name", "email", "phone", "address", "date", "time", "service"]
            .iter()
            .map(|field| field.to_string())
            .collect();
        Self {
            required: columns.clone(),
            columns,
        }
    }
}

// A submitted form, kept as the raw JSON object
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub fields: Map<String, Value>,
}

impl FormSubmission {
    /// Accepts only JSON objects; strings, numbers, arrays and null are rejected.
    pub fn from_value(value: Value) -> Result<Self, SubmitError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(SubmitError::InvalidFormat),
        }
    }

    /// Fails on the first required field that is absent or falsy.
    pub fn validate(&self, required: &[String]) -> Result<(), SubmitError> {
        for field in required {
            match self.fields.get(field) {
                Some(value) if !is_falsy(value) => {}
                _ => return Err(SubmitError::MissingField(field.clone())),
            }
        }
        Ok(())
    }

    /// Builds the spreadsheet row in column order. Absent columns become empty cells.
    pub fn to_row(&self, columns: &[String]) -> Result<Vec<Value>, SubmitError> {
        columns
            .iter()
            .map(|column| match self.fields.get(column) {
                None => Ok(Value::Null),
                Some(Value::Object(_)) | Some(Value::Array(_)) => Err(SubmitError::InvalidFormat),
                Some(scalar) => Ok(scalar.clone()),
            })
            .collect()
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |n| n == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
