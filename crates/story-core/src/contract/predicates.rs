//! Predicados de uso frecuente para `Contract::require`.

use serde_json::Value;

pub fn is_integer(value: &Value) -> bool {
    value.is_i64() || value.is_u64()
}

pub fn is_number(value: &Value) -> bool {
    value.is_number()
}

pub fn is_string(value: &Value) -> bool {
    value.is_string()
}

pub fn is_bool(value: &Value) -> bool {
    value.is_boolean()
}

pub fn is_array(value: &Value) -> bool {
    value.is_array()
}

pub fn is_object(value: &Value) -> bool {
    value.is_object()
}

pub fn not_null(value: &Value) -> bool {
    !value.is_null()
}
