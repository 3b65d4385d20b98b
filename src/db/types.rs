/// A value that can be bound as a statement parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Unsigned 64-bit integer, stored as BIGINT
    Uint64(u64),
    /// Text (unlimited length)
    Text(String),
    /// Text array (TEXT[])
    TextArray(Vec<String>),
}

impl DbValue {
    /// Text value, or NULL when empty.
    pub fn text_or_null(value: &str) -> Self {
        if value.is_empty() {
            DbValue::Null
        } else {
            DbValue::Text(value.to_string())
        }
    }
}

impl From<&str> for DbValue {
    fn from(value: &str) -> Self {
        DbValue::Text(value.to_string())
    }
}

impl From<String> for DbValue {
    fn from(value: String) -> Self {
        DbValue::Text(value)
    }
}

impl From<u64> for DbValue {
    fn from(value: u64) -> Self {
        DbValue::Uint64(value)
    }
}

impl From<bool> for DbValue {
    fn from(value: bool) -> Self {
        DbValue::Bool(value)
    }
}
