use std::fmt;

/// 列的存储类型，用于把查询串文本转换成匹配的绑定类型
/// Storage kind of a column, used to bind query-string text with a matching type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Float,
    Bool,
}

/// 绑定值 / Bound value
///
/// 覆盖 `sqlx::Any` 驱动可编码的标量类型
/// Covers the scalar types the `sqlx::Any` driver can encode
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// 从查询字符串推断类型 / Infer a typed value from a query-string token
    ///
    /// 整数优先，其次浮点，否则保留文本
    /// integers first, then floats, text otherwise
    pub fn infer(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            return Value::Int(i);
        }
        // "nan"/"inf" 之类仍按文本处理 / keep "nan"/"inf" as text
        if raw.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(f) = raw.parse::<f64>() {
                if f.is_finite() {
                    return Value::Float(f);
                }
            }
        }
        Value::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// SQL 字面量（仅用于调试与缓存键）/ SQL literal, for debugging and cache keys only
    pub fn to_sql_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => format!("'{}'", s.replace('\'', "''")),
        }
    }

    /// 按列类型解析文本；未声明类型时退回 `infer`
    /// Parse text for a column kind; undeclared columns fall back to `infer`
    ///
    /// 无法解析为数字的输入保留为文本
    /// input that does not parse as the column's number type stays text
    pub fn coerce(raw: &str, kind: Option<ColumnKind>) -> Self {
        match kind {
            None => Value::infer(raw),
            Some(ColumnKind::Text) => Value::Text(raw.to_string()),
            Some(ColumnKind::Integer) => raw
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .unwrap_or_else(|_| Value::Text(raw.to_string())),
            Some(ColumnKind::Float) => match raw.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Value::Float(f),
                _ => Value::Text(raw.to_string()),
            },
            Some(ColumnKind::Bool) => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Value::Bool(true),
                "false" | "0" => Value::Bool(false),
                _ => Value::Text(raw.to_string()),
            },
        }
    }

    /// 已有值向列类型靠拢（JSON 负载写入时使用）
    /// Conform an existing value to a column kind, used for JSON payload writes
    pub fn conform(self, kind: Option<ColumnKind>) -> Self {
        match (self, kind) {
            (Value::Null, _) => Value::Null,
            (Value::Int(i), Some(ColumnKind::Text)) => Value::Text(i.to_string()),
            (Value::Float(f), Some(ColumnKind::Text)) => Value::Text(f.to_string()),
            (Value::Bool(b), Some(ColumnKind::Text)) => Value::Text(b.to_string()),
            (Value::Int(i), Some(ColumnKind::Float)) => Value::Float(i as f64),
            (Value::Text(t), Some(k @ (ColumnKind::Integer | ColumnKind::Float | ColumnKind::Bool))) => {
                Value::coerce(&t, Some(k))
            }
            (v, _) => v,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Value::Null,
        }
    }
}

/// JSON 转绑定值；数组与对象序列化为文本
/// JSON to bound value; arrays and objects are stored as text
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Text(n.to_string())
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Text(other.to_string()),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from(v.clone())
    }
}
