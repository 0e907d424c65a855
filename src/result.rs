use serde_json::{Map, Value};

/// Shape discriminant of a [`HookResult`], used by the registry to declare
/// which result forms each hook may legally return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Absent,
    Boolean,
    Text,
    Structured,
    List,
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Boolean => write!(f, "boolean"),
            Self::Text => write!(f, "text"),
            Self::Structured => write!(f, "structured"),
            Self::List => write!(f, "list"),
        }
    }
}

/// Raw result of a single hook invocation. Exactly one variant per call.
///
/// Delegates written against dynamic data can build these from
/// `serde_json::json!` values via [`TryFrom<Value>`].
#[derive(Debug, Clone, PartialEq)]
pub enum HookResult {
    /// Hook not defined by the delegate, or the delegate explicitly
    /// declined to answer.
    Absent,
    Boolean(bool),
    /// Scalar result: a backend name, pathname, SQL text, or opaque
    /// metadata payload.
    Text(String),
    /// Ordered key→value map, arbitrarily nested.
    Structured(Map<String, Value>),
    /// Ordered sequence of structured entries.
    List(Vec<Map<String, Value>>),
}

impl HookResult {
    pub fn shape(&self) -> Shape {
        match self {
            Self::Absent => Shape::Absent,
            Self::Boolean(_) => Shape::Boolean,
            Self::Text(_) => Shape::Text,
            Self::Structured(_) => Shape::Structured,
            Self::List(_) => Shape::List,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<bool> for HookResult {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for HookResult {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for HookResult {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Map<String, Value>> for HookResult {
    fn from(value: Map<String, Value>) -> Self {
        Self::Structured(value)
    }
}

impl TryFrom<Value> for HookResult {
    type Error = anyhow::Error;

    /// Maps a JSON value onto the closest result variant. `Null` becomes
    /// [`HookResult::Absent`]; arrays must contain only objects.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::Absent),
            Value::Bool(b) => Ok(Self::Boolean(b)),
            Value::String(s) => Ok(Self::Text(s)),
            Value::Object(map) => Ok(Self::Structured(map)),
            Value::Array(items) => {
                let mut maps = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(map) => maps.push(map),
                        other => {
                            anyhow::bail!("list results may only contain objects, got {other}")
                        }
                    }
                }
                Ok(Self::List(maps))
            }
            Value::Number(n) => anyhow::bail!("bare number {n} is not a valid hook result"),
        }
    }
}
