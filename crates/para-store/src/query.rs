//! Query model shared by every backend
//!
//! Field names are dotted paths into the stored JSON document
//! (`location.latitude`). They come from code, never from request input.

use serde_json::Value;
use std::cmp::Ordering;

/// A predicate over one stored document
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value
    Eq(&'static str, Value),
    /// Field is greater than the value (numbers, or strings lexicographically)
    Gt(&'static str, Value),
    /// Field is greater than or equal to the value
    Gte(&'static str, Value),
    /// Array field has the value as an element
    Contains(&'static str, Value),
    /// Case-insensitive substring of a string field, or of any element of
    /// a string array field
    ContainsText(&'static str, String),
    /// Array field is missing or empty
    IsEmpty(&'static str),
    /// At least one of the nested conditions holds
    AnyOf(Vec<Condition>),
}

impl Condition {
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self::Eq(field, value.into())
    }

    pub fn gt(field: &'static str, value: impl Into<Value>) -> Self {
        Self::Gt(field, value.into())
    }

    pub fn gte(field: &'static str, value: impl Into<Value>) -> Self {
        Self::Gte(field, value.into())
    }

    pub fn contains(field: &'static str, value: impl Into<Value>) -> Self {
        Self::Contains(field, value.into())
    }

    pub fn contains_text(field: &'static str, needle: impl Into<String>) -> Self {
        Self::ContainsText(field, needle.into())
    }

    /// Every field name this condition touches
    pub fn fields(&self) -> Vec<&'static str> {
        match self {
            Self::Eq(f, _)
            | Self::Gt(f, _)
            | Self::Gte(f, _)
            | Self::Contains(f, _)
            | Self::ContainsText(f, _)
            | Self::IsEmpty(f) => vec![*f],
            Self::AnyOf(conditions) => conditions.iter().flat_map(Condition::fields).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }
}

/// Filter, order and page a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub conditions: Vec<Condition>,
    pub sort: Vec<Sort>,
    pub skip: usize,
    pub limit: Option<usize>,
}

impl FindQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add the condition only when a value is present
    pub fn filter_opt<T>(self, value: Option<T>, make: impl FnOnce(T) -> Condition) -> Self {
        match value {
            Some(v) => self.filter(make(v)),
            None => self,
        }
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Look up a dotted path in a document
pub fn field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |value, key| value.get(key))
}

/// Whether `doc` satisfies every condition
pub fn matches_all(doc: &Value, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(doc, c))
}

pub fn matches(doc: &Value, condition: &Condition) -> bool {
    match condition {
        Condition::Eq(path, expected) => match field(doc, path) {
            Some(actual) => values_equal(actual, expected),
            None => expected.is_null(),
        },
        Condition::Gt(path, bound) => {
            field(doc, path).and_then(|v| compare(v, bound)) == Some(Ordering::Greater)
        }
        Condition::Gte(path, bound) => matches!(
            field(doc, path).and_then(|v| compare(v, bound)),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Condition::Contains(path, element) => match field(doc, path) {
            Some(Value::Array(items)) => items.iter().any(|item| values_equal(item, element)),
            _ => false,
        },
        Condition::ContainsText(path, needle) => {
            let pattern = regex::RegexBuilder::new(&regex::escape(needle))
                .case_insensitive(true)
                .build();
            let Ok(pattern) = pattern else {
                return false;
            };
            match field(doc, path) {
                Some(Value::String(s)) => pattern.is_match(s),
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|s| pattern.is_match(s)),
                _ => false,
            }
        }
        Condition::IsEmpty(path) => match field(doc, path) {
            None | Some(Value::Null) => true,
            Some(Value::Array(items)) => items.is_empty(),
            _ => false,
        },
        Condition::AnyOf(conditions) => conditions.iter().any(|c| matches(doc, c)),
    }
}

/// Numbers compare by value regardless of integer/float representation
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Ordering between two scalars of the same kind
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sort order for documents: missing and null first, then by value
pub fn compare_for_sort(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
    }
}

/// Stable multi-key sort in place
pub fn sort_documents(docs: &mut [Value], sort: &[Sort]) {
    if sort.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        sort.iter()
            .map(|s| {
                let ord = compare_for_sort(field(a, s.field), field(b, s.field));
                match s.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
