//! Datum - ReQL's JSON-like data type.
//!
//! A `Datum` represents any value that can be stored or manipulated in a
//! query. It's similar to JSON, with one addition: objects tagged with the
//! reserved `$reql_type$` field are lifted into an explicit
//! [`Datum::Pseudo`] variant so that typed payloads (schemas, times,
//! geometries, binary blobs) are distinguished at the type level. On the wire
//! they are still plain objects carrying the reserved field.
//!
//! # Supported Types
//!
//! - **Null**: Absence of a value
//! - **Boolean**: true or false
//! - **Number**: finite f64 floating point numbers
//! - **String**: UTF-8 encoded text
//! - **Array**: Ordered list of datums
//! - **Object**: Key-value map (like JSON object)
//! - **Pseudo**: Object tagged with a pseudo-type
//!
//! Datums are immutable and cheap to clone; composite payloads are shared
//! through `Arc`. New composite values are produced with
//! [`DatumObjectBuilder`] and [`DatumArrayBuilder`], which enforce the
//! [`Limits`] in effect.
//!
//! # Example
//!
//! ```rust,ignore
//! use photondb_reql::reql::{Datum, DatumObjectBuilder, Limits};
//!
//! let mut builder = DatumObjectBuilder::new();
//! builder.add("name", Datum::from("Alice"));
//! builder.add("age", Datum::from(30));
//! let obj = builder.into_datum(&Limits::default())?;
//! ```

use super::pseudo::{PseudoType, REQL_TYPE_FIELD};
use super::types::Limits;
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Field map of an object datum. Sorted so equality and output are stable.
pub type DatumMap = BTreeMap<String, Datum>;

const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Datum represents a value in a ReQL query.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Null,
    Boolean(bool),
    Number(f64),
    String(Arc<str>),
    Array(Arc<Vec<Datum>>),
    Object(Arc<DatumMap>),
    /// Object carrying a `$reql_type$` tag. `fields` never contains the tag.
    Pseudo {
        kind: PseudoType,
        fields: Arc<DatumMap>,
    },
}

impl Datum {
    /// Create a number datum, rejecting NaN and infinities.
    pub fn number(n: f64) -> Result<Datum> {
        if n.is_finite() {
            Ok(Datum::Number(n))
        } else {
            Err(Error::logic(format!("Non-finite number: {}", n)))
        }
    }

    pub fn string<S: Into<Arc<str>>>(s: S) -> Datum {
        Datum::String(s.into())
    }

    pub fn empty_object() -> Datum {
        Datum::Object(Arc::new(DatumMap::new()))
    }

    /// Check if datum is null
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get as number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Datum::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as array
    pub fn as_array(&self) -> Option<&[Datum]> {
        match self {
            Datum::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Get as a plain (untagged) object
    pub fn as_object(&self) -> Option<&DatumMap> {
        match self {
            Datum::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// The pseudo-type tag, if any.
    pub fn pseudo_type(&self) -> Option<PseudoType> {
        match self {
            Datum::Pseudo { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// User-facing type name, as reported by `type_of` and in type errors.
    pub fn type_name(&self) -> String {
        match self {
            Datum::Null => "NULL".to_string(),
            Datum::Boolean(_) => "BOOL".to_string(),
            Datum::Number(_) => "NUMBER".to_string(),
            Datum::String(_) => "STRING".to_string(),
            Datum::Array(_) => "ARRAY".to_string(),
            Datum::Object(_) => "OBJECT".to_string(),
            Datum::Pseudo { kind, .. } => format!("PTYPE<{}>", kind.name()),
        }
    }

    /// Convert a parsed JSON document into a datum, enforcing `limits`.
    ///
    /// Objects carrying `$reql_type$` become pseudo-values; an unknown or
    /// non-string tag is an error.
    pub fn from_json(json: &serde_json::Value, limits: &Limits) -> Result<Datum> {
        Self::from_json_at(json, limits, 0)
    }

    fn from_json_at(json: &serde_json::Value, limits: &Limits, depth: usize) -> Result<Datum> {
        use serde_json::Value;

        match json {
            Value::Null => Ok(Datum::Null),
            Value::Bool(b) => Ok(Datum::Boolean(*b)),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::logic(format!("Invalid number: {}", n)))
                .and_then(Datum::number),
            Value::String(s) => {
                check_string(s, limits)?;
                Ok(Datum::string(s.as_str()))
            }
            Value::Array(arr) => {
                check_depth(depth + 1, limits)?;
                let mut builder = DatumArrayBuilder::new(limits);
                for item in arr {
                    builder.push(Self::from_json_at(item, limits, depth + 1)?)?;
                }
                Ok(builder.into_datum())
            }
            Value::Object(obj) => {
                check_depth(depth + 1, limits)?;
                let mut builder = DatumObjectBuilder::new();
                for (key, value) in obj {
                    check_string(key, limits)?;
                    builder.add(key.clone(), Self::from_json_at(value, limits, depth + 1)?);
                }
                builder.into_datum(limits)
            }
        }
    }

    /// Convert to a JSON document. Pseudo-values regain their reserved field.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            Datum::Null => Value::Null,
            Datum::Boolean(b) => Value::Bool(*b),
            // Integral values within the exact f64 range print without a fraction.
            Datum::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => {
                Value::Number((*n as i64).into())
            }
            Datum::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Datum::String(s) => Value::String(s.to_string()),
            Datum::Array(arr) => Value::Array(arr.iter().map(Datum::to_json).collect()),
            Datum::Object(obj) => Value::Object(map_to_json(obj)),
            Datum::Pseudo { kind, fields } => {
                let mut json = map_to_json(fields);
                json.insert(
                    REQL_TYPE_FIELD.to_string(),
                    Value::String(kind.name().to_string()),
                );
                Value::Object(json)
            }
        }
    }
}

/// JSON object holding the fields of `map`, without any reserved field.
pub fn map_to_json(map: &DatumMap) -> serde_json::Map<String, serde_json::Value> {
    map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

fn check_string(s: &str, limits: &Limits) -> Result<()> {
    if s.len() > limits.string_bytes {
        return Err(Error::resource_limit(format!(
            "String over size limit `{}`.",
            limits.string_bytes
        )));
    }
    Ok(())
}

pub(crate) fn check_depth(depth: usize, limits: &Limits) -> Result<()> {
    if depth > limits.nesting_depth {
        return Err(Error::resource_limit(format!(
            "Maximum nesting depth `{}` exceeded.",
            limits.nesting_depth
        )));
    }
    Ok(())
}

/// Accumulates object fields; finalised once with [`into_datum`].
///
/// [`into_datum`]: DatumObjectBuilder::into_datum
#[derive(Debug, Default)]
pub struct DatumObjectBuilder {
    fields: DatumMap,
}

impl DatumObjectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing object. A pseudo-value exposes its reserved
    /// field again, so re-tagging it collides in [`add`].
    ///
    /// [`add`]: DatumObjectBuilder::add
    pub fn from_datum(datum: &Datum) -> Result<Self> {
        match datum {
            Datum::Object(obj) => Ok(Self {
                fields: (**obj).clone(),
            }),
            Datum::Pseudo { kind, fields } => {
                let mut fields = (**fields).clone();
                fields.insert(REQL_TYPE_FIELD.to_string(), Datum::string(kind.name()));
                Ok(Self { fields })
            }
            other => Err(Error::logic(format!(
                "Expected type OBJECT but found {}.",
                other.type_name()
            ))),
        }
    }

    /// Insert `key` unless present. Returns `true` if the key already
    /// existed, in which case the existing value is kept.
    pub fn add<K: Into<String>>(&mut self, key: K, value: Datum) -> bool {
        match self.fields.entry(key.into()) {
            Entry::Occupied(_) => true,
            Entry::Vacant(slot) => {
                slot.insert(value);
                false
            }
        }
    }

    /// Insert `key`, replacing any existing value.
    pub fn overwrite<K: Into<String>>(&mut self, key: K, value: Datum) {
        self.fields.insert(key.into(), value);
    }

    /// Remove `key`. Returns `true` if it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.fields.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Freeze into an immutable datum.
    pub fn into_datum(mut self, limits: &Limits) -> Result<Datum> {
        if self.fields.len() > limits.object_size {
            return Err(Error::resource_limit(format!(
                "Object over size limit `{}`.",
                limits.object_size
            )));
        }

        let Some(tag) = self.fields.remove(REQL_TYPE_FIELD) else {
            return Ok(Datum::Object(Arc::new(self.fields)));
        };

        let name = tag.as_str().ok_or_else(|| {
            Error::logic(format!(
                "Invalid $reql_type$ field: expected a STRING but found {}.",
                tag.type_name()
            ))
        })?;
        let kind = PseudoType::from_name(name)
            .ok_or_else(|| Error::logic(format!("Unknown $reql_type$ `{}`.", name)))?;

        Ok(Datum::Pseudo {
            kind,
            fields: Arc::new(self.fields),
        })
    }
}

/// Accumulates array elements under the array size quota.
#[derive(Debug)]
pub struct DatumArrayBuilder {
    items: Vec<Datum>,
    limit: usize,
}

impl DatumArrayBuilder {
    pub fn new(limits: &Limits) -> Self {
        Self {
            items: Vec::new(),
            limit: limits.array_size,
        }
    }

    pub fn push(&mut self, datum: Datum) -> Result<()> {
        if self.items.len() >= self.limit {
            return Err(Error::resource_limit(format!(
                "Array over size limit `{}`.",
                self.limit
            )));
        }
        self.items.push(datum);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_datum(self) -> Datum {
        Datum::Array(Arc::new(self.items))
    }
}

// Conversions
impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Boolean(b)
    }
}

impl From<i32> for Datum {
    fn from(n: i32) -> Self {
        Datum::Number(n as f64)
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::String(s.into())
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::String(s.into())
    }
}

impl From<Vec<Datum>> for Datum {
    fn from(items: Vec<Datum>) -> Self {
        Datum::Array(Arc::new(items))
    }
}

impl Serialize for Datum {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Datum {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Datum::from_json(&json, &Limits::default()).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn small_limits() -> Limits {
        Limits {
            array_size: 2,
            object_size: 2,
            string_bytes: 8,
            nesting_depth: 2,
        }
    }

    #[test]
    fn test_number_rejects_non_finite() {
        assert!(Datum::number(f64::NAN).is_err());
        assert!(Datum::number(f64::INFINITY).is_err());
        assert_eq!(Datum::number(1.5).unwrap(), Datum::Number(1.5));
        assert_eq!(Datum::Number(-0.0), Datum::Number(0.0));
    }

    #[test]
    fn test_builder_add_reports_duplicates() {
        let mut builder = DatumObjectBuilder::new();
        assert!(!builder.add("a", Datum::from(1)));
        assert!(builder.add("a", Datum::from(2)));

        let obj = builder.into_datum(&Limits::default()).unwrap();
        assert_eq!(obj.as_object().unwrap().get("a"), Some(&Datum::from(1)));
    }

    #[test]
    fn test_builder_overwrite_and_delete() {
        let source = Datum::from_json(&json!({"a": 1, "b": 2}), &Limits::default()).unwrap();
        let mut builder = DatumObjectBuilder::from_datum(&source).unwrap();

        builder.overwrite("a", Datum::from("x"));
        assert!(builder.delete("b"));
        assert!(!builder.delete("b"));
        assert_eq!(builder.len(), 1);

        let obj = builder.into_datum(&Limits::default()).unwrap();
        assert_eq!(obj.to_json(), json!({"a": "x"}));
    }

    #[test]
    fn test_builder_from_non_object() {
        let err = DatumObjectBuilder::from_datum(&Datum::from(5)).unwrap_err();
        assert_eq!(err.to_string(), "Expected type OBJECT but found NUMBER.");
    }

    #[test]
    fn test_reserved_field_becomes_pseudo() {
        let datum = Datum::from_json(
            &json!({"$reql_type$": "SCHEMA", "type": "number"}),
            &Limits::default(),
        )
        .unwrap();

        assert_eq!(datum.pseudo_type(), Some(PseudoType::Schema));
        assert_eq!(datum.type_name(), "PTYPE<SCHEMA>");
        assert_eq!(
            datum.to_json(),
            json!({"$reql_type$": "SCHEMA", "type": "number"})
        );
    }

    #[test]
    fn test_unknown_and_invalid_reql_type() {
        let err = Datum::from_json(&json!({"$reql_type$": "WIDGET"}), &Limits::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown $reql_type$ `WIDGET`.");

        let err =
            Datum::from_json(&json!({"$reql_type$": 7}), &Limits::default()).unwrap_err();
        assert!(matches!(err, Error::Logic(_)));
    }

    #[test]
    fn test_limits_enforced_on_conversion() {
        let limits = small_limits();

        let err = Datum::from_json(&json!([1, 2, 3]), &limits).unwrap_err();
        assert_eq!(err, Error::ResourceLimit("Array over size limit `2`.".into()));

        let err = Datum::from_json(&json!({"a": 1, "b": 2, "c": 3}), &limits).unwrap_err();
        assert!(matches!(err, Error::ResourceLimit(_)));

        let err = Datum::from_json(&json!("way too long"), &limits).unwrap_err();
        assert!(matches!(err, Error::ResourceLimit(_)));

        let err = Datum::from_json(&json!([[[1]]]), &limits).unwrap_err();
        assert!(matches!(err, Error::ResourceLimit(_)));

        assert!(Datum::from_json(&json!([[1]]), &limits).is_ok());
    }

    #[test]
    fn test_array_builder_limit() {
        let limits = small_limits();
        let mut builder = DatumArrayBuilder::new(&limits);
        builder.push(Datum::Null).unwrap();
        builder.push(Datum::Null).unwrap();
        assert!(builder.push(Datum::Null).is_err());
        assert_eq!(builder.into_datum().as_array().map(<[Datum]>::len), Some(2));
    }

    #[test]
    fn test_serde_round_trip_through_wire_form() {
        let datum: Datum = serde_json::from_str(r#"{"b": [true, null], "a": "x"}"#).unwrap();
        let text = serde_json::to_string(&datum).unwrap();
        assert_eq!(text, r#"{"a":"x","b":[true,null]}"#);
        assert_eq!(datum.to_string(), text);
    }
}
