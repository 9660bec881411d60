//! Attribute values used as index keys
//!
//! Every indexed attribute is reduced to an `IndexKey` before it touches a
//! bucket map. Equality and hashing on `IndexKey` are what decide bucket
//! placement; item identity is tracked separately by `ItemId`.

use std::fmt;

/// Index key representing an attribute value.
///
/// Supports Absent, Bool, Int, Float (f64 bits for ordering), String.
/// Numbers with an integral value are always `Int`.
/// Ordering is deterministic: Absent < Bool < Int < Float < String.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IndexKey {
    /// Attribute is unset on the record
    Absent,
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value (stored as bits for total ordering)
    Float(u64),
    /// String value
    String(String),
}

impl IndexKey {
    /// Create a key from a boolean
    pub fn from_bool(v: bool) -> Self {
        IndexKey::Bool(v)
    }

    /// Create a key from an integer
    pub fn from_int(v: i64) -> Self {
        IndexKey::Int(v)
    }

    /// Create a key from a float
    ///
    /// Whole numbers in `i64` range become `Int`, so `1.0` and `1` share a
    /// bucket. Other values use the bit representation for total ordering.
    pub fn from_float(v: f64) -> Self {
        const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
        if v.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&v) {
            return IndexKey::Int(v as i64);
        }
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        IndexKey::Float(ordered)
    }

    /// Create a key from a string
    pub fn from_string(v: impl Into<String>) -> Self {
        IndexKey::String(v.into())
    }

    /// Create a key from a JSON value.
    ///
    /// `null` maps to `Absent`. Arrays and objects are not indexable.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => Some(IndexKey::Absent),
            serde_json::Value::Bool(b) => Some(IndexKey::from_bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(IndexKey::from_int(i))
                } else {
                    n.as_f64().map(IndexKey::from_float)
                }
            }
            serde_json::Value::String(s) => Some(IndexKey::from_string(s.as_str())),
            _ => None,
        }
    }

    /// Returns true for the `Absent` key
    pub fn is_absent(&self) -> bool {
        matches!(self, IndexKey::Absent)
    }

    /// Recover the float value of a `Float` key
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            IndexKey::Float(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKey::Absent => write!(f, "<absent>"),
            IndexKey::Bool(b) => write!(f, "{}", b),
            IndexKey::Int(i) => write!(f, "{}", i),
            IndexKey::Float(_) => write!(f, "{}", self.as_f64().unwrap_or(f64::NAN)),
            IndexKey::String(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<bool> for IndexKey {
    fn from(v: bool) -> Self {
        IndexKey::from_bool(v)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for IndexKey {
                fn from(v: $t) -> Self {
                    IndexKey::from_int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for IndexKey {
    fn from(v: f32) -> Self {
        IndexKey::from_float(f64::from(v))
    }
}

impl From<f64> for IndexKey {
    fn from(v: f64) -> Self {
        IndexKey::from_float(v)
    }
}

impl From<&str> for IndexKey {
    fn from(v: &str) -> Self {
        IndexKey::from_string(v)
    }
}

impl From<String> for IndexKey {
    fn from(v: String) -> Self {
        IndexKey::String(v)
    }
}

impl From<&String> for IndexKey {
    fn from(v: &String) -> Self {
        IndexKey::from_string(v.as_str())
    }
}

impl<T: Into<IndexKey>> From<Option<T>> for IndexKey {
    fn from(v: Option<T>) -> Self {
        v.map_or(IndexKey::Absent, Into::into)
    }
}
