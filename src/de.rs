use serde::de::{Deserialize, Deserializer, Error};
use serde_json::Value;

pub fn only_true<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b {
            Ok(b)
        } else {
            Err(Error::custom("invalid bool: false"))
        }
    })
}

pub fn only_false<'a, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'a>,
{
    bool::deserialize(deserializer).and_then(|b| {
        if b {
            Err(Error::custom("invalid bool: true"))
        } else {
            Ok(b)
        }
    })
}

/// Unix seconds which the platform sends either as an integer or, in some
/// payloads, as a float or a numeric string. Absent and `null` both map to
/// `None`.
pub fn unix_seconds<'a, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'a>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| Error::custom(format!("invalid unix time: {}", n))),
        Some(Value::String(s)) => s
            .split('.')
            .next()
            .and_then(|whole| whole.parse().ok())
            .map(Some)
            .ok_or_else(|| Error::custom(format!("invalid unix time: {:?}", s))),
        Some(other) => Err(Error::custom(format!("invalid unix time: {}", other))),
    }
}

/// A string if it is one, `None` for anything else.
pub fn lenient_string<'a, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'a>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// `#[serde(default)]` that also covers an explicit `null`, which the
/// platform sends for e.g. `team` on org-wide installs.
pub fn null_as_default<'a, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'a>,
    T: Deserialize<'a> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
