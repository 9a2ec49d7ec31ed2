//! Post-fetch coercion of column values

use std::fmt;
use std::str::FromStr;

use serde_json::{Number, Value as JsonValue};

use crate::executor::{Row, SQL_TARGET};
use crate::{Error, Result};

/// Scalar type a fetched column can be coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastType {
    Int,
    Float,
    String,
    Bool,
}

impl CastType {
    pub fn name(&self) -> &'static str {
        match self {
            CastType::Int => "int",
            CastType::Float => "float",
            CastType::String => "string",
            CastType::Bool => "bool",
        }
    }

    /// Coerce one value
    pub fn apply(&self, column: &str, value: &JsonValue) -> Result<JsonValue> {
        let failed = || Error::CastFailed {
            column: column.to_string(),
            target: self.name().to_string(),
            value: value.to_string(),
        };

        match self {
            CastType::Int => match value {
                JsonValue::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
                    .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                    .map(JsonValue::from)
                    .ok_or_else(failed),
                JsonValue::String(s) => {
                    let s = s.trim();
                    s.parse::<i64>()
                        .ok()
                        .or_else(|| s.parse::<f64>().ok().map(|f| f.trunc() as i64))
                        .map(JsonValue::from)
                        .ok_or_else(failed)
                }
                JsonValue::Bool(b) => Ok(JsonValue::from(i64::from(*b))),
                _ => Err(failed()),
            },
            CastType::Float => {
                let float = match value {
                    JsonValue::Number(n) => n.as_f64(),
                    JsonValue::String(s) => s.trim().parse::<f64>().ok(),
                    JsonValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
                    _ => None,
                };
                float
                    .and_then(Number::from_f64)
                    .map(JsonValue::Number)
                    .ok_or_else(failed)
            }
            CastType::String => match value {
                JsonValue::String(_) => Ok(value.clone()),
                JsonValue::Number(n) => Ok(JsonValue::String(n.to_string())),
                JsonValue::Bool(true) => Ok(JsonValue::from("1")),
                JsonValue::Bool(false) => Ok(JsonValue::from("0")),
                _ => Err(failed()),
            },
            CastType::Bool => Ok(JsonValue::Bool(match value {
                JsonValue::Null => false,
                JsonValue::Bool(b) => *b,
                JsonValue::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
                JsonValue::String(s) => !(s.is_empty() || s == "0"),
                JsonValue::Array(items) => !items.is_empty(),
                JsonValue::Object(_) => true,
            })),
        }
    }
}

impl fmt::Display for CastType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CastType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "int" | "integer" => Ok(CastType::Int),
            "float" | "double" => Ok(CastType::Float),
            "string" => Ok(CastType::String),
            "bool" | "boolean" => Ok(CastType::Bool),
            other => Err(Error::InvalidCastType {
                name: other.to_string(),
            }),
        }
    }
}

/// Coerce every registered column in every row
///
/// A row without the column, or holding null in it, is left alone.
pub fn apply_casts(rows: &mut [Row], casts: &[(String, CastType)]) -> Result<()> {
    if casts.is_empty() {
        return Ok(());
    }

    for row in rows.iter_mut() {
        for (column, cast) in casts {
            let Some(value) = row.get_mut(column) else {
                continue;
            };
            if value.is_null() {
                continue;
            }

            let cast_value = cast.apply(column, value)?;
            tracing::trace!(target: SQL_TARGET, %column, to = cast.name(), "cast value");
            *value = cast_value;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<JsonValue>) -> Vec<Row> {
        values
            .into_iter()
            .map(|value| match value {
                JsonValue::Object(map) => map,
                other => panic!("not an object: {other}"),
            })
            .collect()
    }

    #[test]
    fn test_cast_type_names() {
        assert_eq!("integer".parse::<CastType>().unwrap(), CastType::Int);
        assert_eq!("double".parse::<CastType>().unwrap(), CastType::Float);
        assert_eq!("boolean".parse::<CastType>().unwrap(), CastType::Bool);

        let err = "array".parse::<CastType>().unwrap_err();
        assert!(matches!(err, Error::InvalidCastType { ref name } if name == "array"));
    }

    #[test]
    fn test_int_cast() {
        assert_eq!(CastType::Int.apply("id", &json!("42")).unwrap(), json!(42));
        assert_eq!(CastType::Int.apply("id", &json!(" 7 ")).unwrap(), json!(7));
        assert_eq!(CastType::Int.apply("id", &json!("2.9")).unwrap(), json!(2));
        assert_eq!(CastType::Int.apply("id", &json!(true)).unwrap(), json!(1));

        let err = CastType::Int.apply("id", &json!("abc")).unwrap_err();
        assert!(matches!(err, Error::CastFailed { ref column, .. } if column == "id"));
    }

    #[test]
    fn test_float_and_string_casts() {
        assert_eq!(CastType::Float.apply("score", &json!("12.5")).unwrap(), json!(12.5));
        assert_eq!(CastType::Float.apply("score", &json!(3)).unwrap(), json!(3.0));
        assert_eq!(CastType::String.apply("id", &json!(5)).unwrap(), json!("5"));
        assert!(CastType::String.apply("tags", &json!([1])).is_err());
    }

    #[test]
    fn test_bool_cast() {
        assert_eq!(CastType::Bool.apply("active", &json!("0")).unwrap(), json!(false));
        assert_eq!(CastType::Bool.apply("active", &json!("")).unwrap(), json!(false));
        assert_eq!(CastType::Bool.apply("active", &json!("yes")).unwrap(), json!(true));
        assert_eq!(CastType::Bool.apply("active", &json!(0)).unwrap(), json!(false));
    }

    #[test]
    fn test_apply_casts_skips_missing_and_null() {
        let mut fetched = rows(vec![
            json!({"id": "1", "visits": "10"}),
            json!({"id": "2"}),
            json!({"id": "3", "visits": null}),
        ]);
        let casts = vec![
            ("id".to_string(), CastType::Int),
            ("visits".to_string(), CastType::Int),
        ];

        apply_casts(&mut fetched, &casts).unwrap();

        assert_eq!(JsonValue::Object(fetched[0].clone()), json!({"id": 1, "visits": 10}));
        assert_eq!(JsonValue::Object(fetched[1].clone()), json!({"id": 2}));
        assert_eq!(JsonValue::Object(fetched[2].clone()), json!({"id": 3, "visits": null}));
    }
}
