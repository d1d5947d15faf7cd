//! Field readers for untrusted JSON
//!
//! Missing, mistyped and non-finite values never propagate: readers return
//! `None` or the caller's fallback so saves are repaired field by field.

use glam::Vec2;
use serde_json::{Map, Value};

pub type Object = Map<String, Value>;

/// Finite number at `key`
pub fn num(obj: &Object, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64).filter(|v| v.is_finite())
}

pub fn f32_or(obj: &Object, key: &str, fallback: f32) -> f32 {
    num(obj, key)
        .map(|v| v as f32)
        .filter(|v| v.is_finite())
        .unwrap_or(fallback)
}

pub fn f64_or(obj: &Object, key: &str, fallback: f64) -> f64 {
    num(obj, key).unwrap_or(fallback)
}

/// Non-negative integer at `key`, saturating at `max`
pub fn uint_or(obj: &Object, key: &str, fallback: u64, max: u64) -> u64 {
    match obj.get(key) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite() && *v >= 0.0).map(|v| v.floor() as u64))
            .map(|v| v.min(max))
            .unwrap_or(fallback),
        _ => fallback,
    }
}

pub fn u32_or(obj: &Object, key: &str, fallback: u32) -> u32 {
    uint_or(obj, key, fallback as u64, u32::MAX as u64) as u32
}

pub fn u8_or(obj: &Object, key: &str, fallback: u8) -> u8 {
    uint_or(obj, key, fallback as u64, u8::MAX as u64) as u8
}

pub fn bool_or(obj: &Object, key: &str, fallback: bool) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(fallback)
}

pub fn string(obj: &Object, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Two-element numeric array (glam's serde layout)
pub fn vec2_or(obj: &Object, key: &str, fallback: Vec2) -> Vec2 {
    let Some(Value::Array(items)) = obj.get(key) else {
        return fallback;
    };
    match items.as_slice() {
        [x, y] => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => {
                let v = Vec2::new(x as f32, y as f32);
                if v.is_finite() { v } else { fallback }
            }
            _ => fallback,
        },
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Object {
        match v {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_readers_fall_back() {
        let o = obj(json!({
            "a": 1.5,
            "b": "nope",
            "c": null,
            "d": -3,
            "e": 1e300,
            "v": [1.0, 2.0],
            "w": [1.0],
        }));
        assert_eq!(f32_or(&o, "a", 0.0), 1.5);
        assert_eq!(f32_or(&o, "b", 9.0), 9.0);
        assert_eq!(f32_or(&o, "c", 9.0), 9.0);
        assert_eq!(f32_or(&o, "e", 9.0), 9.0, "overflows f32");
        assert_eq!(u32_or(&o, "d", 7), 7);
        assert_eq!(u32_or(&o, "a", 7), 1);
        assert_eq!(vec2_or(&o, "v", Vec2::ZERO), Vec2::new(1.0, 2.0));
        assert_eq!(vec2_or(&o, "w", Vec2::ZERO), Vec2::ZERO);
        assert_eq!(string(&o, "b").as_deref(), Some("nope"));
        assert!(!bool_or(&o, "missing", false));
    }
}
