//! Lossy numeric coercion for document values.
//!
//! Every function here is total: a number is read natively if possible,
//! otherwise parsed from its string form, and anything unparseable yields
//! zero. Integers that don't fit the target width saturate.

use toml::Value;

fn parse_wide(s: &str) -> i128 {
    let s = s.trim();
    if let Ok(i) = s.parse::<i128>() {
        return i;
    }
    match s.parse::<f64>() {
        // `as` saturates and maps NaN to zero
        Ok(f) => f.trunc() as i128,
        Err(_) => 0,
    }
}

fn to_wide(value: &Value) -> i128 {
    match value {
        Value::Integer(i) => i128::from(*i),
        Value::Float(f) => f.trunc() as i128,
        Value::String(s) => parse_wide(s),
        _ => 0,
    }
}

macro_rules! integer_coercions {
    ($($ty:ty => $to:ident, $parse:ident;)*) => {
        $(
            #[doc = concat!("Coerces a document value to `", stringify!($ty), "`, zero on failure.")]
            pub fn $to(value: &Value) -> $ty {
                to_wide(value).clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty
            }

            #[doc = concat!("Parses a string as `", stringify!($ty), "`, zero on failure.")]
            pub fn $parse(s: &str) -> $ty {
                parse_wide(s).clamp(<$ty>::MIN as i128, <$ty>::MAX as i128) as $ty
            }
        )*
    };
}

integer_coercions! {
    i8 => to_i8, parse_i8;
    i16 => to_i16, parse_i16;
    i32 => to_i32, parse_i32;
    i64 => to_i64, parse_i64;
    u8 => to_u8, parse_u8;
    u16 => to_u16, parse_u16;
    u32 => to_u32, parse_u32;
    u64 => to_u64, parse_u64;
}

pub fn to_f64(value: &Value) -> f64 {
    match value {
        Value::Integer(i) => *i as f64,
        Value::Float(f) => *f,
        Value::String(s) => parse_f64(s),
        _ => 0.0,
    }
}

pub fn parse_f64(s: &str) -> f64 {
    s.trim().parse::<f64>().unwrap_or(0.0)
}

pub fn to_f32(value: &Value) -> f32 {
    to_f64(value) as f32
}

pub fn parse_f32(s: &str) -> f32 {
    parse_f64(s) as f32
}

/// Returns `true` if the value is a number or a string holding one.
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Integer(_) | Value::Float(_) => true,
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i128>().is_ok() || s.parse::<f64>().is_ok()
        }
        _ => false,
    }
}
