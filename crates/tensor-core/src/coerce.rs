// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Pairwise conversion rules between element kinds.
//!
//! Every `(from, to)` pair is classified by [`conversion`], an exhaustive
//! match over the closed set of kinds, so no pair can fall through to an
//! unchecked copy. The rules:
//!
//! | From → To                 | Rule                                                        |
//! |---------------------------|-------------------------------------------------------------|
//! | same kind                 | identity                                                    |
//! | `Bool` → numeric          | `true` → 1, `false` → 0                                     |
//! | numeric → `Bool`          | nonzero → `true` (negatives and NaN are nonzero), 0 and -0.0 → `false` |
//! | `Int8` ↔ `UInt8`          | bit reinterpretation (-128 ↔ 128, -1 ↔ 255)                  |
//! | `UInt8` → wider           | zero extension: the byte is read as 0..=255, never sign-extended |
//! | integer → narrower int    | two's-complement wrap to the target width                   |
//! | float → `Int32`/`Int64`   | truncation toward zero, saturating at the bounds, NaN → 0   |
//! | float → `Int8`/`UInt8`    | truncation toward zero to `Int32`, then wrap to 8 bits      |
//! | any → float               | nearest representable value                                 |
//! | non-text → `Text`         | canonical decimal: integers plain, floats shortest round-trip with a `.` (`1.0`) |
//! | `Text` → non-text         | parsed with the same grammar; malformed input is a [`TensorError::Coercion`] |
//! | `Text` → `Bool`           | `"true"` / `"false"`, ASCII case-insensitive                 |

use crate::{BufferData, Element, ElementKind, FlatBuffer, Scalar, TensorError};

/// The class of conversion applied for a `(from, to)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same kind; the value is returned unchanged.
    Identity,
    /// Every source value is exactly representable in the target.
    Widen,
    /// Values may be truncated, wrapped or rounded.
    Narrow,
    /// Same bits, different signedness (`Int8` ↔ `UInt8`).
    Reinterpret,
    /// Numeric → `Bool` (nonzero test).
    Truthiness,
    /// Non-text → `Text` (canonical rendering).
    Render,
    /// `Text` → non-text (parsing; may fail).
    Parse,
}

impl Conversion {
    /// Returns `true` if the conversion never changes the value it represents.
    pub fn is_value_preserving(self) -> bool {
        matches!(
            self,
            Conversion::Identity | Conversion::Widen | Conversion::Render
        )
    }
}

/// Classifies the conversion from `from` to `to`.
pub fn conversion(from: ElementKind, to: ElementKind) -> Conversion {
    use ElementKind::*;
    match (from, to) {
        (Bool, Bool)
        | (Int8, Int8)
        | (UInt8, UInt8)
        | (Int32, Int32)
        | (Int64, Int64)
        | (Float32, Float32)
        | (Float64, Float64)
        | (Text, Text) => Conversion::Identity,
        (Text, _) => Conversion::Parse,
        (_, Text) => Conversion::Render,
        (_, Bool) => Conversion::Truthiness,
        (Bool, _) => Conversion::Widen,
        (Int8, UInt8) | (UInt8, Int8) => Conversion::Reinterpret,
        (Int8 | UInt8, Int32 | Int64 | Float32 | Float64) => Conversion::Widen,
        (Int32, Int64 | Float64) => Conversion::Widen,
        (Float32, Float64) => Conversion::Widen,
        (Int32 | Int64 | Float32 | Float64, Int8 | UInt8) => Conversion::Narrow,
        (Int32, Float32) => Conversion::Narrow,
        (Int64, Int32 | Float32 | Float64) => Conversion::Narrow,
        (Float32, Int32 | Int64) => Conversion::Narrow,
        (Float64, Int32 | Int64 | Float32) => Conversion::Narrow,
    }
}

/// Intermediate numeric form. Every non-text kind widens into it without loss.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(value: &Scalar) -> Option<Num> {
        match *value {
            Scalar::Bool(b) => Some(Num::Int(i64::from(b))),
            Scalar::Int8(v) => Some(Num::Int(i64::from(v))),
            // Zero extension: the unsigned byte is read as 0..=255.
            Scalar::UInt8(v) => Some(Num::Int(i64::from(v))),
            Scalar::Int32(v) => Some(Num::Int(i64::from(v))),
            Scalar::Int64(v) => Some(Num::Int(v)),
            Scalar::Float32(v) => Some(Num::Float(f64::from(v))),
            Scalar::Float64(v) => Some(Num::Float(v)),
            Scalar::Text(_) => None,
        }
    }

    fn is_nonzero(self) -> bool {
        match self {
            Num::Int(i) => i != 0,
            // NaN compares unequal to zero and is therefore `true`.
            Num::Float(f) => f != 0.0,
        }
    }

    fn to_i32(self) -> i32 {
        match self {
            Num::Int(i) => i as i32,
            Num::Float(f) => f as i32,
        }
    }

    fn to_i64(self) -> i64 {
        match self {
            Num::Int(i) => i,
            Num::Float(f) => f as i64,
        }
    }

    fn to_f32(self) -> f32 {
        match self {
            Num::Int(i) => i as f32,
            Num::Float(f) => f as f32,
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    fn into_kind(self, to: ElementKind) -> Option<Scalar> {
        let scalar = match to {
            ElementKind::Bool => Scalar::Bool(self.is_nonzero()),
            ElementKind::Int8 => Scalar::Int8(self.to_i32() as i8),
            ElementKind::UInt8 => Scalar::UInt8(self.to_i32() as u8),
            ElementKind::Int32 => Scalar::Int32(self.to_i32()),
            ElementKind::Int64 => Scalar::Int64(self.to_i64()),
            ElementKind::Float32 => Scalar::Float32(self.to_f32()),
            ElementKind::Float64 => Scalar::Float64(self.to_f64()),
            ElementKind::Text => return None,
        };
        Some(scalar)
    }
}

/// Converts `value` to the kind `to`.
///
/// # Examples
/// ```
/// use tensor_core::{coerce::coerce, ElementKind, Scalar};
///
/// // -128 stored as a signed byte is the unsigned byte 128.
/// let byte = coerce(&Scalar::Int8(-128), ElementKind::UInt8).unwrap();
/// assert_eq!(coerce(&byte, ElementKind::Int32).unwrap(), Scalar::Int32(128));
///
/// // Narrowing truncates toward zero.
/// assert_eq!(coerce(&Scalar::Float64(-1.9), ElementKind::Int32).unwrap(), Scalar::Int32(-1));
/// ```
pub fn coerce(value: &Scalar, to: ElementKind) -> Result<Scalar, TensorError> {
    let from = value.kind();
    match conversion(from, to) {
        Conversion::Identity => Ok(value.clone()),
        Conversion::Render => Ok(Scalar::Text(render(value))),
        Conversion::Parse => match value {
            Scalar::Text(text) => parse(text, to),
            other => Err(TensorError::coercion(from, to, render(other), "not a text value")),
        },
        Conversion::Widen
        | Conversion::Narrow
        | Conversion::Reinterpret
        | Conversion::Truthiness => Num::of(value)
            .and_then(|n| n.into_kind(to))
            .ok_or_else(|| TensorError::coercion(from, to, render(value), "no numeric conversion path")),
    }
}

/// Converts `value` into the native type `T`.
pub fn extract<T: Element>(value: &Scalar) -> Result<T, TensorError> {
    let converted = coerce(value, T::KIND)?;
    T::from_scalar(converted).ok_or_else(|| {
        TensorError::coercion(
            value.kind(),
            T::KIND,
            render(value),
            "conversion produced a different kind",
        )
    })
}

/// Renders a value in its canonical, locale-independent text form.
///
/// Integers render without a fraction (`"1"`); floats render as the
/// shortest decimal that parses back to the same value, always with a `.`
/// or exponent (`"1.0"`, `"0.1"`, `"1e-7"`).
pub fn render(value: &Scalar) -> String {
    match value {
        Scalar::Bool(b) => b.to_string(),
        Scalar::Int8(v) => v.to_string(),
        Scalar::UInt8(v) => v.to_string(),
        Scalar::Int32(v) => v.to_string(),
        Scalar::Int64(v) => v.to_string(),
        Scalar::Float32(v) => format!("{v:?}"),
        Scalar::Float64(v) => format!("{v:?}"),
        Scalar::Text(s) => s.clone(),
    }
}

/// Parses `text` as a value of kind `to`.
pub fn parse(text: &str, to: ElementKind) -> Result<Scalar, TensorError> {
    let fail = |reason: String| TensorError::coercion(ElementKind::Text, to, text, reason);
    match to {
        ElementKind::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Ok(Scalar::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(Scalar::Bool(false))
            } else {
                Err(fail("expected \"true\" or \"false\"".into()))
            }
        }
        ElementKind::Int8 => text
            .parse()
            .map(Scalar::Int8)
            .map_err(|e| fail(e.to_string())),
        ElementKind::UInt8 => text
            .parse()
            .map(Scalar::UInt8)
            .map_err(|e| fail(e.to_string())),
        ElementKind::Int32 => text
            .parse()
            .map(Scalar::Int32)
            .map_err(|e| fail(e.to_string())),
        ElementKind::Int64 => text
            .parse()
            .map(Scalar::Int64)
            .map_err(|e| fail(e.to_string())),
        ElementKind::Float32 => text
            .parse()
            .map(Scalar::Float32)
            .map_err(|e| fail(e.to_string())),
        ElementKind::Float64 => text
            .parse()
            .map(Scalar::Float64)
            .map_err(|e| fail(e.to_string())),
        ElementKind::Text => Ok(Scalar::Text(text.to_owned())),
    }
}

/// Converts every element of `buffer` to `to`, keeping its shape.
///
/// Returns a clone when the buffer already has kind `to`.
pub fn coerce_buffer(buffer: &FlatBuffer, to: ElementKind) -> Result<FlatBuffer, TensorError> {
    if buffer.kind() == to {
        return Ok(buffer.clone());
    }
    let mut data = BufferData::with_capacity(to, buffer.len());
    for value in buffer.scalars() {
        data.push(coerce(&value?, to)?)?;
    }
    FlatBuffer::new(buffer.shape().clone(), data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    fn sample(kind: ElementKind) -> Scalar {
        match kind {
            ElementKind::Bool => Scalar::Bool(true),
            ElementKind::Int8 => Scalar::Int8(1),
            ElementKind::UInt8 => Scalar::UInt8(1),
            ElementKind::Int32 => Scalar::Int32(1),
            ElementKind::Int64 => Scalar::Int64(1),
            ElementKind::Float32 => Scalar::Float32(1.0),
            ElementKind::Float64 => Scalar::Float64(1.0),
            ElementKind::Text => Scalar::Text("1".into()),
        }
    }

    #[test]
    fn test_every_pair_is_defined() {
        for from in ElementKind::ALL {
            for to in ElementKind::ALL {
                let result = coerce(&sample(from), to);
                if from == ElementKind::Text && to == ElementKind::Bool {
                    assert!(result.is_err(), "\"1\" is not a boolean literal");
                } else {
                    let value = result.unwrap();
                    assert_eq!(value.kind(), to, "{from} -> {to}");
                }
            }
        }
    }

    #[test]
    fn test_identity() {
        for kind in ElementKind::ALL {
            assert_eq!(conversion(kind, kind), Conversion::Identity);
            assert_eq!(coerce(&sample(kind), kind).unwrap(), sample(kind));
        }
    }

    #[test]
    fn test_unsigned_byte_reinterpretation() {
        let b = coerce(&Scalar::Int8(-128), ElementKind::UInt8).unwrap();
        assert_eq!(b, Scalar::UInt8(128));
        assert_eq!(coerce(&b, ElementKind::Int32).unwrap(), Scalar::Int32(128));

        let b = coerce(&Scalar::Int8(-1), ElementKind::UInt8).unwrap();
        assert_eq!(b, Scalar::UInt8(255));
        assert_eq!(coerce(&b, ElementKind::Int32).unwrap(), Scalar::Int32(255));

        // Signed bytes still sign-extend.
        assert_eq!(
            coerce(&Scalar::Int8(-128), ElementKind::Int32).unwrap(),
            Scalar::Int32(-128)
        );
    }

    #[test]
    fn test_unsigned_byte_full_range() {
        for v in 0u8..=255 {
            let unsigned = Scalar::UInt8(v);
            assert_eq!(unsigned.to::<i32>().unwrap(), i32::from(v));
            assert_eq!(unsigned.to::<i64>().unwrap(), i64::from(v));
            assert_eq!(unsigned.to::<f32>().unwrap(), f32::from(v));
            assert_eq!(unsigned.to::<f64>().unwrap(), f64::from(v));
            assert_eq!(unsigned.to::<String>().unwrap(), v.to_string());
            assert_eq!(Scalar::Int32(i32::from(v)).to::<u8>().unwrap(), v);
            assert_eq!(unsigned.to::<i8>().unwrap(), v as i8);
        }
    }

    #[test]
    fn test_byte_overflow_wrap() {
        // 127 + 1 in signed storage is -128, which is the unsigned value 128.
        let signed = Scalar::Int8(127i8.wrapping_add(1));
        assert_eq!(signed, Scalar::Int8(-128));
        assert_eq!(signed.to::<u8>().unwrap(), 128);
        // Integers beyond 0..=255 wrap modulo 256 into UInt8.
        assert_eq!(Scalar::Int32(256).to::<u8>().unwrap(), 0);
        assert_eq!(Scalar::Int32(300).to::<u8>().unwrap(), 44);
        assert_eq!(Scalar::Int32(-1).to::<u8>().unwrap(), 255);
        assert_eq!(Scalar::Int64(255 + 1).to::<u8>().unwrap(), 0);
    }

    #[test]
    fn test_narrowing_truncation() {
        assert_eq!(Scalar::Float64(1.9).to::<i32>().unwrap(), 1);
        assert_eq!(Scalar::Float64(-1.9).to::<i32>().unwrap(), -1);
        assert_eq!(Scalar::Float32(1.9).to::<i64>().unwrap(), 1);
        assert_eq!(Scalar::Float64(-1.9).to::<i8>().unwrap(), -1);
        assert_eq!(Scalar::Float64(254.99).to::<u8>().unwrap(), 254);
    }

    #[test]
    fn test_out_of_range_float_to_int() {
        assert_eq!(Scalar::Float64(3.0e10).to::<i32>().unwrap(), i32::MAX);
        assert_eq!(Scalar::Float64(-3.0e10).to::<i32>().unwrap(), i32::MIN);
        assert_eq!(Scalar::Float64(f64::NAN).to::<i64>().unwrap(), 0);
        // 8-bit targets wrap after truncating to Int32.
        assert_eq!(Scalar::Float64(300.7).to::<u8>().unwrap(), 44);
    }

    #[test]
    fn test_integer_narrowing_wraps() {
        assert_eq!(Scalar::Int64((1 << 32) + 5).to::<i32>().unwrap(), 5);
        assert_eq!(Scalar::Int32(200).to::<i8>().unwrap(), -56);
    }

    #[test]
    fn test_numeric_to_bool() {
        assert!(!Scalar::Int32(0).to::<bool>().unwrap());
        assert!(Scalar::Int32(-1).to::<bool>().unwrap());
        assert!(Scalar::Int8(-128).to::<bool>().unwrap());
        assert!(!Scalar::Float64(0.0).to::<bool>().unwrap());
        assert!(!Scalar::Float64(-0.0).to::<bool>().unwrap());
        assert!(Scalar::Float64(f64::NAN).to::<bool>().unwrap());
        assert!(Scalar::Float64(5e-324).to::<bool>().unwrap());
        assert!(Scalar::Float32(-0.5).to::<bool>().unwrap());
    }

    #[test]
    fn test_bool_to_numeric() {
        assert_eq!(Scalar::Bool(true).to::<u8>().unwrap(), 1);
        assert_eq!(Scalar::Bool(true).to::<i64>().unwrap(), 1);
        assert_eq!(Scalar::Bool(false).to::<f64>().unwrap(), 0.0);
        assert_eq!(Scalar::Bool(true).to::<String>().unwrap(), "true");
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&Scalar::Float64(1.0)), "1.0");
        assert_eq!(render(&Scalar::Float32(1.0)), "1.0");
        assert_eq!(render(&Scalar::Float32(0.1)), "0.1");
        assert_eq!(render(&Scalar::Int64(1)), "1");
        assert_eq!(render(&Scalar::UInt8(200)), "200");
        assert_eq!(render(&Scalar::Int8(-5)), "-5");
    }

    #[test]
    fn test_render_parse_roundtrip_floats() {
        for v in [0.1 + 0.2, 1e-7, 1e300, -2.5, f64::MAX] {
            let text = render(&Scalar::Float64(v));
            assert_eq!(parse(&text, ElementKind::Float64).unwrap(), Scalar::Float64(v));
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("1", ElementKind::Int32).unwrap(), Scalar::Int32(1));
        assert_eq!(parse("1.0", ElementKind::Float64).unwrap(), Scalar::Float64(1.0));
        assert_eq!(parse("-128", ElementKind::Int8).unwrap(), Scalar::Int8(-128));
        assert_eq!(parse("255", ElementKind::UInt8).unwrap(), Scalar::UInt8(255));
        assert_eq!(parse("TRUE", ElementKind::Bool).unwrap(), Scalar::Bool(true));
        assert_eq!(parse("false", ElementKind::Bool).unwrap(), Scalar::Bool(false));
    }

    #[test]
    fn test_parse_malformed() {
        let err = parse("1.0", ElementKind::Int32).unwrap_err();
        match err {
            TensorError::Coercion { from, to, value, .. } => {
                assert_eq!(from, ElementKind::Text);
                assert_eq!(to, ElementKind::Int32);
                assert_eq!(value, "1.0");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse("yes", ElementKind::Bool).is_err());
        assert!(parse("256", ElementKind::UInt8).is_err());
        assert!(parse("-1", ElementKind::UInt8).is_err());
        assert!(parse("", ElementKind::Float32).is_err());
    }

    #[test]
    fn test_conversion_classes() {
        use ElementKind::*;
        assert_eq!(conversion(Int8, UInt8), Conversion::Reinterpret);
        assert_eq!(conversion(UInt8, Int32), Conversion::Widen);
        assert_eq!(conversion(Float64, Int32), Conversion::Narrow);
        assert_eq!(conversion(Int32, Float32), Conversion::Narrow);
        assert_eq!(conversion(Int64, Bool), Conversion::Truthiness);
        assert_eq!(conversion(Bool, Text), Conversion::Render);
        assert_eq!(conversion(Text, Bool), Conversion::Parse);
        assert!(conversion(Int32, Int64).is_value_preserving());
        assert!(!conversion(Int64, Int32).is_value_preserving());
    }

    #[test]
    fn test_coerce_buffer() {
        let b = FlatBuffer::from_vec(Shape::vector(3), vec![1.5f64, -2.5, 0.0]).unwrap();
        let i = coerce_buffer(&b, ElementKind::Int32).unwrap();
        assert_eq!(i.shape(), b.shape());
        assert_eq!(i.as_i32_slice(), Some(&[1, -2, 0][..]));

        let t = coerce_buffer(&b, ElementKind::Text).unwrap();
        assert_eq!(t.kind(), ElementKind::Text);
        assert_eq!(t.to_scalars().unwrap()[1], Scalar::Text("-2.5".into()));
    }

    #[test]
    fn test_coerce_buffer_failure_carries_value() {
        let b = FlatBuffer::from_vec(Shape::vector(2), vec!["1".to_string(), "x".to_string()]).unwrap();
        let err = coerce_buffer(&b, ElementKind::Int64).unwrap_err();
        assert!(matches!(err, TensorError::Coercion { ref value, .. } if value == "x"));
    }
}
