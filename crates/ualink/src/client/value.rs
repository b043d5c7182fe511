// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Typed values exchanged with the protocol stack.
//!
//! The capability surface is text only. [`UaValue`] is the typed form a
//! stack reads and writes, plus the coercion from caller text into the type
//! a variable already holds.

use std::fmt;

use crate::error::{ConversionError, UaError, UaResult};
use crate::types::TypeTag;

// =============================================================================
// UaValue
// =============================================================================

/// A variable value as seen by the protocol stack.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UaValue {
    /// Boolean value.
    Boolean(bool),

    /// 16-bit signed integer.
    Int16(i16),

    /// 32-bit signed integer.
    Int32(i32),

    /// 64-bit signed integer.
    Int64(i64),

    /// 16-bit unsigned integer.
    UInt16(u16),

    /// 32-bit unsigned integer.
    UInt32(u32),

    /// 32-bit float.
    Float(f32),

    /// 64-bit double.
    Double(f64),

    /// String value.
    String(String),

    /// A runtime type this adapter does not render. Carries the type name.
    Other(String),

    /// No value present.
    #[default]
    Empty,
}

impl UaValue {
    /// Returns the type tag reported for this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Self::Boolean(_) => TypeTag::Boolean,
            Self::Int16(_) => TypeTag::Int16,
            Self::Int32(_) => TypeTag::Int32,
            Self::Int64(_) => TypeTag::Int64,
            Self::UInt16(_) => TypeTag::UInt16,
            Self::UInt32(_) => TypeTag::UInt32,
            Self::Float(_) => TypeTag::Float,
            Self::Double(_) => TypeTag::Double,
            Self::String(_) => TypeTag::String,
            Self::Other(_) => TypeTag::Other,
            Self::Empty => TypeTag::Missing,
        }
    }

    /// Returns `true` when the value has a renderable scalar type.
    #[inline]
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Other(_) | Self::Empty)
    }

    /// Renders the value as text. `None` for unsupported or empty values.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Boolean(v) => Some(v.to_string()),
            Self::Int16(v) => Some(v.to_string()),
            Self::Int32(v) => Some(v.to_string()),
            Self::Int64(v) => Some(v.to_string()),
            Self::UInt16(v) => Some(v.to_string()),
            Self::UInt32(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Double(v) => Some(v.to_string()),
            Self::String(v) => Some(v.clone()),
            Self::Other(_) | Self::Empty => None,
        }
    }

    /// Coerces caller text into a value of the given type.
    ///
    /// Tags without a concrete type (`Other`, `-`) produce a `String`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConversionError`] when `text` does not parse as `tag` or
    /// does not fit its range.
    ///
    /// # Examples
    ///
    /// ```
    /// use ualink::client::UaValue;
    /// use ualink::types::TypeTag;
    ///
    /// assert_eq!(UaValue::parse_as(TypeTag::Int32, "17").unwrap(), UaValue::Int32(17));
    /// assert!(UaValue::parse_as(TypeTag::Int32, "abc").is_err());
    /// ```
    pub fn parse_as(tag: TypeTag, text: &str) -> UaResult<Self> {
        match tag {
            TypeTag::Boolean => parse_bool(text).map(Self::Boolean),
            TypeTag::Int16 => parse_int(text, tag).map(Self::Int16),
            TypeTag::Int32 => parse_int(text, tag).map(Self::Int32),
            TypeTag::Int64 => parse_int(text, tag).map(Self::Int64),
            TypeTag::UInt16 => parse_int(text, tag).map(Self::UInt16),
            TypeTag::UInt32 => parse_int(text, tag).map(Self::UInt32),
            TypeTag::Float => {
                let v = parse_float(text, tag)?;
                let narrowed = v as f32;
                if v.is_finite() && narrowed.is_infinite() {
                    return Err(UaError::conversion(ConversionError::overflow(text, tag.as_str())));
                }
                Ok(Self::Float(narrowed))
            }
            TypeTag::Double => parse_float(text, tag).map(Self::Double),
            TypeTag::String | TypeTag::Other | TypeTag::Missing => {
                Ok(Self::String(text.to_string()))
            }
        }
    }
}

impl fmt::Display for UaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(type_name) => write!(f, "<{}>", type_name),
            Self::Empty => write!(f, "<empty>"),
            other => match other.to_text() {
                Some(text) => f.write_str(&text),
                None => Ok(()),
            },
        }
    }
}

impl From<bool> for UaValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for UaValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<f64> for UaValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for UaValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for UaValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

// =============================================================================
// Text Parsing
// =============================================================================

fn parse_bool(text: &str) -> UaResult<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        Ok(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        Ok(false)
    } else {
        Err(UaError::conversion(ConversionError::invalid_value(
            TypeTag::Boolean.as_str(),
            text,
        )))
    }
}

fn parse_int<T>(text: &str, tag: TypeTag) -> UaResult<T>
where
    T: TryFrom<i128>,
{
    let wide: i128 = text.trim().parse().map_err(|_| {
        UaError::conversion(ConversionError::invalid_value(tag.as_str(), text))
    })?;
    T::try_from(wide)
        .map_err(|_| UaError::conversion(ConversionError::overflow(text, tag.as_str())))
}

fn parse_float(text: &str, tag: TypeTag) -> UaResult<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| UaError::conversion(ConversionError::invalid_value(tag.as_str(), text)))
}

// =============================================================================
// Tests
// =============================================================================
