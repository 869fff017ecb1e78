//! Primitive codec: conversion between text and typed scalar values.
//!
//! A [`Value`] knows how to parse itself from attribute or element text, how
//! to render its canonical text form, and how to check schema constraints
//! (ranges, patterns) after a successful conversion. Conversion and
//! validation failures are plain `None`/`false` results; the marshal layer
//! turns them into [`XmlError::InvalidValue`].
//!
//! Constrained types are declared with three macros:
//!
//! ```rust
//! use limiquantix_virtxml::{pattern_value, ranged_value, xml_enum};
//!
//! ranged_value! {
//!     /// Port with the `-1` auto sentinel.
//!     pub struct Port(i32) in -1..=65535;
//! }
//!
//! pattern_value! {
//!     pub struct HexByte = r"0x[0-9a-fA-F]{1,2}";
//! }
//!
//! xml_enum! {
//!     pub enum Toggle {
//!         On = "on",
//!         Off = "off",
//!     }
//! }
//! ```

use chrono::{DateTime, NaiveDateTime, TimeZone, Timelike, Utc};
use regex::Regex;
use serde::Serialize;

use crate::error::{Result, XmlError};

/// A scalar leaf value carried by an attribute or by element text.
pub trait Value: Sized + Clone {
    /// Schema name of the type, used in error messages.
    const KIND: &'static str;

    /// Convert text into a value. Returns `None` when conversion fails.
    fn parse_text(text: &str) -> Option<Self>;

    /// Canonical text form.
    fn to_text(&self) -> String;

    /// Post-conversion constraint check.
    fn validate(&self) -> bool {
        true
    }
}

/// Parse and validate text.
pub fn decode<T: Value>(text: &str) -> Result<T> {
    match T::parse_text(text) {
        Some(value) if value.validate() => Ok(value),
        _ => Err(XmlError::InvalidValue {
            kind: T::KIND,
            value: text.to_string(),
        }),
    }
}

/// Validate and render a value.
pub fn encode<T: Value>(value: &T) -> Result<String> {
    if value.validate() {
        Ok(value.to_text())
    } else {
        Err(XmlError::InvalidValue {
            kind: T::KIND,
            value: value.to_text(),
        })
    }
}

/// Compile a pattern with exact-match semantics.
///
/// Returns `None` for an invalid pattern; values of such a type never validate.
#[doc(hidden)]
pub fn anchored(pattern: &str) -> Option<Regex> {
    match Regex::new(&format!("^(?:{})$", pattern)) {
        Ok(regex) => Some(regex),
        Err(e) => {
            tracing::error!(pattern = %pattern, error = %e, "Invalid value pattern");
            None
        }
    }
}

// =============================================================================
// BUILT-IN VALUES
// =============================================================================

impl Value for String {
    const KIND: &'static str = "string";

    fn parse_text(text: &str) -> Option<Self> {
        Some(text.to_string())
    }

    fn to_text(&self) -> String {
        self.clone()
    }
}

macro_rules! numeric_value {
    ($($ty:ty => $kind:literal),+ $(,)?) => {$(
        impl Value for $ty {
            const KIND: &'static str = $kind;

            fn parse_text(text: &str) -> Option<Self> {
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                text.parse().ok()
            }

            fn to_text(&self) -> String {
                self.to_string()
            }
        }
    )+};
}

numeric_value! {
    u8 => "unsignedByte",
    u16 => "unsignedShort",
    u32 => "unsignedInt",
    u64 => "unsignedLong",
    i8 => "byte",
    i16 => "short",
    i32 => "int",
    i64 => "long",
}

impl Value for f64 {
    const KIND: &'static str = "double";

    fn parse_text(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        text.parse().ok()
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn validate(&self) -> bool {
        self.is_finite()
    }
}

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

impl Value for NaiveDateTime {
    const KIND: &'static str = "dateTime";

    fn parse_text(text: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(text.trim(), "%Y-%m-%dT%H:%M:%S%.f").ok()
    }

    fn to_text(&self) -> String {
        let mut text = self.format(DATE_TIME_FORMAT).to_string();
        if self.nanosecond() != 0 {
            text.push_str(&self.format("%.f").to_string());
        }
        text
    }
}

/// Point in time written as whole seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnixTime(pub DateTime<Utc>);

impl UnixTime {
    /// Build from seconds since the epoch.
    pub fn from_secs(secs: i64) -> Option<Self> {
        Utc.timestamp_opt(secs, 0).single().map(Self)
    }

    /// Seconds since the epoch.
    pub fn secs(&self) -> i64 {
        self.0.timestamp()
    }
}

impl Default for UnixTime {
    fn default() -> Self {
        Self(DateTime::<Utc>::from(std::time::UNIX_EPOCH))
    }
}

impl Value for UnixTime {
    const KIND: &'static str = "unixTime";

    fn parse_text(text: &str) -> Option<Self> {
        i64::parse_text(text).and_then(Self::from_secs)
    }

    fn to_text(&self) -> String {
        self.secs().to_string()
    }
}

// =============================================================================
// DECLARATION MACROS
// =============================================================================

/// Declare an integer newtype constrained to an inclusive range.
///
/// The bounds are part of the schema and are kept verbatim.
#[macro_export]
macro_rules! ranged_value {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident($inner:ty) in $min:literal ..= $max:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $name($inner);

        impl $name {
            /// Smallest accepted value.
            pub const MIN: $inner = $min;
            /// Largest accepted value.
            pub const MAX: $inner = $max;

            /// Wrap a value if it lies within the range.
            pub fn new(value: $inner) -> Option<Self> {
                if (Self::MIN..=Self::MAX).contains(&value) {
                    Some(Self(value))
                } else {
                    None
                }
            }

            /// The wrapped value.
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self(Self::MIN)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.0, f)
            }
        }

        impl $crate::primitive::Value for $name {
            const KIND: &'static str = stringify!($name);

            fn parse_text(text: &str) -> Option<Self> {
                <$inner as $crate::primitive::Value>::parse_text(text).map(Self)
            }

            fn to_text(&self) -> String {
                self.0.to_string()
            }

            fn validate(&self) -> bool {
                (Self::MIN..=Self::MAX).contains(&self.0)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                $crate::__private::serde::Serialize::serialize(&self.0, serializer)
            }
        }
    };
}

/// Declare a string newtype validated by an exact-match regular expression.
#[macro_export]
macro_rules! pattern_value {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident = $pattern:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        $vis struct $name(String);

        impl $name {
            /// The unanchored pattern; matching is always against the whole text.
            pub const PATTERN: &'static str = $pattern;

            /// Wrap a string if it matches the pattern.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let value = Self(value.into());
                if $crate::primitive::Value::validate(&value) {
                    Some(value)
                } else {
                    None
                }
            }

            /// The wrapped text.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            fn regex() -> Option<&'static $crate::__private::Regex> {
                static REGEX: $crate::__private::Lazy<Option<$crate::__private::Regex>> =
                    $crate::__private::Lazy::new(|| $crate::primitive::anchored($pattern));
                REGEX.as_ref()
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl $crate::primitive::Value for $name {
            const KIND: &'static str = stringify!($name);

            fn parse_text(text: &str) -> Option<Self> {
                Some(Self(text.trim().to_string()))
            }

            fn to_text(&self) -> String {
                self.0.clone()
            }

            fn validate(&self) -> bool {
                Self::regex().map_or(false, |regex| regex.is_match(&self.0))
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }
    };
}

/// Declare a closed enumeration with its canonical XML spelling.
///
/// The first variant is the default.
#[macro_export]
macro_rules! xml_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The XML spelling.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ALL[0]
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::primitive::Value for $name {
            const KIND: &'static str = stringify!($name);

            fn parse_text(text: &str) -> Option<Self> {
                match text.trim() {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }

            fn to_text(&self) -> String {
                self.as_str().to_string()
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}
