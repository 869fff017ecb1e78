//! Variant encoder: tagged unions resolved by first successful parse.
//!
//! Candidates are always tried in declaration order and the first one that
//! parses and validates becomes the active variant, even when a later
//! candidate would also match. Generation dispatches on the active variant.
//!
//! Two flavours exist:
//!
//! - [`value_choice!`](crate::value_choice) over [`Value`](crate::primitive::Value)
//!   candidates, for attribute or element text;
//! - [`element_choice!`](crate::element_choice) over
//!   [`Schema`](crate::node::Schema) candidates. A candidate is either a
//!   group read from the current element (`Variant(Type)`) or a child element
//!   with a given tag (`Variant(Type) = "tag"`).

use tracing::trace;

use crate::error::{Result, XmlError};
use crate::marshal::{Consume, Produce};

/// Descriptor of one alternative of a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alternative {
    /// Variant name.
    pub name: &'static str,
    /// Tag of the child element, for element alternatives.
    pub tag: Option<&'static str>,
    /// Rust type of the alternative.
    pub type_name: &'static str,
}

/// A sum type over schema alternatives.
pub trait Choice: Sized + Clone + Default {
    /// Name used in error messages.
    const NAME: &'static str;

    /// Alternatives in declaration order.
    fn alternatives() -> Vec<Alternative>;

    /// Index of the active alternative.
    fn tag(&self) -> usize;

    /// Read the first alternative that matches at the cursor.
    fn consume_choice(c: &mut Consume<'_>) -> Result<Self>;

    /// Write the active alternative.
    fn produce_choice(&self, p: &mut Produce<'_>) -> Result<()>;
}

/// Record a rejected alternative.
#[doc(hidden)]
pub fn rejected(choice: &'static str, alternative: &'static str, error: &XmlError) {
    trace!(choice, alternative, error = %error, "Choice alternative rejected");
}

/// Declare a sum type over text values, resolved by first match.
#[macro_export]
macro_rules! value_choice {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident($ty:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $($(#[$vmeta])* $variant($ty)),+
        }

        impl $name {
            /// Candidate names in declaration order.
            pub const CANDIDATES: &'static [&'static str] = &[$(stringify!($variant)),+];

            /// Index of the active candidate.
            #[allow(unused_assignments)]
            pub fn tag(&self) -> usize {
                let mut index = 0usize;
                $(
                    if let Self::$variant(_) = self {
                        return index;
                    }
                    index += 1;
                )+
                index
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $crate::__first_variant_default!($($variant($ty)),+)
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(&$crate::primitive::Value::to_text(self))
            }
        }

        impl $crate::primitive::Value for $name {
            const KIND: &'static str = stringify!($name);

            fn parse_text(text: &str) -> Option<Self> {
                $(
                    if let Ok(value) = $crate::primitive::decode::<$ty>(text) {
                        return Some(Self::$variant(value));
                    }
                )+
                None
            }

            fn to_text(&self) -> String {
                match self {
                    $(Self::$variant(value) => $crate::primitive::Value::to_text(value)),+
                }
            }

            fn validate(&self) -> bool {
                match self {
                    $(Self::$variant(value) => $crate::primitive::Value::validate(value)),+
                }
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                match self {
                    $(Self::$variant(value) => $crate::__private::serde::Serialize::serialize(value, serializer)),+
                }
            }
        }
    };
}

/// Declare a sum type over schema groups or tagged elements, resolved by
/// first match.
#[macro_export]
macro_rules! element_choice {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident($ty:ty) $(= $tag:literal)?),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        $vis enum $name {
            $($(#[$vmeta])* $variant($ty)),+
        }

        impl Default for $name {
            fn default() -> Self {
                $crate::__first_variant_default!($($variant($ty)),+)
            }
        }

        impl $crate::variant::Choice for $name {
            const NAME: &'static str = stringify!($name);

            fn alternatives() -> Vec<$crate::variant::Alternative> {
                vec![$(
                    $crate::variant::Alternative {
                        name: stringify!($variant),
                        tag: $crate::__choice_alternative!(tag $($tag)?),
                        type_name: stringify!($ty),
                    }
                ),+]
            }

            #[allow(unused_assignments)]
            fn tag(&self) -> usize {
                let mut index = 0usize;
                $(
                    if let Self::$variant(_) = self {
                        return index;
                    }
                    index += 1;
                )+
                index
            }

            fn consume_choice(
                c: &mut $crate::marshal::Consume<'_>,
            ) -> $crate::error::Result<Self> {
                $(
                    match $crate::__choice_alternative!(consume c, $ty $(, $tag)?) {
                        Ok(value) => return Ok(Self::$variant(value)),
                        Err(error) if error.is_fatal() => return Err(error),
                        Err(error) => $crate::variant::rejected(
                            <Self as $crate::variant::Choice>::NAME,
                            stringify!($variant),
                            &error,
                        ),
                    }
                )+
                Err(c.exhausted(<Self as $crate::variant::Choice>::NAME))
            }

            fn produce_choice(
                &self,
                p: &mut $crate::marshal::Produce<'_>,
            ) -> $crate::error::Result<()> {
                match self {
                    $(Self::$variant(value) => $crate::__choice_alternative!(produce p, value $(, $tag)?)),+
                }
            }
        }

        impl $crate::node::Schema for $name {
            fn describe<M: $crate::marshal::Marshal>(
                &mut self,
                m: &mut M,
            ) -> $crate::error::Result<()> {
                m.choice(self)
            }
        }

        impl $crate::__private::serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::serde::Serializer,
            {
                match self {
                    $(Self::$variant(value) => $crate::__private::serde::Serialize::serialize(value, serializer)),+
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __first_variant_default {
    ($variant:ident($ty:ty) $(, $rest:ident($rest_ty:ty))*) => {
        Self::$variant(<$ty as ::std::default::Default>::default())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __choice_alternative {
    (tag) => {
        None
    };
    (tag $tag:literal) => {
        Some($tag)
    };
    (consume $c:ident, $ty:ty) => {
        $c.try_group::<$ty>()
    };
    (consume $c:ident, $ty:ty, $tag:literal) => {
        $c.try_element::<$ty>($tag)
    };
    (produce $p:ident, $value:ident) => {
        $p.group($value)
    };
    (produce $p:ident, $value:ident, $tag:literal) => {
        $p.tagged($tag, $value)
    };
}
