//! Print-style joining of heterogeneous message arguments
//!
//! The logging macros accept any number of operands and join them the way a
//! `print` builtin would: operands are written back to back, and a single
//! space is inserted only between two adjacent operands that are both
//! non-strings.
//!
//! ```
//! use fieldlog::{sprint, Arg, ToArg};
//!
//! let line = sprint(&["took".to_arg(), 5u32.to_arg(), 10u32.to_arg(), "ms".to_arg()]);
//! assert_eq!(line, "took5 10ms");
//! ```

use super::fields::FieldValue;
use std::borrow::Cow;
use std::fmt::{self, Write};

/// A single message operand.
#[derive(Clone, Copy)]
pub enum Arg<'a> {
    Str(&'a str),
    Value(&'a dyn fmt::Display),
}

impl<'a> Arg<'a> {
    /// Wrap any `Display` value as a non-string operand.
    pub fn display(value: &'a dyn fmt::Display) -> Self {
        Arg::Value(value)
    }

    #[inline]
    pub fn is_str(&self) -> bool {
        matches!(self, Arg::Str(_))
    }
}

impl fmt::Display for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(s),
            Arg::Value(v) => v.fmt(f),
        }
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Arg::Value(v) => f.debug_tuple("Value").field(&v.to_string()).finish(),
        }
    }
}

/// Conversion used by the logging macros.
pub trait ToArg {
    fn to_arg(&self) -> Arg<'_>;
}

impl ToArg for str {
    fn to_arg(&self) -> Arg<'_> {
        Arg::Str(self)
    }
}

impl ToArg for String {
    fn to_arg(&self) -> Arg<'_> {
        Arg::Str(self)
    }
}

impl ToArg for Cow<'_, str> {
    fn to_arg(&self) -> Arg<'_> {
        Arg::Str(self)
    }
}

impl ToArg for FieldValue {
    fn to_arg(&self) -> Arg<'_> {
        match self {
            FieldValue::String(s) => Arg::Str(s),
            other => Arg::Value(other),
        }
    }
}

impl<'a> ToArg for Arg<'a> {
    fn to_arg(&self) -> Arg<'_> {
        *self
    }
}

impl<T: ToArg + ?Sized> ToArg for &T {
    fn to_arg(&self) -> Arg<'_> {
        (**self).to_arg()
    }
}

macro_rules! impl_to_arg_display {
    ($($t:ty),*) => {
        $(impl ToArg for $t {
            fn to_arg(&self) -> Arg<'_> {
                Arg::Value(self)
            }
        })*
    };
}

impl_to_arg_display!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char
);

/// Join operands with print semantics.
pub fn sprint(args: &[Arg<'_>]) -> String {
    let mut out = String::new();
    let mut previous_is_str = true;
    for (index, arg) in args.iter().enumerate() {
        if index > 0 && !arg.is_str() && !previous_is_str {
            out.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{}", arg);
        previous_is_str = arg.is_str();
    }
    out
}
