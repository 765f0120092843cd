//! Formatter trait and the fixed field keys shared by formatters

use super::entry::Entry;
use super::error::{LoggerError, Result};
use super::fields::{FieldValue, Fields};
use std::borrow::Cow;
use std::collections::HashMap;

/// Renders an entry into bytes.
///
/// Implementations append one complete record, including its terminator, to
/// `buf`. The buffer may come from a pool and must not be assumed empty.
pub trait Formatter: Send + Sync {
    fn format(&self, entry: &Entry, buf: &mut Vec<u8>) -> Result<()>;
}

impl<F> Formatter for F
where
    F: Fn(&Entry, &mut Vec<u8>) -> Result<()> + Send + Sync,
{
    fn format(&self, entry: &Entry, buf: &mut Vec<u8>) -> Result<()> {
        self(entry, buf)
    }
}

/// Keys a formatter writes on its own, ahead of user fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Time,
    Level,
    Msg,
    FieldError,
    Func,
    File,
}

impl FieldKey {
    pub const fn default_name(self) -> &'static str {
        match self {
            FieldKey::Time => "time",
            FieldKey::Level => "level",
            FieldKey::Msg => "msg",
            FieldKey::FieldError => "field_error",
            FieldKey::Func => "func",
            FieldKey::File => "file",
        }
    }
}

impl std::str::FromStr for FieldKey {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "time" => Ok(FieldKey::Time),
            "level" => Ok(FieldKey::Level),
            "msg" => Ok(FieldKey::Msg),
            "field_error" => Ok(FieldKey::FieldError),
            "func" => Ok(FieldKey::Func),
            "file" => Ok(FieldKey::File),
            other => Err(LoggerError::config(
                "field_map",
                format!("unknown field key: {}", other),
            )),
        }
    }
}

/// Renames for the fixed keys.
///
/// ```
/// use fieldlog::{FieldKey, FieldMap};
///
/// let map = FieldMap::new().with(FieldKey::Msg, "message");
/// assert_eq!(map.resolve(FieldKey::Msg), "message");
/// assert_eq!(map.resolve(FieldKey::Level), "level");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    names: HashMap<FieldKey, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: FieldKey, name: impl Into<String>) -> Self {
        self.names.insert(key, name.into());
        self
    }

    pub fn resolve(&self, key: FieldKey) -> &str {
        self.names
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_name())
    }
}

/// User fields keyed by their rendered name.
pub(crate) type RenderFields<'a> = HashMap<Cow<'a, str>, &'a FieldValue>;

/// Rename user fields that would shadow a fixed key to `fields.<key>`.
///
/// The caller keys only count as fixed when the entry carries a caller.
pub(crate) fn prefix_field_clashes<'a>(
    fields: &'a Fields,
    field_map: &FieldMap,
    has_caller: bool,
) -> RenderFields<'a> {
    let mut data: RenderFields<'a> = fields
        .iter()
        .map(|(key, value)| (Cow::Borrowed(key.as_str()), value))
        .collect();

    let mut fixed = vec![
        FieldKey::Time,
        FieldKey::Msg,
        FieldKey::Level,
        FieldKey::FieldError,
    ];
    if has_caller {
        fixed.extend([FieldKey::Func, FieldKey::File]);
    }

    for key in fixed {
        let name = field_map.resolve(key);
        if let Some(value) = data.remove(name) {
            data.insert(Cow::Owned(format!("fields.{}", name)), value);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clashing_keys_are_prefixed() {
        let fields = Fields::new()
            .with_field("time", "user-time")
            .with_field("msg", "user-msg")
            .with_field("plain", 1);

        let data = prefix_field_clashes(&fields, &FieldMap::new(), false);

        assert!(data.contains_key("fields.time"));
        assert!(data.contains_key("fields.msg"));
        assert!(data.contains_key("plain"));
        assert!(!data.contains_key("time"));
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn test_caller_keys_clash_only_with_caller() {
        let fields = Fields::new().with_field("file", "main.rs");

        let without = prefix_field_clashes(&fields, &FieldMap::new(), false);
        assert!(without.contains_key("file"));

        let with = prefix_field_clashes(&fields, &FieldMap::new(), true);
        assert!(with.contains_key("fields.file"));
    }

    #[test]
    fn test_clash_follows_field_map() {
        let map = FieldMap::new().with(FieldKey::Time, "ts");
        let fields = Fields::new().with_field("ts", 1).with_field("time", 2);

        let data = prefix_field_clashes(&fields, &map, false);
        assert!(data.contains_key("fields.ts"));
        assert!(data.contains_key("time"));
    }

    #[test]
    fn test_field_key_from_str() {
        assert_eq!("msg".parse::<FieldKey>().unwrap(), FieldKey::Msg);
        assert_eq!("field_error".parse::<FieldKey>().unwrap(), FieldKey::FieldError);
        assert!("message".parse::<FieldKey>().is_err());
    }
}
