//! Caller frame capture
//!
//! Every public logging method is `#[track_caller]`, so the call site is
//! known for free. Turning it into a [`Frame`] is delegated to a
//! [`CallerResolver`], and only happens when caller reporting is on.

use std::fmt;
use std::panic::Location;

/// Where a logging call was made.
#[derive(Debug, Clone, Copy)]
pub struct CallSite {
    pub location: &'static Location<'static>,
    /// Filled in by the logging macros via `module_path!()`
    pub module_path: Option<&'static str>,
}

impl CallSite {
    #[track_caller]
    pub fn here() -> Self {
        Self {
            location: Location::caller(),
            module_path: None,
        }
    }

    #[must_use]
    pub fn with_module(mut self, module_path: &'static str) -> Self {
        self.module_path = Some(module_path);
        self
    }
}

/// A resolved caller frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

pub trait CallerResolver: Send + Sync {
    fn resolve(&self, site: &CallSite) -> Option<Frame>;
}

/// Resolves from the tracked source location. The function name is the
/// calling module when known, empty otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocationResolver;

impl CallerResolver for LocationResolver {
    fn resolve(&self, site: &CallSite) -> Option<Frame> {
        Some(Frame {
            function: site.module_path.unwrap_or_default().to_string(),
            file: site.location.file().to_string(),
            line: site.location.line(),
        })
    }
}

impl<F> CallerResolver for F
where
    F: Fn(&CallSite) -> Option<Frame> + Send + Sync,
{
    fn resolve(&self, site: &CallSite) -> Option<Frame> {
        self(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_resolver() {
        let site = CallSite::here().with_module(module_path!());
        let frame = LocationResolver.resolve(&site).unwrap();

        assert!(frame.file.ends_with("caller.rs"));
        assert_eq!(frame.function, module_path!());
        assert_eq!(frame.line, site.location.line());
        assert_eq!(frame.to_string(), format!("{}:{}", frame.file, frame.line));
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |_: &CallSite| -> Option<Frame> { None };
        assert!(resolver.resolve(&CallSite::here()).is_none());
    }
}
