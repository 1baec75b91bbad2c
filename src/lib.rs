// PhotonDB ReQL - term evaluation core
// Extensible datums, pseudo-types and compiled query terms

#![warn(rust_2018_idioms)]

/// Asserts an internal invariant.
///
/// A failure means a framework bug (a value was mis-routed by code that
/// should already have classified it), never bad user input, so the current
/// worker is torn down after the violation is logged.
#[macro_export]
macro_rules! sanity_check {
    ($cond:expr) => {
        $crate::sanity_check!($cond, "{}", stringify!($cond))
    };
    ($cond:expr, $($msg:tt)+) => {
        if !$cond {
            let message = format!($($msg)+);
            tracing::error!(invariant = %message, "Internal invariant violated");
            panic!("internal invariant violated: {}", message);
        }
    };
}

pub mod config;
pub mod query;
pub mod reql;

// Re-exports for convenience
pub use query::{CompiledTerm, Deterministic, QueryExecutor, TermRegistry};
pub use reql::{Datum, PseudoType};

/// ReQL error types
pub mod error {
    use crate::query::term::ArgSpec;
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum Error {
        /// Malformed term structure found while compiling.
        #[error("Compile error: {0}")]
        Compile(String),

        #[error("Expected {expected} but found {found} in `{term}`.")]
        Arity {
            term: &'static str,
            expected: ArgSpec,
            found: usize,
        },

        /// Recoverable user error raised during evaluation.
        #[error("{0}")]
        Logic(String),

        #[error("{0}")]
        ResourceLimit(String),

        /// The client sent something that is not a query.
        #[error("Query error: {0}")]
        Query(String),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Internal error: {0}")]
        Internal(String),

        /// Backtrace frame recorded while an evaluation error unwinds.
        #[error("{source}")]
        At {
            term: &'static str,
            source: Box<Error>,
        },
    }

    impl Error {
        pub fn logic<S: Into<String>>(msg: S) -> Self {
            Error::Logic(msg.into())
        }

        pub fn resource_limit<S: Into<String>>(msg: S) -> Self {
            Error::ResourceLimit(msg.into())
        }

        /// Attach a backtrace frame for `term`.
        pub fn at(self, term: &'static str) -> Self {
            Error::At {
                term,
                source: Box::new(self),
            }
        }

        /// The error with all backtrace frames stripped.
        pub fn root(&self) -> &Error {
            match self {
                Error::At { source, .. } => source.root(),
                other => other,
            }
        }

        /// Term names from the outermost frame to the one that failed.
        pub fn backtrace(&self) -> Vec<&'static str> {
            let mut frames = Vec::new();
            let mut current = self;
            while let Error::At { term, source } = current {
                frames.push(*term);
                current = source;
            }
            frames
        }

        pub fn is_compile_time(&self) -> bool {
            matches!(self.root(), Error::Compile(_) | Error::Arity { .. })
        }
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::error::Error;
    use super::*;

    #[test]
    fn test_version_format() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_backtrace_frames() {
        let err = Error::logic("boom").at("schema").at("funcall");
        assert_eq!(err.backtrace(), vec!["funcall", "schema"]);
        assert_eq!(err.root(), &Error::Logic("boom".to_string()));
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    #[should_panic(expected = "internal invariant violated")]
    fn test_sanity_check_panics() {
        sanity_check!(1 + 1 == 3);
    }
}
