use bgdl_errors::{Error, TransferError};
use regex::Regex;

/// Decides whether an enumerated transfer belongs to a requested source URI
#[derive(Debug, Clone, Default)]
pub enum UriMatcher {
    /// Raw string equality
    #[default]
    Exact,
    /// Equal when the first match of the pattern is identical in both URIs
    Pattern(Regex),
}

impl UriMatcher {
    /// Compile a pattern matcher
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` if the pattern is not a valid regular
    /// expression.
    pub fn pattern(pattern: &str) -> Result<Self, Error> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| {
                TransferError::InvalidArguments {
                    message: format!("invalid uri matcher `{pattern}`: {e}"),
                }
                .into()
            })
    }

    /// Pattern matcher when `pattern` is present, exact matching otherwise
    ///
    /// # Errors
    ///
    /// Returns `InvalidArguments` for an invalid pattern.
    pub fn from_option(pattern: Option<&str>) -> Result<Self, Error> {
        match pattern {
            Some(pattern) => Self::pattern(pattern),
            None => Ok(Self::Exact),
        }
    }

    #[must_use]
    pub fn matches(&self, candidate: &str, requested: &str) -> bool {
        match self {
            Self::Exact => candidate == requested,
            Self::Pattern(regex) => {
                if candidate == requested {
                    return true;
                }
                match (regex.find(candidate), regex.find(requested)) {
                    (Some(a), Some(b)) => a.as_str() == b.as_str(),
                    _ => false,
                }
            }
        }
    }
}
