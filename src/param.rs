//! Bound-parameter placeholder generation.

use crate::error::Error;
use crate::error::Result;

/// The placeholder notation a driver expects for bound parameters.
///
/// These are the five DB-API parameter styles. `Pyformat` is accepted for
/// driver compatibility but collapses to the same `%s` marker as `Format`:
/// parameters travel as positional vectors here, so the mapping-style
/// `%(name)s` form has nothing to bind against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamStyle {
    /// `?` (SQLite, ODBC)
    Qmark,
    /// `:0`, `:1`, ... (zero-based)
    Numeric,
    /// `:name`
    Named,
    /// `%s`
    Format,
    /// `%s` (see the type-level note)
    Pyformat,
}

impl ParamStyle {
    /// Renders the placeholder for one bound parameter.
    ///
    /// `index` is the zero-based parameter ordinal, used by
    /// [`ParamStyle::Numeric`]. `name` feeds [`ParamStyle::Named`] and is
    /// otherwise optional.
    ///
    /// # Errors
    ///
    /// [`Error::Injection`] when a supplied name contains `;` or `'`, for
    /// every style. [`Error::Configuration`] when the named style gets no
    /// usable name.
    pub fn placeholder(&self, name: Option<&str>, index: usize) -> Result<String> {
        if let Some(name) = name {
            if name.contains(';') || name.contains('\'') {
                return Err(Error::Injection(format!("parameter name ({})", name)));
            }
        }
        match self {
            ParamStyle::Qmark => Ok("?".to_string()),
            ParamStyle::Numeric => Ok(format!(":{}", index)),
            ParamStyle::Named => match name {
                Some(name) if !name.is_empty() => Ok(format!(":{}", name)),
                _ => Err(Error::Configuration(
                    "a parameter name is required for the named paramstyle".to_string(),
                )),
            },
            ParamStyle::Format | ParamStyle::Pyformat => Ok("%s".to_string()),
        }
    }

    /// The DB-API name of this style.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamStyle::Qmark => "qmark",
            ParamStyle::Numeric => "numeric",
            ParamStyle::Named => "named",
            ParamStyle::Format => "format",
            ParamStyle::Pyformat => "pyformat",
        }
    }
}

impl std::fmt::Display for ParamStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ParamStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "qmark" => Ok(ParamStyle::Qmark),
            "numeric" => Ok(ParamStyle::Numeric),
            "named" => Ok(ParamStyle::Named),
            "format" => Ok(ParamStyle::Format),
            "pyformat" => Ok(ParamStyle::Pyformat),
            other => Err(Error::Configuration(format!("unsupported paramstyle: {}", other))),
        }
    }
}
