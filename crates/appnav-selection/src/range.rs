//! Range primitives
//!
//! A [`Range`] is one include/exclude entry of a select option: a sign, an
//! option code and one or two bound values.

use crate::error::{SelectionError, SelectionResult};
use serde_json::Value;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Include or exclude marker of a range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// `I`: rows matching the range are selected
    Include,
    /// `E`: rows matching the range are removed
    Exclude,
}

impl Sign {
    /// Wire code
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Include => "I",
            Self::Exclude => "E",
        }
    }

    /// Opposite sign
    #[inline]
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Include => Self::Exclude,
            Self::Exclude => Self::Include,
        }
    }
}

impl FromStr for Sign {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "I" => Ok(Self::Include),
            "E" => Ok(Self::Exclude),
            other => Err(SelectionError::UnknownSign(other.to_string())),
        }
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Option code of a range
///
/// Closed set; anything else is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectOption {
    /// Equal to `low`
    Eq,
    /// Not equal to `low`
    Ne,
    /// Matches wildcard pattern `low` (`*` / `+`)
    Cp,
    /// Does not match wildcard pattern `low`
    Np,
    /// Between `low` and `high`, inclusive
    Bt,
    /// Not between `low` and `high`
    Nb,
    /// Less than `low`
    Lt,
    /// Less than or equal to `low`
    Le,
    /// Greater than `low`
    Gt,
    /// Greater than or equal to `low`
    Ge,
}

impl SelectOption {
    /// All option codes, in wire order
    pub const ALL: [SelectOption; 10] = [
        Self::Eq,
        Self::Ne,
        Self::Cp,
        Self::Np,
        Self::Bt,
        Self::Nb,
        Self::Lt,
        Self::Le,
        Self::Gt,
        Self::Ge,
    ];

    /// Wire code
    #[inline]
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Cp => "CP",
            Self::Np => "NP",
            Self::Bt => "BT",
            Self::Nb => "NB",
            Self::Lt => "LT",
            Self::Le => "LE",
            Self::Gt => "GT",
            Self::Ge => "GE",
        }
    }

    /// Whether the option needs both bounds
    #[inline]
    #[must_use]
    pub const fn needs_high(self) -> bool {
        matches!(self, Self::Bt | Self::Nb)
    }
}

impl FromStr for SelectOption {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|o| o.code() == s)
            .ok_or_else(|| SelectionError::UnknownOption(s.to_string()))
    }
}

impl Display for SelectOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One include/exclude entry of a select option
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    /// Include or exclude
    pub sign: Sign,
    /// Comparison option
    pub option: SelectOption,
    /// Lower bound (or the single compared value)
    pub low: String,
    /// Upper bound, present for `BT` / `NB`
    pub high: Option<String>,
    /// Semantic date grouping carried alongside the range
    pub semantic_dates: Option<Value>,
}

impl Range {
    /// Create a validated range
    ///
    /// # Errors
    /// `MissingHigh` if `option` is `BT`/`NB` and `high` is absent.
    pub fn new(
        sign: Sign,
        option: SelectOption,
        low: impl Into<String>,
        high: Option<String>,
    ) -> SelectionResult<Self> {
        if option.needs_high() && high.is_none() {
            return Err(SelectionError::MissingHigh {
                property: String::new(),
                option: option.code().to_string(),
            });
        }
        Ok(Self {
            sign,
            option,
            low: low.into(),
            high,
            semantic_dates: None,
        })
    }

    /// `I EQ value`, the canonical single-value range
    #[inline]
    #[must_use]
    pub fn include_eq(value: impl Into<String>) -> Self {
        Self {
            sign: Sign::Include,
            option: SelectOption::Eq,
            low: value.into(),
            high: None,
            semantic_dates: None,
        }
    }

    /// Attach semantic date data
    #[inline]
    #[must_use]
    pub fn with_semantic_dates(mut self, data: Value) -> Self {
        self.semantic_dates = Some(data);
        self
    }

    /// Whether this is a plain `I EQ` single value
    #[inline]
    #[must_use]
    pub fn is_single_value(&self) -> bool {
        self.sign == Sign::Include && self.option == SelectOption::Eq
    }

    /// `EQ ""` encodes "is empty"
    #[inline]
    #[must_use]
    pub fn is_empty_check(&self) -> bool {
        self.option == SelectOption::Eq && self.low.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_codes_roundtrip() {
        for option in SelectOption::ALL {
            assert_eq!(option.code().parse::<SelectOption>().unwrap(), option);
        }
    }

    #[test]
    fn unknown_option_rejected() {
        assert!(matches!(
            "NOTBT".parse::<SelectOption>(),
            Err(SelectionError::UnknownOption(_))
        ));
        assert!("eq".parse::<SelectOption>().is_err());
    }

    #[test]
    fn sign_parse() {
        assert_eq!("I".parse::<Sign>().unwrap(), Sign::Include);
        assert_eq!("E".parse::<Sign>().unwrap(), Sign::Exclude);
        assert!("X".parse::<Sign>().is_err());
        assert_eq!(Sign::Include.negate(), Sign::Exclude);
    }

    #[test]
    fn between_requires_high() {
        let err = Range::new(Sign::Include, SelectOption::Bt, "1", None).unwrap_err();
        assert!(matches!(err, SelectionError::MissingHigh { .. }));

        let ok = Range::new(Sign::Exclude, SelectOption::Bt, "1", Some("9".into())).unwrap();
        assert_eq!(ok.high.as_deref(), Some("9"));
    }

    #[test]
    fn empty_check_shorthand() {
        assert!(Range::include_eq("").is_empty_check());
        assert!(!Range::include_eq("x").is_empty_check());
        assert!(Range::include_eq("x").is_single_value());
    }
}
