//! Condition operators
//!
//! Filter widgets speak in operators like `Contains` or `NOTBT`; the wire
//! format only knows sign/option pairs. [`ConditionOperator`] is the closed
//! set of widget operators and [`ConditionOperator::to_range`] is the single
//! mapping table between the two worlds.

use crate::error::{SelectionError, SelectionResult};
use crate::range::{Range, SelectOption, Sign};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Widget-level comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionOperator {
    /// `EQ`: equal to the value
    Eq,
    /// `NE`: not equal to the value
    Ne,
    /// `BT`: between two values, inclusive
    Between,
    /// `NOTBT`: outside two values
    NotBetween,
    /// `LT`: less than
    Lt,
    /// `NOTLT`: not less than
    NotLt,
    /// `LE`: less than or equal
    Le,
    /// `NOTLE`: greater than
    NotLe,
    /// `GT`: greater than
    Gt,
    /// `NOTGT`: not greater than
    NotGt,
    /// `GE`: greater than or equal
    Ge,
    /// `NOTGE`: less than
    NotGe,
    /// Substring match, `I CP *x*`
    Contains,
    /// No substring match, `E CP *x*`
    NotContains,
    /// Prefix match, `I CP x*`
    StartsWith,
    /// No prefix match, `E CP x*`
    NotStartsWith,
    /// Suffix match, `I CP *x`
    EndsWith,
    /// No suffix match, `E CP *x`
    NotEndsWith,
    /// Value is empty, `I EQ ""`
    Empty,
    /// Value is not empty, `E EQ ""`
    NotEmpty,
}

impl ConditionOperator {
    /// Every operator, in table order
    pub const ALL: [ConditionOperator; 20] = [
        Self::Eq,
        Self::Ne,
        Self::Between,
        Self::NotBetween,
        Self::Lt,
        Self::NotLt,
        Self::Le,
        Self::NotLe,
        Self::Gt,
        Self::NotGt,
        Self::Ge,
        Self::NotGe,
        Self::Contains,
        Self::NotContains,
        Self::StartsWith,
        Self::NotStartsWith,
        Self::EndsWith,
        Self::NotEndsWith,
        Self::Empty,
        Self::NotEmpty,
    ];

    /// Operator name as used by filter widgets
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eq => "EQ",
            Self::Ne => "NE",
            Self::Between => "BT",
            Self::NotBetween => "NOTBT",
            Self::Lt => "LT",
            Self::NotLt => "NOTLT",
            Self::Le => "LE",
            Self::NotLe => "NOTLE",
            Self::Gt => "GT",
            Self::NotGt => "NOTGT",
            Self::Ge => "GE",
            Self::NotGe => "NOTGE",
            Self::Contains => "Contains",
            Self::NotContains => "NotContains",
            Self::StartsWith => "StartsWith",
            Self::NotStartsWith => "NotStartsWith",
            Self::EndsWith => "EndsWith",
            Self::NotEndsWith => "NotEndsWith",
            Self::Empty => "Empty",
            Self::NotEmpty => "NotEmpty",
        }
    }

    /// Number of values the operator consumes
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Empty | Self::NotEmpty => 0,
            Self::Between | Self::NotBetween => 2,
            _ => 1,
        }
    }

    /// Map to a wire range
    ///
    /// # Errors
    /// `ConditionArity` if `values` does not match [`Self::arity`].
    pub fn to_range(self, values: &[&str]) -> SelectionResult<Range> {
        if values.len() != self.arity() {
            return Err(SelectionError::ConditionArity {
                operator: self.name(),
                expected: self.arity(),
                actual: values.len(),
            });
        }
        let first = values.first().copied().unwrap_or_default();
        let second = values.get(1).map(|v| (*v).to_string());

        use ConditionOperator as C;
        use SelectOption as O;
        use Sign::{Exclude as E, Include as I};

        let (sign, option, low, high) = match self {
            C::Eq => (I, O::Eq, first.to_string(), None),
            C::Ne => (E, O::Eq, first.to_string(), None),
            C::Between => (I, O::Bt, first.to_string(), second),
            C::NotBetween => (E, O::Bt, first.to_string(), second),
            C::Lt => (I, O::Lt, first.to_string(), None),
            C::NotLt => (E, O::Lt, first.to_string(), None),
            C::Le => (I, O::Le, first.to_string(), None),
            C::NotLe => (E, O::Le, first.to_string(), None),
            C::Gt => (I, O::Gt, first.to_string(), None),
            C::NotGt => (E, O::Gt, first.to_string(), None),
            C::Ge => (I, O::Ge, first.to_string(), None),
            C::NotGe => (E, O::Ge, first.to_string(), None),
            C::Contains => (I, O::Cp, format!("*{first}*"), None),
            C::NotContains => (E, O::Cp, format!("*{first}*"), None),
            C::StartsWith => (I, O::Cp, format!("{first}*"), None),
            C::NotStartsWith => (E, O::Cp, format!("{first}*"), None),
            C::EndsWith => (I, O::Cp, format!("*{first}"), None),
            C::NotEndsWith => (E, O::Cp, format!("*{first}"), None),
            C::Empty => (I, O::Eq, String::new(), None),
            C::NotEmpty => (E, O::Eq, String::new(), None),
        };
        Range::new(sign, option, low, high)
    }

    /// Classify a wire range back into a widget operator and its values
    ///
    /// Returns `None` for ranges no widget operator expresses, such as a
    /// `CP` pattern with an inner wildcard.
    #[must_use]
    pub fn classify(range: &Range) -> Option<(Self, Vec<String>)> {
        use ConditionOperator as C;

        let negated = range.sign == Sign::Exclude;
        let pick = |plain: C, not: C| if negated { not } else { plain };
        let one = |v: &str| vec![v.to_string()];

        match range.option {
            SelectOption::Eq if range.low.is_empty() => Some((pick(C::Empty, C::NotEmpty), vec![])),
            SelectOption::Eq => Some((pick(C::Eq, C::Ne), one(&range.low))),
            SelectOption::Ne => Some((pick(C::Ne, C::Eq), one(&range.low))),
            SelectOption::Bt | SelectOption::Nb => {
                let between = (range.option == SelectOption::Bt) != negated;
                let op = if between { C::Between } else { C::NotBetween };
                Some((op, vec![range.low.clone(), range.high.clone()?]))
            }
            SelectOption::Lt => Some((pick(C::Lt, C::NotLt), one(&range.low))),
            SelectOption::Le => Some((pick(C::Le, C::NotLe), one(&range.low))),
            SelectOption::Gt => Some((pick(C::Gt, C::NotGt), one(&range.low))),
            SelectOption::Ge => Some((pick(C::Ge, C::NotGe), one(&range.low))),
            SelectOption::Cp | SelectOption::Np => {
                let negated = negated != (range.option == SelectOption::Np);
                let (plain, not, inner) = classify_pattern(&range.low)?;
                let op = if negated { not } else { plain };
                Some((op, one(inner)))
            }
        }
    }
}

fn classify_pattern(pattern: &str) -> Option<(ConditionOperator, ConditionOperator, &str)> {
    use ConditionOperator as C;

    let leading = pattern.strip_prefix('*');
    let trailing = pattern.strip_suffix('*');
    let (plain, not, inner) = match (leading, trailing) {
        (Some(_), Some(_)) if pattern.len() >= 2 => {
            (C::Contains, C::NotContains, &pattern[1..pattern.len() - 1])
        }
        (Some(_), Some(_)) => return None,
        (None, Some(rest)) => (C::StartsWith, C::NotStartsWith, rest),
        (Some(rest), None) => (C::EndsWith, C::NotEndsWith, rest),
        (None, None) => return None,
    };
    if inner.contains('*') {
        return None;
    }
    Some((plain, not, inner))
}

impl FromStr for ConditionOperator {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| SelectionError::UnknownCondition(s.to_string()))
    }
}

impl Display for ConditionOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
