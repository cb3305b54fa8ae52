//! Reload amounts applied to an account balance.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::ReloadAmountError;

/// A non-negative amount added to an account during a reload.
///
/// Equality is by value, so `25` and `25.00` compare equal.
///
/// # Examples
/// ```
/// use account_record::ReloadAmount;
/// use rust_decimal::Decimal;
///
/// let amount = ReloadAmount::new(Decimal::new(25, 0)).expect("non-negative");
/// assert_eq!(amount.dollar_string(), "$25");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReloadAmount {
    value: Decimal,
}

impl ReloadAmount {
    /// Build a reload amount, rejecting negative values.
    ///
    /// # Errors
    ///
    /// Returns [`ReloadAmountError::Negative`] when `value` is below zero.
    pub fn new(value: Decimal) -> Result<Self, ReloadAmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ReloadAmountError::Negative { value });
        }
        Ok(Self { value })
    }

    /// The preset amounts offered to the account holder.
    #[must_use]
    pub fn presets() -> [Self; 3] {
        [
            Self {
                value: Decimal::new(5, 0),
            },
            Self {
                value: Decimal::new(25, 0),
            },
            Self {
                value: Decimal::new(50, 0),
            },
        ]
    }

    /// Amount to add.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.value
    }

    /// Amount formatted as currency with no decimal places, for prompts.
    #[must_use]
    pub fn dollar_string(&self) -> String {
        let rounded = self
            .value
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        format!("${rounded:.0}")
    }
}

impl fmt::Display for ReloadAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dollar_string())
    }
}

impl FromStr for ReloadAmount {
    type Err = ReloadAmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str(trimmed).map_err(|_| ReloadAmountError::Invalid {
            input: trimmed.to_owned(),
        })?;
        Self::new(value)
    }
}
