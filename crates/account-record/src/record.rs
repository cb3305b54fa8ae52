//! Account record stored on a tag.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Account data exchanged with a tag.
///
/// ## Invariants
/// - `id` is the sole identity key; two records describe the same account
///   when their ids match, whatever their other fields say.
/// - `account_value` is expected to be non-negative but this type does not
///   enforce it.
///
/// The JSON form uses camelCase field names and writes `accountValue` as a
/// JSON number with its exact decimal digits.
///
/// # Examples
/// ```
/// use account_record::AccountRecord;
/// use rust_decimal::Decimal;
///
/// let record = AccountRecord::new("Amanda", "Gonzalez", Decimal::new(35, 0), 1);
/// assert_eq!(record.display_name(), "Amanda Gonzalez");
/// assert_eq!(record.funds_available(), "$35.00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRecord {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Stored balance.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub account_value: Decimal,
    /// Account identifier.
    pub id: i64,
}

impl AccountRecord {
    /// Build a record from its parts.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        account_value: Decimal,
        id: i64,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            account_value,
            id,
        }
    }

    /// The demo account written by the create-user flow.
    #[must_use]
    pub fn demo() -> Self {
        Self::new("Amanda", "Gonzalez", Decimal::ZERO, 1)
    }

    /// Name shown to the account holder.
    ///
    /// Falls back to the last name when the first name is empty; otherwise
    /// the two are joined by a single space.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.first_name.is_empty() {
            self.last_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }

    /// Balance formatted as currency with two decimal places.
    #[must_use]
    pub fn funds_available(&self) -> String {
        let rounded = self
            .account_value
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("${rounded:.2}")
    }

    /// Return a copy of this record with `amount` added to the balance.
    ///
    /// Returns `None` when the addition overflows the decimal range.
    #[must_use]
    pub fn credited(&self, amount: Decimal) -> Option<Self> {
        let account_value = self.account_value.checked_add(amount)?;
        Some(Self {
            account_value,
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Amanda", "Gonzalez", "Amanda Gonzalez")]
    #[case("", "Gonzalez", "Gonzalez")]
    #[case("Amanda", "", "Amanda ")]
    #[case("", "", "")]
    fn display_name_follows_fallback_rules(
        #[case] first: &str,
        #[case] last: &str,
        #[case] expected: &str,
    ) {
        let record = AccountRecord::new(first, last, Decimal::ZERO, 1);
        assert_eq!(record.display_name(), expected);
    }

    #[rstest]
    #[case(Decimal::ZERO, "$0.00")]
    #[case(Decimal::new(35, 0), "$35.00")]
    #[case(Decimal::new(1005, 3), "$1.01")]
    #[case(Decimal::new(12_345, 1), "$1234.50")]
    fn funds_available_uses_two_decimal_places(#[case] value: Decimal, #[case] expected: &str) {
        let record = AccountRecord::new("A", "B", value, 1);
        assert_eq!(record.funds_available(), expected);
    }

    #[test]
    fn credited_adds_exactly() {
        let record = AccountRecord::new("A", "B", Decimal::new(10, 0), 1);
        let updated = record.credited(Decimal::new(25, 0)).expect("no overflow");
        assert_eq!(updated.account_value, Decimal::new(35, 0));
        assert_eq!(updated.id, record.id);
        assert_eq!(updated.first_name, record.first_name);
    }

    #[test]
    fn credited_reports_overflow() {
        let record = AccountRecord::new("A", "B", Decimal::MAX, 1);
        assert!(record.credited(Decimal::ONE).is_none());
    }

    #[test]
    fn demo_record_matches_create_flow_fixture() {
        let demo = AccountRecord::demo();
        assert_eq!(demo.display_name(), "Amanda Gonzalez");
        assert_eq!(demo.account_value, Decimal::ZERO);
        assert_eq!(demo.id, 1);
    }
}
