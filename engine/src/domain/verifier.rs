//! Identity check between the expected account and the one on a tag.

use account_record::AccountRecord;

/// Whether `on_tag` is the same account as `expected`.
///
/// Only `id` is compared; names and balance are neither checked nor
/// corrected.
#[must_use]
pub fn verify(expected: &AccountRecord, on_tag: &AccountRecord) -> bool {
    expected.id == on_tag.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case(1, 1, true)]
    #[case(1, 2, false)]
    #[case(-4, -4, true)]
    fn verify_compares_ids(#[case] expected_id: i64, #[case] tag_id: i64, #[case] same: bool) {
        let expected = AccountRecord::new("Amanda", "Gonzalez", Decimal::ZERO, expected_id);
        let on_tag = AccountRecord::new("Amanda", "Gonzalez", Decimal::ZERO, tag_id);
        assert_eq!(verify(&expected, &on_tag), same);
    }

    #[test]
    fn verify_ignores_names_and_balance() {
        let expected = AccountRecord::new("Amanda", "Gonzalez", Decimal::ZERO, 1);
        let on_tag = AccountRecord::new("Someone", "Else", Decimal::from(99), 1);
        assert!(verify(&expected, &on_tag));
    }
}
