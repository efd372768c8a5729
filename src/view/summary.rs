//! Reductions behind the summary cards above each table.
//!
//! Every helper takes the rows exactly as derived for display; callers must
//! never pass the unfiltered collection. Sums saturate at the `Decimal`
//! bounds instead of panicking.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub fn count_where<R>(rows: &[&R], predicate: impl Fn(&R) -> bool) -> usize {
    rows.iter().filter(|row| predicate(**row)).count()
}

pub fn sum_by<R>(rows: &[&R], value: impl Fn(&R) -> Decimal) -> Decimal {
    rows.iter()
        .map(|row| value(*row))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn sum_where<R>(
    rows: &[&R],
    predicate: impl Fn(&R) -> bool,
    value: impl Fn(&R) -> Decimal,
) -> Decimal {
    rows.iter()
        .filter(|row| predicate(**row))
        .map(|row| value(*row))
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn group_sum<R, K: Ord>(
    rows: &[&R],
    key: impl Fn(&R) -> K,
    value: impl Fn(&R) -> Decimal,
) -> BTreeMap<K, Decimal> {
    let mut groups = BTreeMap::new();
    for row in rows {
        let total = groups.entry(key(*row)).or_insert(Decimal::ZERO);
        *total = total.saturating_add(value(*row));
    }
    groups
}

pub fn group_count<R, K: Ord>(rows: &[&R], key: impl Fn(&R) -> K) -> BTreeMap<K, usize> {
    let mut groups = BTreeMap::new();
    for row in rows {
        *groups.entry(key(*row)).or_insert(0) += 1;
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Line {
        tag: &'static str,
        amount: Decimal,
    }

    #[test]
    fn reductions_over_rows() {
        let lines = [
            Line { tag: "a", amount: dec!(1.25) },
            Line { tag: "b", amount: dec!(2) },
            Line { tag: "a", amount: dec!(0.75) },
        ];
        let rows: Vec<&Line> = lines.iter().collect();

        assert_eq!(sum_by(&rows, |l| l.amount), dec!(4));
        assert_eq!(count_where(&rows, |l| l.tag == "a"), 2);
        assert_eq!(sum_where(&rows, |l| l.tag == "b", |l| l.amount), dec!(2));

        let groups = group_sum(&rows, |l| l.tag, |l| l.amount);
        assert_eq!(groups["a"], dec!(2.00));
        assert_eq!(group_count(&rows, |l| l.tag)["b"], 1);
    }

    #[test]
    fn sums_saturate_instead_of_overflowing() {
        let lines = [
            Line { tag: "a", amount: Decimal::MAX },
            Line { tag: "a", amount: dec!(1) },
        ];
        let rows: Vec<&Line> = lines.iter().collect();
        assert_eq!(sum_by(&rows, |l| l.amount), Decimal::MAX);
        assert_eq!(group_sum(&rows, |l| l.tag, |l| l.amount)["a"], Decimal::MAX);
    }

    #[test]
    fn empty_rows_reduce_to_zero() {
        let rows: Vec<&Line> = Vec::new();
        assert_eq!(sum_by(&rows, |l| l.amount), Decimal::ZERO);
        assert!(group_sum(&rows, |l| l.tag, |l| l.amount).is_empty());
    }
}
