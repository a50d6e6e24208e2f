//! Aggregation over a set of expense records: grouped sums, totals and derived statistics.
//!
//! Nothing here is persisted. Every function recomputes its result from the records it is given,
//! so calling one twice over the same records yields the same result.

use crate::model::{Amount, Category, Expense, Period};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// A mapping from a grouping key to the sum of the amounts in that group, ordered by key.
pub type Totals<K> = BTreeMap<K, Amount>;

fn totals_by<R, K, F>(records: &[R], key: F) -> Totals<K>
where
    R: AsRef<Expense>,
    K: Ord,
    F: Fn(&Expense) -> K,
{
    let mut totals = Totals::new();
    for record in records {
        let expense = record.as_ref();
        *totals.entry(key(expense)).or_insert(Amount::ZERO) += expense.amount();
    }
    totals
}

/// Sums amounts per category.
pub fn totals_by_category<R: AsRef<Expense>>(records: &[R]) -> Totals<Category> {
    totals_by(records, |e| e.category().clone())
}

/// Sums amounts per calendar month. Iterating the result goes from the oldest month to the
/// newest.
pub fn totals_by_month<R: AsRef<Expense>>(records: &[R]) -> Totals<Period> {
    totals_by(records, |e| Period::of(e.date()))
}

/// The sum of every amount. Zero for no records.
pub fn total_spent<R: AsRef<Expense>>(records: &[R]) -> Amount {
    records.iter().map(|r| r.as_ref().amount()).sum()
}

/// The entries of `totals` from the largest sum to the smallest. Equal sums keep key order.
pub fn sorted_desc<K: Ord + Clone>(totals: &Totals<K>) -> Vec<(K, Amount)> {
    let mut entries: Vec<(K, Amount)> = totals.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // BTreeMap iteration is ascending by key and sort_by is stable.
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// The category with the largest sum, or `None` for no records. Of two categories with the same
/// sum the one that sorts first by name wins.
pub fn top_category<R: AsRef<Expense>>(records: &[R]) -> Option<(Category, Amount)> {
    sorted_desc(&totals_by_category(records)).into_iter().next()
}

/// The records dated within `period`, in their original order.
pub fn for_period<R: AsRef<Expense> + Clone>(records: &[R], period: Period) -> Vec<R> {
    records
        .iter()
        .filter(|r| period.contains(r.as_ref().date()))
        .cloned()
        .collect()
}

/// The most recent month that has any records.
pub fn latest_period<R: AsRef<Expense>>(records: &[R]) -> Option<Period> {
    records
        .iter()
        .map(|r| Period::of(r.as_ref().date()))
        .max()
}

/// Up to `n` records, newest date first. Records with the same date keep their stored order.
pub fn recent<R: AsRef<Expense> + Clone>(records: &[R], n: usize) -> Vec<R> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| b.as_ref().date().cmp(&a.as_ref().date()));
    sorted.truncate(n);
    sorted
}

/// The category with the largest sum and that sum.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TopCategory {
    pub category: Category,
    pub total: Amount,
}

/// The figures that go at the top of a report.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub total: Amount,
    pub top: Option<TopCategory>,
    pub count: usize,
    pub period: Period,
    pub period_total: Amount,
    pub recent: Vec<Expense>,
}

/// Computes the summary of `records` as of `today`, with at most `recent_count` recent records.
pub fn summarize<R: AsRef<Expense>>(
    records: &[R],
    today: NaiveDate,
    recent_count: usize,
) -> Summary {
    let expenses: Vec<Expense> = records.iter().map(|r| r.as_ref().clone()).collect();
    let period = Period::of(today);
    Summary {
        total: total_spent(&expenses),
        top: top_category(&expenses).map(|(category, total)| TopCategory { category, total }),
        count: expenses.len(),
        period,
        period_total: total_spent(&for_period(&expenses, period)),
        recent: recent(&expenses, recent_count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Row;
    use std::str::FromStr;

    fn e(date: &str, category: &str, amount: &str) -> Expense {
        Expense::parse(date, category, amount, "").unwrap()
    }

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn scenario_b() -> Vec<Expense> {
        vec![
            e("2025-10-14", "Food", "250.00"),
            e("2025-10-13", "Travel", "120.50"),
            e("2025-10-12", "Shopping", "950.00"),
        ]
    }

    fn mixed() -> Vec<Expense> {
        vec![
            e("2025-09-30", "Food", "10.10"),
            e("2025-10-01", "Travel", "20.20"),
            e("2025-10-14", "food", "0.30"),
            e("2024-12-31", "Bills", "1000"),
            e("2025-10-14", "Misc", "5"),
        ]
    }

    #[test]
    fn test_scenario_a() {
        let records = vec![e("2025-10-14", "Food", "250.00")];
        let totals = totals_by_category(&records);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[&Category::new("Food")], amt("250.00"));
    }

    #[test]
    fn test_scenario_b() {
        let records = scenario_b();
        assert_eq!(total_spent(&records), amt("1320.50"));
        let (top, sum) = top_category(&records).unwrap();
        assert_eq!(top.name(), "Shopping");
        assert_eq!(sum, amt("950"));
    }

    #[test]
    fn test_empty() {
        let records: Vec<Expense> = Vec::new();
        assert_eq!(total_spent(&records), Amount::ZERO);
        assert!(totals_by_category(&records).is_empty());
        assert!(totals_by_month(&records).is_empty());
        assert!(top_category(&records).is_none());
        assert!(latest_period(&records).is_none());
        assert!(recent(&records, 10).is_empty());
    }

    #[test]
    fn test_category_totals_partition_the_total() {
        let records = mixed();
        let by_category: Amount = totals_by_category(&records).values().sum();
        let by_month: Amount = totals_by_month(&records).values().sum();
        assert_eq!(by_category, total_spent(&records));
        assert_eq!(by_month, total_spent(&records));
        assert_eq!(total_spent(&records), amt("1035.60"));
    }

    #[test]
    fn test_total_is_order_independent() {
        let mut records = mixed();
        let before = total_spent(&records);
        records.reverse();
        assert_eq!(total_spent(&records), before);
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let records = mixed();
        assert_eq!(totals_by_category(&records), totals_by_category(&records));
        assert_eq!(totals_by_month(&records), totals_by_month(&records));
    }

    #[test]
    fn test_categories_merge_after_normalization() {
        let totals = totals_by_category(&mixed());
        assert_eq!(totals[&Category::new("Food")], amt("10.40"));
    }

    #[test]
    fn test_widest_amounts_sum_without_overflow() {
        let records: Vec<Expense> = (0..500)
            .map(|_| e("2025-10-14", "Rent", "999,999,999,999,999"))
            .collect();
        let total = total_spent(&records);
        assert_eq!(total.to_string(), "499999999999999500");
        assert_eq!(totals_by_category(&records).values().next(), Some(&total));
        assert_eq!(totals_by_month(&records).len(), 1);
    }

    #[test]
    fn test_months_ascending() {
        let months: Vec<String> = totals_by_month(&mixed())
            .keys()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(months, vec!["2024-12", "2025-09", "2025-10"]);
        assert_eq!(latest_period(&mixed()).unwrap().to_string(), "2025-10");
    }

    #[test]
    fn test_sorted_desc_breaks_ties_by_key() {
        let records = vec![
            e("2025-10-01", "Travel", "5"),
            e("2025-10-01", "Bills", "5"),
            e("2025-10-01", "Food", "7"),
        ];
        let names: Vec<String> = sorted_desc(&totals_by_category(&records))
            .into_iter()
            .map(|(c, _)| c.to_string())
            .collect();
        assert_eq!(names, vec!["Food", "Bills", "Travel"]);
    }

    #[test]
    fn test_for_period() {
        let october = Period::from_str("2025-10").unwrap();
        let records = for_period(&mixed(), october);
        assert_eq!(records.len(), 3);
        assert!(for_period(&mixed(), Period::from_str("2023-01").unwrap()).is_empty());
    }

    #[test]
    fn test_recent_is_newest_first_and_stable() {
        let records = mixed();
        let recent = recent(&records, 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0], records[2]);
        assert_eq!(recent[1], records[4]);
        assert_eq!(recent[2], records[1]);
        assert_eq!(super::recent(&records, 100).len(), records.len());
    }

    #[test]
    fn test_works_on_rows() {
        let rows: Vec<Row<Expense>> = scenario_b()
            .into_iter()
            .enumerate()
            .map(|(i, e)| Row::new(Some(i as i64 + 1), e))
            .collect();
        assert_eq!(total_spent(&rows), amt("1320.50"));
        assert_eq!(recent(&rows, 1)[0].id(), Some(1));
    }

    #[test]
    fn test_summarize() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        let summary = summarize(&mixed(), today, 2);
        assert_eq!(summary.total, amt("1035.60"));
        assert_eq!(summary.count, 5);
        assert_eq!(summary.period.to_string(), "2025-10");
        assert_eq!(summary.period_total, amt("25.50"));
        assert_eq!(summary.recent.len(), 2);
        let top = summary.top.unwrap();
        assert_eq!(top.category.name(), "Bills");
        assert_eq!(top.total, amt("1000"));
    }

    #[test]
    fn test_summarize_empty() {
        let today = NaiveDate::from_ymd_opt(2025, 10, 20).unwrap();
        let summary = summarize(&Vec::<Expense>::new(), today, 10);
        assert_eq!(summary.total, Amount::ZERO);
        assert!(summary.top.is_none());
        assert!(summary.recent.is_empty());
    }
}
