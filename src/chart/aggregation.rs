//! Bucketing of transactions into chart data.
//!
//! Everything here is pure: the same transactions, range and date always give
//! the same buckets regardless of the order of the input.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::{Date, Duration, Month, macros::date};

use crate::{
    money::Money,
    transaction::{Transaction, TransactionType},
};

const EPOCH: Date = date!(1970 - 01 - 01);

/// How far back a chart looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeKey {
    #[serde(rename = "7D")]
    SevenDays,
    #[default]
    #[serde(rename = "1M")]
    OneMonth,
    #[serde(rename = "3M")]
    ThreeMonths,
    #[serde(rename = "6M")]
    SixMonths,
    #[serde(rename = "1Y")]
    OneYear,
    #[serde(rename = "ALL")]
    All,
}

impl RangeKey {
    /// The number of days the range covers, `None` for [RangeKey::All].
    pub fn days(self) -> Option<i64> {
        match self {
            Self::SevenDays => Some(7),
            Self::OneMonth => Some(30),
            Self::ThreeMonths => Some(90),
            Self::SixMonths => Some(180),
            Self::OneYear => Some(365),
            Self::All => None,
        }
    }

    /// The earliest date included in the range ending on `today`.
    ///
    /// [RangeKey::All] starts at the Unix epoch.
    pub fn lower_bound(self, today: Date) -> Date {
        self.days()
            .and_then(|days| today.checked_sub(Duration::days(days)))
            .unwrap_or(EPOCH)
    }

    fn granularity(self) -> Granularity {
        match self {
            Self::All => Granularity::Month,
            _ => Granularity::Day,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Granularity {
    Day,
    Month,
}

impl Granularity {
    fn bucket_start(self, date: Date) -> Date {
        match self {
            Self::Day => date,
            Self::Month => date - Duration::days(i64::from(date.day()) - 1),
        }
    }

    fn label(self, start: Date) -> String {
        let month = month_abbreviation(start.month());

        match self {
            Self::Day => format!("{month} {:02}", start.day()),
            Self::Month => format!("{month} {}", start.year()),
        }
    }
}

fn month_abbreviation(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// The income and expenses of one day or month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBucket {
    /// A display label derived from `start`, e.g. "Oct 05" or "Oct 2025".
    pub label: String,
    /// The first day of the bucket.
    pub start: Date,
    pub income: Money,
    pub expense: Money,
}

/// Chart buckets in ascending date order and the totals across them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    pub range: RangeKey,
    pub buckets: Vec<ChartBucket>,
    pub total_income: Money,
    pub total_expense: Money,
    /// `total_income - total_expense`.
    pub net: Money,
}

/// Bucket the `transactions` dated within `range` of `today`.
///
/// Transactions dated after `today` are ignored. Every range except
/// [RangeKey::All] buckets by day; [RangeKey::All] buckets by month.
pub fn build_chart(transactions: &[Transaction], range: RangeKey, today: Date) -> ChartSummary {
    let lower_bound = range.lower_bound(today);
    let granularity = range.granularity();

    let mut totals: BTreeMap<Date, (Money, Money)> = BTreeMap::new();

    for transaction in transactions
        .iter()
        .filter(|transaction| (lower_bound..=today).contains(&transaction.date))
    {
        let (income, expense) = totals
            .entry(granularity.bucket_start(transaction.date))
            .or_default();

        match transaction.transaction_type {
            TransactionType::Income => *income = *income + transaction.amount,
            TransactionType::Expense => *expense = *expense + transaction.amount,
        }
    }

    let buckets: Vec<ChartBucket> = totals
        .into_iter()
        .map(|(start, (income, expense))| ChartBucket {
            label: granularity.label(start),
            start,
            income,
            expense,
        })
        .collect();

    let total_income = buckets.iter().map(|bucket| bucket.income).sum();
    let total_expense = buckets.iter().map(|bucket| bucket.expense).sum();

    ChartSummary {
        range,
        buckets,
        total_income,
        total_expense,
        net: total_income - total_expense,
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime, macros::date};

    use crate::{
        chart::{RangeKey, build_chart},
        money::Money,
        transaction::{Transaction, TransactionType},
        user::UserID,
    };

    fn transaction(transaction_type: TransactionType, amount: i64, date: time::Date) -> Transaction {
        Transaction {
            id: 1,
            user_id: UserID::new(1),
            account_id: 1,
            transaction_type,
            amount: Money::from_minor_units(amount),
            description: String::new(),
            category: "other-expense".to_owned(),
            date,
            is_recurring: false,
            recurring_interval: None,
            next_recurring_date: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn old_transaction_is_only_in_all() {
        let today = date!(2025 - 10 - 31);
        let transactions = vec![transaction(
            TransactionType::Expense,
            1000,
            today - Duration::days(40),
        )];

        let month = build_chart(&transactions, RangeKey::OneMonth, today);
        let all = build_chart(&transactions, RangeKey::All, today);

        assert!(month.buckets.is_empty());
        assert_eq!(month.total_expense, Money::ZERO);
        assert_eq!(all.buckets.len(), 1);
        assert_eq!(all.total_expense, Money::from_minor_units(1000));
    }

    #[test]
    fn all_starts_at_epoch() {
        let today = date!(2025 - 10 - 31);
        let transactions = vec![
            transaction(TransactionType::Income, 1000, date!(1969 - 12 - 31)),
            transaction(TransactionType::Income, 500, date!(1970 - 01 - 01)),
        ];

        let chart = build_chart(&transactions, RangeKey::All, today);

        assert_eq!(RangeKey::All.lower_bound(today), date!(1970 - 01 - 01));
        assert_eq!(chart.buckets.len(), 1);
        assert_eq!(chart.buckets[0].label, "Jan 1970");
        assert_eq!(chart.total_income, Money::from_minor_units(500));
    }

    #[test]
    fn large_totals_do_not_overflow() {
        let today = date!(2025 - 10 - 31);
        let transactions = vec![
            transaction(TransactionType::Income, i64::MAX, date!(2025 - 10 - 01)),
            transaction(TransactionType::Income, i64::MAX, date!(2025 - 10 - 01)),
            transaction(TransactionType::Expense, i64::MAX, date!(2025 - 09 - 01)),
            transaction(TransactionType::Expense, i64::MAX, date!(2025 - 08 - 01)),
        ];

        let chart = build_chart(&transactions, RangeKey::All, today);

        assert_eq!(chart.buckets[2].income, Money::from_minor_units(i64::MAX));
        assert_eq!(chart.total_income, Money::from_minor_units(i64::MAX));
        assert_eq!(chart.total_expense, Money::from_minor_units(i64::MAX));
        assert_eq!(chart.net, Money::ZERO);
    }

    #[test]
    fn day_buckets_split_income_and_expense() {
        let today = date!(2025 - 10 - 31);
        let transactions = vec![
            transaction(TransactionType::Income, 5000, date!(2025 - 10 - 05)),
            transaction(TransactionType::Expense, 1500, date!(2025 - 10 - 05)),
            transaction(TransactionType::Expense, 250, date!(2025 - 10 - 05)),
            transaction(TransactionType::Expense, 100, date!(2025 - 10 - 06)),
        ];

        let chart = build_chart(&transactions, RangeKey::OneMonth, today);

        assert_eq!(chart.buckets.len(), 2);
        assert_eq!(chart.buckets[0].label, "Oct 05");
        assert_eq!(chart.buckets[0].income, Money::from_minor_units(5000));
        assert_eq!(chart.buckets[0].expense, Money::from_minor_units(1750));
        assert_eq!(chart.buckets[1].label, "Oct 06");
        assert_eq!(chart.buckets[1].income, Money::ZERO);
        assert_eq!(chart.total_income, Money::from_minor_units(5000));
        assert_eq!(chart.total_expense, Money::from_minor_units(1850));
        assert_eq!(chart.net, Money::from_minor_units(3150));
    }

    #[test]
    fn buckets_are_ordered_by_date_not_label() {
        let today = date!(2025 - 12 - 31);
        let transactions = vec![
            transaction(TransactionType::Expense, 100, date!(2025 - 12 - 01)),
            transaction(TransactionType::Expense, 100, date!(2025 - 02 - 10)),
            transaction(TransactionType::Expense, 100, date!(2024 - 11 - 10)),
        ];

        let chart = build_chart(&transactions, RangeKey::All, today);

        let labels: Vec<_> = chart.buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["Nov 2024", "Feb 2025", "Dec 2025"]);
        assert_eq!(chart.buckets[0].start, date!(2024 - 11 - 01));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let today = date!(2025 - 10 - 31);
        let transactions = vec![
            transaction(TransactionType::Income, 100, today - Duration::days(7)),
            transaction(TransactionType::Income, 100, today),
            transaction(TransactionType::Income, 100, today - Duration::days(8)),
            transaction(TransactionType::Income, 100, today + Duration::days(1)),
        ];

        let chart = build_chart(&transactions, RangeKey::SevenDays, today);

        assert_eq!(chart.total_income, Money::from_minor_units(200));
    }

    #[test]
    fn result_does_not_depend_on_input_order() {
        let today = date!(2025 - 10 - 31);
        let mut transactions = vec![
            transaction(TransactionType::Income, 700, date!(2025 - 09 - 15)),
            transaction(TransactionType::Expense, 300, date!(2025 - 10 - 20)),
            transaction(TransactionType::Expense, 200, date!(2025 - 09 - 15)),
        ];

        let forward = build_chart(&transactions, RangeKey::ThreeMonths, today);
        transactions.reverse();
        let backward = build_chart(&transactions, RangeKey::ThreeMonths, today);

        assert_eq!(forward, backward);
        assert_eq!(forward, build_chart(&transactions, RangeKey::ThreeMonths, today));
    }

    #[test]
    fn range_keys_use_short_names() {
        assert_eq!(serde_json::to_string(&RangeKey::OneYear).unwrap(), "\"1Y\"");
        assert_eq!(
            serde_json::from_str::<RangeKey>("\"7D\"").unwrap(),
            RangeKey::SevenDays
        );
        assert_eq!(RangeKey::default(), RangeKey::OneMonth);
    }
}
