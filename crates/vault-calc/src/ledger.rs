//! 按日分組的月度日記帳

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use vault_core::{parse_timestamp, Consumo, Despesa, Entrada, MonthKey, Quebrado, Saida};

/// 可放入日記帳的記錄
pub trait LedgerRecord {
    /// 後端時間戳
    fn recorded_at(&self) -> &str;

    /// 數量（雞蛋個數）
    fn quantity(&self) -> i64 {
        0
    }

    /// 金額
    fn value(&self) -> Decimal {
        Decimal::ZERO
    }

    /// 記錄所屬日期（後端時間戳的日期部分）
    fn recorded_on(&self) -> Option<NaiveDate> {
        parse_timestamp(self.recorded_at()).map(|dt| dt.date())
    }
}

impl LedgerRecord for Entrada {
    fn recorded_at(&self) -> &str {
        &self.data
    }

    fn quantity(&self) -> i64 {
        self.quantidade
    }
}

impl LedgerRecord for Saida {
    fn recorded_at(&self) -> &str {
        &self.data
    }

    fn quantity(&self) -> i64 {
        self.quantidade
    }

    fn value(&self) -> Decimal {
        self.valor_total
    }
}

impl LedgerRecord for Quebrado {
    fn recorded_at(&self) -> &str {
        &self.data
    }

    fn quantity(&self) -> i64 {
        self.quantidade
    }
}

impl LedgerRecord for Consumo {
    fn recorded_at(&self) -> &str {
        &self.data
    }

    fn quantity(&self) -> i64 {
        self.quantidade
    }
}

impl LedgerRecord for Despesa {
    fn recorded_at(&self) -> &str {
        &self.data
    }

    fn value(&self) -> Decimal {
        self.valor
    }
}

/// 數量與金額小計
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    pub quantity: i64,
    pub value: Decimal,
}

impl LedgerTotals {
    fn add<T: LedgerRecord>(&mut self, record: &T) {
        self.quantity += record.quantity();
        self.value += record.value();
    }

    fn of<T: LedgerRecord>(records: &[T]) -> Self {
        let mut totals = Self::default();
        for record in records {
            totals.add(record);
        }
        totals
    }
}

/// 單日記錄
#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<T> {
    pub date: NaiveDate,
    pub records: Vec<T>,
    pub totals: LedgerTotals,
}

/// 月度日記帳：今天 + 之前各日（新到舊）
#[derive(Debug, Clone, PartialEq)]
pub struct DailyLedger<T> {
    pub month: MonthKey,
    pub today: Vec<T>,
    pub previous: Vec<DayGroup<T>>,
    pub totals: LedgerTotals,
    /// 日期無法解析的記錄數（只計入月合計）
    pub undated: usize,
}

impl<T: LedgerRecord> DailyLedger<T> {
    /// 依日期分組
    ///
    /// 同一天內保持後端回傳的順序。
    pub fn build(month: MonthKey, records: Vec<T>, today: NaiveDate) -> Self {
        let mut totals = LedgerTotals::default();
        let mut by_day: BTreeMap<NaiveDate, Vec<T>> = BTreeMap::new();
        let mut undated = 0;

        for record in records {
            totals.add(&record);
            match record.recorded_on() {
                Some(date) => by_day.entry(date).or_default().push(record),
                None => {
                    tracing::warn!("記錄日期無法解析: {:?}", record.recorded_at());
                    undated += 1;
                }
            }
        }

        let today_records = by_day.remove(&today).unwrap_or_default();
        let previous = by_day
            .into_iter()
            .rev()
            .map(|(date, records)| DayGroup {
                date,
                totals: LedgerTotals::of(&records),
                records,
            })
            .collect();

        Self {
            month,
            today: today_records,
            previous,
            totals,
            undated,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.previous.is_empty() && self.undated == 0
    }

    pub fn today_totals(&self) -> LedgerTotals {
        LedgerTotals::of(&self.today)
    }
}
