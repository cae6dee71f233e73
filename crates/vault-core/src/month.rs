//! 月份分區鍵（`YYYY-MM`）

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::VaultError;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// 月份鍵
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// 創建月份鍵（month 為 1..=12）
    pub fn new(year: i32, month: u32) -> crate::Result<Self> {
        if !(1..=12).contains(&month) || !(0..=9999).contains(&year) {
            return Err(VaultError::InvalidMonth(format!("{year}-{month}")));
        }
        Ok(Self { year, month })
    }

    /// 日期所在的月份
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 前後移動月份，跨年時自動進位
    pub fn shift(&self, delta: i32) -> Self {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(delta);
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn next(&self) -> Self {
        self.shift(1)
    }

    pub fn previous(&self) -> Self {
        self.shift(-1)
    }

    /// 月份第一天
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// 日期是否落在此月份
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// 顯示用標籤，例如 `Jan 2024`
    pub fn label(&self) -> String {
        format!(
            "{} {}",
            MONTH_ABBREVIATIONS[(self.month - 1) as usize],
            self.year
        )
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VaultError::InvalidMonth(s.to_string());

        let (year, month) = s.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || month.len() != 2
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn month(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("2024-12", 1, "2025-01")]
    #[case("2024-01", -1, "2023-12")]
    #[case("2024-06", 0, "2024-06")]
    #[case("2024-11", 14, "2026-01")]
    #[case("2024-03", -27, "2021-12")]
    fn test_shift_rollover(#[case] start: &str, #[case] delta: i32, #[case] expected: &str) {
        assert_eq!(month(start).shift(delta).to_string(), expected);
    }

    #[rstest]
    #[case("2024-1")]
    #[case("24-01")]
    #[case("2024-13")]
    #[case("2024-00")]
    #[case("2024/01")]
    #[case("")]
    #[case("abcd-ef")]
    fn test_rejects_malformed(#[case] raw: &str) {
        assert!(raw.parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_label() {
        assert_eq!(month("2024-01").label(), "Jan 2024");
        assert_eq!(month("2023-12").label(), "Dez 2023");
    }

    #[test]
    fn test_from_date_and_contains() {
        let date = NaiveDate::from_ymd_opt(2025, 2, 28).unwrap();
        let key = MonthKey::from_date(date);
        assert_eq!(key.to_string(), "2025-02");
        assert!(key.contains(date));
        assert!(!key.next().contains(date));
        assert_eq!(key.first_day(), NaiveDate::from_ymd_opt(2025, 2, 1));
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&month("2024-05")).unwrap();
        assert_eq!(json, "\"2024-05\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month("2024-05"));
    }

    proptest! {
        #[test]
        fn prop_shift_is_reversible(year in 1000i32..9000, m in 1u32..=12, delta in -600i32..600) {
            let key = MonthKey::new(year, m).unwrap();
            prop_assert_eq!(key.shift(delta).shift(-delta), key);
        }

        #[test]
        fn prop_shift_stays_in_range(year in 1000i32..9000, m in 1u32..=12, delta in -600i32..600) {
            let shifted = MonthKey::new(year, m).unwrap().shift(delta);
            prop_assert!((1..=12).contains(&shifted.month()));
        }
    }
}
