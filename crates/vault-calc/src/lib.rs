//! # Vault Calculation
//!
//! 純邏輯：銷售表單連動、金額格式、表單驗證、日記帳分組與報表

pub mod datetime;
pub mod ledger;
pub mod money;
pub mod reconciler;
pub mod report;
pub mod validation;

// Re-export 主要類型
pub use datetime::format_datetime;
pub use ledger::{DailyLedger, DayGroup, LedgerRecord, LedgerTotals};
pub use money::{format_currency, format_decimal_input, parse_decimal_input, round2};
pub use reconciler::{EditMode, FieldDisplay, FieldSnapshot, LinkedFieldReconciler};
pub use report::{IncomeStatement, ReportView};
