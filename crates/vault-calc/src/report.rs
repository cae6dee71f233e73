//! 月度報表與年度序列

use rust_decimal::Decimal;
use vault_core::{MonthKey, MonthlyReport};

/// 損益摘要（直接採用後端數值）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncomeStatement {
    pub revenue: Decimal,
    pub expenses: Decimal,
    pub profit: Decimal,
}

/// 報表頁資料
#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub month: MonthKey,
    pub summary: MonthlyReport,
    /// 當年 1–12 月（缺少的月份補零）
    pub annual: Vec<MonthlyReport>,
}

impl ReportView {
    pub fn build(month: MonthKey, summary: MonthlyReport, annual: Vec<MonthlyReport>) -> Self {
        Self {
            annual: fill_year(month.year(), annual),
            month,
            summary,
        }
    }

    /// 月結餘 = 入庫 - 銷售 - 破損
    pub fn saldo(&self) -> i64 {
        self.summary.total_entradas - self.summary.total_saidas - self.summary.total_quebrados
    }

    pub fn income_statement(&self) -> IncomeStatement {
        IncomeStatement {
            revenue: self.summary.faturamento_total,
            expenses: self.summary.total_despesas,
            profit: self.summary.lucro_estimado,
        }
    }

    /// 全年營業額合計
    pub fn annual_revenue(&self) -> Decimal {
        self.annual.iter().map(|r| r.faturamento_total).sum()
    }
}

/// 補齊一年的 12 個月份
fn fill_year(year: i32, reports: Vec<MonthlyReport>) -> Vec<MonthlyReport> {
    let mut months: Vec<MonthlyReport> = (1..=12)
        .filter_map(|m| MonthKey::new(year, m).ok())
        .map(|key| MonthlyReport::empty(key.to_string()))
        .collect();

    for report in reports {
        match report.mes_referencia.parse::<MonthKey>() {
            Ok(key) if key.year() == year => {
                months[(key.month() - 1) as usize] = report;
            }
            _ => tracing::warn!("略過不屬於 {} 年的報表: {}", year, report.mes_referencia),
        }
    }

    months
}
