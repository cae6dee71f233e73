//! 報表與版本資訊模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 月度彙總（後端 `resumo_mensal`）
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonthlyReport {
    /// 月份（`YYYY-MM`）
    pub mes_referencia: String,
    pub total_entradas: i64,
    pub total_saidas: i64,
    pub total_quebrados: i64,
    pub total_consumo: i64,
    /// 營業額
    pub faturamento_total: Decimal,
    pub total_despesas: Decimal,
    /// 營業額 - 支出
    pub lucro_estimado: Decimal,
}

impl MonthlyReport {
    /// 空的月度彙總
    pub fn empty(mes_referencia: impl Into<String>) -> Self {
        Self {
            mes_referencia: mes_referencia.into(),
            ..Self::default()
        }
    }
}

/// 版本發佈說明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub version: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub fixes: Vec<String>,
}

impl Release {
    /// 標題（沒有時用版本號）
    pub fn heading(&self) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => format!("Versão {}", self.version),
        }
    }
}

/// `/api/version` 回應
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "currentVersion")]
    pub current_version: String,
    #[serde(default)]
    pub versions: Vec<Release>,
}
