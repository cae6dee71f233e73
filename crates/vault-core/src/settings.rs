//! 全域設定模型

use serde::{Deserialize, Serialize};

use crate::records::deserialize_flag;

/// 日期顯示格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFormat {
    /// `DD/MM/AAAA`
    #[default]
    DayMonthYear,
    /// `MM/DD/AAAA`
    MonthDayYear,
    /// `AAAA-MM-DD`
    Iso,
}

impl DateFormat {
    /// 依設定值取得格式；未知值使用預設格式
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "MM/DD/AAAA" => DateFormat::MonthDayYear,
            "AAAA-MM-DD" => DateFormat::Iso,
            _ => DateFormat::DayMonthYear,
        }
    }

    pub fn as_setting(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "DD/MM/AAAA",
            DateFormat::MonthDayYear => "MM/DD/AAAA",
            DateFormat::Iso => "AAAA-MM-DD",
        }
    }
}

/// 一般設定（影響所有區塊的格式化）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// 幣別代碼（ISO 4217）
    pub moeda: String,

    /// IANA 時區
    pub timezone: String,

    /// 日期格式設定值
    pub formato_data: String,

    /// 農場名稱
    pub nome_fazenda: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            moeda: "BRL".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            formato_data: DateFormat::default().as_setting().to_string(),
            nome_fazenda: "EggVault".to_string(),
        }
    }
}

impl GeneralSettings {
    /// 建構器模式：設置幣別
    pub fn with_moeda(mut self, moeda: impl Into<String>) -> Self {
        self.moeda = moeda.into();
        self
    }

    /// 建構器模式：設置時區
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// 建構器模式：設置日期格式
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.formato_data = format.as_setting().to_string();
        self
    }

    /// 建構器模式：設置農場名稱
    pub fn with_nome_fazenda(mut self, nome: impl Into<String>) -> Self {
        self.nome_fazenda = nome.into();
        self
    }

    pub fn date_format(&self) -> DateFormat {
        DateFormat::from_setting(&self.formato_data)
    }

    /// 頁面標題
    pub fn page_title(&self) -> String {
        let nome = if self.nome_fazenda.trim().is_empty() {
            "EggVault"
        } else {
            self.nome_fazenda.as_str()
        };
        format!("🥚 {nome} — Gerenciamento de Ovos")
    }
}

/// 管理員設定（一般設定 + 功能開關）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSettings {
    #[serde(flatten)]
    pub general: GeneralSettings,

    #[serde(default, deserialize_with = "deserialize_flag")]
    pub consumo_habilitado: bool,
}

/// `/api/configuracoes/consumo-habilitado` 回應
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ConsumoFlag {
    #[serde(deserialize_with = "deserialize_flag")]
    pub habilitado: bool,
}
