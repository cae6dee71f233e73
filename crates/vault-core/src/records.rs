//! 庫存與日記帳記錄模型

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// 庫存水位（後端以顏色表示）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockLevel {
    #[serde(rename = "verde")]
    High,
    #[serde(rename = "amarelo")]
    Medium,
    #[serde(rename = "vermelho")]
    Low,
}

impl StockLevel {
    /// 庫存卡片上的狀態文字
    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::High => "🟢 Estoque Alto",
            StockLevel::Medium => "🟡 Estoque Médio",
            StockLevel::Low => "🔴 Estoque Baixo",
        }
    }
}

/// 目前庫存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estoque {
    #[serde(default)]
    pub id: Option<i64>,

    /// 現有數量
    pub quantidade_total: i64,

    /// 最後更新時間（空字串表示從未更新）
    #[serde(default)]
    pub ultima_atualizacao: String,

    #[serde(default)]
    pub status: String,

    pub cor: StockLevel,
}

/// 入庫記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrada {
    pub id: i64,
    pub quantidade: i64,
    pub data: String,
    #[serde(default)]
    pub observacao: String,
}

/// 銷售記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Saida {
    pub id: i64,
    pub quantidade: i64,
    pub preco_unitario: Decimal,
    pub valor_total: Decimal,
    pub data: String,
}

/// 破損記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quebrado {
    pub id: i64,
    pub quantidade: i64,
    pub data: String,
    #[serde(default)]
    pub motivo: String,
}

/// 自用消耗記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumo {
    pub id: i64,
    pub quantidade: i64,
    pub data: String,
    #[serde(default)]
    pub observacao: String,
}

/// 支出記錄
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Despesa {
    pub id: i64,
    pub valor: Decimal,
    pub descricao: String,
    pub data: String,
}

/// 價格歷史條目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preco {
    pub id: i64,
    pub preco_unitario: Decimal,
    pub data_inicio: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub ativo: bool,
}

/// 使用者帳號
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Usuario {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub nome: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_admin: bool,
}

impl Usuario {
    /// 顯示名稱（沒有姓名時用帳號）
    pub fn display_name(&self) -> &str {
        match self.nome.as_deref() {
            Some(nome) if !nome.is_empty() => nome,
            _ => &self.username,
        }
    }
}

/// 解析後端時間戳
///
/// 接受 `YYYY-MM-DD`、`YYYY-MM-DD HH:MM[:SS[.f]]`、`T` 分隔以及 RFC 3339。
/// 帶時區的值換算為 UTC。
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// 後端的布林欄位可能是 `true`、`1` 或 `"1"`
pub(crate) fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => value,
        Flag::Int(value) => value != 0,
        Flag::Text(value) => matches!(value.trim(), "1" | "true" | "True" | "TRUE"),
    })
}
