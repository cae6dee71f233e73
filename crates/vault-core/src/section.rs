//! 儀表板區塊（分頁）識別

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::VaultError;

/// 儀表板區塊
///
/// 線上名稱沿用後端與前端共用的字串識別（`entradas`、`vendas` ...）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    /// 庫存總覽
    Estoque,
    /// 入庫
    Entradas,
    /// 銷售
    Vendas,
    /// 破損
    Quebrados,
    /// 自用消耗
    Consumo,
    /// 支出
    Despesas,
    /// 價格
    Precos,
    /// 報表
    Relatorios,
    /// 管理面板
    Admin,
}

impl Section {
    /// 所有區塊（導覽順序）
    pub const ALL: [Section; 9] = [
        Section::Estoque,
        Section::Entradas,
        Section::Vendas,
        Section::Quebrados,
        Section::Consumo,
        Section::Despesas,
        Section::Precos,
        Section::Relatorios,
        Section::Admin,
    ];

    /// 線上名稱
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Estoque => "estoque",
            Section::Entradas => "entradas",
            Section::Vendas => "vendas",
            Section::Quebrados => "quebrados",
            Section::Consumo => "consumo",
            Section::Despesas => "despesas",
            Section::Precos => "precos",
            Section::Relatorios => "relatorios",
            Section::Admin => "admin",
        }
    }

    /// 是否按月份分區
    pub fn is_month_scoped(&self) -> bool {
        matches!(
            self,
            Section::Entradas
                | Section::Vendas
                | Section::Quebrados
                | Section::Consumo
                | Section::Despesas
                | Section::Relatorios
        )
    }

    /// 按日記錄的區塊對應的 REST 資源名
    ///
    /// 銷售在後端叫 `saidas`。
    pub fn ledger_resource(&self) -> Option<&'static str> {
        match self {
            Section::Entradas => Some("entradas"),
            Section::Vendas => Some("saidas"),
            Section::Quebrados => Some("quebrados"),
            Section::Consumo => Some("consumo"),
            Section::Despesas => Some("despesas"),
            _ => None,
        }
    }

    /// 僅限管理員
    pub fn requires_admin(&self) -> bool {
        matches!(self, Section::Admin)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::ALL
            .iter()
            .copied()
            .find(|section| section.as_str() == s)
            .ok_or_else(|| VaultError::UnknownSection(s.to_string()))
    }
}
