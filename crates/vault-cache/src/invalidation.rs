//! 變更操作與受影響區塊

use vault_core::Section;

/// 會讓快取失效的變更操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mutation {
    /// 新增或撤銷入庫
    EntradaChanged,
    /// 新增或撤銷銷售
    VendaChanged,
    /// 新增或撤銷破損
    QuebradoChanged,
    /// 新增或撤銷自用
    ConsumoChanged,
    /// 新增或撤銷支出
    DespesaChanged,
    /// 設定新價格
    PriceSet,
    /// 儲存一般設定（幣別、時區、日期格式會影響所有畫面）
    GeneralSettingsSaved,
    FeatureFlagsSaved,
    UsersChanged,
}

impl Mutation {
    /// 按日記錄區塊的新增或撤銷
    pub fn ledger(section: Section) -> Option<Self> {
        match section {
            Section::Entradas => Some(Mutation::EntradaChanged),
            Section::Vendas => Some(Mutation::VendaChanged),
            Section::Quebrados => Some(Mutation::QuebradoChanged),
            Section::Consumo => Some(Mutation::ConsumoChanged),
            Section::Despesas => Some(Mutation::DespesaChanged),
            _ => None,
        }
    }

    /// 受影響的區塊；`None` 表示全部清除
    pub fn invalidated_sections(&self) -> Option<&'static [Section]> {
        use Section::*;

        match self {
            Mutation::EntradaChanged => Some(&[Entradas, Estoque, Relatorios]),
            Mutation::VendaChanged => Some(&[Vendas, Estoque, Relatorios]),
            Mutation::QuebradoChanged => Some(&[Quebrados, Estoque, Relatorios]),
            Mutation::ConsumoChanged => Some(&[Consumo, Estoque, Relatorios]),
            Mutation::DespesaChanged => Some(&[Despesas, Estoque, Relatorios]),
            Mutation::PriceSet => Some(&[Precos, Estoque, Vendas]),
            Mutation::GeneralSettingsSaved => None,
            Mutation::FeatureFlagsSaved | Mutation::UsersChanged => Some(&[Admin]),
        }
    }
}
