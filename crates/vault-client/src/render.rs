//! 畫面輸出介面

use vault_calc::{DailyLedger, ReportView};
use vault_core::{
    AdminSettings, Consumo, Despesa, Entrada, Estoque, MonthlyReport, Preco, Quebrado, Saida,
    Section, Usuario,
};

/// 提示類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

/// 提示訊息（toast）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }
}

/// 庫存總覽：目前庫存、本月摘要、目前價格
#[derive(Debug, Clone, PartialEq)]
pub struct StockOverview {
    pub estoque: Estoque,
    pub month_report: MonthlyReport,
    pub active_price: Option<Preco>,
}

impl StockOverview {
    pub fn status_label(&self) -> &'static str {
        self.estoque.cor.label()
    }
}

/// 帶可用庫存的日記帳（銷售、破損、自用都要先看庫存）
#[derive(Debug, Clone, PartialEq)]
pub struct StockLedger<T> {
    pub available: i64,
    pub ledger: DailyLedger<T>,
}

/// 銷售頁
#[derive(Debug, Clone, PartialEq)]
pub struct SalesView {
    pub available: i64,
    pub active_price: Option<Preco>,
    pub ledger: DailyLedger<Saida>,
}

/// 價格頁
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBoard {
    pub active: Option<Preco>,
    pub history: Vec<Preco>,
}

/// 管理面板
#[derive(Debug, Clone, PartialEq)]
pub struct AdminView {
    pub settings: AdminSettings,
    pub users: Vec<Usuario>,
}

/// 各區塊載入後的畫面資料
#[derive(Debug, Clone, PartialEq)]
pub enum SectionView {
    Estoque(StockOverview),
    Entradas(DailyLedger<Entrada>),
    Vendas(SalesView),
    Quebrados(StockLedger<Quebrado>),
    Consumo(StockLedger<Consumo>),
    Despesas(DailyLedger<Despesa>),
    Precos(PriceBoard),
    Relatorios(ReportView),
    Admin(AdminView),
}

impl SectionView {
    pub fn section(&self) -> Section {
        match self {
            SectionView::Estoque(_) => Section::Estoque,
            SectionView::Entradas(_) => Section::Entradas,
            SectionView::Vendas(_) => Section::Vendas,
            SectionView::Quebrados(_) => Section::Quebrados,
            SectionView::Consumo(_) => Section::Consumo,
            SectionView::Despesas(_) => Section::Despesas,
            SectionView::Precos(_) => Section::Precos,
            SectionView::Relatorios(_) => Section::Relatorios,
            SectionView::Admin(_) => Section::Admin,
        }
    }
}

/// 畫面層
pub trait Renderer {
    /// 顯示區塊資料
    fn render(&mut self, view: SectionView);

    /// 顯示提示
    fn notify(&mut self, notice: Notice);

    /// 回到登入畫面（逾期、登出、改密碼後）
    fn session_expired(&mut self);
}

/// 只記錄輸出的畫面層（無頭執行與測試用）
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub views: Vec<SectionView>,
    pub notices: Vec<Notice>,
    pub login_prompts: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_view(&self) -> Option<&SectionView> {
        self.views.last()
    }

    pub fn last_notice(&self) -> Option<&Notice> {
        self.notices.last()
    }

    /// 各次輸出的區塊
    pub fn rendered_sections(&self) -> Vec<Section> {
        self.views.iter().map(SectionView::section).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, view: SectionView) {
        self.views.push(view);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn session_expired(&mut self) {
        self.login_prompts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vault_core::MonthKey;

    #[test]
    fn test_recording_renderer_keeps_order() {
        let month = MonthKey::new(2024, 3).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let mut renderer = RecordingRenderer::new();

        renderer.render(SectionView::Entradas(DailyLedger::build(month, Vec::new(), today)));
        renderer.render(SectionView::Precos(PriceBoard {
            active: None,
            history: Vec::new(),
        }));
        renderer.notify(Notice::info("Você saiu do sistema"));
        renderer.session_expired();

        assert_eq!(renderer.rendered_sections(), vec![Section::Entradas, Section::Precos]);
        assert_eq!(renderer.last_notice().map(|n| n.kind), Some(NoticeKind::Info));
        assert_eq!(renderer.login_prompts, 1);
    }
}
