//! 儀表板巡覽示例
//!
//! 連到 `EGGVAULT_API_URL` 的後端，登入後依序打開每個區塊。
//! 帳號密碼從 `EGGVAULT_USER` / `EGGVAULT_PASSWORD` 讀取。

use anyhow::Context;
use eggvault::calc::{format_currency, LedgerRecord};
use eggvault::client::{ClientConfig, Notice, NoticeKind, Renderer, SectionView, Session};
use eggvault::model::Section;
use tracing_subscriber::EnvFilter;

/// 把畫面輸出成文字
struct ConsoleRenderer {
    moeda: String,
}

impl ConsoleRenderer {
    fn money(&self, value: rust_decimal::Decimal) -> String {
        format_currency(value, &self.moeda)
    }

    fn ledger_line<T: LedgerRecord>(&self, title: &str, today: &[T], quantity: i64, days: usize) {
        let today_qty: i64 = today.iter().map(LedgerRecord::quantity).sum();
        println!("  {title}: 今日 {today_qty}，本月 {quantity}（另有 {days} 天記錄）");
    }
}

impl Renderer for ConsoleRenderer {
    fn render(&mut self, view: SectionView) {
        println!("\n== {} ==", view.section());
        match view {
            SectionView::Estoque(overview) => {
                println!(
                    "  庫存 {} 顆  {}",
                    overview.estoque.quantidade_total,
                    overview.status_label()
                );
                if let Some(preco) = &overview.active_price {
                    println!("  目前價格 {}", self.money(preco.preco_unitario));
                }
            }
            SectionView::Entradas(ledger) => {
                self.ledger_line("入庫", &ledger.today, ledger.totals.quantity, ledger.previous.len())
            }
            SectionView::Vendas(sales) => {
                self.ledger_line(
                    "銷售",
                    &sales.ledger.today,
                    sales.ledger.totals.quantity,
                    sales.ledger.previous.len(),
                );
                println!("  營收 {}", self.money(sales.ledger.totals.value));
            }
            SectionView::Quebrados(view) => {
                let ledger = &view.ledger;
                self.ledger_line("破損", &ledger.today, ledger.totals.quantity, ledger.previous.len());
                println!("  可用庫存 {}", view.available);
            }
            SectionView::Consumo(view) => {
                let ledger = &view.ledger;
                self.ledger_line("自用", &ledger.today, ledger.totals.quantity, ledger.previous.len());
            }
            SectionView::Despesas(ledger) => {
                let count = ledger.today.len()
                    + ledger.previous.iter().map(|day| day.records.len()).sum::<usize>();
                println!("  支出 {} 筆，合計 {}", count, self.money(ledger.totals.value));
            }
            SectionView::Precos(board) => {
                println!("  價格歷史 {} 筆", board.history.len());
            }
            SectionView::Relatorios(report) => {
                let statement = report.income_statement();
                println!(
                    "  {}：結餘 {} 顆，營收 {}，利潤 {}",
                    report.month.label(),
                    report.saldo(),
                    self.money(statement.revenue),
                    self.money(statement.profit)
                );
            }
            SectionView::Admin(admin) => {
                println!("  {} 位使用者", admin.users.len());
            }
        }
    }

    fn notify(&mut self, notice: Notice) {
        let mark = match notice.kind {
            NoticeKind::Success => "✔",
            NoticeKind::Error => "✖",
            NoticeKind::Info => "ℹ",
        };
        println!("{mark} {}", notice.message);
    }

    fn session_expired(&mut self) {
        println!("（回到登入畫面）");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env().context("讀取配置失敗")?;
    let username = std::env::var("EGGVAULT_USER").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("EGGVAULT_PASSWORD").unwrap_or_else(|_| "admin".to_string());

    tracing::info!("連線到 {}", config.base_url);
    let renderer = ConsoleRenderer {
        moeda: "BRL".to_string(),
    };
    let mut session = Session::new(&config, renderer)?;

    session.login(&username, &password).await?;
    let moeda = session.state().settings.moeda.clone();
    session.renderer_mut().moeda = moeda;

    for section in Section::ALL {
        // 錯誤已經透過 notify 顯示
        let _ = session.navigate(section).await;
    }

    if let Some(info) = session.check_for_updates(None).await? {
        println!("\n後端版本 {}", info.current_version);
        for release in info.versions.iter().take(3) {
            println!("  - {}", release.heading());
        }
    }

    session.logout().await;
    Ok(())
}
