//! 銷售表單：數量 × 單價 × 總額 連動
//!
//! 單價與總額互相推導，數量變動時依最後編輯的欄位決定要重算哪一個。
//! 每次重算都只寫入「另一個」欄位，不會回頭觸發自己的變更處理，
//! 因此不會出現互相更新的迴圈。

use rust_decimal::Decimal;
use vault_core::VendaRequest;

use crate::money::{format_decimal_input, parse_decimal_input, parse_quantity_input, round2};
use crate::validation;

/// 最後編輯的衍生欄位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// 尚未編輯單價或總額
    #[default]
    Idle,
    /// 單價為準，總額由數量 × 單價推導
    EditingPrice,
    /// 總額為準，單價由總額 ÷ 數量推導
    EditingTotal,
}

/// 三個欄位的目前值
///
/// 使用者輸入的欄位保留原始精度，推導出的欄位四捨五入到兩位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldSnapshot {
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// 欄位顯示值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDisplay {
    pub quantity: String,
    pub unit_price: String,
    pub total: String,
}

/// 連動欄位協調器
#[derive(Debug, Clone, Default)]
pub struct LinkedFieldReconciler {
    fields: FieldSnapshot,
    mode: EditMode,
}

impl LinkedFieldReconciler {
    /// 創建空白表單
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> FieldSnapshot {
        self.fields
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// 數量變動
    ///
    /// 總額為準時重算單價（數量 ≤ 0 時保持不變），否則重算總額。
    pub fn on_quantity_changed(&mut self, quantity: i64) -> FieldSnapshot {
        self.fields.quantity = quantity;
        match self.mode {
            EditMode::EditingTotal => self.derive_unit_price(),
            EditMode::Idle | EditMode::EditingPrice => self.derive_total(),
        }
        self.fields
    }

    /// 單價變動：單價成為依據，重算總額
    pub fn on_unit_price_changed(&mut self, unit_price: Decimal) -> FieldSnapshot {
        self.mode = EditMode::EditingPrice;
        self.fields.unit_price = unit_price;
        self.derive_total();
        self.fields
    }

    /// 總額變動：總額成為依據，數量 > 0 時重算單價
    pub fn on_total_changed(&mut self, total: Decimal) -> FieldSnapshot {
        self.mode = EditMode::EditingTotal;
        self.fields.total = total;
        self.derive_unit_price();
        self.fields
    }

    pub fn on_quantity_input(&mut self, raw: &str) -> FieldSnapshot {
        self.on_quantity_changed(parse_quantity_input(raw))
    }

    pub fn on_unit_price_input(&mut self, raw: &str) -> FieldSnapshot {
        self.on_unit_price_changed(parse_decimal_input(raw))
    }

    pub fn on_total_input(&mut self, raw: &str) -> FieldSnapshot {
        self.on_total_changed(parse_decimal_input(raw))
    }

    /// 預填單價（例如剛設定新價格），不算使用者編輯
    pub fn seed_unit_price(&mut self, unit_price: Decimal) -> FieldSnapshot {
        self.mode = EditMode::Idle;
        self.fields.unit_price = unit_price;
        self.derive_total();
        self.fields
    }

    /// 總額 = round2(數量 × 單價)；溢位時保持原值
    fn derive_total(&mut self) {
        match Decimal::from(self.fields.quantity).checked_mul(self.fields.unit_price) {
            Some(total) => self.fields.total = round2(total),
            None => tracing::debug!(
                "總額溢位，保持原值: {} × {}",
                self.fields.quantity,
                self.fields.unit_price
            ),
        }
    }

    /// 單價 = round2(總額 ÷ 數量)，數量 ≤ 0 時保持原值
    fn derive_unit_price(&mut self) {
        if self.fields.quantity <= 0 {
            return;
        }
        if let Some(unit_price) = self.fields.total.checked_div(Decimal::from(self.fields.quantity)) {
            self.fields.unit_price = round2(unit_price);
        }
    }

    /// 清空表單
    pub fn reset(&mut self) {
        self.fields = FieldSnapshot::default();
        self.mode = EditMode::Idle;
    }

    /// 欄位顯示值（金額固定兩位小數、`,` 小數點）
    pub fn display(&self) -> FieldDisplay {
        FieldDisplay {
            quantity: self.fields.quantity.to_string(),
            unit_price: format_decimal_input(self.fields.unit_price),
            total: format_decimal_input(self.fields.total),
        }
    }

    /// 組出銷售請求
    ///
    /// 只有使用者直接輸入總額（且 > 0）時才送出 `valor_total`。
    pub fn sale_request(&self) -> vault_core::Result<VendaRequest> {
        validation::validate_sale(self.fields.quantity, self.fields.unit_price)?;

        let valor_total = (self.mode == EditMode::EditingTotal && self.fields.total > Decimal::ZERO)
            .then_some(self.fields.total);

        Ok(VendaRequest {
            quantidade: self.fields.quantity,
            preco_unitario: self.fields.unit_price,
            valor_total,
        })
    }
}
