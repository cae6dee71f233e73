//! 金額輸入解析與顯示格式

use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

/// 四捨五入到兩位小數（遠離零）
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// 解析輸入欄位的數值前綴
///
/// 第一個 `,` 視為小數點，之後取最長的合法數字前綴（可帶正負號與指數）。
/// 完全無法解析時回傳 `None`。
pub fn parse_decimal_prefix(raw: &str) -> Option<Decimal> {
    let normalized = raw.trim().replacen(',', ".", 1);
    let bytes = normalized.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let sign_len = end;

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    // 整數與小數部分合計至少要有一位數字
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        // 只有小數點而沒有任何數字時不算
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // 指數只有在後面接著數字時才算數（"2e" 解析為 2，"2e3" 為 2000）
    let mantissa_end = end;
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    let mut mantissa = normalized[sign_len..mantissa_end].trim_end_matches('.').to_string();
    if mantissa.starts_with('.') {
        mantissa.insert(0, '0');
    }
    let negative = normalized.starts_with('-');

    // 超出 Decimal 範圍的指數視為無法解析
    let value = if end > mantissa_end {
        Decimal::from_scientific(&format!("{}{}", mantissa, &normalized[mantissa_end..end])).ok()?
    } else {
        Decimal::from_str(&mantissa).ok()?
    };

    Some(if negative { -value } else { value })
}

/// 容錯解析：接受 `.` 與 `,` 小數點，無法解析時為 0
pub fn parse_decimal_input(raw: &str) -> Decimal {
    parse_decimal_prefix(raw).unwrap_or(Decimal::ZERO)
}

/// 解析整數前綴（例如 `"12 ovos"` → 12）
pub fn parse_integer_prefix(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }
    trimmed[..end].parse().ok()
}

/// 數量欄位：無法解析時為 0
pub fn parse_quantity_input(raw: &str) -> i64 {
    parse_integer_prefix(raw).unwrap_or(0)
}

/// 輸入欄位顯示：固定兩位小數，以 `,` 作為小數點
pub fn format_decimal_input(value: Decimal) -> String {
    format!("{:.2}", round2(value)).replace('.', ",")
}

/// 幣別顯示規則
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CurrencyStyle {
    symbol: &'static str,
    symbol_first: bool,
    spaced: bool,
    decimal_sep: char,
    group_sep: char,
    decimals: u32,
}

impl CurrencyStyle {
    const fn prefix(symbol: &'static str, spaced: bool, decimal_sep: char, group_sep: char) -> Self {
        Self {
            symbol,
            symbol_first: true,
            spaced,
            decimal_sep,
            group_sep,
            decimals: 2,
        }
    }

    const fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    fn lookup(moeda: &str) -> Self {
        match moeda.trim().to_ascii_uppercase().as_str() {
            "USD" | "MXN" => Self::prefix("$", false, '.', ','),
            "EUR" => Self {
                symbol: "€",
                symbol_first: false,
                spaced: true,
                decimal_sep: ',',
                group_sep: '.',
                decimals: 2,
            },
            "GBP" => Self::prefix("£", false, '.', ','),
            "JPY" => Self::prefix("￥", false, '.', ',').with_decimals(0),
            "ARS" | "COP" | "UYU" => Self::prefix("$", true, ',', '.'),
            "CLP" => Self::prefix("$", false, ',', '.').with_decimals(0),
            "PEN" => Self::prefix("S/", true, '.', ','),
            _ => Self::prefix("R$", true, ',', '.'),
        }
    }
}

/// 依幣別格式化金額，例如 BRL → `R$ 1.234,56`
///
/// 未知幣別使用 BRL 規則。
pub fn format_currency(value: Decimal, moeda: &str) -> String {
    let style = CurrencyStyle::lookup(moeda);
    let rounded = value
        .abs()
        .round_dp_with_strategy(style.decimals, RoundingStrategy::MidpointAwayFromZero);

    let plain = format!("{:.*}", style.decimals as usize, rounded);
    let (int_part, frac_part) = match plain.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (plain.as_str(), None),
    };

    let mut number = group_digits(int_part, style.group_sep);
    if let Some(frac) = frac_part {
        number.push(style.decimal_sep);
        number.push_str(frac);
    }

    let sign = if value.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let space = if style.spaced { " " } else { "" };

    if style.symbol_first {
        format!("{sign}{}{space}{number}", style.symbol)
    } else {
        format!("{sign}{number}{space}{}", style.symbol)
    }
}

fn group_digits(digits: &str, separator: char) -> String {
    let len = digits.len();
    let mut grouped = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(ch);
    }
    grouped
}
