//! 時間戳顯示格式

use chrono::TimeZone;
use chrono_tz::Tz;
use vault_core::{parse_timestamp, DateFormat, GeneralSettings};

/// 無法顯示的時間
pub const MISSING: &str = "—";

const FALLBACK_TZ: Tz = chrono_tz::America::Sao_Paulo;

/// 依設定的時區與日期格式顯示後端時間戳
///
/// 後端時間戳視為 UTC。
pub fn format_datetime(raw: &str, settings: &GeneralSettings) -> String {
    let Some(naive) = parse_timestamp(raw) else {
        return MISSING.to_string();
    };

    let tz: Tz = settings.timezone.parse().unwrap_or_else(|_| {
        tracing::warn!("未知的時區 {}，改用 America/Sao_Paulo", settings.timezone);
        FALLBACK_TZ
    });
    let local = tz.from_utc_datetime(&naive);

    let pattern = match settings.date_format() {
        DateFormat::DayMonthYear => "%d/%m/%Y %H:%M",
        DateFormat::MonthDayYear => "%m/%d/%Y, %H:%M",
        DateFormat::Iso => "%Y-%m-%d %H:%M",
    };
    local.format(pattern).to_string()
}
