//! 時鐘抽象（快取新鮮度用）

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 毫秒時鐘
pub trait Clock {
    /// 目前時間（epoch 毫秒，必須單調不減）
    fn now_ms(&self) -> u64;

    /// 今天的日期（日記帳分組用）
    fn today(&self) -> NaiveDate;
}

/// 系統時鐘
///
/// 啟動時對齊 epoch，之後以 `Instant` 前進，系統時間被調整也不會倒退。
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
    origin_epoch_ms: u64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            origin_epoch_ms: Utc::now().timestamp_millis().max(0) as u64,
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin_epoch_ms + self.origin.elapsed().as_millis() as u64
    }

    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// 手動時鐘（測試用）
///
/// 複製出的實例共用同一個時間。
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms: Arc::new(AtomicU64::new(now_ms)),
        }
    }

    /// 從指定的 UTC 時間開始
    pub fn at(start: NaiveDateTime) -> Self {
        Self::new(start.and_utc().timestamp_millis().max(0) as u64)
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: u64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn today(&self) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms() as i64)
            .map(|dt| dt.date_naive())
            .unwrap_or_default()
    }
}
