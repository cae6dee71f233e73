//! 分頁資料快取（TTL + 變更失效）

use std::collections::HashMap;
use std::fmt;
use vault_core::Section;

use crate::clock::{Clock, SystemClock};
use crate::invalidation::Mutation;

/// 預設有效時間：30 秒
pub const DEFAULT_TTL_MS: u64 = 30_000;

/// 快取鍵（區塊 + 範圍，範圍通常是月份）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub section: Section,
    pub scope: String,
}

impl CacheKey {
    pub fn new(section: Section, scope: impl Into<String>) -> Self {
        Self {
            section,
            scope: scope.into(),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.section, self.scope)
    }
}

/// 載入時間
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntry {
    pub timestamp_ms: u64,
}

/// 分頁快取
///
/// 只記錄「何時載入過」，資料本身由畫面持有。
pub struct TabCache<C: Clock = SystemClock> {
    entries: HashMap<Section, HashMap<String, CacheEntry>>,
    ttl_ms: u64,
    clock: C,
}

impl TabCache<SystemClock> {
    /// 創建使用系統時鐘的快取
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for TabCache<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TabCache<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms: DEFAULT_TTL_MS,
            clock,
        }
    }

    /// 設置有效時間
    pub fn with_ttl(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = ttl_ms;
        self
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn entry(&self, section: Section, scope: &str) -> Option<CacheEntry> {
        self.entries
            .get(&section)
            .and_then(|scopes| scopes.get(scope))
            .copied()
    }

    /// 載入後經過的毫秒數
    pub fn age_ms(&self, section: Section, scope: &str) -> Option<u64> {
        self.entry(section, scope)
            .map(|entry| self.clock.now_ms().saturating_sub(entry.timestamp_ms))
    }

    /// 是否仍在有效時間內
    pub fn is_valid(&self, section: Section, scope: &str) -> bool {
        match self.age_ms(section, scope) {
            Some(age) if age < self.ttl_ms => {
                tracing::trace!("快取命中 {}:{} ({} ms)", section, scope, age);
                true
            }
            Some(age) => {
                tracing::trace!("快取過期 {}:{} ({} ms)", section, scope, age);
                false
            }
            None => {
                tracing::trace!("快取未命中 {}:{}", section, scope);
                false
            }
        }
    }

    /// 標記為剛載入
    pub fn mark_loaded(&mut self, section: Section, scope: &str) {
        let timestamp_ms = self.clock.now_ms();
        tracing::trace!("標記已載入 {}", CacheKey::new(section, scope));
        self.entries
            .entry(section)
            .or_default()
            .insert(scope.to_string(), CacheEntry { timestamp_ms });
    }

    /// 清除指定區塊的所有範圍；空切片清除全部
    ///
    /// 回傳移除的條目數。
    pub fn invalidate(&mut self, sections: &[Section]) -> usize {
        if sections.is_empty() {
            return self.invalidate_all();
        }

        let removed = sections
            .iter()
            .filter_map(|section| self.entries.remove(section))
            .map(|scopes| scopes.len())
            .sum();
        tracing::debug!("快取失效 {:?}: 移除 {} 筆", sections, removed);
        removed
    }

    /// 清除全部條目
    pub fn invalidate_all(&mut self) -> usize {
        let removed = self.len();
        self.entries.clear();
        tracing::debug!("快取全部失效: 移除 {} 筆", removed);
        removed
    }

    /// 套用變更操作的失效規則
    pub fn apply(&mut self, mutation: Mutation) -> usize {
        match mutation.invalidated_sections() {
            Some(sections) => self.invalidate(sections),
            None => self.invalidate_all(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 所有條目的鍵（排序後）
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self
            .entries
            .iter()
            .flat_map(|(section, scopes)| {
                scopes.keys().map(move |scope| CacheKey::new(*section, scope.clone()))
            })
            .collect();
        keys.sort_by(|a, b| (a.section, &a.scope).cmp(&(b.section, &b.scope)));
        keys
    }
}
