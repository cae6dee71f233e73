//! # Vault Client
//!
//! 後端 REST 客戶端與儀表板工作階段

pub mod api;
pub mod config;
pub mod error;
pub mod render;
pub mod session;

// Re-export 主要類型
pub use api::{Ack, ApiClient, ApiResponse};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use render::{
    AdminView, Notice, NoticeKind, PriceBoard, RecordingRenderer, Renderer, SalesView,
    SectionView, StockLedger, StockOverview,
};
pub use session::{Session, SessionState};
