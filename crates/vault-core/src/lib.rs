//! # Vault Core
//!
//! 核心資料模型與類型定義

pub mod month;
pub mod records;
pub mod report;
pub mod requests;
pub mod section;
pub mod settings;

// Re-export 主要類型
pub use month::MonthKey;
pub use records::{
    parse_timestamp, Consumo, Despesa, Entrada, Estoque, Preco, Quebrado, Saida, StockLevel,
    Usuario,
};
pub use report::{MonthlyReport, Release, VersionInfo};
pub use requests::{
    ChangePasswordRequest, ConsumoRequest, DespesaRequest, EntradaRequest, FeatureFlagsRequest,
    LoginRequest, LoginResponse, NewUserRequest, PrecoRequest, QuebradoRequest,
    ResetPasswordRequest, VendaRequest,
};
pub use section::Section;
pub use settings::{AdminSettings, ConsumoFlag, DateFormat, GeneralSettings};

/// Vault 錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    /// 表單驗證失敗（訊息直接顯示給使用者）
    #[error("{0}")]
    Validation(String),

    #[error("無效的月份: {0}")]
    InvalidMonth(String),

    #[error("未知的區塊: {0}")]
    UnknownSection(String),

    #[error("區塊 {0} 不按月份分區")]
    NotMonthScoped(Section),

    #[error("區塊 {0} 沒有可撤銷的記錄")]
    NotUndoable(Section),

    #[error("配置錯誤: {0}")]
    Config(String),
}

impl VaultError {
    /// 建立驗證錯誤
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
