//! # EggVault
//!
//! 雞蛋庫存儀表板的客戶端核心

pub use vault_cache as cache;
pub use vault_calc as calc;
pub use vault_client as client;
pub use vault_core as model;

pub use vault_cache::{Mutation, TabCache};
pub use vault_calc::LinkedFieldReconciler;
pub use vault_client::{ApiClient, ClientConfig, ClientError, Renderer, Session};
pub use vault_core::{MonthKey, Section, VaultError};
