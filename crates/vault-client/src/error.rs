//! 客戶端錯誤類型

use vault_core::VaultError;

pub const MSG_SESSION_EXPIRED: &str = "Sessão expirada. Faça login novamente.";
pub const MSG_CONNECTION: &str = "Erro de conexão com o servidor";
pub const MSG_UNKNOWN: &str = "Erro desconhecido";
pub const MSG_BAD_CREDENTIALS: &str = "Credenciais inválidas";

/// 客戶端錯誤
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// 網路或 HTTP 層失敗
    #[error("連線失敗: {0}")]
    Transport(#[from] reqwest::Error),

    /// 後端回應 401
    #[error("{}", MSG_SESSION_EXPIRED)]
    SessionExpired,

    /// 後端回應 `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("回應解析失敗: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] VaultError),
}

impl ClientError {
    /// 顯示給使用者的訊息
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Transport(_) => MSG_CONNECTION.to_string(),
            ClientError::SessionExpired => MSG_SESSION_EXPIRED.to_string(),
            ClientError::Rejected(message) => message.clone(),
            ClientError::Decode(_) => MSG_UNKNOWN.to_string(),
            ClientError::Core(err) => err.to_string(),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, ClientError::SessionExpired)
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(ClientError::SessionExpired.user_message(), MSG_SESSION_EXPIRED);
        assert_eq!(
            ClientError::Rejected("Estoque insuficiente".into()).user_message(),
            "Estoque insuficiente"
        );
        assert_eq!(
            ClientError::from(VaultError::validation("Descrição é obrigatória")).user_message(),
            "Descrição é obrigatória"
        );

        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ClientError::from(decode).user_message(), MSG_UNKNOWN);
    }
}
