//! REST 請求與回應主體

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Usuario;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntradaRequest {
    pub quantidade: i64,
    pub observacao: String,
}

/// 銷售請求
///
/// 使用者直接輸入總額時才帶上 `valor_total`。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendaRequest {
    pub quantidade: i64,
    pub preco_unitario: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valor_total: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuebradoRequest {
    pub quantidade: i64,
    pub motivo: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumoRequest {
    pub quantidade: i64,
    pub observacao: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DespesaRequest {
    pub valor: Decimal,
    pub descricao: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrecoRequest {
    pub preco_unitario: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureFlagsRequest {
    pub consumo_habilitado: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登入成功的回應資料
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub usuario: Usuario,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangePasswordRequest {
    pub senha_atual: String,
    pub nova_senha: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUserRequest {
    pub username: String,
    pub password: String,
    pub nome: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetPasswordRequest {
    pub nova_senha: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_venda_omits_total_when_absent() {
        let body = serde_json::to_value(VendaRequest {
            quantidade: 12,
            preco_unitario: Decimal::new(250, 2),
            valor_total: None,
        })
        .unwrap();

        assert_eq!(body, json!({ "quantidade": 12, "preco_unitario": 2.5 }));
    }

    #[test]
    fn test_venda_carries_total_when_present() {
        let body = serde_json::to_value(VendaRequest {
            quantidade: 12,
            preco_unitario: Decimal::new(250, 2),
            valor_total: Some(Decimal::from(30)),
        })
        .unwrap();

        assert_eq!(body["valor_total"], json!(30.0));
    }
}
