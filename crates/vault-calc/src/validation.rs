//! 表單驗證（訊息直接顯示給使用者）

use rust_decimal::Decimal;
use vault_core::{
    ChangePasswordRequest, ConsumoRequest, DespesaRequest, EntradaRequest, GeneralSettings,
    NewUserRequest, PrecoRequest, QuebradoRequest, ResetPasswordRequest, Result, VaultError,
};

use crate::money::{parse_decimal_prefix, parse_integer_prefix};

pub const MSG_QUANTITY: &str = "Quantidade deve ser um número positivo";
pub const MSG_UNIT_PRICE: &str = "Preço unitário inválido";
pub const MSG_EXPENSE_VALUE: &str = "Valor deve ser um número positivo";
pub const MSG_EXPENSE_DESCRIPTION: &str = "Descrição é obrigatória";
pub const MSG_NEW_PRICE: &str = "Preço deve ser um número não negativo";
pub const MSG_FARM_NAME: &str = "Nome da fazenda é obrigatório";
pub const MSG_PASSWORD_SHORT: &str = "Nova senha deve ter no mínimo 4 caracteres";
pub const MSG_PASSWORD_MISMATCH: &str = "As senhas não coincidem";
pub const MSG_USERNAME: &str = "Usuário é obrigatório";

/// 密碼最短長度
pub const MIN_PASSWORD_LEN: usize = 4;

/// 數量必須為正整數
pub fn validate_quantity(raw: &str) -> Result<i64> {
    match parse_integer_prefix(raw) {
        Some(quantity) if quantity > 0 => Ok(quantity),
        _ => Err(VaultError::validation(MSG_QUANTITY)),
    }
}

/// 銷售：數量 > 0 且單價 ≥ 0
pub fn validate_sale(quantity: i64, unit_price: Decimal) -> Result<()> {
    if quantity <= 0 {
        return Err(VaultError::validation(MSG_QUANTITY));
    }
    if unit_price < Decimal::ZERO {
        return Err(VaultError::validation(MSG_UNIT_PRICE));
    }
    Ok(())
}

pub fn entrada_request(quantidade: &str, observacao: &str) -> Result<EntradaRequest> {
    Ok(EntradaRequest {
        quantidade: validate_quantity(quantidade)?,
        observacao: observacao.trim().to_string(),
    })
}

pub fn quebrado_request(quantidade: &str, motivo: &str) -> Result<QuebradoRequest> {
    Ok(QuebradoRequest {
        quantidade: validate_quantity(quantidade)?,
        motivo: motivo.trim().to_string(),
    })
}

pub fn consumo_request(quantidade: &str, observacao: &str) -> Result<ConsumoRequest> {
    Ok(ConsumoRequest {
        quantidade: validate_quantity(quantidade)?,
        observacao: observacao.trim().to_string(),
    })
}

/// 支出：金額 > 0，說明必填
pub fn despesa_request(valor: &str, descricao: &str) -> Result<DespesaRequest> {
    let valor = match parse_decimal_prefix(valor) {
        Some(valor) if valor > Decimal::ZERO => valor,
        _ => return Err(VaultError::validation(MSG_EXPENSE_VALUE)),
    };
    let descricao = descricao.trim();
    if descricao.is_empty() {
        return Err(VaultError::validation(MSG_EXPENSE_DESCRIPTION));
    }
    Ok(DespesaRequest {
        valor,
        descricao: descricao.to_string(),
    })
}

/// 新價格：≥ 0
pub fn preco_request(preco_unitario: &str) -> Result<PrecoRequest> {
    match parse_decimal_prefix(preco_unitario) {
        Some(preco_unitario) if preco_unitario >= Decimal::ZERO => Ok(PrecoRequest { preco_unitario }),
        _ => Err(VaultError::validation(MSG_NEW_PRICE)),
    }
}

/// 一般設定：農場名稱必填（去除前後空白）
pub fn general_settings(settings: GeneralSettings) -> Result<GeneralSettings> {
    let nome = settings.nome_fazenda.trim().to_string();
    if nome.is_empty() {
        return Err(VaultError::validation(MSG_FARM_NAME));
    }
    Ok(settings.with_nome_fazenda(nome))
}

fn validate_new_password(nova_senha: &str, confirmacao: &str) -> Result<()> {
    if nova_senha.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::validation(MSG_PASSWORD_SHORT));
    }
    if nova_senha != confirmacao {
        return Err(VaultError::validation(MSG_PASSWORD_MISMATCH));
    }
    Ok(())
}

pub fn change_password_request(
    senha_atual: &str,
    nova_senha: &str,
    confirmacao: &str,
) -> Result<ChangePasswordRequest> {
    validate_new_password(nova_senha, confirmacao)?;
    Ok(ChangePasswordRequest {
        senha_atual: senha_atual.to_string(),
        nova_senha: nova_senha.to_string(),
    })
}

pub fn reset_password_request(nova_senha: &str, confirmacao: &str) -> Result<ResetPasswordRequest> {
    validate_new_password(nova_senha, confirmacao)?;
    Ok(ResetPasswordRequest {
        nova_senha: nova_senha.to_string(),
    })
}

pub fn new_user_request(
    username: &str,
    password: &str,
    nome: &str,
    is_admin: bool,
) -> Result<NewUserRequest> {
    let username = username.trim();
    if username.is_empty() {
        return Err(VaultError::validation(MSG_USERNAME));
    }
    Ok(NewUserRequest {
        username: username.to_string(),
        password: password.to_string(),
        nome: nome.trim().to_string(),
        is_admin,
    })
}
