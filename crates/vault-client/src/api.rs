//! REST 客戶端
//!
//! 所有回應都包在 `{success, data?, message?, error?}` 信封裡；
//! 401 一律視為登入逾期，不看信封內容。

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use vault_core::{
    AdminSettings, ChangePasswordRequest, Consumo, ConsumoFlag, ConsumoRequest, Despesa,
    DespesaRequest, Entrada, EntradaRequest, Estoque, FeatureFlagsRequest, GeneralSettings,
    LoginRequest, LoginResponse, MonthKey, MonthlyReport, NewUserRequest, Preco, PrecoRequest,
    Quebrado, QuebradoRequest, ResetPasswordRequest, Saida, Section, Usuario, VaultError,
    VendaRequest, VersionInfo,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result, MSG_BAD_CREDENTIALS, MSG_UNKNOWN};

/// 回應信封
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    /// 其餘頂層欄位（例如新增後的 `id`、版本資訊）
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl Envelope {
    fn into_response<T: DeserializeOwned>(self) -> Result<ApiResponse<T>> {
        let data = serde_json::from_value(self.data.unwrap_or(Value::Null))?;
        Ok(ApiResponse {
            data,
            message: self.message,
        })
    }

    fn into_ack(self) -> Ack {
        Ack {
            id: self.extra.get("id").and_then(Value::as_i64),
            message: self.message.unwrap_or_default(),
        }
    }
}

/// 解包後的成功回應
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub data: T,
    pub message: Option<String>,
}

/// 寫入操作的確認
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
    pub message: String,
    /// 新建記錄的 ID
    pub id: Option<i64>,
}

/// 後端 REST 客戶端
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            token: None,
        })
    }

    /// 建構器模式：設置登入令牌
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::debug!("{} {}", method, path);
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 送出請求並檢查 401
    async fn dispatch(&mut self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!("回應狀態 {} ({})", status, response.url().path());

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("登入已逾期，清除令牌");
            self.token = None;
            return Err(ClientError::SessionExpired);
        }
        Ok(response)
    }

    async fn envelope(&mut self, builder: RequestBuilder) -> Result<Envelope> {
        let response = self.dispatch(builder).await?;
        let body = response.bytes().await?;
        let envelope: Envelope = serde_json::from_slice(&body)?;

        if !envelope.success {
            let message = envelope
                .error
                .or(envelope.message)
                .unwrap_or_else(|| MSG_UNKNOWN.to_string());
            tracing::warn!("後端拒絕請求: {}", message);
            return Err(ClientError::Rejected(message));
        }
        Ok(envelope)
    }

    async fn get<T: DeserializeOwned>(&mut self, path: &str) -> Result<ApiResponse<T>> {
        let builder = self.request(Method::GET, path);
        self.envelope(builder).await?.into_response()
    }

    async fn send<B: Serialize + ?Sized>(&mut self, method: Method, path: &str, body: &B) -> Result<Ack> {
        let builder = self.request(method, path).json(body);
        Ok(self.envelope(builder).await?.into_ack())
    }

    async fn delete(&mut self, path: &str) -> Result<Ack> {
        let builder = self.request(Method::DELETE, path);
        Ok(self.envelope(builder).await?.into_ack())
    }

    /// 下載檔案（沒有信封）
    async fn download(&mut self, path: &str) -> Result<Vec<u8>> {
        let builder = self.request(Method::GET, path);
        let response = self.dispatch(builder).await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Envelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error.or(envelope.message))
                .unwrap_or_else(|| MSG_UNKNOWN.to_string());
            tracing::warn!("下載失敗 {}: {}", status, message);
            return Err(ClientError::Rejected(message));
        }
        Ok(body.to_vec())
    }

    fn ledger_path(section: Section) -> Result<String> {
        section
            .ledger_resource()
            .map(|resource| format!("/api/{resource}"))
            .ok_or(ClientError::Core(VaultError::NotUndoable(section)))
    }

    // ── 庫存與日記帳 ──

    pub async fn estoque(&mut self) -> Result<Estoque> {
        Ok(self.get("/api/estoque").await?.data)
    }

    pub async fn entradas(&mut self, month: MonthKey) -> Result<Vec<Entrada>> {
        Ok(self.get(&format!("/api/entradas?mes={month}")).await?.data)
    }

    pub async fn saidas(&mut self, month: MonthKey) -> Result<Vec<Saida>> {
        Ok(self.get(&format!("/api/saidas?mes={month}")).await?.data)
    }

    pub async fn quebrados(&mut self, month: MonthKey) -> Result<Vec<Quebrado>> {
        Ok(self.get(&format!("/api/quebrados?mes={month}")).await?.data)
    }

    pub async fn consumo(&mut self, month: MonthKey) -> Result<Vec<Consumo>> {
        Ok(self.get(&format!("/api/consumo?mes={month}")).await?.data)
    }

    pub async fn despesas(&mut self, month: MonthKey) -> Result<Vec<Despesa>> {
        Ok(self.get(&format!("/api/despesas?mes={month}")).await?.data)
    }

    pub async fn create_entrada(&mut self, request: &EntradaRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/entradas", request).await
    }

    pub async fn create_venda(&mut self, request: &VendaRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/saidas", request).await
    }

    pub async fn create_quebrado(&mut self, request: &QuebradoRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/quebrados", request).await
    }

    pub async fn create_consumo(&mut self, request: &ConsumoRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/consumo", request).await
    }

    pub async fn create_despesa(&mut self, request: &DespesaRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/despesas", request).await
    }

    /// 撤銷記錄（後端同時回復庫存與營收）
    pub async fn undo(&mut self, section: Section, id: i64) -> Result<Ack> {
        let path = format!("{}/{id}", Self::ledger_path(section)?);
        self.delete(&path).await
    }

    /// 有資料的月份（新到舊）
    pub async fn months(&mut self) -> Result<Vec<MonthKey>> {
        Ok(self.get("/api/meses").await?.data)
    }

    // ── 價格 ──

    pub async fn active_price(&mut self) -> Result<Option<Preco>> {
        Ok(self.get("/api/precos/ativo").await?.data)
    }

    pub async fn price_history(&mut self) -> Result<Vec<Preco>> {
        Ok(self.get("/api/precos").await?.data)
    }

    pub async fn set_price(&mut self, request: &PrecoRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/precos", request).await
    }

    // ── 報表 ──

    pub async fn monthly_report(&mut self, month: MonthKey) -> Result<MonthlyReport> {
        let report: Option<MonthlyReport> = self.get(&format!("/api/relatorio?mes={month}")).await?.data;
        Ok(report.unwrap_or_else(|| MonthlyReport::empty(month.to_string())))
    }

    pub async fn annual_report(&mut self, year: i32) -> Result<Vec<MonthlyReport>> {
        Ok(self.get(&format!("/api/relatorio/anual?ano={year}")).await?.data)
    }

    pub async fn export_excel(&mut self, month: MonthKey) -> Result<Vec<u8>> {
        self.download(&format!("/api/export/excel?mes={month}")).await
    }

    pub async fn export_pdf(&mut self, month: MonthKey) -> Result<Vec<u8>> {
        self.download(&format!("/api/export/pdf?mes={month}")).await
    }

    pub async fn export_excel_annual(&mut self, year: i32) -> Result<Vec<u8>> {
        self.download(&format!("/api/export/excel-anual?ano={year}")).await
    }

    // ── 設定 ──

    pub async fn general_settings(&mut self) -> Result<GeneralSettings> {
        Ok(self.get("/api/configuracoes/gerais").await?.data)
    }

    pub async fn consumo_enabled(&mut self) -> Result<bool> {
        let flag: ConsumoFlag = self.get("/api/configuracoes/consumo-habilitado").await?.data;
        Ok(flag.habilitado)
    }

    pub async fn admin_settings(&mut self) -> Result<AdminSettings> {
        Ok(self.get("/api/admin/configuracoes").await?.data)
    }

    pub async fn save_general_settings(&mut self, settings: &GeneralSettings) -> Result<Ack> {
        self.send(Method::PUT, "/api/admin/configuracoes", settings).await
    }

    pub async fn save_feature_flags(&mut self, flags: &FeatureFlagsRequest) -> Result<Ack> {
        self.send(Method::PUT, "/api/admin/configuracoes", flags).await
    }

    // ── 登入 ──

    /// 登入；成功後保存令牌
    ///
    /// 登入失敗的 401 代表帳號密碼錯誤，不是逾期。
    pub async fn login(&mut self, request: &LoginRequest) -> Result<LoginResponse> {
        let builder = self.request(Method::POST, "/api/auth/login").json(request);
        let response: LoginResponse = match self.envelope(builder).await {
            Ok(envelope) => envelope.into_response()?.data,
            Err(ClientError::SessionExpired) => {
                return Err(ClientError::Rejected(MSG_BAD_CREDENTIALS.to_string()))
            }
            Err(err) => return Err(err),
        };
        self.token = Some(response.token.clone());
        Ok(response)
    }

    pub async fn me(&mut self) -> Result<Usuario> {
        Ok(self.get("/api/auth/me").await?.data)
    }

    /// 登出並清除令牌（後端錯誤不影響本地登出）
    pub async fn logout(&mut self) {
        let builder = self.request(Method::POST, "/api/auth/logout");
        if let Err(err) = self.dispatch(builder).await {
            tracing::debug!("登出請求失敗: {}", err);
        }
        self.token = None;
    }

    pub async fn change_password(&mut self, request: &ChangePasswordRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/auth/alterar-senha", request).await
    }

    // ── 使用者管理 ──

    pub async fn users(&mut self) -> Result<Vec<Usuario>> {
        Ok(self.get("/api/admin/usuarios").await?.data)
    }

    pub async fn create_user(&mut self, request: &NewUserRequest) -> Result<Ack> {
        self.send(Method::POST, "/api/admin/usuarios", request).await
    }

    pub async fn reset_password(&mut self, user_id: i64, request: &ResetPasswordRequest) -> Result<Ack> {
        self.send(Method::PUT, &format!("/api/admin/usuarios/{user_id}"), request)
            .await
    }

    pub async fn delete_user(&mut self, user_id: i64) -> Result<Ack> {
        self.delete(&format!("/api/admin/usuarios/{user_id}")).await
    }

    // ── 版本 ──

    /// 版本資訊（欄位在信封頂層）；沒有 `currentVersion` 時回傳 `None`
    pub async fn version(&mut self) -> Result<Option<VersionInfo>> {
        let builder = self.request(Method::GET, "/api/version");
        let envelope = self.envelope(builder).await?;
        if !envelope.extra.contains_key("currentVersion") {
            return Ok(None);
        }
        Ok(Some(serde_json::from_value(Value::Object(envelope.extra))?))
    }
}
