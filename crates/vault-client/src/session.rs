//! 儀表板工作階段
//!
//! 持有 API 客戶端、分頁快取、銷售表單與目前狀態。
//! 所有方法都是 `&mut self`，呼叫天然依序執行。

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use vault_cache::{Clock, Mutation, SystemClock, TabCache};
use vault_calc::{
    format_currency, format_datetime, validation, DailyLedger, LinkedFieldReconciler, ReportView,
};
use vault_core::{
    FeatureFlagsRequest, GeneralSettings, LoginRequest, MonthKey, Section, Usuario, VaultError,
    VersionInfo,
};

use crate::api::{Ack, ApiClient};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::render::{
    AdminView, Notice, PriceBoard, Renderer, SalesView, SectionView, StockLedger, StockOverview,
};

pub const MSG_LOGGED_OUT: &str = "Você saiu do sistema";
pub const MSG_PASSWORD_CHANGED: &str = "Senha alterada! Faça login novamente.";

/// 目前的使用者與畫面狀態
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<Usuario>,
    pub current: Section,
    months: BTreeMap<Section, MonthKey>,
    pub settings: GeneralSettings,
    pub consumo_enabled: bool,
}

impl SessionState {
    /// 所有按月份分區的區塊都從本月開始
    pub fn new(current_month: MonthKey) -> Self {
        let months = Section::ALL
            .iter()
            .filter(|section| section.is_month_scoped())
            .map(|section| (*section, current_month))
            .collect();

        Self {
            user: None,
            current: Section::Estoque,
            months,
            settings: GeneralSettings::default(),
            consumo_enabled: false,
        }
    }

    pub fn month(&self, section: Section) -> Option<MonthKey> {
        self.months.get(&section).copied()
    }

    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_admin)
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// 快取範圍：月份或空字串
    pub fn scope(&self, section: Section) -> String {
        self.month(section).map(|month| month.to_string()).unwrap_or_default()
    }

    /// 依設定格式化金額
    pub fn currency(&self, value: Decimal) -> String {
        format_currency(value, &self.settings.moeda)
    }

    /// 依設定格式化時間戳
    pub fn datetime(&self, raw: &str) -> String {
        format_datetime(raw, &self.settings)
    }

    /// 實際要顯示的區塊（權限與功能開關）
    fn resolve(&self, requested: Section) -> Section {
        match requested {
            Section::Admin if !self.is_admin() => Section::Estoque,
            Section::Consumo if !self.consumo_enabled => Section::Estoque,
            other => other,
        }
    }
}

/// 儀表板工作階段
pub struct Session<R: Renderer, C: Clock = SystemClock> {
    api: ApiClient,
    cache: TabCache<C>,
    reconciler: LinkedFieldReconciler,
    state: SessionState,
    renderer: R,
}

impl<R: Renderer> Session<R, SystemClock> {
    pub fn new(config: &ClientConfig, renderer: R) -> Result<Self> {
        Self::with_clock(config, renderer, SystemClock::new())
    }
}

impl<R: Renderer, C: Clock> Session<R, C> {
    pub fn with_clock(config: &ClientConfig, renderer: R, clock: C) -> Result<Self> {
        let current_month = MonthKey::from_date(clock.today());
        Ok(Self {
            api: ApiClient::new(config)?,
            cache: TabCache::with_clock(clock).with_ttl(config.cache_ttl_ms),
            reconciler: LinkedFieldReconciler::new(),
            state: SessionState::new(current_month),
            renderer,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn cache(&self) -> &TabCache<C> {
        &self.cache
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn api_mut(&mut self) -> &mut ApiClient {
        &mut self.api
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn reconciler(&self) -> &LinkedFieldReconciler {
        &self.reconciler
    }

    /// 銷售表單（由畫面層轉送欄位輸入）
    pub fn reconciler_mut(&mut self) -> &mut LinkedFieldReconciler {
        &mut self.reconciler
    }

    // ── 登入 ──

    pub async fn login(&mut self, username: &str, password: &str) -> Result<Usuario> {
        let request = LoginRequest {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        let response = match self.api.login(&request).await {
            Ok(response) => response,
            Err(err) => {
                self.renderer.notify(Notice::error(err.user_message()));
                return Err(err);
            }
        };

        tracing::info!("使用者 {} 登入", response.usuario.username);
        let user = response.usuario;
        self.state.user = Some(user.clone());
        self.refresh_settings().await;
        self.refresh_consumo_flag().await;

        self.renderer
            .notify(Notice::success(format!("Bem-vindo, {}!", user.display_name())));
        // 首頁載入失敗已經提示過，不影響登入結果
        if let Err(err) = self.navigate(Section::Estoque).await {
            tracing::debug!("登入後載入庫存失敗: {}", err);
        }
        Ok(user)
    }

    /// 用保存的令牌恢復登入
    pub async fn restore(&mut self, token: &str) -> Result<Usuario> {
        self.api.set_token(token);
        match self.api.me().await {
            Ok(user) => {
                tracing::info!("恢復 {} 的工作階段", user.username);
                self.state.user = Some(user.clone());
                self.refresh_settings().await;
                self.refresh_consumo_flag().await;
                Ok(user)
            }
            Err(err) => {
                tracing::debug!("令牌無效: {}", err);
                self.sign_out();
                Err(err)
            }
        }
    }

    pub async fn logout(&mut self) {
        self.api.logout().await;
        self.sign_out();
        self.renderer.notify(Notice::info(MSG_LOGGED_OUT));
    }

    /// 修改密碼；成功後必須重新登入
    pub async fn change_password(
        &mut self,
        senha_atual: &str,
        nova_senha: &str,
        confirmacao: &str,
    ) -> Result<()> {
        let request =
            self.validated(validation::change_password_request(senha_atual, nova_senha, confirmacao))?;

        if let Err(err) = self.api.change_password(&request).await {
            self.report(&err);
            return Err(err);
        }

        self.renderer.notify(Notice::success(MSG_PASSWORD_CHANGED));
        self.sign_out();
        Ok(())
    }

    fn sign_out(&mut self) {
        self.api.clear_token();
        self.state.user = None;
        self.cache.invalidate_all();
        self.reconciler.reset();
        self.renderer.session_expired();
    }

    async fn refresh_settings(&mut self) {
        match self.api.general_settings().await {
            Ok(settings) => self.state.settings = settings,
            Err(err) => {
                tracing::warn!("無法載入一般設定，使用預設值: {}", err);
                self.state.settings = GeneralSettings::default();
            }
        }
    }

    async fn refresh_consumo_flag(&mut self) {
        self.state.consumo_enabled = match self.api.consumo_enabled().await {
            Ok(enabled) => enabled,
            Err(err) => {
                tracing::warn!("無法確認自用功能是否啟用: {}", err);
                false
            }
        };
    }

    // ── 導覽與載入 ──

    /// 切換區塊，回傳實際顯示的區塊
    pub async fn navigate(&mut self, requested: Section) -> Result<Section> {
        let section = self.state.resolve(requested);
        if section != requested {
            tracing::debug!("{} 不可用，改為 {}", requested, section);
        }
        self.state.current = section;
        self.load(section, false).await?;
        Ok(section)
    }

    /// 載入區塊；回傳是否真的向後端取資料
    ///
    /// 只有成功輸出畫面後才標記快取。
    pub async fn load(&mut self, section: Section, force: bool) -> Result<bool> {
        let scope = self.state.scope(section);
        if !force && self.cache.is_valid(section, &scope) {
            return Ok(false);
        }

        match self.fetch(section).await {
            Ok(view) => {
                self.renderer.render(view);
                self.cache.mark_loaded(section, &scope);
                Ok(true)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// 重新載入目前區塊
    pub async fn refresh(&mut self) -> Result<bool> {
        self.load(self.state.current, true).await
    }

    /// 月份前後移動，回傳新月份
    pub async fn change_month(&mut self, section: Section, delta: i32) -> Result<MonthKey> {
        let month = self
            .state
            .month(section)
            .ok_or(ClientError::Core(VaultError::NotMonthScoped(section)))?
            .shift(delta);
        self.select_month(section, month).await
    }

    /// 直接選擇月份（報表頁的月份選單）
    pub async fn select_month(&mut self, section: Section, month: MonthKey) -> Result<MonthKey> {
        if !section.is_month_scoped() {
            return Err(ClientError::Core(VaultError::NotMonthScoped(section)));
        }
        self.state.months.insert(section, month);
        self.load(section, false).await?;
        Ok(month)
    }

    fn month_of(&self, section: Section) -> Result<MonthKey> {
        self.state
            .month(section)
            .ok_or(ClientError::Core(VaultError::NotMonthScoped(section)))
    }

    async fn fetch(&mut self, section: Section) -> Result<SectionView> {
        let today = self.cache.clock().today();

        let view = match section {
            Section::Estoque => {
                let estoque = self.api.estoque().await?;
                let month_report = self.api.monthly_report(MonthKey::from_date(today)).await?;
                let active_price = self.api.active_price().await?;
                SectionView::Estoque(StockOverview {
                    estoque,
                    month_report,
                    active_price,
                })
            }
            Section::Entradas => {
                let month = self.month_of(section)?;
                let records = self.api.entradas(month).await?;
                SectionView::Entradas(DailyLedger::build(month, records, today))
            }
            Section::Vendas => {
                let month = self.month_of(section)?;
                let available = self.api.estoque().await?.quantidade_total;
                let active_price = self.api.active_price().await?;
                if let Some(preco) = &active_price {
                    if self.reconciler.snapshot().unit_price.is_zero() {
                        self.reconciler.seed_unit_price(preco.preco_unitario);
                    }
                }
                let records = self.api.saidas(month).await?;
                SectionView::Vendas(SalesView {
                    available,
                    active_price,
                    ledger: DailyLedger::build(month, records, today),
                })
            }
            Section::Quebrados => {
                let month = self.month_of(section)?;
                let available = self.api.estoque().await?.quantidade_total;
                let records = self.api.quebrados(month).await?;
                SectionView::Quebrados(StockLedger {
                    available,
                    ledger: DailyLedger::build(month, records, today),
                })
            }
            Section::Consumo => {
                let month = self.month_of(section)?;
                let available = self.api.estoque().await?.quantidade_total;
                let records = self.api.consumo(month).await?;
                SectionView::Consumo(StockLedger {
                    available,
                    ledger: DailyLedger::build(month, records, today),
                })
            }
            Section::Despesas => {
                let month = self.month_of(section)?;
                let records = self.api.despesas(month).await?;
                SectionView::Despesas(DailyLedger::build(month, records, today))
            }
            Section::Precos => SectionView::Precos(PriceBoard {
                active: self.api.active_price().await?,
                history: self.api.price_history().await?,
            }),
            Section::Relatorios => {
                let month = self.month_of(section)?;
                let summary = self.api.monthly_report(month).await?;
                let annual = self.api.annual_report(month.year()).await?;
                SectionView::Relatorios(ReportView::build(month, summary, annual))
            }
            Section::Admin => SectionView::Admin(AdminView {
                settings: self.api.admin_settings().await?,
                users: self.api.users().await?,
            }),
        };

        Ok(view)
    }

    // ── 寫入操作 ──

    pub async fn record_entrada(&mut self, quantidade: &str, observacao: &str) -> Result<Ack> {
        let request = self.validated(validation::entrada_request(quantidade, observacao))?;
        let result = self.api.create_entrada(&request).await;
        self.commit(result, Mutation::EntradaChanged, Section::Entradas).await
    }

    /// 用銷售表單目前的值登記銷售，成功後清空表單
    pub async fn record_venda(&mut self) -> Result<Ack> {
        let request = self.validated(self.reconciler.sale_request())?;
        let result = self.api.create_venda(&request).await;
        if result.is_ok() {
            self.reconciler.reset();
        }
        self.commit(result, Mutation::VendaChanged, Section::Vendas).await
    }

    pub async fn record_quebrado(&mut self, quantidade: &str, motivo: &str) -> Result<Ack> {
        let request = self.validated(validation::quebrado_request(quantidade, motivo))?;
        let result = self.api.create_quebrado(&request).await;
        self.commit(result, Mutation::QuebradoChanged, Section::Quebrados).await
    }

    pub async fn record_consumo(&mut self, quantidade: &str, observacao: &str) -> Result<Ack> {
        let request = self.validated(validation::consumo_request(quantidade, observacao))?;
        let result = self.api.create_consumo(&request).await;
        self.commit(result, Mutation::ConsumoChanged, Section::Consumo).await
    }

    pub async fn record_despesa(&mut self, valor: &str, descricao: &str) -> Result<Ack> {
        let request = self.validated(validation::despesa_request(valor, descricao))?;
        let result = self.api.create_despesa(&request).await;
        self.commit(result, Mutation::DespesaChanged, Section::Despesas).await
    }

    /// 撤銷一筆記錄（後端回復庫存）
    pub async fn undo(&mut self, section: Section, id: i64) -> Result<Ack> {
        let Some(mutation) = Mutation::ledger(section) else {
            let err = ClientError::Core(VaultError::NotUndoable(section));
            self.report(&err);
            return Err(err);
        };
        let result = self.api.undo(section, id).await;
        self.commit(result, mutation, section).await
    }

    /// 設定新價格，並預填到銷售表單
    pub async fn set_price(&mut self, preco_unitario: &str) -> Result<Ack> {
        let request = self.validated(validation::preco_request(preco_unitario))?;
        let result = self.api.set_price(&request).await;
        let ack = self.commit(result, Mutation::PriceSet, Section::Precos).await?;
        self.reconciler.seed_unit_price(request.preco_unitario);
        Ok(ack)
    }

    /// 儲存一般設定；所有畫面都要以新格式重新顯示
    pub async fn save_general_settings(&mut self, settings: GeneralSettings) -> Result<Ack> {
        let settings = self.validated(validation::general_settings(settings))?;
        let result = self.api.save_general_settings(&settings).await;
        let ack = self.acknowledge(result)?;
        self.refresh_settings().await;
        self.cache.apply(Mutation::GeneralSettingsSaved);
        self.reload_current_if(|_| true).await?;
        Ok(ack)
    }

    pub async fn save_feature_flags(&mut self, consumo_habilitado: bool) -> Result<Ack> {
        let request = FeatureFlagsRequest { consumo_habilitado };
        let result = self.api.save_feature_flags(&request).await;
        let ack = self.acknowledge(result)?;
        self.refresh_consumo_flag().await;
        self.cache.apply(Mutation::FeatureFlagsSaved);
        self.reload_current_if(|section| section == Section::Admin).await?;
        Ok(ack)
    }

    // ── 使用者管理 ──

    pub async fn create_user(
        &mut self,
        username: &str,
        password: &str,
        nome: &str,
        is_admin: bool,
    ) -> Result<Ack> {
        let request = self.validated(validation::new_user_request(username, password, nome, is_admin))?;
        let result = self.api.create_user(&request).await;
        self.commit(result, Mutation::UsersChanged, Section::Admin).await
    }

    pub async fn reset_user_password(
        &mut self,
        user_id: i64,
        nova_senha: &str,
        confirmacao: &str,
    ) -> Result<Ack> {
        let request = self.validated(validation::reset_password_request(nova_senha, confirmacao))?;
        let result = self.api.reset_password(user_id, &request).await;
        self.commit(result, Mutation::UsersChanged, Section::Admin).await
    }

    pub async fn delete_user(&mut self, user_id: i64) -> Result<Ack> {
        let result = self.api.delete_user(user_id).await;
        self.commit(result, Mutation::UsersChanged, Section::Admin).await
    }

    // ── 檔案匯出 ──

    pub async fn export_excel(&mut self) -> Result<Vec<u8>> {
        let month = self.month_of(Section::Relatorios)?;
        self.renderer
            .notify(Notice::info(format!("Baixando Excel de {}...", month.label())));
        let result = self.api.export_excel(month).await;
        self.downloaded(result)
    }

    pub async fn export_pdf(&mut self) -> Result<Vec<u8>> {
        let month = self.month_of(Section::Relatorios)?;
        self.renderer
            .notify(Notice::info(format!("Baixando PDF de {}...", month.label())));
        let result = self.api.export_pdf(month).await;
        self.downloaded(result)
    }

    pub async fn export_excel_annual(&mut self) -> Result<Vec<u8>> {
        let year = self.month_of(Section::Relatorios)?.year();
        self.renderer
            .notify(Notice::info(format!("Baixando Excel anual de {year}...")));
        let result = self.api.export_excel_annual(year).await;
        self.downloaded(result)
    }

    /// 後端版本與上次看過的不同時回傳版本資訊
    pub async fn check_for_updates(&mut self, last_seen: Option<&str>) -> Result<Option<VersionInfo>> {
        let info = self.api.version().await?;
        Ok(info.filter(|info| Some(info.current_version.as_str()) != last_seen))
    }

    // ── 內部 ──

    fn validated<T>(&mut self, result: vault_core::Result<T>) -> Result<T> {
        result.map_err(|err| {
            self.renderer.notify(Notice::error(err.to_string()));
            ClientError::Core(err)
        })
    }

    fn report(&mut self, err: &ClientError) {
        if err.is_session_expired() {
            tracing::warn!("工作階段逾期");
            self.renderer.notify(Notice::error(err.user_message()));
            self.state.user = None;
            self.cache.invalidate_all();
            self.renderer.session_expired();
        } else {
            self.renderer.notify(Notice::error(err.user_message()));
        }
    }

    fn downloaded(&mut self, result: Result<Vec<u8>>) -> Result<Vec<u8>> {
        result.map_err(|err| {
            self.report(&err);
            err
        })
    }

    fn acknowledge(&mut self, result: Result<Ack>) -> Result<Ack> {
        match result {
            Ok(ack) => {
                if !ack.message.is_empty() {
                    self.renderer.notify(Notice::success(ack.message.clone()));
                }
                Ok(ack)
            }
            Err(err) => {
                self.report(&err);
                Err(err)
            }
        }
    }

    /// 提示 → 失效 → 強制重新載入受影響的區塊
    async fn commit(&mut self, result: Result<Ack>, mutation: Mutation, reload: Section) -> Result<Ack> {
        let ack = self.acknowledge(result)?;
        let removed = self.cache.apply(mutation);
        tracing::debug!("{:?} 使 {} 筆快取失效", mutation, removed);
        self.load(reload, true).await?;
        Ok(ack)
    }

    async fn reload_current_if(&mut self, predicate: impl Fn(Section) -> bool) -> Result<()> {
        let current = self.state.current;
        if self.state.is_logged_in() && predicate(current) {
            self.load(current, true).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(is_admin: bool) -> Usuario {
        Usuario {
            id: 1,
            username: "ana".into(),
            nome: Some("Ana".into()),
            is_admin,
        }
    }

    fn state() -> SessionState {
        SessionState::new(MonthKey::new(2024, 3).unwrap())
    }

    #[test]
    fn test_month_scoped_sections_start_on_current_month() {
        let state = state();
        assert_eq!(state.month(Section::Vendas), MonthKey::new(2024, 3).ok());
        assert_eq!(state.month(Section::Relatorios), MonthKey::new(2024, 3).ok());
        assert_eq!(state.month(Section::Estoque), None);
        assert_eq!(state.scope(Section::Entradas), "2024-03");
        assert_eq!(state.scope(Section::Precos), "");
    }

    #[test]
    fn test_admin_guard() {
        let mut state = state();
        state.user = Some(user(false));
        assert_eq!(state.resolve(Section::Admin), Section::Estoque);

        state.user = Some(user(true));
        assert_eq!(state.resolve(Section::Admin), Section::Admin);
    }

    #[test]
    fn test_consumo_guard() {
        let mut state = state();
        assert_eq!(state.resolve(Section::Consumo), Section::Estoque);

        state.consumo_enabled = true;
        assert_eq!(state.resolve(Section::Consumo), Section::Consumo);
        assert_eq!(state.resolve(Section::Vendas), Section::Vendas);
    }

    #[test]
    fn test_formatting_follows_settings() {
        let mut state = state();
        assert_eq!(state.currency(Decimal::new(123450, 2)), "R$ 1.234,50");

        state.settings = GeneralSettings::default().with_moeda("USD");
        assert_eq!(state.currency(Decimal::new(500, 2)), "$5.00");
    }
}
