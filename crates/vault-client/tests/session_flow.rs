use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use vault_cache::ManualClock;
use vault_client::{ClientConfig, ClientError, NoticeKind, RecordingRenderer, SectionView, Session};
use vault_core::{MonthKey, Section, VaultError};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

type TestSession = Session<RecordingRenderer, ManualClock>;

fn ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": data}))
}

fn ack(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": message, "id": 1}))
}

fn clock() -> ManualClock {
    let start = NaiveDate::from_ymd_opt(2024, 3, 9)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    ManualClock::at(start)
}

async fn mount_get(server: &MockServer, route: &str, data: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ok(data))
        .mount(server)
        .await;
}

/// 以既有令牌登入的工作階段
async fn session(server: &MockServer, clock: ManualClock, is_admin: bool) -> TestSession {
    mount_get(
        server,
        "/api/auth/me",
        json!({"id": 1, "username": "ana", "nome": "Ana", "is_admin": is_admin}),
    )
    .await;
    mount_get(
        server,
        "/api/configuracoes/gerais",
        json!({"moeda": "BRL", "timezone": "America/Sao_Paulo", "formato_data": "DD/MM/AAAA", "nome_fazenda": "Sítio"}),
    )
    .await;
    mount_get(server, "/api/configuracoes/consumo-habilitado", json!({"habilitado": true})).await;

    let config = ClientConfig::new(server.uri());
    let mut session = Session::with_clock(&config, RecordingRenderer::new(), clock).unwrap();
    session.restore("tok").await.unwrap();
    session
}

async fn mount_stock_overview(server: &MockServer, expected_stock_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/estoque"))
        .respond_with(ok(json!({
            "quantidade_total": 120,
            "ultima_atualizacao": "2024-03-09 10:00:00",
            "status": "ok",
            "cor": "verde"
        })))
        .expect(expected_stock_calls)
        .mount(server)
        .await;
    mount_get(server, "/api/relatorio", json!({"mes_referencia": "2024-03", "total_entradas": 300})).await;
    mount_get(
        server,
        "/api/precos/ativo",
        json!({"id": 2, "preco_unitario": 0.8, "data_inicio": "2024-03-01", "ativo": 1}),
    )
    .await;
}

#[tokio::test]
async fn test_restore_loads_settings() {
    let server = MockServer::start().await;
    let session = session(&server, clock(), false).await;

    assert!(session.state().is_logged_in());
    assert_eq!(session.state().settings.nome_fazenda, "Sítio");
    assert!(session.state().consumo_enabled);
    assert_eq!(session.state().month(Section::Entradas), MonthKey::new(2024, 3).ok());
}

#[tokio::test]
async fn test_navigate_twice_within_ttl_fetches_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/entradas"))
        .and(query_param("mes", "2024-03"))
        .respond_with(ok(json!([
            {"id": 1, "quantidade": 30, "data": "2024-03-09T08:00:00"},
            {"id": 2, "quantidade": 12, "data": "2024-03-02T08:00:00"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let clock = clock();
    let mut session = session(&server, clock.clone(), false).await;

    session.navigate(Section::Entradas).await.unwrap();
    clock.advance_ms(10_000);
    session.navigate(Section::Entradas).await.unwrap();

    let views = &session.renderer().views;
    assert_eq!(views.len(), 1);
    match &views[0] {
        SectionView::Entradas(ledger) => {
            assert_eq!(ledger.today.len(), 1);
            assert_eq!(ledger.previous.len(), 1);
            assert_eq!(ledger.totals.quantity, 42);
        }
        other => panic!("unexpected view {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_entry_refetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/despesas"))
        .respond_with(ok(json!([])))
        .expect(2)
        .mount(&server)
        .await;

    let clock = clock();
    let mut session = session(&server, clock.clone(), false).await;

    assert!(session.load(Section::Despesas, false).await.unwrap());
    clock.advance_ms(30_000);
    assert!(session.load(Section::Despesas, false).await.unwrap());
}

#[tokio::test]
async fn test_entrada_mutation_refreshes_stock() {
    let server = MockServer::start().await;
    mount_stock_overview(&server, 2).await;
    mount_get(&server, "/api/entradas", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/entradas"))
        .and(body_json(json!({"quantidade": 30, "observacao": "galpão 2"})))
        .respond_with(ack("Entrada registrada"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;

    session.navigate(Section::Estoque).await.unwrap();
    session.record_entrada("30", " galpão 2 ").await.unwrap();
    session.navigate(Section::Estoque).await.unwrap();
    session.navigate(Section::Estoque).await.unwrap();

    assert_eq!(
        session.renderer().rendered_sections(),
        vec![Section::Estoque, Section::Entradas, Section::Estoque]
    );
    let notice = session.renderer().notices.last().unwrap();
    assert_eq!(notice.kind, NoticeKind::Success);
    assert_eq!(notice.message, "Entrada registrada");
    assert!(session.cache().is_valid(Section::Entradas, "2024-03"));
}

#[tokio::test]
async fn test_failed_load_is_not_marked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/precos/ativo"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "database is locked"
        })))
        .expect(2)
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;

    assert!(session.navigate(Section::Precos).await.is_err());
    assert!(!session.cache().is_valid(Section::Precos, ""));
    assert!(session.navigate(Section::Precos).await.is_err());

    let notice = session.renderer().last_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "database is locked");
    assert!(session.renderer().views.is_empty());
}

#[tokio::test]
async fn test_login_survives_failed_stock_load() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ok(json!({
            "token": "tok-ana",
            "usuario": {"id": 1, "username": "ana", "nome": "Ana", "is_admin": 0}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/estoque"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "estoque indisponível"
        })))
        .mount(&server)
        .await;

    let config = ClientConfig::new(server.uri());
    let mut session = Session::with_clock(&config, RecordingRenderer::new(), clock()).unwrap();

    let user = session.login("ana", "1234").await.unwrap();
    assert_eq!(user.display_name(), "Ana");
    assert!(session.state().is_logged_in());
    assert_eq!(session.api().token(), Some("tok-ana"));
    assert!(!session.cache().is_valid(Section::Estoque, ""));

    let notice = session.renderer().last_notice().unwrap();
    assert_eq!(notice.kind, NoticeKind::Error);
    assert_eq!(notice.message, "estoque indisponível");
}

#[tokio::test]
async fn test_unauthorized_load_expires_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/estoque"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;
    let err = session.navigate(Section::Estoque).await.unwrap_err();

    assert!(err.is_session_expired());
    assert!(!session.state().is_logged_in());
    assert_eq!(session.api().token(), None);
    assert_eq!(session.renderer().login_prompts, 1);
    assert_eq!(
        session.renderer().last_notice().map(|n| n.message.as_str()),
        Some("Sessão expirada. Faça login novamente.")
    );
}

#[tokio::test]
async fn test_change_month_rolls_over_and_caches_per_month() {
    let server = MockServer::start().await;
    for mes in ["2024-03", "2024-02"] {
        Mock::given(method("GET"))
            .and(path("/api/despesas"))
            .and(query_param("mes", mes))
            .respond_with(ok(json!([])))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut session = session(&server, clock(), false).await;

    session.navigate(Section::Despesas).await.unwrap();
    let previous = session.change_month(Section::Despesas, -1).await.unwrap();
    let back = session.change_month(Section::Despesas, 1).await.unwrap();

    assert_eq!(previous, MonthKey::new(2024, 2).unwrap());
    assert_eq!(back, MonthKey::new(2024, 3).unwrap());
    assert_eq!(session.renderer().views.len(), 2);
}

#[tokio::test]
async fn test_change_month_rejects_unpartitioned_section() {
    let server = MockServer::start().await;
    let mut session = session(&server, clock(), false).await;

    let err = session.change_month(Section::Estoque, 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Core(VaultError::NotMonthScoped(Section::Estoque))));
}

#[tokio::test]
async fn test_admin_guard_redirects_to_stock() {
    let server = MockServer::start().await;
    mount_stock_overview(&server, 1).await;

    let mut session = session(&server, clock(), false).await;
    let shown = session.navigate(Section::Admin).await.unwrap();

    assert_eq!(shown, Section::Estoque);
    assert_eq!(session.state().current, Section::Estoque);
}

#[tokio::test]
async fn test_sale_uses_seeded_price() {
    let server = MockServer::start().await;
    mount_stock_overview(&server, 2).await;
    mount_get(&server, "/api/saidas", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/saidas"))
        .and(body_json(json!({"quantidade": 12, "preco_unitario": 0.8})))
        .respond_with(ack("Venda registrada"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;
    session.navigate(Section::Vendas).await.unwrap();

    let fields = session.reconciler_mut().on_quantity_input("12");
    assert_eq!(fields.total, Decimal::new(960, 2));

    session.record_venda().await.unwrap();

    let fields = session.reconciler().snapshot();
    assert_eq!(fields.quantity, 0);
    assert_eq!(fields.unit_price, Decimal::new(80, 2));
}

#[tokio::test]
async fn test_sale_sends_total_after_total_edit() {
    let server = MockServer::start().await;
    mount_stock_overview(&server, 2).await;
    mount_get(&server, "/api/saidas", json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/saidas"))
        .and(body_json(json!({"quantidade": 10, "preco_unitario": 0.75, "valor_total": 7.5})))
        .respond_with(ack("Venda registrada"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;
    session.navigate(Section::Vendas).await.unwrap();

    session.reconciler_mut().on_quantity_input("10");
    let fields = session.reconciler_mut().on_total_input("7,50");
    assert_eq!(fields.unit_price, Decimal::new(75, 2));

    session.record_venda().await.unwrap();
}

#[tokio::test]
async fn test_invalid_expense_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/despesas"))
        .respond_with(ack("Despesa registrada"))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;
    let err = session.record_despesa("0", "ração").await.unwrap_err();

    assert!(matches!(err, ClientError::Core(VaultError::Validation(_))));
    assert_eq!(
        session.renderer().last_notice().map(|n| n.message.as_str()),
        Some("Valor deve ser um número positivo")
    );
}

#[tokio::test]
async fn test_set_price_seeds_sale_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/precos"))
        .and(body_json(json!({"preco_unitario": 1.1})))
        .respond_with(ack("Preço atualizado"))
        .expect(1)
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/api/precos/ativo",
        json!({"id": 3, "preco_unitario": 1.1, "data_inicio": "2024-03-09", "ativo": true}),
    )
    .await;
    mount_get(&server, "/api/precos", json!([])).await;

    let mut session = session(&server, clock(), false).await;
    session.set_price("1,10").await.unwrap();

    assert_eq!(session.reconciler().snapshot().unit_price, Decimal::new(110, 2));
    assert_eq!(session.renderer().rendered_sections(), vec![Section::Precos]);
}

#[tokio::test]
async fn test_undo_rejects_non_ledger_section() {
    let server = MockServer::start().await;
    let mut session = session(&server, clock(), false).await;

    let err = session.undo(Section::Precos, 1).await.unwrap_err();
    assert!(matches!(err, ClientError::Core(VaultError::NotUndoable(Section::Precos))));
}

#[tokio::test]
async fn test_check_for_updates_compares_last_seen() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "currentVersion": "2.1.0",
            "versions": []
        })))
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;

    assert!(session.check_for_updates(Some("2.1.0")).await.unwrap().is_none());
    let info = session.check_for_updates(Some("2.0.0")).await.unwrap().unwrap();
    assert_eq!(info.current_version, "2.1.0");
    assert!(session.check_for_updates(None).await.unwrap().is_some());
}

#[tokio::test]
async fn test_change_password_requires_new_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/alterar-senha"))
        .and(body_json(json!({"senha_atual": "1234", "nova_senha": "abcd"})))
        .respond_with(ack("Senha alterada"))
        .expect(1)
        .mount(&server)
        .await;

    let mut session = session(&server, clock(), false).await;
    session.change_password("1234", "abcd", "abcd").await.unwrap();

    assert!(!session.state().is_logged_in());
    assert_eq!(session.api().token(), None);
    assert_eq!(session.renderer().login_prompts, 1);
}
