//src/main.rs

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod settlement;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::auth::auth_guard;

fn api_routes(app_state: AppState) -> Router<AppState> {
    let transaction_routes = Router::new()
        .route("/"
               ,post(handlers::transactions::create_transaction)
               .get(handlers::transactions::list_transactions)
        )
        .route("/{id}"
               ,get(handlers::transactions::get_transaction)
               .put(handlers::transactions::update_transaction)
        )
        .route("/{id}/approve", post(handlers::transactions::approve_transaction))
        .route("/{id}/reject", post(handlers::transactions::reject_transaction));

    let expense_routes = Router::new()
        .route("/"
               ,post(handlers::expenses::create_expense)
               .get(handlers::expenses::list_expenses)
        )
        .route("/distributions", post(handlers::expenses::create_distribution))
        .route("/budgets", get(handlers::expenses::budget_status))
        .route("/{id}/approve", post(handlers::expenses::approve_expense))
        .route("/{id}/reject", post(handlers::expenses::reject_expense));

    let charge_routes = Router::new()
        .route("/"
               ,post(handlers::charges::create_charge)
               .get(handlers::charges::list_charges)
        )
        .route("/{id}/apply", post(handlers::charges::apply_charge))
        .route("/{id}/cancel", post(handlers::charges::cancel_charge));

    let advance_routes = Router::new()
        .route("/"
               ,post(handlers::advances::request_advance)
               .get(handlers::advances::list_advances)
        )
        .route("/{id}/approve", post(handlers::advances::approve_advance))
        .route("/{id}/reject", post(handlers::advances::reject_advance));

    let bonification_routes = Router::new()
        .route("/", get(handlers::bonifications::list_bonifications))
        .route("/config"
               ,get(handlers::bonifications::get_config)
               .put(handlers::bonifications::save_config)
        )
        .route("/{colporter_id}", get(handlers::bonifications::get_bonification));

    let report_routes = Router::new()
        .route("/program", get(handlers::reports::program_report))
        .route("/people", get(handlers::reports::people_report));

    // Tudo abaixo de /api exige token válido
    Router::new()
        .nest("/transactions", transaction_routes)
        .nest("/expenses", expense_routes)
        .nest("/charges", charge_routes)
        .nest("/cash-advances", advance_routes)
        .nest("/bonifications", bonification_routes)
        .nest("/reports", report_routes)
        .route("/earnings/{person_id}", get(handlers::earnings::get_earnings))
        .route("/hours", post(handlers::bonifications::record_hours))
        .layer(axum_middleware::from_fn_with_state(
            app_state,
            auth_guard,
        ))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new()
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let bind_addr = app_state.settings.bind_addr.clone();

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes(app_state.clone()))
        .with_state(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Erro no servidor Axum")?;

    Ok(())
}
