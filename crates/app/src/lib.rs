//! Retiro application composition root
//!
//! Wires the repositories, gateway and LLM clients, and the dialogue
//! orchestrator into a single axum application.

pub mod webhook;

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use retiro_agent::{ActionExecutor, DialogueOrchestrator, OrchestratorSettings};
use retiro_bookings::{domain::schedule::business_offset, BookingRepository, BookingsState};
use retiro_common::Config;
use retiro_contacts::{ContactDirectory, ContactRepository, ContactsState};
use retiro_conversations::{ConversationStore, ConversationsRepositories, ConversationsState};
use retiro_gateway::{GatewayConfig, GatewayFactory};
use retiro_llm::{LlmConfig, LlmServiceFactory};

/// Shared state for the webhook ingress
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<DialogueOrchestrator>,
}

/// Create the main application router with all routes and middleware
pub async fn create_app(config: Config, pool: PgPool) -> Result<Router, anyhow::Error> {
    // External collaborators, injected rather than global
    let gateway: Arc<dyn retiro_gateway::ChatGateway> = Arc::from(GatewayFactory::create(
        &config.gateway_provider,
        GatewayConfig {
            base_url: config.gateway_base_url.clone(),
            api_key: config.gateway_api_key.clone(),
            session: config.gateway_session.clone(),
            timeout_secs: config.gateway_timeout_secs,
        },
    )?);

    let llm: Arc<dyn retiro_llm::LlmService> = Arc::from(LlmServiceFactory::create(
        &config.llm_provider,
        LlmConfig {
            api_key: config.anthropic_api_key.clone(),
            base_url: None,
            default_model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            timeout_secs: config.llm_timeout_secs,
        },
    )?);

    // Repositories
    let contacts = ContactRepository::new(pool.clone());
    let conversations = ConversationsRepositories::new(pool.clone());
    let bookings = BookingRepository::new(pool.clone());

    // Core components
    let directory = ContactDirectory::new(contacts.clone(), gateway.clone());
    let store = ConversationStore::new(conversations.clone());
    let executor = ActionExecutor::new(
        contacts.clone(),
        store.clone(),
        bookings.clone(),
        business_offset(config.business_utc_offset_hours),
    );
    let orchestrator = Arc::new(DialogueOrchestrator::new(
        directory,
        store,
        executor,
        llm,
        gateway,
        OrchestratorSettings {
            history_limit: config.history_limit,
            fallback_reply: config.fallback_reply.clone(),
        },
    ));

    let app_state = AppState { orchestrator };

    // Build router — webhook ingress plus the domain admin routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Retiro API v0.1.0" }))
        .route(
            "/webhooks/whatsapp",
            axum::routing::post(webhook::receive_webhook),
        )
        .with_state(app_state)
        .merge(retiro_contacts::routes().with_state(ContactsState { contacts }))
        .merge(retiro_conversations::routes().with_state(ConversationsState {
            repos: conversations,
        }))
        .merge(retiro_bookings::routes().with_state(BookingsState { bookings }));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
