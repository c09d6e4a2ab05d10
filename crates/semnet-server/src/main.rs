//! SemNet server binary.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use semnet_core::{
    AgentSummarizer, ContextBudget, DisabledSummarizer, EngineConfig, HttpVectorStore,
    InMemoryVectorStore, NetworkService, ObjectType, Properties, StaticSummarizer, Summarizer,
    VectorStore,
};
use semnet_server::{build_router, AppState};

/// SemNet server - semantic network generation over a vector store
#[derive(Parser, Debug)]
#[command(name = "semnet-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0", env = "SEMNET_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SEMNET_PORT")]
    port: u16,

    /// Path to the engine configuration file
    #[arg(short, long, default_value = "semnet.toml", env = "SEMNET_CONFIG")]
    config: String,

    /// Base URL of the vector store
    #[arg(long, env = "SEMNET_STORE_URL")]
    store_url: Option<String>,

    /// Base URL of the LLM summarization agent
    #[arg(long, env = "SEMNET_AGENT_URL")]
    agent_url: Option<String>,

    /// Run against an in-memory demo store instead of live collaborators
    #[arg(long, default_value_t = false)]
    demo: bool,
}

/// Build CORS layer from environment configuration.
fn build_cors_layer() -> CorsLayer {
    match std::env::var("SEMNET_CORS_ORIGIN") {
        Ok(origins) => {
            use tower_http::cors::AllowOrigin;
            let origin_list: Vec<_> = origins
                .split(',')
                .filter_map(|o| o.trim().parse().ok())
                .collect();
            tracing::info!("CORS: restricted to {} origin(s)", origin_list.len());
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origin_list))
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any)
        }
        Err(_) => {
            tracing::warn!("CORS: permissive (dev mode). Set SEMNET_CORS_ORIGIN to restrict.");
            CorsLayer::permissive()
        }
    }
}

/// Seeds a small, fully linked object set so the server can run without a
/// live vector store.
fn seed_demo_store() -> InMemoryVectorStore {
    fn props(title: &str, description: &str) -> Properties {
        let mut p = Properties::new();
        p.insert("title".into(), title.into());
        p.insert("description".into(), description.into());
        p
    }

    let store = InMemoryVectorStore::new();
    store.insert(
        "task-1",
        ObjectType::Task,
        props("Prepare Q3 invoices", "Collect and verify all Q3 invoices"),
    );
    store.insert(
        "email-1",
        ObjectType::Email,
        props("Invoice reminder", "Customer asks about invoice 1042"),
    );
    store.insert(
        "file-1",
        ObjectType::File,
        props("invoices-q3.xlsx", "Spreadsheet with the Q3 invoice list"),
    );
    store.insert(
        "task-2",
        ObjectType::Task,
        props("Chase overdue payments", "Follow up on unpaid invoices"),
    );
    store.insert(
        "note-1",
        ObjectType::Note,
        props("Payment terms", "Net-30 applies to all B2B customers"),
    );
    store.link("task-1", "email-1", 0.88);
    store.link("task-1", "file-1", 0.84);
    store.link("email-1", "task-2", 0.76);
    store.link("file-1", "note-1", 0.71);
    store
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!("Starting SemNet server...");

    let config = EngineConfig::load_from(&args.config)?;
    let call_timeout = config.request_timeout();

    let store: Arc<dyn VectorStore> = if args.demo {
        tracing::info!("Demo mode: in-memory vector store with seeded objects");
        Arc::new(seed_demo_store())
    } else {
        let store_url = args
            .store_url
            .context("--store-url (or SEMNET_STORE_URL) is required unless --demo is set")?;
        tracing::info!(%store_url, "Vector store: HTTP");
        let mut client = HttpVectorStore::new(store_url, call_timeout)?;
        if let Ok(api_key) = std::env::var("SEMNET_STORE_API_KEY") {
            client = client.with_api_key(api_key);
        }
        Arc::new(client)
    };

    let summarizer: Arc<dyn Summarizer> = if args.demo {
        Arc::new(StaticSummarizer)
    } else if let Some(agent_url) = args.agent_url {
        tracing::info!(%agent_url, "Summarization: LLM agent");
        let budget = ContextBudget {
            per_description: config.description_max_chars,
            total: config.context_max_chars,
        };
        Arc::new(AgentSummarizer::new(agent_url, call_timeout, budget)?)
    } else {
        tracing::warn!(
            "Summarization: DISABLED (no SEMNET_AGENT_URL). Level summaries will be null."
        );
        Arc::new(DisabledSummarizer)
    };

    let state = Arc::new(AppState {
        service: NetworkService::new(store, summarizer, config),
    });

    let app = build_router(state)
        .layer(build_cors_layer())
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("SemNet server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
