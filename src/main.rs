//! Shopsearch HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use shopsearch::config::Config;
use shopsearch::embedding::{CachedEmbedder, EmbeddingCache, OpenAiEmbedder};
use shopsearch::gateway::create_router;
use shopsearch::intent::IntentParser;
use shopsearch::llm::OpenAiChatClient;
use shopsearch::pipeline::{PipelineOptions, SearchPipeline};
use shopsearch::search::MatchThresholds;
use shopsearch::store::QdrantStore;
use shopsearch::variants::VariantGenerator;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        qdrant_url = %config.qdrant_url,
        collection = %config.collection_name,
        "Shopsearch starting"
    );

    let chat = OpenAiChatClient::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.timeout(),
    )?;

    let parser = IntentParser::new(chat.clone(), config.chat_model.clone(), config.max_tokens);

    let mut generator =
        VariantGenerator::new(chat, config.chat_model.clone(), config.max_tokens);
    if let Some(template) = &config.prompt_template {
        generator = generator.with_template(template.clone());
    }

    let embedder = OpenAiEmbedder::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.embedding_model.clone(),
        config.timeout(),
    )?
    .with_batching(config.embed_batch_size, config.embed_batch_delay());
    let embedder = CachedEmbedder::new(embedder, Arc::new(EmbeddingCache::new()));

    let store = QdrantStore::new(
        config.qdrant_url.clone(),
        config.qdrant_api_key.clone(),
        config.collection_name.clone(),
        config.vector_size,
        config.timeout(),
    );

    let options = PipelineOptions {
        max_results: config.max_results,
        thresholds: MatchThresholds {
            high: config.high_score,
            good: config.good_score,
        },
        variant_count: config.variant_count,
        batch_variant_count: config.batch_variant_count,
        ..PipelineOptions::default()
    };

    let pipeline = Arc::new(SearchPipeline::new(
        parser, generator, embedder, store, options,
    ));

    let app = create_router(pipeline);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shopsearch shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
