use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sage::cli::output::Output;
use sage::cli::{Cli, Commands};
use sage::engine::ChatEngine;
use sage::rag::embeddings::FastembedEmbedder;
use sage::session::SessionStore;
use sage::utils::config::Config;
use sage::AppState;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let out = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    let result = runtime.block_on(async {
        let config = Config::from_env()?;
        match cli.command.unwrap_or(Commands::Serve) {
            Commands::Serve => serve(config, &out).await,
            Commands::Ingest => ingest(config, &out).await,
            Commands::Eval => eval(config, &out).await,
        }
    });

    if let Err(e) = &result {
        out.error(&format!("{:#}", e));
    }
    result
}

async fn serve(config: Config, out: &Output) -> anyhow::Result<()> {
    out.banner();
    out.step("Assembling chat engine");
    let engine = ChatEngine::assemble(&config).await?;
    out.success("Engine ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        config: Arc::new(config),
        engine: Arc::new(engine),
        sessions: Arc::new(SessionStore::new()),
    };

    let router = sage::api::routes::create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(addr = addr.as_str(), "listening");
    out.success(&format!("Chat UI at http://{}/", addr));

    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}

async fn ingest(config: Config, out: &Output) -> anyhow::Result<()> {
    out.banner();
    out.step("Loading embedding model");
    let embedder = Arc::new(FastembedEmbedder::new(&config.rag.embed_model_dir)?);

    out.step(&format!(
        "Ingesting documents from {}",
        config.ingest.input_dir.display()
    ));
    let report = sage::ingest::run(&config, embedder).await?;

    out.success("Ingestion complete");
    out.detail("documents", &report.documents.to_string());
    out.detail("chunks", &report.chunks.to_string());
    out.detail("collection", &report.collection);
    out.detail("total indexed", &report.total_indexed.to_string());
    Ok(())
}

async fn eval(config: Config, out: &Output) -> anyhow::Result<()> {
    out.banner();
    out.step("Assembling chat engine");
    let engine = ChatEngine::assemble(&config).await?;

    out.step(&format!(
        "Evaluating {} questions",
        sage::eval::EVAL_QUESTIONS.len()
    ));
    let summary = sage::eval::run(
        &engine,
        engine.embedder(),
        sage::eval::EVAL_QUESTIONS,
        Duration::from_secs(config.eval.pause_secs),
    )
    .await?;

    sage::eval::write_report(&config.eval.output_path, &summary.records).await?;

    out.success("Evaluation complete");
    out.detail("questions", &summary.records.len().to_string());
    out.detail(
        "mean similarity",
        &format!("{:.4}", summary.mean_similarity),
    );
    out.detail("report", &config.eval.output_path.display().to_string());
    Ok(())
}
