//! Offline evaluation harness.
//!
//! Replays the fixed question set through the assembled engine, scores each
//! generated answer against its reference by embedding cosine similarity,
//! and writes a JSON report. A provider failure on one question records an
//! empty answer and the run continues - total-run completion matters more
//! than any single question.

pub mod questions;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::engine::ChatEngine;
use crate::rag::embeddings::{cosine_similarity, Embedder};
use crate::types::{AppError, EvalRecord, Result};
pub use questions::{EvalCase, EVAL_QUESTIONS};

/// Aggregate outcome of an evaluation run.
#[derive(Debug)]
pub struct EvalSummary {
    pub records: Vec<EvalRecord>,
    pub mean_similarity: f32,
}

/// Case-insensitive, whitespace-trimmed string equality.
pub fn exact_match(answer: &str, ground_truth: &str) -> bool {
    answer.trim().to_lowercase() == ground_truth.trim().to_lowercase()
}

/// Cosine similarity between the embeddings of `answer` and
/// `ground_truth`. An empty answer scores exactly 0.0 and is never
/// embedded.
pub async fn similarity(
    embedder: &Arc<dyn Embedder>,
    answer: &str,
    ground_truth: &str,
) -> Result<f32> {
    if answer.trim().is_empty() {
        return Ok(0.0);
    }

    let vectors = embedder
        .embed_batch(&[answer.to_string(), ground_truth.to_string()])
        .await?;
    let [a, b] = vectors.as_slice() else {
        return Err(AppError::Embedding(
            "expected two embeddings for similarity scoring".to_string(),
        ));
    };

    Ok(cosine_similarity(a, b))
}

/// Replay `cases` through the engine sequentially, pausing `pause` between
/// questions to respect provider rate limits.
pub async fn run(
    engine: &ChatEngine,
    embedder: Arc<dyn Embedder>,
    cases: &[EvalCase],
    pause: Duration,
) -> Result<EvalSummary> {
    let mut records = Vec::with_capacity(cases.len());
    let mut total_score = 0.0f32;

    for (i, case) in cases.iter().enumerate() {
        info!(n = i + 1, question = case.question, "evaluating");

        let answer = match engine.chat(case.question).await {
            Ok(reply) => reply.answer,
            Err(e) => {
                warn!(n = i + 1, error = %e, "generation failed, recording empty answer");
                String::new()
            }
        };

        let score = similarity(&embedder, &answer, case.ground_truth).await?;
        let exact = exact_match(&answer, case.ground_truth);
        debug!(n = i + 1, score, exact_match = exact, "scored answer");

        total_score += score;
        records.push(EvalRecord {
            question: case.question.to_string(),
            ground_truth: case.ground_truth.to_string(),
            answer,
            similarity_score: score,
        });

        tokio::time::sleep(pause).await;
    }

    let mean_similarity = if records.is_empty() {
        0.0
    } else {
        total_score / records.len() as f32
    };

    info!(questions = records.len(), mean_similarity, "evaluation complete");

    Ok(EvalSummary {
        records,
        mean_similarity,
    })
}

/// Serialize the per-question records to `path`, overwriting any prior
/// report.
pub async fn write_report(path: &Path, records: &[EvalRecord]) -> Result<()> {
    let json = serde_json::to_string_pretty(records)
        .map_err(|e| AppError::Internal(format!("failed to serialize report: {}", e)))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write report: {}", e)))?;

    info!(path = %path.display(), "wrote evaluation report");
    Ok(())
}
