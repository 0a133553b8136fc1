//! Prompt templates.
//!
//! Pure functions over plain data, so prompt output is testable without
//! constructing an engine. The system prompt interpolates a live snapshot
//! of the collection so the model can answer questions about the store
//! itself without retrieval.

use crate::db::CollectionSummary;
use crate::types::SourceNode;

/// Version tag of the system-prompt template. Bump when the template text
/// changes so eval runs stay comparable.
pub const SYSTEM_PROMPT_VERSION: &str = "v1";

/// Build the system prompt from a collection snapshot.
pub fn build_system_prompt(summary: &CollectionSummary) -> String {
    format!(
        "You are an expert AWS support assistant.\n\
         \n\
         Your knowledge comes strictly from:\n\
         1. Retrieved AWS documentation (EC2, S3, Lambda).\n\
         2. Database metadata provided below.\n\
         \n\
         Database metadata:\n\
         - Total documents stored: {count}\n\
         - Example document IDs: [{ids}]\n\
         - Example file names: [{files}]\n\
         \n\
         Rules:\n\
         - If asked about database size, files, or stored documents, use the metadata.\n\
         - Otherwise, answer strictly from retrieved document context.\n\
         - If insufficient context, say so. Do not invent.\n\
         - Do not provide the unique IDs.",
        count = summary.count,
        ids = summary.sample_ids.join(", "),
        files = summary.sample_files.join(", "),
    )
}

/// Build the prompt that rewrites a follow-up message into a standalone
/// question using the conversation so far.
pub fn build_condense_prompt(history: &[(String, String)], follow_up: &str) -> String {
    let transcript: String = history
        .iter()
        .map(|(role, content)| format!("{}: {}\n", role, content))
        .collect();

    format!(
        "Given the following conversation between a user and an assistant, \
         rewrite the follow-up message into a standalone question that \
         includes all context needed to answer it. Reply with the question \
         only.\n\
         \n\
         <Chat History>\n\
         {transcript}</Chat History>\n\
         \n\
         Follow-up message: {follow_up}\n\
         Standalone question:",
    )
}

/// Render retrieved passages into the context block appended to the system
/// prompt for answer generation.
pub fn build_context_block(sources: &[SourceNode]) -> String {
    if sources.is_empty() {
        return "Context information from the document store is below.\n\
                ---------------------\n\
                (no relevant context retrieved)\n\
                ---------------------"
            .to_string();
    }

    let passages: String = sources
        .iter()
        .map(|node| {
            format!(
                "[source: {}, page {}]\n{}\n",
                node.file_name, node.page_label, node.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Context information from the document store is below.\n\
         ---------------------\n\
         {passages}\
         ---------------------",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> CollectionSummary {
        CollectionSummary {
            count: 42,
            sample_ids: vec!["id-1".to_string(), "id-2".to_string()],
            sample_files: vec!["ec2-guide.pdf".to_string(), "s3-guide.pdf".to_string()],
        }
    }

    #[test]
    fn test_system_prompt_uses_count_verbatim() {
        let prompt = build_system_prompt(&summary());
        assert!(prompt.contains("Total documents stored: 42"));
    }

    #[test]
    fn test_system_prompt_lists_samples() {
        let prompt = build_system_prompt(&summary());
        assert!(prompt.contains("id-1, id-2"));
        assert!(prompt.contains("ec2-guide.pdf, s3-guide.pdf"));
        assert!(prompt.contains("Do not provide the unique IDs"));
    }

    #[test]
    fn test_system_prompt_empty_collection() {
        let prompt = build_system_prompt(&CollectionSummary {
            count: 0,
            sample_ids: vec![],
            sample_files: vec![],
        });
        assert!(prompt.contains("Total documents stored: 0"));
        assert!(prompt.contains("Example document IDs: []"));
    }

    #[test]
    fn test_version_tag_present() {
        assert!(!SYSTEM_PROMPT_VERSION.is_empty());
    }

    #[test]
    fn test_condense_prompt_includes_history_and_follow_up() {
        let history = vec![
            ("user".to_string(), "What is EC2?".to_string()),
            ("assistant".to_string(), "A compute service.".to_string()),
        ];
        let prompt = build_condense_prompt(&history, "How much does it cost?");

        assert!(prompt.contains("user: What is EC2?"));
        assert!(prompt.contains("assistant: A compute service."));
        assert!(prompt.contains("Follow-up message: How much does it cost?"));
        assert!(prompt.ends_with("Standalone question:"));
    }

    #[test]
    fn test_context_block_renders_sources() {
        let sources = vec![SourceNode {
            content: "EC2 provides resizable compute capacity.".to_string(),
            file_name: "ec2-guide.pdf".to_string(),
            page_label: "3".to_string(),
            score: 0.9,
        }];
        let block = build_context_block(&sources);

        assert!(block.contains("[source: ec2-guide.pdf, page 3]"));
        assert!(block.contains("resizable compute capacity"));
    }

    #[test]
    fn test_context_block_empty() {
        let block = build_context_block(&[]);
        assert!(block.contains("no relevant context retrieved"));
    }
}
