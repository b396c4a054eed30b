//! Prompt and output-schema construction.

use seoforge_core::config::AiConfig;
use seoforge_core::types::{SavedResult, TrainingExample, TITLE_OPTION_COUNT};

use crate::backend::{ChatMessage, CompletionRequest, JsonSchemaSpec};

const SYSTEM_INSTRUCTIONS: &str = "You are an expert YouTube SEO content creator. \
Generate optimized content for YouTube videos based on transcripts.

Your goal is to:
1. Create compelling, SEO-optimized video descriptions
2. Generate catchy thumbnail titles (short, attention-grabbing)
3. Create 5 different video title options (each optimized for YouTube SEO and click-through rate)
4. Generate relevant tags separated by commas

Focus on:
- Using keywords naturally for SEO
- Creating curiosity and engagement
- Making content discoverable
- Following YouTube best practices";

const STYLE_CLOSING: &str =
    "Learn from the user's past preferences and maintain a consistent style that matches their brand.";

const TRAINING_HEADER: &str = "Here are examples of content the user has liked in the past:";
const SAVED_HEADER: &str = "Here are some of the user's recently chosen content:";

/// Render the style-context section of the system prompt.
///
/// Each populated list gets its own headed section; an empty list contributes
/// nothing, so two empty lists give an empty string. Training example fields
/// that are unset or empty are skipped.
pub fn build_context_block(training: &[TrainingExample], saved: &[SavedResult]) -> String {
    let mut block = String::new();

    if !training.is_empty() {
        block.push_str("\n\n");
        block.push_str(TRAINING_HEADER);
        block.push('\n');
        for (i, example) in training.iter().enumerate() {
            block.push_str(&format!("\nExample {}:\n", i + 1));
            let fields = [
                ("Title", &example.title),
                ("Description", &example.description),
                ("Tags", &example.tags),
                ("Notes", &example.notes),
            ];
            for (label, value) in fields {
                if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                    block.push_str(&format!("{}: {}\n", label, value));
                }
            }
        }
    }

    if !saved.is_empty() {
        block.push_str("\n\n");
        block.push_str(SAVED_HEADER);
        block.push('\n');
        for (i, result) in saved.iter().enumerate() {
            block.push_str(&format!("\nResult {}:\n", i + 1));
            block.push_str(&format!("Title: {}\n", result.final_video_title));
            block.push_str(&format!("Description: {}\n", result.final_description));
            block.push_str(&format!("Tags: {}\n", result.final_tags));
        }
    }

    block
}

/// JSON schema the model's content must satisfy.
pub fn output_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "description": { "type": "string" },
            "thumbnail_title": { "type": "string" },
            "video_title_options": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": TITLE_OPTION_COUNT,
                "maxItems": TITLE_OPTION_COUNT
            },
            "tags": { "type": "string" }
        },
        "required": ["description", "thumbnail_title", "video_title_options", "tags"],
        "additionalProperties": false
    })
}

/// Assemble the full completion request for one transcript.
pub fn build_request(transcript: &str, context_block: &str, config: &AiConfig) -> CompletionRequest {
    let system = format!("{}{}\n\n{}", SYSTEM_INSTRUCTIONS, context_block, STYLE_CLOSING);
    let user = format!("Generate YouTube content for this video transcript:\n\n{}", transcript);

    CompletionRequest {
        messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
        json_schema: Some(JsonSchemaSpec {
            name: config.schema_name.clone(),
            schema: output_schema(),
        }),
    }
}
