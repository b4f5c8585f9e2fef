use std::fmt::Write;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;
use crate::llm::{GenerationRequest, ModelClient};
use crate::models::{AgentResponse, AgentStatus};
use crate::services::retrieval::{RetrievedLesson, Retriever};

/// Stands in for a request that carried no query.
pub const DEFAULT_QUERY: &str = "No query provided";

const TUTOR_PREAMBLE: &str = "You are a patient tutor for a 30-day Rust course. \
Answer the learner's question clearly and briefly. Prefer the course lessons below \
when they are relevant and point to their resources; say so when the lessons do not \
cover the question.";

/// Theory excerpts are cut to this many characters in the prompt.
const THEORY_EXCERPT_CHARS: usize = 600;

#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
}

/// Answers learner questions: lesson retrieval, then one model call.
pub struct AgentService {
    retriever: Arc<dyn Retriever>,
    model: Arc<dyn ModelClient>,
    settings: AgentSettings,
}

impl AgentService {
    pub fn new(
        retriever: Arc<dyn Retriever>,
        model: Arc<dyn ModelClient>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            retriever,
            model,
            settings,
        }
    }

    pub async fn handle_query(&self, query: Option<&str>) -> Result<AgentResponse, AppError> {
        let query = match query.map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => DEFAULT_QUERY,
        };

        let context = self.retriever.retrieve(query).await?;
        debug!(lessons = context.len(), "context retrieved");

        let request = GenerationRequest {
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
            system: Some(build_system_prompt(&context)),
            prompt: query.to_string(),
        };
        let generation = self.model.generate(&request).await?;
        info!(
            tokens = generation.usage.total_tokens,
            "agent answered query"
        );

        Ok(AgentResponse {
            status: AgentStatus::Success,
            agent_response: generation.content,
            tokens_used: generation.usage.total_tokens,
        })
    }
}

fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn build_system_prompt(context: &[RetrievedLesson]) -> String {
    let mut prompt = String::from(TUTOR_PREAMBLE);

    if context.is_empty() {
        prompt.push_str("\n\nNo course lessons matched this question.");
        return prompt;
    }

    prompt.push_str("\n\nCourse lessons:");
    for (n, item) in context.iter().enumerate() {
        let lesson = &item.row.lesson;
        let _ = write!(
            prompt,
            "\n\n{}. Day {}: {}",
            n + 1,
            lesson.day_index,
            lesson.title
        );
        if !lesson.theory.is_empty() {
            let _ = write!(prompt, "\n{}", excerpt(&lesson.theory, THEORY_EXCERPT_CHARS));
        }
        if let Some(example) = &lesson.core_example {
            if !example.code.is_empty() {
                let _ = write!(prompt, "\nExample:\n{}", example.code);
            }
        }
        if let Some(why) = lesson.pitfall_example.as_ref().and_then(|p| p.why()) {
            let _ = write!(prompt, "\nCommon mistake: {}", why);
        }
        for resource in &item.resources {
            let _ = write!(prompt, "\nResource: {} <{}>", resource.title, resource.url);
        }
    }
    prompt
}
