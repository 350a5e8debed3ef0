use crate::domain::ports::TextGeneratorBox;
use crate::domain::tutor::{Tutor, TutorSummary};
use crate::error::Result;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

pub const DEFAULT_REASONING_LANGUAGE: &str = "Arabic";

/// The tutor the AI picked and why.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub tutor_id: String,
    pub reasoning: String,
}

/// Asks a generative-text service which tutor best fits a student's request.
pub struct RecommendationService {
    generator: TextGeneratorBox,
    reasoning_language: String,
}

impl RecommendationService {
    pub fn new(generator: TextGeneratorBox) -> Self {
        Self::with_language(generator, DEFAULT_REASONING_LANGUAGE)
    }

    pub fn with_language(generator: TextGeneratorBox, language: impl Into<String>) -> Self {
        Self {
            generator,
            reasoning_language: language.into(),
        }
    }

    /// Returns `Ok(None)` when the answer cannot be used: unparseable JSON,
    /// missing fields, or a tutor that is not in `tutors`. Only transport
    /// failures are errors.
    pub async fn recommend(&self, query: &str, tutors: &[Tutor]) -> Result<Option<Recommendation>> {
        let summaries: Vec<TutorSummary> = tutors.iter().map(Tutor::summary).collect();
        let prompt = self.prompt(query, &summaries)?;

        let raw = self.generator.generate_json(&prompt, &response_schema()).await?;
        debug!(bytes = raw.len(), "Received recommendation");

        let Some(recommendation) = parse_recommendation(&raw) else {
            return Ok(None);
        };
        if !tutors.iter().any(|t| t.id == recommendation.tutor_id) {
            warn!(tutor_id = %recommendation.tutor_id, "Recommended tutor is not in the catalog");
            return Ok(None);
        }
        Ok(Some(recommendation))
    }

    fn prompt(&self, query: &str, summaries: &[TutorSummary]) -> Result<String> {
        let catalog = serde_json::to_string(summaries)?;
        Ok(format!(
            "A student wrote the following request: \"{query}\"\n\
             Choose the best tutor from the list below and explain why they are the best fit.\n\
             {catalog}\n\n\
             Answer in JSON with:\n\
             1. tutorId (the id of the chosen tutor)\n\
             2. reasoning (the reason, written in {language} in a friendly and convincing tone)",
            language = self.reasoning_language,
        ))
    }
}

/// The shape the generator must answer with.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "tutorId": { "type": "STRING" },
            "reasoning": { "type": "STRING" }
        },
        "required": ["tutorId", "reasoning"]
    })
}

/// Parses the generator's answer, logging instead of failing.
pub fn parse_recommendation(raw: &str) -> Option<Recommendation> {
    let text = if raw.trim().is_empty() { "{}" } else { raw };
    match serde_json::from_str::<Recommendation>(text) {
        Ok(recommendation) => Some(recommendation),
        Err(e) => {
            warn!(error = %e, "Failed to parse AI response");
            None
        }
    }
}
