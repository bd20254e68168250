//! Quiz generation from a finished explanation.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;
use wonder_core::text::strip_code_fence;
use wonder_core::ProviderError;
use wonder_prompts::names;
use wonder_provider::{AiProvider, CompletionRequest};
use wonder_store::{Difficulty, QuestionType, Quiz, QuizQuestion};

const MAX_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.7;

/// Minutes budgeted per question.
pub const MINUTES_PER_QUESTION: u32 = 2;

#[derive(Debug, Deserialize)]
struct GeneratedQuiz {
    #[serde(default)]
    title: Option<String>,
    questions: Vec<GeneratedQuestion>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestion {
    question: String,
    #[serde(default = "default_question_type")]
    question_type: QuestionType,
    correct_answer: String,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default)]
    explanation: Option<String>,
}

fn default_question_type() -> QuestionType {
    QuestionType::MultipleChoice
}

/// Ask the model for a quiz about `topic`. Any failure other than a missing
/// API key falls back to [`fallback_quiz`].
pub async fn generate_quiz(
    provider: &dyn AiProvider,
    explanation: &str,
    topic: &str,
    difficulty: Difficulty,
    num_questions: u32,
) -> Result<Quiz, ProviderError> {
    let prompt = match wonder_prompts::render(
        names::QUIZ,
        &json!({
            "topic": topic,
            "explanation": explanation,
            "difficulty": difficulty.as_str(),
            "num_questions": num_questions,
        }),
    ) {
        Ok(prompt) => prompt,
        Err(e) => {
            warn!(error = %e, "quiz prompt failed to render, using fallback quiz");
            return Ok(fallback_quiz(topic, difficulty));
        }
    };

    let raw = match provider
        .complete(&CompletionRequest::new(prompt, MAX_TOKENS, TEMPERATURE).json())
        .await
    {
        Ok(raw) => raw,
        Err(ProviderError::NotConfigured(msg)) => return Err(ProviderError::NotConfigured(msg)),
        Err(e) => {
            warn!(error = %e, topic, "quiz generation failed, using fallback quiz");
            return Ok(fallback_quiz(topic, difficulty));
        }
    };

    match parse_quiz(&raw, topic, difficulty) {
        Some(quiz) => {
            info!(quiz_id = %quiz.id, questions = quiz.questions.len(), "quiz generated");
            Ok(quiz)
        }
        None => {
            warn!(topic, "quiz reply was not usable, using fallback quiz");
            Ok(fallback_quiz(topic, difficulty))
        }
    }
}

fn parse_quiz(raw: &str, topic: &str, difficulty: Difficulty) -> Option<Quiz> {
    let generated: GeneratedQuiz = serde_json::from_str(strip_code_fence(raw)).ok()?;
    let questions: Vec<QuizQuestion> = generated
        .questions
        .into_iter()
        .filter(|q| !q.question.trim().is_empty())
        .map(|q| QuizQuestion {
            question: q.question,
            question_type: q.question_type,
            correct_answer: q.correct_answer,
            options: q.options,
            explanation: q.explanation,
            difficulty,
        })
        .collect();
    if questions.is_empty() {
        return None;
    }

    let title = generated
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("Quiz about {}", topic));

    Some(Quiz {
        id: Uuid::new_v4().to_string(),
        title,
        topic: topic.to_string(),
        estimated_time: questions.len() as u32 * MINUTES_PER_QUESTION,
        questions,
        difficulty,
        created_at: Utc::now(),
    })
}

/// Deterministic three-question quiz used whenever generation fails.
pub fn fallback_quiz(topic: &str, difficulty: Difficulty) -> Quiz {
    let questions = vec![
        QuizQuestion {
            question: "What is the main topic of this lesson?".to_string(),
            question_type: QuestionType::MultipleChoice,
            correct_answer: topic.to_string(),
            options: Some(vec![
                topic.to_string(),
                "Something else".to_string(),
                "I don't know".to_string(),
                "Maybe".to_string(),
            ]),
            explanation: Some(format!("The main topic is {}", topic)),
            difficulty,
        },
        QuizQuestion {
            question: "True or False: This lesson teaches us something interesting.".to_string(),
            question_type: QuestionType::TrueFalse,
            correct_answer: "True".to_string(),
            options: None,
            explanation: Some(
                "This lesson is designed to be interesting and educational".to_string(),
            ),
            difficulty,
        },
        QuizQuestion {
            question: "Fill in the blank: This lesson is about _____.".to_string(),
            question_type: QuestionType::FillBlank,
            correct_answer: topic.to_string(),
            options: None,
            explanation: Some(format!("The lesson is about {}", topic)),
            difficulty,
        },
    ];

    Quiz {
        id: Uuid::new_v4().to_string(),
        title: format!("Quick Quiz about {}", topic),
        topic: topic.to_string(),
        estimated_time: questions.len() as u32 * MINUTES_PER_QUESTION,
        questions,
        difficulty,
        created_at: Utc::now(),
    }
}
