//! Attempt scoring and feedback.

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;
use wonder_store::{Difficulty, QuestionType, Quiz, QuizAttempt, QuizQuestion};

/// Result of scoring one submission
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub score: f64,
    pub correct_answers: usize,
    pub total_questions: usize,
    pub feedback: String,
    pub attempt_id: String,
    #[serde(skip)]
    pub attempt: QuizAttempt,
}

/// Score `answers` (keyed by question index) against `quiz`.
pub fn score_attempt(
    quiz: &Quiz,
    user_id: &str,
    answers: BTreeMap<String, String>,
    time_taken: u64,
) -> ScoreReport {
    let total_questions = quiz.questions.len();
    let correct_answers = quiz
        .questions
        .iter()
        .enumerate()
        .filter(|(index, question)| {
            let given = answers.get(&index.to_string()).map(String::as_str).unwrap_or("");
            is_correct(question, given)
        })
        .count();

    let score = if total_questions == 0 {
        0.0
    } else {
        correct_answers as f64 / total_questions as f64 * 100.0
    };

    let attempt = QuizAttempt {
        quiz_id: quiz.id.clone(),
        user_id: user_id.to_string(),
        score,
        total_questions,
        correct_answers,
        time_taken,
        completed_at: Utc::now(),
        answers,
    };

    ScoreReport {
        score,
        correct_answers,
        total_questions,
        feedback: feedback(score, quiz.difficulty),
        attempt_id: Uuid::new_v4().to_string(),
        attempt,
    }
}

pub fn is_correct(question: &QuizQuestion, given: &str) -> bool {
    let expected = question.correct_answer.as_str();
    match question.question_type {
        QuestionType::TrueFalse => given.to_lowercase() == expected.to_lowercase(),
        QuestionType::MultipleChoice => given == expected,
        QuestionType::FillBlank => given.trim().to_lowercase() == expected.trim().to_lowercase(),
        QuestionType::ShortAnswer => {
            let given = given.to_lowercase();
            expected
                .to_lowercase()
                .split_whitespace()
                .any(|word| given.contains(word))
        }
    }
}

pub fn feedback(score: f64, difficulty: Difficulty) -> String {
    if score >= 90.0 {
        format!("🎉 Amazing! You're a {} level expert!", difficulty)
    } else if score >= 80.0 {
        format!("🌟 Great job! You really understand this {} material!", difficulty)
    } else if score >= 70.0 {
        format!("👍 Good work! You're getting the hang of this {} topic!", difficulty)
    } else if score >= 60.0 {
        format!("📚 Keep practicing! This {} material takes time to master.", difficulty)
    } else {
        format!("💪 Don't worry! {} level topics can be challenging. Try again!", difficulty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(question_type: QuestionType, answer: &str) -> QuizQuestion {
        QuizQuestion {
            question: "q".to_string(),
            question_type,
            correct_answer: answer.to_string(),
            options: None,
            explanation: None,
            difficulty: Difficulty::Medium,
        }
    }

    #[test]
    fn test_answer_matching_rules() {
        let tf = question(QuestionType::TrueFalse, "True");
        assert!(is_correct(&tf, "true"));
        assert!(!is_correct(&tf, " true"));

        let mc = question(QuestionType::MultipleChoice, "Volcano");
        assert!(is_correct(&mc, "Volcano"));
        assert!(!is_correct(&mc, "volcano"));

        let fill = question(QuestionType::FillBlank, "Photosynthesis");
        assert!(is_correct(&fill, "  photosynthesis "));

        let short = question(QuestionType::ShortAnswer, "hot magma");
        assert!(is_correct(&short, "It is made of Magma"));
        assert!(!is_correct(&short, "ice"));
    }

    #[test]
    fn test_feedback_bands() {
        assert!(feedback(95.0, Difficulty::Easy).contains("easy level expert"));
        assert!(feedback(80.0, Difficulty::Medium).contains("Great job"));
        assert!(feedback(70.0, Difficulty::Medium).contains("Good work"));
        assert!(feedback(60.0, Difficulty::Hard).contains("Keep practicing! This hard"));
        assert!(feedback(10.0, Difficulty::Hard).contains("hard level topics can be challenging"));
    }
}
