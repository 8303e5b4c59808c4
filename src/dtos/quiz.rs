//! Quiz DTOs - Data Transfer Objects per quiz, domande e scelte

use crate::entities::{Choice, Question, QuestionType, Quiz, QuizStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizDTO {
    pub quiz_id: i64,
    pub title: String,
    pub description: String,
    pub owner_id: i64,
    pub status: QuizStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

impl From<Quiz> for QuizDTO {
    fn from(value: Quiz) -> Self {
        let is_active = value.is_active();
        Self {
            quiz_id: value.quiz_id,
            title: value.title,
            description: value.description,
            owner_id: value.owner_id,
            status: value.status,
            start_time: value.start_time,
            end_time: value.end_time,
            created_at: value.created_at,
            is_active,
        }
    }
}

/// Quiz con le sue domande, usato sia dal creatore sia dal partecipante
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuizDetailDTO {
    #[serde(flatten)]
    pub quiz: QuizDTO,
    pub max_score: i64,
    pub total_questions: i64,
    pub questions: Vec<QuestionDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct QuestionDTO {
    pub question_id: i64,
    pub text: String,
    pub question_type: QuestionType,
    pub order: i64,
    pub points: i64,
    pub choices: Vec<ChoiceDTO>,
}

impl QuestionDTO {
    /// Groups `choices` under `question`. With `reveal_correct` false the correct flag is
    /// left out, which is what participants get.
    pub fn with_choices(question: Question, choices: &[Choice], reveal_correct: bool) -> Self {
        let choices = choices
            .iter()
            .filter(|c| c.question_id == question.question_id)
            .map(|c| ChoiceDTO {
                choice_id: c.choice_id,
                text: c.text.clone(),
                order: c.order,
                is_correct: reveal_correct.then_some(c.is_correct),
            })
            .collect();

        Self {
            question_id: question.question_id,
            text: question.text,
            question_type: question.question_type,
            order: question.order,
            points: question.points,
            choices,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChoiceDTO {
    pub choice_id: i64,
    pub text: String,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateQuizDTO {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub status: Option<QuizStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Aggiornamento parziale: solo i campi `Some` vengono scritti
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateQuizDTO {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<QuizStatus>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl UpdateQuizDTO {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateQuestionDTO {
    #[validate(length(min = 1))]
    pub text: String,
    pub question_type: Option<QuestionType>,
    #[validate(range(min = 0))]
    pub order: i64,
    #[validate(range(min = 1))]
    pub points: Option<i64>,
    #[validate(length(min = 2), nested)]
    pub choices: Vec<CreateChoiceDTO>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateChoiceDTO {
    #[validate(length(min = 1))]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[validate(range(min = 0))]
    pub order: i64,
}

/// Statistiche di un quiz per il creatore
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct QuizProgressDTO {
    pub quiz_id: i64,
    pub total_attempts: i64,
    pub completed_attempts: i64,
    pub total_questions: i64,
    pub max_score: i64,
    /// media delle percentuali dei tentativi completati, 0 se non ce ne sono
    pub average_percentage: f64,
}
