use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    entity::{Course, Module, Quiz},
    grading::GradeOutcome,
};

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleOutline {
    pub id: i64,
    pub title: String,
    pub order_index: i32,
}

/// Course page as seen before purchase: no module content.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseOutline {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: i64,
    pub published: bool,
    pub instructor_id: i64,
    pub modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    pub fn from_entities(course: Course, modules: &[Module]) -> Self {
        Self {
            id: course.id(),
            title: course.title().to_string(),
            description: course.description().to_string(),
            price: course.price(),
            published: course.published(),
            instructor_id: course.instructor_id(),
            modules: modules
                .iter()
                .map(|m| ModuleOutline {
                    id: m.id(),
                    title: m.title().to_string(),
                    order_index: m.order_index(),
                })
                .collect(),
        }
    }
}

/// Quiz without its answer.
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizView {
    pub id: i64,
    pub module_id: i64,
    pub question: String,
    pub options: Vec<String>,
}

impl From<&Quiz> for QuizView {
    fn from(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id(),
            module_id: quiz.module_id(),
            question: quiz.question().to_string(),
            options: quiz.options().to_vec(),
        }
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ModuleDetail {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: String,
    pub pdf_url: Option<String>,
    pub order_index: i32,
    pub created_at: DateTime<Utc>,
    pub quizzes: Vec<QuizView>,
}

impl ModuleDetail {
    pub fn from_entities(module: Module, quizzes: &[Quiz]) -> Self {
        Self {
            id: module.id(),
            course_id: module.course_id(),
            title: module.title().to_string(),
            content: module.content().to_string(),
            pdf_url: module.pdf_url().map(str::to_string),
            order_index: module.order_index(),
            created_at: *module.created_at(),
            quizzes: quizzes.iter().map(QuizView::from).collect(),
        }
    }
}

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct SubmitResponse {
    pub score: i32,
    pub passed: bool,
    pub total_quiz: usize,
    pub correct: usize,
    pub wrong: usize,
    pub course_id: i64,
    pub module_id: i64,
}

impl SubmitResponse {
    pub fn new(outcome: GradeOutcome, course_id: i64, module_id: i64) -> Self {
        Self {
            score: outcome.score,
            passed: outcome.passed,
            total_quiz: outcome.total,
            correct: outcome.correct,
            wrong: outcome.wrong,
            course_id,
            module_id,
        }
    }
}
