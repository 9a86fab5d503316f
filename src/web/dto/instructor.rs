use serde::Deserialize;

use crate::model::entity::{CourseUpdate, ModuleUpdate, QuizCreate};

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CourseCreateRequest {
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct CourseUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
}

impl From<CourseUpdateRequest> for CourseUpdate {
    fn from(value: CourseUpdateRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            price: value.price,
            published: None,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ModuleCreateRequest {
    pub title: String,
    pub content: Option<String>,
    pub pdf_url: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ModuleUpdateRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub pdf_url: Option<String>,
    pub order: Option<i32>,
}

impl From<ModuleUpdateRequest> for ModuleUpdate {
    fn from(value: ModuleUpdateRequest) -> Self {
        Self {
            title: value.title,
            content: value.content,
            pdf_url: value.pdf_url,
            order_index: value.order,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct QuizCreateRequest {
    pub question: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl QuizCreateRequest {
    pub fn into_draft(self, module_id: i64) -> QuizCreate {
        QuizCreate {
            module_id,
            question: self.question,
            options: self.options,
            answer: self.answer,
        }
    }
}
