//! Service banner and category catalogs

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use para_core::catalog::{ReportCategory, EQUIPMENT_CATEGORIES, HAUNTING_TYPES};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct RootResponse {
    #[schema(example = "ParaInvestigate API")]
    pub message: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/api/",
    tag = "catalog",
    responses((status = 200, description = "Service name and version", body = RootResponse))
)]
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();
    Json(RootResponse {
        message: "ParaInvestigate API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize, ToSchema)]
pub struct CategoriesResponse {
    /// Sighting categories
    pub categories: Vec<String>,
    pub haunting_types: Vec<String>,
    pub equipment_categories: Vec<String>,
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "catalog",
    responses((status = 200, description = "Category catalogs", body = CategoriesResponse))
)]
pub async fn categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.increment_requests();
    Json(CategoriesResponse {
        categories: owned(&ReportCategory::names()),
        haunting_types: owned(&HAUNTING_TYPES),
        equipment_categories: owned(&EQUIPMENT_CATEGORIES),
    })
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}
