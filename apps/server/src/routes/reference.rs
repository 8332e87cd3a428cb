//! Read-only reference lists.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use stockroom_core::{Category, Supplier};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SupplierList {
    pub suppliers: Vec<Supplier>,
}

#[derive(Debug, Serialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

pub async fn suppliers(State(state): State<AppState>) -> Result<Json<SupplierList>, ApiError> {
    let suppliers = state.db.catalog().suppliers().await?;
    Ok(Json(SupplierList { suppliers }))
}

pub async fn categories(State(state): State<AppState>) -> Result<Json<CategoryList>, ApiError> {
    let categories = state.db.catalog().categories().await?;
    Ok(Json(CategoryList { categories }))
}
