//! Dashboard reporting.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use stockroom_core::{DashboardSummary, StockLevel, TopItems, WeeklyCount};

use crate::error::ApiError;
use crate::AppState;

pub async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    Ok(Json(state.db.dashboard().summary().await?))
}

pub async fn weekly_transactions(
    State(state): State<AppState>,
) -> Result<Json<Vec<WeeklyCount>>, ApiError> {
    Ok(Json(state.db.dashboard().weekly_transactions().await?))
}

pub async fn top_items(State(state): State<AppState>) -> Result<Json<TopItems>, ApiError> {
    Ok(Json(state.db.dashboard().top_items().await?))
}

/// Restock banner. `alert` is false when nothing is low.
#[derive(Debug, Serialize)]
pub struct LowStockAlert {
    pub alert: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<StockLevel>,
}

pub async fn low_stock(State(state): State<AppState>) -> Result<Json<LowStockAlert>, ApiError> {
    let items = state.db.dashboard().low_stock().await?;

    let alert = if items.is_empty() {
        LowStockAlert {
            alert: false,
            message: None,
            items,
        }
    } else {
        LowStockAlert {
            alert: true,
            message: Some("Beberapa barang hampir habis, segera minta supply!"),
            items,
        }
    };

    Ok(Json(alert))
}
