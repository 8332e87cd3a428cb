//! # Stock Movement Routes
//!
//! `POST /transactions/in` and `/out` record a movement, `GET /transactions`
//! lists the history.
//!
//! ## Request Body
//! ```json
//! {
//!   "rows": [{ "itemId": "P001", "qty": 5, "supplierId": "S001", "note": "" }],
//!   "supplier_id": "S001",
//!   "note": "restock",
//!   "username": "budi",
//!   "user_id": "A1B2"
//! }
//! ```
//! `qty` may arrive as a number or a numeric string.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Deserializer, Serialize};
use stockroom_core::{HistoryEntry, LineItem, MovementType, NewStockMovement, UserIdentity};

use super::ApiJson;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MovementRequest {
    #[serde(default)]
    pub rows: Vec<MovementRow>,
    #[serde(default, alias = "supplierId")]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, alias = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementRow {
    #[serde(default)]
    pub item_id: String,
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub qty: i64,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

impl MovementRequest {
    fn into_movement(self, movement_type: MovementType) -> NewStockMovement {
        NewStockMovement {
            movement_type,
            supplier_id: self.supplier_id,
            note: self.note,
            items: self
                .rows
                .into_iter()
                .map(|row| LineItem {
                    product_id: row.item_id.trim().to_string(),
                    quantity: row.qty,
                    supplier_id: row.supplier_id,
                    note: row.note,
                })
                .collect(),
            user: UserIdentity {
                username: self.username,
                user_id: self.user_id,
            },
        }
    }
}

fn lenient_quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Quantity {
        Number(i64),
        Text(String),
    }

    match Quantity::deserialize(deserializer)? {
        Quantity::Number(n) => Ok(n),
        Quantity::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("qty must be a whole number, got {s:?}"))),
    }
}

#[derive(Debug, Serialize)]
pub struct Recorded {
    pub message: &'static str,
    pub tranid: String,
}

#[derive(Debug, Serialize)]
pub struct History {
    pub transactions: Vec<HistoryEntry>,
}

pub async fn record_in(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MovementRequest>,
) -> Result<Json<Recorded>, ApiError> {
    record(&state, MovementType::In, req).await
}

pub async fn record_out(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<MovementRequest>,
) -> Result<Json<Recorded>, ApiError> {
    record(&state, MovementType::Out, req).await
}

async fn record(
    state: &AppState,
    movement_type: MovementType,
    req: MovementRequest,
) -> Result<Json<Recorded>, ApiError> {
    let recorded = state
        .db
        .recorder()
        .record(req.into_movement(movement_type))
        .await?;

    let message = match movement_type {
        MovementType::In => "Transaksi IN berhasil",
        MovementType::Out => "Transaksi OUT berhasil",
    };

    Ok(Json(Recorded {
        message,
        tranid: recorded.id,
    }))
}

pub async fn history(State(state): State<AppState>) -> Result<Json<History>, ApiError> {
    let transactions = state.db.transactions().history().await?;
    Ok(Json(History { transactions }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_maps_frontend_fields() {
        let req: MovementRequest = serde_json::from_value(serde_json::json!({
            "rows": [
                { "itemId": " P001 ", "qty": "5", "supplierId": "S002", "note": "pagi" },
                { "itemId": "P002", "qty": 2 }
            ],
            "username": "budi"
        }))
        .unwrap();

        let movement = req.into_movement(MovementType::In);
        assert_eq!(movement.items.len(), 2);
        assert_eq!(movement.items[0].product_id, "P001");
        assert_eq!(movement.items[0].quantity, 5);
        assert_eq!(movement.resolved_supplier().as_deref(), Some("S002"));
        assert_eq!(movement.resolved_note(), "pagi");
        assert_eq!(movement.user.username.as_deref(), Some("budi"));
        assert_eq!(movement.total_quantity(), 7);
    }

    #[test]
    fn test_rejects_non_numeric_quantity() {
        let result: Result<MovementRequest, _> = serde_json::from_value(serde_json::json!({
            "rows": [{ "itemId": "P001", "qty": "lima" }]
        }));
        assert!(result.is_err());
    }
}
