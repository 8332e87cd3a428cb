//! HTTP routes.
//!
//! | Prefix | Module |
//! |---|---|
//! | `/login` | [`auth`] |
//! | `/items` | [`items`] |
//! | `/suppliers`, `/categories` | [`reference`] |
//! | `/transactions` | [`transactions`] |
//! | `/dashboard` | [`dashboard`] |
//! | `/health` | [`health`] |

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod items;
pub mod reference;
pub mod transactions;

use axum::extract::{FromRequest, Request};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::AppState;

/// All API routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/login/register", post(auth::register))
        .route("/login/profile", patch(auth::update_profile))
        .route("/items", get(items::list).post(items::create))
        .route(
            "/items/{id}",
            get(items::get).put(items::update).delete(items::delete),
        )
        .route("/suppliers", get(reference::suppliers))
        .route("/categories", get(reference::categories))
        .route("/transactions", get(transactions::history))
        .route("/transactions/in", post(transactions::record_in))
        .route("/transactions/out", post(transactions::record_out))
        .route("/dashboard/summary", get(dashboard::summary))
        .route(
            "/dashboard/weekly-transactions",
            get(dashboard::weekly_transactions),
        )
        .route("/dashboard/top-items", get(dashboard::top_items))
        .route("/dashboard/low-stock", get(dashboard::low_stock))
        .route("/health", get(health::health))
}

/// JSON body extractor whose rejection is an [`ApiError`], so malformed
/// bodies get the same `{ code, message }` shape as every other error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}
