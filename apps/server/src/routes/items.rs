//! # Product Routes
//!
//! Catalog CRUD. Create and update take `multipart/form-data` so a photo can
//! ride along with the fields.
//!
//! ## Form Fields
//! | Field | Also read as | Notes |
//! |---|---|---|
//! | `name` | `namaItem` | required on create |
//! | `categoryId`, `supplierId` | `catid`, `supid` | blank clears the reference |
//! | `description` | `keterangan` | |
//! | `unitPrice` | `hargaSatuan` | integer minor units >= 0 (`12500` or `12500.00`, not `12500.50`); blank means 0 |
//! | `stock` | `stok` | whole number >= 0, blank means 0 |
//! | `photo` | `foto` | image file; on update a plain empty field clears it |
//!
//! On update only the fields present in the form change.

use std::collections::HashMap;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stockroom_core::validation::{optional_ref, parse_price, parse_stock};
use stockroom_core::{NewProduct, Product, ProductUpdate};
use tracing::info;

use crate::error::ApiError;
use crate::uploads;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ProductList {
    pub count: usize,
    pub items: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub message: &'static str,
    pub deleted: Product,
}

/// Legacy form names accepted when the primary name is absent.
const FIELD_ALIASES: &[(&str, &str)] = &[
    ("name", "namaItem"),
    ("categoryId", "catid"),
    ("supplierId", "supid"),
    ("description", "keterangan"),
    ("unitPrice", "hargaSatuan"),
    ("stock", "stok"),
    ("photo", "foto"),
];

/// What a product form submitted.
#[derive(Debug, Default)]
struct ProductForm {
    fields: HashMap<String, String>,
    /// Public path of a photo stored while reading the form.
    photo: Option<String>,
}

impl ProductForm {
    async fn read(mut multipart: Multipart, uploads_dir: &std::path::Path) -> Result<Self, ApiError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            let file_name = field.file_name().map(str::to_string);
            match file_name {
                Some(file_name) if name == "photo" || name == "foto" => {
                    let bytes = field.bytes().await?;
                    // Browsers send an empty file part when nothing was picked.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    if let Some(previous) = form.photo.take() {
                        uploads::remove_photo(uploads_dir, &previous).await;
                    }
                    form.photo = Some(uploads::save_photo(uploads_dir, &file_name, &bytes).await?);
                }
                _ => {
                    let value = field.text().await?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    fn field(&self, key: &str) -> Option<&String> {
        self.fields.get(key).or_else(|| {
            FIELD_ALIASES
                .iter()
                .find(|(primary, _)| *primary == key)
                .and_then(|(_, legacy)| self.fields.get(*legacy))
        })
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.field(key).map(String::as_str)
    }

    fn reference(&self, key: &str) -> Option<Option<String>> {
        self.field(key).map(|v| optional_ref(Some(v.clone())))
    }

    fn new_product(&self) -> Result<NewProduct, ApiError> {
        Ok(NewProduct {
            name: self.text("name").unwrap_or_default().to_string(),
            category_id: self.reference("categoryId").flatten(),
            supplier_id: self.reference("supplierId").flatten(),
            description: self.text("description").unwrap_or_default().to_string(),
            unit_price: parse_price(self.text("unitPrice").unwrap_or_default())?,
            stock: parse_stock(self.text("stock").unwrap_or_default())?,
            photo: self.photo.clone(),
        })
    }

    fn update(&self) -> Result<ProductUpdate, ApiError> {
        let photo = match (&self.photo, self.text("photo")) {
            (Some(stored), _) => Some(Some(stored.clone())),
            (None, Some(value)) if value.trim().is_empty() => Some(None),
            _ => None,
        };

        Ok(ProductUpdate {
            name: self.text("name").map(str::to_string),
            category_id: self.reference("categoryId"),
            supplier_id: self.reference("supplierId"),
            description: self.text("description").map(str::to_string),
            unit_price: self.text("unitPrice").map(parse_price).transpose()?,
            stock: self.text("stock").map(parse_stock).transpose()?,
            photo,
        })
    }
}

/// `GET /items?q=`
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, axum::extract::rejection::QueryRejection>,
) -> Result<Json<ProductList>, ApiError> {
    let Query(params) = params?;
    let items = state.db.products().search(&params.q).await?;
    Ok(Json(ProductList {
        count: items.len(),
        items,
    }))
}

/// `GET /items/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", &id))
}

/// `POST /items`
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let uploads_dir = &state.config.uploads_dir;
    let form = ProductForm::read(multipart, uploads_dir).await?;

    let result = match form.new_product() {
        Ok(new) => state.db.products().create(new).await.map_err(ApiError::from),
        Err(e) => Err(e),
    };

    match result {
        Ok(product) => Ok((StatusCode::CREATED, Json(product))),
        Err(e) => {
            if let Some(photo) = &form.photo {
                uploads::remove_photo(uploads_dir, photo).await;
            }
            Err(e)
        }
    }
}

/// `PUT /items/{id}`
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Product>, ApiError> {
    let uploads_dir = &state.config.uploads_dir;
    let form = ProductForm::read(multipart, uploads_dir).await?;

    let result = apply_update(&state, &id, &form).await;

    match result {
        Ok((product, old_photo)) => {
            if let Some(old) = old_photo.filter(|old| product.photo.as_ref() != Some(old)) {
                uploads::remove_photo(uploads_dir, &old).await;
            }
            Ok(Json(product))
        }
        Err(e) => {
            if let Some(photo) = &form.photo {
                uploads::remove_photo(uploads_dir, photo).await;
            }
            Err(e)
        }
    }
}

async fn apply_update(
    state: &AppState,
    id: &str,
    form: &ProductForm,
) -> Result<(Product, Option<String>), ApiError> {
    let changes = form.update()?;
    let current = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    let product = state.db.products().update(id, changes).await?;
    Ok((product, current.photo))
}

/// `DELETE /items/{id}`
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, ApiError> {
    let deleted = state.db.products().delete(&id).await?;

    if let Some(photo) = &deleted.photo {
        uploads::remove_photo(&state.config.uploads_dir, photo).await;
    }

    info!(product_id = %deleted.id, "Product removed via API");
    Ok(Json(Deleted {
        message: "Produk dihapus",
        deleted,
    }))
}
