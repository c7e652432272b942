//! services/api/src/web/pantry.rs
//!
//! REST handlers for the signed-in user's pantry items.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use pantry_planner_core::{NewPantryItem, PantryItem, PantryItemPatch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{port_error_response, HandlerError};
use crate::web::rest::{double_option, required_text, MessageResponse, QuantityInput};
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PantryItemResponse {
    pub id: Uuid,
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub category: String,
    pub expiry_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PantryItem> for PantryItemResponse {
    fn from(item: PantryItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            category: item.category,
            expiry_date: item.expiry_date,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePantryItemRequest {
    pub name: String,
    #[schema(value_type = Option<String>)]
    pub quantity: Option<QuantityInput>,
    pub unit: Option<String>,
    pub category: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

impl CreatePantryItemRequest {
    pub fn into_new_item(self) -> Result<NewPantryItem, String> {
        Ok(NewPantryItem {
            name: required_text("name", &self.name)?,
            quantity: self.quantity.map(QuantityInput::into_text),
            unit: self.unit,
            category: self.category,
            expiry_date: self.expiry_date,
        })
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePantryItemRequest {
    pub name: Option<String>,
    #[schema(value_type = Option<String>)]
    pub quantity: Option<QuantityInput>,
    pub unit: Option<String>,
    pub category: Option<String>,
    /// `null` clears the expiry date; omitting the field keeps it.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub expiry_date: Option<Option<NaiveDate>>,
}

impl UpdatePantryItemRequest {
    pub fn into_patch(self) -> Result<PantryItemPatch, String> {
        Ok(PantryItemPatch {
            name: self
                .name
                .map(|n| required_text("name", &n))
                .transpose()?,
            quantity: self.quantity.map(QuantityInput::into_text),
            unit: self.unit,
            category: self.category,
            expiry_date: self.expiry_date,
        })
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/pantry - List the user's pantry items, newest first
#[utoipa::path(
    get,
    path = "/api/pantry",
    responses(
        (status = 200, description = "Pantry items", body = [PantryItemResponse]),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_pantry_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let items = state
        .pantry
        .list_pantry_items(user_id)
        .await
        .map_err(|e| port_error_response("Failed to fetch pantry items", e))?;

    Ok(Json(
        items
            .into_iter()
            .map(PantryItemResponse::from)
            .collect::<Vec<_>>(),
    ))
}

/// POST /api/pantry - Add a pantry item
#[utoipa::path(
    post,
    path = "/api/pantry",
    request_body = CreatePantryItemRequest,
    responses(
        (status = 201, description = "Item created", body = PantryItemResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Not signed in"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_pantry_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<CreatePantryItemRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let new_item = req
        .into_new_item()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let item = state
        .pantry
        .create_pantry_item(user_id, new_item)
        .await
        .map_err(|e| port_error_response("Failed to add pantry item", e))?;

    Ok((StatusCode::CREATED, Json(PantryItemResponse::from(item))))
}

/// PUT /api/pantry/{id} - Update fields of a pantry item
#[utoipa::path(
    put,
    path = "/api/pantry/{id}",
    request_body = UpdatePantryItemRequest,
    params(("id" = Uuid, Path, description = "Pantry item id")),
    responses(
        (status = 200, description = "Item updated", body = PantryItemResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_pantry_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdatePantryItemRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let patch = req
        .into_patch()
        .map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;

    let item = state
        .pantry
        .update_pantry_item(user_id, item_id, patch)
        .await
        .map_err(|e| port_error_response("Failed to update pantry item", e))?;

    Ok(Json(PantryItemResponse::from(item)))
}

/// DELETE /api/pantry/{id} - Remove a pantry item
#[utoipa::path(
    delete,
    path = "/api/pantry/{id}",
    params(("id" = Uuid, Path, description = "Pantry item id")),
    responses(
        (status = 200, description = "Item removed", body = MessageResponse),
        (status = 404, description = "Item not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_pantry_item_handler(
    State(state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    state
        .pantry
        .delete_pantry_item(user_id, item_id)
        .await
        .map_err(|e| port_error_response("Failed to delete pantry item", e))?;

    Ok(Json(MessageResponse::new("Item removed")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_trims_name_and_keeps_quantity_text() {
        let req: CreatePantryItemRequest = serde_json::from_str(
            r#"{"name": "  Brown Rice ", "quantity": 2, "unit": "kg", "expiryDate": "2026-12-01"}"#,
        )
        .unwrap();

        let item = req.into_new_item().unwrap();

        assert_eq!(item.name, "Brown Rice");
        assert_eq!(item.quantity.as_deref(), Some("2"));
        assert_eq!(item.expiry_date, NaiveDate::from_ymd_opt(2026, 12, 1));
        assert_eq!(item.category, None);
    }

    #[test]
    fn create_request_requires_a_name() {
        let req: CreatePantryItemRequest = serde_json::from_str(r#"{"name": " "}"#).unwrap();
        assert!(req.into_new_item().is_err());
    }

    #[test]
    fn update_request_maps_null_expiry_to_clear() {
        let req: UpdatePantryItemRequest =
            serde_json::from_str(r#"{"quantity": "a few", "expiryDate": null}"#).unwrap();

        let patch = req.into_patch().unwrap();

        assert_eq!(patch.quantity.as_deref(), Some("a few"));
        assert_eq!(patch.expiry_date, Some(None));
        assert!(patch.name.is_none());
    }
}
