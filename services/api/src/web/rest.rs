//! services/api/src/web/rest.rs
//!
//! Contains the master definition for the OpenAPI specification and the payload
//! pieces shared by several REST handlers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use utoipa::{OpenApi, ToSchema};

use crate::web::{auth, grocery, pantry, recipes};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::me_handler,
        pantry::list_pantry_handler,
        pantry::create_pantry_item_handler,
        pantry::update_pantry_item_handler,
        pantry::delete_pantry_item_handler,
        recipes::list_recipes_handler,
        recipes::get_recipe_handler,
        recipes::create_recipe_handler,
        recipes::update_recipe_handler,
        recipes::delete_recipe_handler,
        grocery::generate_handler,
        grocery::list_grocery_lists_handler,
        grocery::update_grocery_list_handler,
        grocery::update_grocery_item_handler,
        grocery::delete_grocery_list_handler,
    ),
    components(
        schemas(
            MessageResponse,
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            pantry::PantryItemResponse,
            pantry::CreatePantryItemRequest,
            pantry::UpdatePantryItemRequest,
            recipes::IngredientPayload,
            recipes::RecipeResponse,
            recipes::CreateRecipeRequest,
            recipes::UpdateRecipeRequest,
            grocery::GenerateRequest,
            grocery::GroceryItemResponse,
            grocery::GroceryListResponse,
            grocery::UpdateGroceryListRequest,
            grocery::UpdateGroceryItemRequest,
        )
    ),
    tags(
        (name = "Pantry Planner API", description = "Pantry stock, recipes and generated grocery lists.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Payload Pieces
//=========================================================================================

/// Plain acknowledgement body, e.g. after a delete.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

/// A quantity as clients send it: either a JSON number or free text.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum QuantityInput {
    Number(f64),
    Text(String),
}

impl QuantityInput {
    /// The stored text form. Numbers print without a trailing `.0`.
    pub fn into_text(self) -> String {
        match self {
            QuantityInput::Number(n) => n.to_string(),
            QuantityInput::Text(s) => s,
        }
    }

    /// Strict numeric reading, used where the stored field is a number.
    pub fn into_number(self) -> Result<f64, String> {
        let n = match self {
            QuantityInput::Number(n) => n,
            QuantityInput::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", s))?,
        };
        if n.is_finite() {
            Ok(n)
        } else {
            Err("quantity must be finite".to_string())
        }
    }
}

impl Serialize for QuantityInput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            QuantityInput::Number(n) => serializer.serialize_f64(*n),
            QuantityInput::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

/// Trims a required text field, rejecting blanks.
pub fn required_text(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(format!("{} is required", field))
    } else {
        Ok(trimmed.to_string())
    }
}
