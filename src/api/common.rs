//! Common API utilities and shared types
//!
//! Extractors that report malformed requests in the JSON error envelope
//! instead of axum's plain-text rejections. When the failing field is known
//! it is reported in `details` like any other validation error.

use std::error::Error as StdError;

use axum::{
    extract::{
        path::ErrorKind,
        rejection::PathRejection,
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::api::middleware::ApiError;
use crate::services::{FieldError, ServiceError};

/// JSON request body
///
/// Field-level validation is left to the services so that rules depending
/// on stored state run in the right order.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            let field = deserialize_field_error::<serde_json::Error>(&rejection);
            rejection_error(field, rejection.body_text())
        })?;
        Ok(Self(value))
    }
}

/// Path parameters
pub struct ApiPath<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| rejection_error(path_field_error(&rejection), rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Query string parameters
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await.map_err(|rejection| {
            // serde_urlencoded reports through serde's plain value error
            let field = deserialize_field_error::<serde::de::value::Error>(&rejection);
            rejection_error(field, rejection.body_text())
        })?;
        Ok(Self(value))
    }
}

fn rejection_error(field: Option<FieldError>, fallback: String) -> ApiError {
    match field {
        Some(field) => ServiceError::Validation(vec![field]).into(),
        None => ApiError::validation_error(fallback),
    }
}

/// Locate the serde path error carried by a body or query rejection and turn
/// it into a field error. `E` is the deserializer's error type.
fn deserialize_field_error<E>(rejection: &(dyn StdError + 'static)) -> Option<FieldError>
where
    E: StdError + 'static,
{
    let err = std::iter::successors(Some(rejection), |&err| err.source())
        .find_map(|err| err.downcast_ref::<serde_path_to_error::Error<E>>())?;

    let message = err.inner().to_string();
    let path = err.path().to_string();
    // A missing field is reported against the enclosing object
    let field = if path == "." {
        missing_field(&message)?.to_string()
    } else {
        path
    };
    Some(FieldError::new(field, message))
}

fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

fn path_field_error(rejection: &PathRejection) -> Option<FieldError> {
    let PathRejection::FailedToDeserializePathParams(err) = rejection else {
        return None;
    };
    match err.kind() {
        ErrorKind::ParseErrorAtKey {
            key,
            value,
            expected_type,
        } => Some(FieldError::new(
            key.as_str(),
            format!("Cannot parse `{}` as {}", value, expected_type),
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_name() {
        assert_eq!(missing_field("missing field `productId` at line 1 column 15"), Some("productId"));
        assert_eq!(missing_field("invalid type: string \"two\""), None);
    }

    #[test]
    fn test_field_error_from_nested_path() {
        #[derive(Debug, serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        #[allow(dead_code)]
        struct Body {
            product_id: i64,
            quantity: i64,
        }

        let de = &mut serde_json::Deserializer::from_str(r#"{"productId": 1, "quantity": "two"}"#);
        let err = serde_path_to_error::deserialize::<_, Body>(de).unwrap_err();
        let field = deserialize_field_error::<serde_json::Error>(&err).unwrap();
        assert_eq!(field.field, "quantity");

        let de = &mut serde_json::Deserializer::from_str(r#"{"quantity": 2}"#);
        let err = serde_path_to_error::deserialize::<_, Body>(de).unwrap_err();
        let field = deserialize_field_error::<serde_json::Error>(&err).unwrap();
        assert_eq!(field.field, "productId");
    }
}
