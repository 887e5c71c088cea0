use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or invalid credentials")]
    Unauthorized,

    #[error("Not allowed to access this resource")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(_) | DomainError::VerificationFailed => {
                AppError::BadRequest(e.to_string())
            }
            DomainError::Unauthorized => AppError::Unauthorized,
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::NotFound(_) => AppError::NotFound(e.to_string()),
            DomainError::InsufficientStock { .. } | DomainError::InvalidState(_) => {
                AppError::Conflict(e.to_string())
            }
            DomainError::Gateway(_) => AppError::BadGateway(e.to_string()),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                log::error!("Request failed: {detail}");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;
    use uuid::Uuid;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::from(DomainError::NotFound("Order")).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn internal_error_hides_detail() {
        let resp = AppError::Internal("password=hunter2".to_string()).error_response();
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }

    #[test]
    fn not_found_display() {
        assert_eq!(
            AppError::from(DomainError::NotFound("Product")).to_string(),
            "Product not found"
        );
    }

    #[test]
    fn validation_and_signature_failures_are_bad_requests() {
        for e in [
            DomainError::validation("reason is required"),
            DomainError::VerificationFailed,
        ] {
            assert_eq!(
                AppError::from(e).status_code(),
                StatusCode::BAD_REQUEST
            );
        }
    }

    #[test]
    fn stock_and_state_conflicts_map_to_409() {
        let stock = DomainError::InsufficientStock {
            product_id: Uuid::nil(),
            requested: 3,
            available: 1,
        };
        assert_eq!(AppError::from(stock).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::from(DomainError::invalid_state("order is delivered")).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn auth_errors_map_to_401_and_403() {
        assert_eq!(
            AppError::from(DomainError::Unauthorized).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::from(DomainError::Forbidden).status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn domain_internal_maps_to_app_internal() {
        let app_err: AppError = DomainError::Internal("oops".to_string()).into();
        assert!(matches!(app_err, AppError::Internal(_)));
    }

    #[test]
    fn gateway_failure_is_bad_gateway() {
        let app_err: AppError = DomainError::Gateway("timeout".to_string()).into();
        assert_eq!(app_err.status_code(), StatusCode::BAD_GATEWAY);
    }
}
