use std::future::Future;
use std::pin::Pin;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};

use crate::domain::access::Requester;
use crate::errors::AppError;
use crate::state::AppState;

/// The caller resolved from an `Authorization: Bearer <token>` header.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Requester);

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = extract_bearer_token(req).map(str::to_string);
        let state = req.app_data::<web::Data<AppState>>().cloned();

        Box::pin(async move {
            let token = token.ok_or(AppError::Unauthorized)?;
            let state = state
                .ok_or_else(|| AppError::Internal("application state missing".to_string()))?;
            let requester = web::block(move || state.auth.authenticate(&token)).await??;
            Ok(Authenticated(requester))
        })
    }
}

fn extract_bearer_token(req: &HttpRequest) -> Option<&str> {
    let value = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.splitn(2, ' ');

    let scheme = parts.next()?;
    let token = parts.next()?.trim();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }

    Some(token)
}
