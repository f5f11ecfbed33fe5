use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
    typed_header::TypedHeaderRejection,
};
use serde::Serialize;

use crate::{
    AppState,
    error::AppError,
    infrastructure::ProfileStore,
    utils::{TokenService, plan_is_entitled},
};

/// A caller whose token is valid and whose profile carries a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub plan: String,
}

/// Runs the full access check for a bearer token: signature and expiry
/// first, then the caller's plan in the profile store.
pub async fn authorize(
    tokens: &TokenService,
    profiles: &dyn ProfileStore,
    bearer: Option<&str>,
) -> Result<Identity, AppError> {
    let token = bearer
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::Unauthenticated)?;

    let claims = tokens.verify(token).ok_or(AppError::Unauthenticated)?;
    if claims.sub.is_empty() || claims.email.is_empty() {
        tracing::debug!("Token payload lacks subject or email");
        return Err(AppError::Unauthenticated);
    }

    let profile = profiles.find_profile(&claims.sub).await.map_err(|e| {
        tracing::error!(user_id = %claims.sub, error = %e, "Profile lookup failed");
        AppError::from(e)
    })?;

    let Some(plan) = profile
        .and_then(|profile| profile.plan)
        .filter(|plan| plan_is_entitled(Some(plan.as_str())))
    else {
        tracing::info!(user_id = %claims.sub, "Access denied: no valid plan");
        return Err(AppError::Forbidden);
    };

    tracing::debug!(user_id = %claims.sub, plan = %plan, "Access granted");
    Ok(Identity {
        user_id: claims.sub,
        email: claims.email,
        plan,
    })
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer.as_ref().ok().map(|TypedHeader(auth)| auth.token());
    let identity = authorize(&state.tokens, state.profiles.as_ref(), token).await?;

    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}
