use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use uuid::Uuid;

use crate::auth::jwt::{verify_token, TokenType};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
}

impl AuthUser {
    /// Owner check used before touching any user-owned row.
    pub fn ensure_owns(&self, owner_id: Uuid) -> Result<(), AppError> {
        if owner_id == self.id {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

pub async fn require_auth(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(bearer.token(), &state.config)?;

    if token_data.claims.token_type != TokenType::Access {
        return Err(AppError::Unauthorized);
    }

    let auth_user = AuthUser {
        id: token_data.claims.sub,
        username: token_data.claims.username,
    };

    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_owns() {
        let user = AuthUser {
            id: Uuid::new_v4(),
            username: "demo".into(),
        };
        assert!(user.ensure_owns(user.id).is_ok());
        assert!(matches!(user.ensure_owns(Uuid::new_v4()), Err(AppError::Forbidden)));
    }
}
