use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::verify_token;
use crate::db::models::{Role, User};
use crate::db::pool;
use crate::error::ApiError;

/// Authenticated user context injected into protected requests.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub role: Role,
}

/// JWT authentication middleware for protected route groups.
///
/// Confirms the subject still exists before letting the request through,
/// so tokens for deleted accounts stop working immediately.
pub async fn require_auth(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;

    let claims = verify_token(&token)?;

    let pool = pool().await?;
    let user = User::find(&pool, claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Not authorized to access this route"))?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        role: user.role,
    });

    Ok(next.run(request).await)
}

/// Pulls the credential from the Authorization header, then lets a token
/// cookie overwrite it. When both are present the cookie wins.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let mut token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    if let Some(cookie_token) = token_cookie(headers) {
        token = Some(cookie_token);
    }

    token
}

fn token_cookie(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == "token")
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// Rejects with 403 unless the caller holds one of the named roles.
pub fn require_role(user: &CurrentUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden(format!(
            "User role {} is not authorized to access this route",
            user.role.as_str()
        )))
    }
}

/// Rejects with 403 unless the caller owns the resource or is an admin.
pub fn require_owner(user: &CurrentUser, owner_id: Uuid) -> Result<(), ApiError> {
    if user.role == Role::Admin || user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Not authorized to modify this resource",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn bearer_header_supplies_token() {
        let h = headers(&[("authorization", "Bearer abc123")]);
        assert_eq!(extract_token(&h), Some("abc123".to_string()));
    }

    #[test]
    fn cookie_supplies_token() {
        let h = headers(&[("cookie", "theme=dark; token=xyz789")]);
        assert_eq!(extract_token(&h), Some("xyz789".to_string()));
    }

    #[test]
    fn cookie_overwrites_bearer_header() {
        let h = headers(&[
            ("authorization", "Bearer header-token"),
            ("cookie", "token=cookie-token"),
        ]);
        assert_eq!(extract_token(&h), Some("cookie-token".to_string()));
    }

    #[test]
    fn missing_credentials_yield_none() {
        let h = headers(&[("cookie", "theme=dark")]);
        assert_eq!(extract_token(&h), None);
    }

    fn current(role: Role) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn role_gate_allows_listed_roles_only() {
        let publisher = current(Role::Publisher);
        assert!(require_role(&publisher, &[Role::Publisher, Role::Admin]).is_ok());
        assert!(require_role(&publisher, &[Role::Admin]).is_err());
    }

    #[test]
    fn owner_gate_allows_owner_and_admin() {
        let owner = current(Role::Publisher);
        assert!(require_owner(&owner, owner.id).is_ok());
        assert!(require_owner(&owner, Uuid::new_v4()).is_err());

        let admin = current(Role::Admin);
        assert!(require_owner(&admin, Uuid::new_v4()).is_ok());
    }
}
