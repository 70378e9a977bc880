use axum::{
    async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::header::COOKIE,
    http::request::Parts,
};

use crate::domain::user::entity::user::UserRole;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::jwt::{decode_token, Claims};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Extractor for the authenticated caller.
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<i64, AppError> {
        self.0
            .sub
            .parse()
            .map_err(|_| AppError::Unauthorized("Identificador de usuário inválido.".to_string()))
    }

    pub fn role(&self) -> UserRole {
        self.0.role.clone()
    }

    /// Fails with 403 unless the caller has one of `allowed`.
    pub fn require_role(&self, allowed: &[UserRole]) -> Result<(), AppError> {
        if allowed.contains(&self.0.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Seu perfil não tem permissão para esta operação.".to_string(),
            ))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = if let Some(auth_header) = parts.headers.get(AUTHORIZATION) {
            let auth_header_str = auth_header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Cabeçalho inválido.".to_string()))?;

            match auth_header_str.strip_prefix("Bearer ") {
                Some(token) => token.to_string(),
                None => {
                    return Err(AppError::Unauthorized(
                        "Formato de token inválido.".to_string(),
                    ))
                }
            }
        } else {
            extract_token_from_cookie(parts)?
        };

        let claims = decode_token(&token, &state.config.jwt_secret)?;

        Ok(AuthUser(claims))
    }
}

fn extract_token_from_cookie(parts: &Parts) -> Result<String, AppError> {
    let cookie_header = parts
        .headers
        .get(COOKIE)
        .ok_or_else(|| AppError::Unauthorized("Login necessário.".to_string()))?;

    let cookie_str = cookie_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Cookie inválido.".to_string()))?;

    // "name1=value1; name2=value2"
    for cookie in cookie_str.split(';') {
        let cookie = cookie.trim();
        if let Some(value) = cookie.strip_prefix(&format!("{}=", ACCESS_TOKEN_COOKIE)) {
            if !value.is_empty() {
                return Ok(value.to_string());
            }
        }
    }

    Err(AppError::Unauthorized("Login necessário.".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn claims(role: UserRole) -> Claims {
        Claims {
            sub: "10".to_string(),
            role,
            iat: 0,
            exp: usize::MAX,
        }
    }

    #[test]
    fn require_role_should_accept_listed_role() {
        let user = AuthUser(claims(UserRole::Emissor));

        assert!(user
            .require_role(&[UserRole::Emissor, UserRole::Admin])
            .is_ok());
    }

    #[test]
    fn require_role_should_reject_other_role() {
        let user = AuthUser(claims(UserRole::Receptor));

        let result = user.require_role(&[UserRole::Emissor]);

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn user_id_should_parse_subject() {
        let user = AuthUser(claims(UserRole::Receptor));

        assert_eq!(user.user_id().unwrap(), 10);
    }

    #[test]
    fn cookie_token_should_be_extracted() {
        let (parts, _) = Request::builder()
            .header(COOKIE, "theme=dark; access_token=abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();

        assert_eq!(extract_token_from_cookie(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn missing_cookie_should_be_unauthorized() {
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();

        assert!(matches!(
            extract_token_from_cookie(&parts),
            Err(AppError::Unauthorized(_))
        ));
    }
}
