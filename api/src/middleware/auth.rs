//! Bearer token authentication for protected endpoints.

use actix_web::HttpRequest;
use uuid::Uuid;

use sd_core::domain::entities::user::Role;
use sd_core::errors::{DomainError, DomainResult};
use sd_core::services::session::SessionIssuer;

/// Extract the bearer token from the `Authorization` header
fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Authenticate the request, returning the session's subject and role
pub fn authenticate<S: SessionIssuer>(
    req: &HttpRequest,
    sessions: &S,
) -> DomainResult<(Uuid, Role)> {
    let token = bearer_token(req).ok_or(DomainError::Unauthenticated)?;
    sessions.authenticate(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_token_extraction() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def.ghi"));

        let missing = TestRequest::default().to_http_request();
        assert_eq!(bearer_token(&missing), None);

        let wrong_scheme = TestRequest::default()
            .insert_header(("Authorization", "Basic dXNlcjpwdw=="))
            .to_http_request();
        assert_eq!(bearer_token(&wrong_scheme), None);
    }
}
