//! Registration, login and profile endpoints.

use actix_web::{web, HttpRequest, HttpResponse};

use sd_core::domain::entities::user::Role;
use sd_core::repositories::identity::IdentityRepository;
use sd_core::services::credentials::PasswordHasher;
use sd_core::services::otp::OtpChallengeProvider;
use sd_core::services::session::SessionIssuer;
use sd_core::stores::attachment::AttachmentStore;
use sd_core::stores::token::TokenStore;
use sd_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::{
    CustomerLoginBody, ForgotPasswordBody, IdentityResponse, LoginResponse, RegisterCustomerBody,
    RegisterStaffBody, StaffLoginBody, UpdateProfileBody,
};
use crate::handlers::error::domain_error_response;
use crate::middleware::auth::authenticate;

/// Roles the staff registration endpoint may create
const STAFF_ROLES: &[Role] = &[Role::Admin, Role::Driver];

/// Handler for `POST /api/v1/auth/register` (staff)
pub async fn register_staff<R, T, A, H, S, P>(
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<RegisterStaffBody>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    let request = match body.into_inner().into_request() {
        Ok(request) => request,
        Err(err) => return domain_error_response(&err),
    };
    match state.mutations.register(STAFF_ROLES, request).await {
        Ok(snapshot) => HttpResponse::Created().json(ApiResponse::success(
            "Registration successful",
            IdentityResponse::from(snapshot),
        )),
        Err(err) => domain_error_response(&err),
    }
}

/// Handler for `POST /api/v1/auth/register-customer`
pub async fn register_customer<R, T, A, H, S, P>(
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<RegisterCustomerBody>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    let request = match body.into_inner().into_request() {
        Ok(request) => request,
        Err(err) => return domain_error_response(&err),
    };
    match state.mutations.register(&[Role::Customer], request).await {
        Ok(snapshot) => HttpResponse::Created().json(ApiResponse::success(
            "Registration successful",
            IdentityResponse::from(snapshot),
        )),
        Err(err) => domain_error_response(&err),
    }
}

/// Handler for `POST /api/v1/auth/login` (staff, by username)
pub async fn login_staff<R, T, A, H, S, P>(
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<StaffLoginBody>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    match state.accounts.login_staff(&body.username, &body.password).await {
        Ok(outcome) => HttpResponse::Ok().json(ApiResponse::success(
            "Login successful",
            LoginResponse::from(outcome),
        )),
        Err(err) => domain_error_response(&err),
    }
}

/// Handler for `POST /api/v1/auth/login-customer` (by phone)
pub async fn login_customer<R, T, A, H, S, P>(
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<CustomerLoginBody>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    match state.accounts.login_customer(&body.phone, &body.password).await {
        Ok(outcome) => HttpResponse::Ok().json(ApiResponse::success(
            "Login successful",
            LoginResponse::from(outcome),
        )),
        Err(err) => domain_error_response(&err),
    }
}

/// Handler for `POST /api/v1/auth/forgot-password`
pub async fn forgot_password<R, T, A, H, S, P>(
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<ForgotPasswordBody>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    match state
        .mutations
        .reset_password(body.into_inner().into_request())
        .await
    {
        Ok(()) => {
            HttpResponse::Ok()
                .json(ApiResponse::<()>::success_empty("Password reset successfully"))
        }
        Err(err) => domain_error_response(&err),
    }
}

/// Handler for `PATCH /api/v1/auth/profile` (authenticated)
pub async fn update_profile<R, T, A, H, S, P>(
    req: HttpRequest,
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<UpdateProfileBody>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    let (user_id, _role) = match authenticate(&req, state.sessions.as_ref()) {
        Ok(identity) => identity,
        Err(err) => return domain_error_response(&err),
    };
    let request = match body.into_inner().into_request() {
        Ok(request) => request,
        Err(err) => return domain_error_response(&err),
    };
    match state.mutations.update_profile(user_id, request).await {
        Ok(snapshot) => HttpResponse::Ok().json(ApiResponse::success(
            "Profile updated successfully",
            IdentityResponse::from(snapshot),
        )),
        Err(err) => domain_error_response(&err),
    }
}

/// Handler for `GET /api/v1/auth/me` (authenticated)
pub async fn me<R, T, A, H, S, P>(
    req: HttpRequest,
    state: web::Data<AppState<R, T, A, H, S, P>>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    let (user_id, _role) = match authenticate(&req, state.sessions.as_ref()) {
        Ok(identity) => identity,
        Err(err) => return domain_error_response(&err),
    };
    match state.accounts.fetch_identity(user_id).await {
        Ok(view) => HttpResponse::Ok().json(ApiResponse::success(
            "Identity fetched successfully",
            IdentityResponse::from(view),
        )),
        Err(err) => domain_error_response(&err),
    }
}
