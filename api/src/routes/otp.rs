//! OTP challenge endpoints.

use actix_web::{web, HttpResponse};
use serde_json::json;

use sd_core::repositories::identity::IdentityRepository;
use sd_core::services::credentials::PasswordHasher;
use sd_core::services::otp::OtpChallengeProvider;
use sd_core::services::session::SessionIssuer;
use sd_core::stores::attachment::AttachmentStore;
use sd_core::stores::token::TokenStore;
use sd_shared::types::ApiResponse;

use crate::app::AppState;
use crate::dto::{SendOtpRequest, VerifyOtpRequest};
use crate::handlers::error::domain_error_response;

/// Handler for `POST /api/v1/otp/send`
///
/// Asks the SMS gateway to challenge the phone with a one-time code.
pub async fn send_challenge<R, T, A, H, S, P>(
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<SendOtpRequest>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    match state.otp.send_challenge(&body.phone).await {
        Ok(_) => {
            HttpResponse::Ok().json(ApiResponse::<()>::success_empty("OTP sent successfully"))
        }
        Err(err) => domain_error_response(&err),
    }
}

/// Handler for `POST /api/v1/otp/verify`
///
/// Checks the response code; on success returns a single-use verification
/// token bound to the phone.
pub async fn verify_challenge<R, T, A, H, S, P>(
    state: web::Data<AppState<R, T, A, H, S, P>>,
    body: web::Json<VerifyOtpRequest>,
) -> HttpResponse
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    match state.otp.verify_challenge(&body.phone, &body.code).await {
        Ok(token) => HttpResponse::Ok().json(ApiResponse::success(
            "Phone verified successfully",
            json!({ "verification_token": token }),
        )),
        Err(err) => domain_error_response(&err),
    }
}
