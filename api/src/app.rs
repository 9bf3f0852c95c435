//! Application state and route wiring.

use std::sync::Arc;

use actix_web::{web, HttpResponse};

use sd_core::repositories::identity::IdentityRepository;
use sd_core::services::account::AccountService;
use sd_core::services::credentials::PasswordHasher;
use sd_core::services::mutation::MutationCoordinator;
use sd_core::services::otp::{OtpChallengeProvider, OtpService};
use sd_core::services::session::SessionIssuer;
use sd_core::stores::attachment::AttachmentStore;
use sd_core::stores::token::TokenStore;

use crate::routes;

/// Shared services handed to every handler
pub struct AppState<R, T, A, H, S, P>
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    pub mutations: MutationCoordinator<R, T, A, H>,
    pub accounts: AccountService<R, A, H, S>,
    pub otp: OtpService<P, T>,
    pub sessions: Arc<S>,
}

impl<R, T, A, H, S, P> AppState<R, T, A, H, S, P>
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    pub fn new(
        identities: Arc<R>,
        tokens: Arc<T>,
        attachments: Arc<A>,
        hasher: Arc<H>,
        sessions: Arc<S>,
        provider: Arc<P>,
    ) -> Self {
        Self {
            mutations: MutationCoordinator::new(
                Arc::clone(&identities),
                Arc::clone(&tokens),
                Arc::clone(&attachments),
                Arc::clone(&hasher),
            ),
            accounts: AccountService::new(
                identities,
                attachments,
                hasher,
                Arc::clone(&sessions),
            ),
            otp: OtpService::new(provider, tokens),
            sessions,
        }
    }
}

/// Register all routes under `/api/v1`
pub fn configure_routes<R, T, A, H, S, P>(cfg: &mut web::ServiceConfig)
where
    R: IdentityRepository + 'static,
    T: TokenStore + 'static,
    A: AttachmentStore + 'static,
    H: PasswordHasher + 'static,
    S: SessionIssuer + 'static,
    P: OtpChallengeProvider + 'static,
{
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api/v1")
            .service(
                web::scope("/otp")
                    .route("/send", web::post().to(routes::otp::send_challenge::<R, T, A, H, S, P>))
                    .route(
                        "/verify",
                        web::post().to(routes::otp::verify_challenge::<R, T, A, H, S, P>),
                    ),
            )
            .service(
                web::scope("/auth")
                    .route(
                        "/register",
                        web::post().to(routes::auth::register_staff::<R, T, A, H, S, P>),
                    )
                    .route(
                        "/register-customer",
                        web::post().to(routes::auth::register_customer::<R, T, A, H, S, P>),
                    )
                    .route("/login", web::post().to(routes::auth::login_staff::<R, T, A, H, S, P>))
                    .route(
                        "/login-customer",
                        web::post().to(routes::auth::login_customer::<R, T, A, H, S, P>),
                    )
                    .route(
                        "/forgot-password",
                        web::post().to(routes::auth::forgot_password::<R, T, A, H, S, P>),
                    )
                    .route(
                        "/profile",
                        web::patch().to(routes::auth::update_profile::<R, T, A, H, S, P>),
                    )
                    .route("/me", web::get().to(routes::auth::me::<R, T, A, H, S, P>)),
            ),
    );
}

/// Health check endpoint handler
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "sheger-dispatch-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
