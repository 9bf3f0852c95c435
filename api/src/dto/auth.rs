//! Request DTOs for the OTP and auth endpoints.
//!
//! File uploads arrive as base64 payloads inside the JSON body. The update
//! endpoint distinguishes an omitted `address` from an explicit `null`
//! with a double `Option`, so clients can clear the field.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer};

use sd_core::domain::entities::user::Role;
use sd_core::errors::{DomainError, DomainResult};
use sd_core::services::mutation::{
    FilePayload, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
};

/// Body of `POST /api/v1/otp/send`
#[derive(Debug, Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
}

/// Body of `POST /api/v1/otp/verify`
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub phone: String,
    pub code: String,
}

/// A base64-encoded file upload
#[derive(Debug, Clone, Deserialize)]
pub struct FileUpload {
    pub filename: String,
    pub content: String,
}

impl FileUpload {
    /// Decode into a raw payload; bad base64 is a field validation error
    fn decode(self, field: &str) -> DomainResult<FilePayload> {
        let bytes = BASE64
            .decode(self.content.as_bytes())
            .map_err(|_| DomainError::validation(field, "The file content must be valid base64."))?;
        Ok(FilePayload::new(self.filename, bytes))
    }
}

fn decode_optional(upload: Option<FileUpload>, field: &str) -> DomainResult<Option<FilePayload>> {
    upload.map(|u| u.decode(field)).transpose()
}

/// Body of `POST /api/v1/auth/register` (staff: admin or driver)
#[derive(Debug, Deserialize)]
pub struct RegisterStaffBody {
    pub role: String,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub address: Option<String>,
    pub job_title: Option<String>,
    pub verification_token: Option<String>,
    pub profile_photo: Option<FileUpload>,
    pub driver_license: Option<FileUpload>,
}

impl RegisterStaffBody {
    pub fn into_request(self) -> DomainResult<RegisterRequest> {
        let role = Role::parse(&self.role).ok_or(DomainError::RoleInvalid)?;
        Ok(RegisterRequest {
            role,
            full_name: self.full_name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            password: self.password,
            address: self.address,
            token: self.verification_token,
            job_title: self.job_title,
            profile_photo: decode_optional(self.profile_photo, "profile_photo")?,
            id_photo_front: None,
            id_photo_back: None,
            driver_license: decode_optional(self.driver_license, "driver_license")?,
        })
    }
}

/// Body of `POST /api/v1/auth/register-customer`
#[derive(Debug, Deserialize)]
pub struct RegisterCustomerBody {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub address: Option<String>,
    pub verification_token: Option<String>,
    pub profile_photo: Option<FileUpload>,
    pub id_photo_front: Option<FileUpload>,
    pub id_photo_back: Option<FileUpload>,
}

impl RegisterCustomerBody {
    pub fn into_request(self) -> DomainResult<RegisterRequest> {
        Ok(RegisterRequest {
            role: Role::Customer,
            full_name: self.full_name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            password: self.password,
            address: self.address,
            token: self.verification_token,
            job_title: None,
            profile_photo: decode_optional(self.profile_photo, "profile_photo")?,
            id_photo_front: decode_optional(self.id_photo_front, "id_photo_front")?,
            id_photo_back: decode_optional(self.id_photo_back, "id_photo_back")?,
            driver_license: None,
        })
    }
}

/// Present-but-null deserializes to `Some(None)`, absent to `None`
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Body of `PATCH /api/v1/auth/profile`
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileBody {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub address: Option<Option<String>>,
    pub job_title: Option<String>,
    pub verification_token: Option<String>,
    pub profile_photo: Option<FileUpload>,
    pub id_photo_front: Option<FileUpload>,
    pub id_photo_back: Option<FileUpload>,
    pub driver_license: Option<FileUpload>,
}

impl UpdateProfileBody {
    pub fn into_request(self) -> DomainResult<UpdateProfileRequest> {
        Ok(UpdateProfileRequest {
            full_name: self.full_name,
            username: self.username,
            email: self.email,
            phone: self.phone,
            password: self.password,
            address: self.address,
            job_title: self.job_title,
            token: self.verification_token,
            profile_photo: decode_optional(self.profile_photo, "profile_photo")?,
            id_photo_front: decode_optional(self.id_photo_front, "id_photo_front")?,
            id_photo_back: decode_optional(self.id_photo_back, "id_photo_back")?,
            driver_license: decode_optional(self.driver_license, "driver_license")?,
        })
    }
}

/// Body of `POST /api/v1/auth/login`
#[derive(Debug, Deserialize)]
pub struct StaffLoginBody {
    pub username: String,
    pub password: String,
}

/// Body of `POST /api/v1/auth/login-customer`
#[derive(Debug, Deserialize)]
pub struct CustomerLoginBody {
    pub phone: String,
    pub password: String,
}

/// Body of `POST /api/v1/auth/forgot-password`
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordBody {
    pub phone: String,
    pub password: String,
    pub verification_token: String,
}

impl ForgotPasswordBody {
    pub fn into_request(self) -> ResetPasswordRequest {
        ResetPasswordRequest {
            phone: self.phone,
            password: self.password,
            token: self.verification_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_double_option() {
        let absent: UpdateProfileBody = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.address, None);

        let cleared: UpdateProfileBody = serde_json::from_str(r#"{"address":null}"#).unwrap();
        assert_eq!(cleared.address, Some(None));

        let set: UpdateProfileBody =
            serde_json::from_str(r#"{"address":"Bole, Addis Ababa"}"#).unwrap();
        assert_eq!(set.address, Some(Some("Bole, Addis Ababa".to_string())));
    }

    #[test]
    fn test_file_upload_decoding() {
        let upload = FileUpload {
            filename: "photo.jpg".to_string(),
            content: BASE64.encode(b"jpeg bytes"),
        };
        let payload = upload.decode("profile_photo").unwrap();
        assert_eq!(payload.bytes, b"jpeg bytes");

        let bad = FileUpload {
            filename: "photo.jpg".to_string(),
            content: "%%% not base64 %%%".to_string(),
        };
        assert!(matches!(
            bad.decode("profile_photo").unwrap_err(),
            DomainError::Validation { .. }
        ));
    }

    #[test]
    fn test_staff_body_rejects_unknown_role() {
        let body = RegisterStaffBody {
            role: "superuser".to_string(),
            full_name: "X".to_string(),
            username: "x".to_string(),
            email: "x@example.com".to_string(),
            phone: "0911111111".to_string(),
            password: "password123".to_string(),
            address: None,
            job_title: None,
            verification_token: None,
            profile_photo: None,
            driver_license: None,
        };
        assert!(matches!(
            body.into_request().unwrap_err(),
            DomainError::RoleInvalid
        ));
    }
}
