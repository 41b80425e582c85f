use async_trait::async_trait;
use serde_json::json;

use crate::api_client::{ApiResult, BackendClient};
use crate::auth::session::{AuthBackend, LoginPayload, OtpPurpose};
use crate::models::user::{ProfileUpdate, User};

#[async_trait]
impl AuthBackend for BackendClient {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginPayload> {
        let mut envelope = self
            .post("/auth/login", None, &json!({ "email": email, "password": password }))
            .await?;
        Ok(LoginPayload {
            user: envelope.take("user")?,
            token: envelope.take("token")?,
        })
    }

    async fn register(&self, full_name: &str, email: &str, password: &str) -> ApiResult<()> {
        self.post(
            "/auth/register",
            None,
            &json!({ "full_name": full_name, "email": email, "password": password }),
        )
        .await?;
        Ok(())
    }

    async fn verify_email(&self, email: &str, otp_code: &str) -> ApiResult<()> {
        self.post(
            "/auth/verify-email",
            None,
            &json!({ "email": email, "otp_code": otp_code }),
        )
        .await?;
        Ok(())
    }

    async fn resend_otp(&self, email: &str, purpose: OtpPurpose) -> ApiResult<()> {
        self.post(
            "/auth/resend-otp",
            None,
            &json!({ "email": email, "purpose": purpose.as_str() }),
        )
        .await?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> ApiResult<()> {
        self.post("/auth/forgot-password", None, &json!({ "email": email }))
            .await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        email: &str,
        otp_code: &str,
        new_password: &str,
    ) -> ApiResult<()> {
        self.post(
            "/auth/reset-password",
            None,
            &json!({ "email": email, "otp_code": otp_code, "new_password": new_password }),
        )
        .await?;
        Ok(())
    }

    async fn update_profile(&self, token: &str, update: &ProfileUpdate) -> ApiResult<User> {
        self.put("/auth/profile", Some(token), update)
            .await?
            .take("user")
    }
}
