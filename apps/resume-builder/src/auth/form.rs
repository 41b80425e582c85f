//! Login page view-model: mode, sticky email and the two banners.
//!
//! Errors never escape a submit call. They land in the `error` banner.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::auth::session::{AuthError, OtpPurpose, SessionManager};
use crate::models::user::User;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
    ForgotPassword,
    OtpVerify,
    ResetPassword,
}

/// Fields posted by the login page. Unused fields may be left empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthFormInput {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub otp_code: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthView {
    pub mode: AuthMode,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<String>,
    pub user: Option<User>,
}

#[derive(Debug, Default)]
pub struct AuthForm {
    mode: AuthMode,
    email: String,
    error: Option<String>,
    success: Option<String>,
    user: Option<User>,
}

impl AuthForm {
    pub fn view(&self) -> AuthView {
        AuthView {
            mode: self.mode,
            email: self.email.clone(),
            error: self.error.clone(),
            success: self.success.clone(),
            user: self.user.clone(),
        }
    }

    /// Switches mode, clearing the fields and both banners.
    pub fn switch_mode(&mut self, mode: AuthMode) {
        *self = AuthForm {
            mode,
            ..AuthForm::default()
        };
    }

    pub async fn sign_in(&mut self, session: &SessionManager, input: &AuthFormInput) {
        self.begin(input);
        match session.login(&self.email, &input.password).await {
            Ok(user) => {
                self.user = Some(user);
                self.success = Some("Login successful! Redirecting...".into());
            }
            Err(AuthError::VerificationRequired { message }) => {
                debug!("Sign-in needs verification; switching to OTP entry");
                self.mode = AuthMode::OtpVerify;
                self.success = Some(message);
            }
            Err(e) => self.fail(e, "Login failed"),
        }
    }

    pub async fn sign_up(&mut self, session: &SessionManager, input: &AuthFormInput) {
        self.begin(input);
        if input.password != input.confirm_password {
            self.error = Some("Passwords do not match".into());
            return;
        }
        match session
            .register(&input.full_name, &self.email, &input.password)
            .await
        {
            Ok(()) => {
                self.mode = AuthMode::OtpVerify;
                self.success = Some(
                    "Registration successful! Please check your email for verification code."
                        .into(),
                );
            }
            Err(e) => self.fail(e, "Registration failed"),
        }
    }

    pub async fn forgot_password(&mut self, session: &SessionManager, input: &AuthFormInput) {
        self.begin(input);
        match session.forgot_password(&self.email).await {
            Ok(()) => {
                self.mode = AuthMode::ResetPassword;
                self.success = Some("Password reset code sent to your email!".into());
            }
            Err(e) => self.fail(e, "Failed to send reset code"),
        }
    }

    /// Submits the OTP for whichever flow the form is in.
    pub async fn submit_otp(&mut self, session: &SessionManager, input: &AuthFormInput) {
        self.begin(input);
        let result = match self.mode {
            AuthMode::OtpVerify => session
                .verify_email(&self.email, &input.otp_code)
                .await
                .map(|()| "Email verified successfully! You can now login."),
            AuthMode::ResetPassword => session
                .reset_password(&self.email, &input.otp_code, &input.new_password)
                .await
                .map(|()| "Password reset successfully! You can now login."),
            _ => {
                self.error = Some("No verification code was requested".into());
                return;
            }
        };
        match result {
            Ok(message) => {
                self.mode = AuthMode::SignIn;
                self.success = Some(message.into());
            }
            Err(e) => self.fail(e, "Verification failed"),
        }
    }

    pub async fn resend_otp(&mut self, session: &SessionManager, input: &AuthFormInput) {
        self.begin(input);
        let purpose = match self.mode {
            AuthMode::ResetPassword => OtpPurpose::PasswordReset,
            _ => OtpPurpose::SignupVerification,
        };
        match session.resend_otp(&self.email, purpose).await {
            Ok(()) => self.success = Some("OTP code resent to your email!".into()),
            Err(e) => self.fail(e, "Failed to resend OTP"),
        }
    }

    fn begin(&mut self, input: &AuthFormInput) {
        if !input.email.trim().is_empty() {
            self.email = input.email.trim().to_string();
        }
        self.error = None;
        self.success = None;
    }

    fn fail(&mut self, err: AuthError, fallback: &str) {
        let message = match err {
            AuthError::Rejected(message) if !message.is_empty() => message,
            _ => fallback.to_string(),
        };
        self.error = Some(message);
    }
}
