use async_trait::async_trait;
use serde_json::json;

use crate::alerts::{AlertBackend, UnsubscribeRequest};
use crate::api_client::{ApiResult, BackendClient};

#[async_trait]
impl AlertBackend for BackendClient {
    async fn subscribe(&self, email: &str, category_id: i64) -> ApiResult<Option<String>> {
        let envelope = self
            .post(
                "/job-alerts/subscribe",
                None,
                &json!({ "email": email, "category_id": category_id }),
            )
            .await?;
        Ok(envelope.message)
    }

    async fn unsubscribe(&self, request: &UnsubscribeRequest) -> ApiResult<Option<String>> {
        let body = match request {
            UnsubscribeRequest::Token(token) => json!({ "token": token }),
            UnsubscribeRequest::Email(email) => json!({ "email": email }),
        };
        let envelope = self.post("/job-alerts/unsubscribe", None, &body).await?;
        Ok(envelope.message)
    }
}
