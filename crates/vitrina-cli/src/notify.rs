//! Best-effort Telegram notification. Delivery failures are logged and
//! swallowed; a missing token or chat id skips sending entirely.

use serde_json::json;
use vitrina_core::AppConfig;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Sends the summary message if notification credentials are configured.
pub async fn send_telegram_message(config: &AppConfig, text: &str) {
    let (Some(token), Some(chat_id)) = (
        config.telegram_bot_token.as_deref(),
        config.telegram_chat_id.as_deref(),
    ) else {
        tracing::info!("telegram notification skipped: token or chat id not set");
        return;
    };

    if let Err(e) = post_message(TELEGRAM_API_BASE, token, chat_id, text).await {
        tracing::error!(error = %e, "failed to send telegram notification");
    }
}

async fn post_message(
    api_base: &str,
    token: &str,
    chat_id: &str,
    text: &str,
) -> Result<(), reqwest::Error> {
    let client = reqwest::Client::new();
    let url = format!("{api_base}/bot{token}/sendMessage");
    client
        .post(&url)
        .json(&json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": "HTML",
        }))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn posts_the_message_to_the_bot_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/botTESTTOKEN/sendMessage"))
            .and(body_partial_json(serde_json::json!({
                "chat_id": "42",
                "parse_mode": "HTML",
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        post_message(&server.uri(), "TESTTOKEN", "42", "отчет")
            .await
            .expect("send should succeed");
    }

    #[tokio::test]
    async fn api_errors_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = post_message(&server.uri(), "TESTTOKEN", "42", "отчет").await;
        assert!(result.is_err());
    }
}
