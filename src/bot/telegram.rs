use std::time::Duration;

use anyhow::{anyhow, Result};
use concat_string::concat_string;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::util::http::{self, RequestOptions};

const API_BASE: &str = "https://api.telegram.org";

/// 長輪詢之外額外給 HTTP 請求的緩衝時間
const POLL_GRACE: Duration = Duration::from_secs(10);

/// A thin Telegram Bot API client speaking JSON over the shared HTTP client.
#[derive(Debug, Clone)]
pub struct Telegram {
    base_url: String,
}

impl Telegram {
    pub fn new(token: &str) -> Self {
        Self::with_api_base(API_BASE, token)
    }

    /// Points the client at another Bot API server.
    pub fn with_api_base(api_base: &str, token: &str) -> Self {
        Telegram {
            base_url: concat_string!(api_base.trim_end_matches('/'), "/bot", token, "/"),
        }
    }

    fn method_url(&self, method: &str) -> String {
        concat_string!(self.base_url, method)
    }

    async fn call<REQ, RES>(&self, method: &str, req: &REQ, options: RequestOptions) -> Result<RES>
    where
        REQ: Serialize,
        RES: DeserializeOwned,
    {
        let res: ApiResponse<RES> =
            http::post_use_json(&self.method_url(method), None, Some(req), options).await?;

        match res {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(anyhow!(
                "Telegram {} failed: {}",
                method,
                description.unwrap_or_else(|| "no description".to_string())
            )),
        }
    }

    /// Long-polls for new messages starting at `offset`.
    pub async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        let req = GetUpdatesRequest {
            offset,
            timeout: timeout_secs,
            allowed_updates: &["message"],
        };
        let options = RequestOptions::new(Duration::from_secs(timeout_secs) + POLL_GRACE, 0);

        self.call("getUpdates", &req, options).await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<Message> {
        let req = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };

        self.call("sendMessage", &req, RequestOptions::default())
            .await
    }
}

#[derive(Deserialize, Debug)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Chat {
    pub id: i64,
}
