//! TelegramNotifier - Bot API の sendMessage で通知する

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::domain::{NotifyError, TelegramConfig};
use crate::ports::Notifier;

/// `GET {api_url}/bot{token}/sendMessage?chat_id=..&text=..`
///
/// URL に token が含まれるので、reqwest のエラーからは URL を落としてから返す。
pub struct TelegramNotifier {
    client: reqwest::Client,
    endpoint: Url,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| NotifyError::Http(err.without_url()))?;

        let endpoint = format!(
            "{}/bot{}/sendMessage",
            config.api_url.as_str().trim_end_matches('/'),
            config.bot_token.expose()
        );
        let endpoint = Url::parse(&endpoint).map_err(|_| NotifyError::Rejected {
            status: 0,
            description: "bot token does not form a valid URL".to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            chat_id: config.chat_id.clone(),
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("chat_id", self.chat_id.as_str()), ("text", text)])
            .send()
            .await
            .map_err(|err| NotifyError::Http(err.without_url()))?;

        let status = response.status();
        let body = response.json::<ApiResponse>().await.ok();

        match body {
            Some(ApiResponse { ok: false, description }) => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_default(),
            }),
            _ if !status.is_success() => Err(NotifyError::Rejected {
                status: status.as_u16(),
                description: String::new(),
            }),
            _ => Ok(()),
        }
    }
}
