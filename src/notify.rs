//! Pushover通知

use crate::config::PushoverConfig;
use crate::error::{CheckError, Result};
use crate::raster::encode_png;
use image::RgbaImage;
use log::debug;
use reqwest::multipart::{Form, Part};

const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

#[derive(Debug, Clone)]
pub struct Pushover {
    client: reqwest::Client,
    token: String,
    user: String,
    api_url: String,
}

impl Pushover {
    pub fn new(config: &PushoverConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: config.token.clone(),
            user: config.user.clone(),
            api_url: PUSHOVER_API_URL.to_string(),
        }
    }

    /// 送信先URLを差し替える（テスト用）
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// メッセージを送信（画像があればPNGで添付）
    pub async fn send(&self, message: &str, attachment: Option<&RgbaImage>) -> Result<()> {
        let mut form = Form::new()
            .text("token", self.token.clone())
            .text("user", self.user.clone())
            .text("message", message.to_string());

        if let Some(image) = attachment {
            let part = Part::bytes(encode_png(image)?)
                .file_name("snapshot.png")
                .mime_str("image/png")
                .map_err(|e| CheckError::Notify(e.to_string()))?;
            form = form.part("attachment", part);
        }

        let response = self
            .client
            .post(&self.api_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CheckError::Notify(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CheckError::Notify(format!("HTTP {}: {}", status, body)));
        }

        debug!("Pushover送信完了");
        Ok(())
    }
}
