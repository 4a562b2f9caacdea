//! # Telegram 機器人
//!
//! 以 `getUpdates` 長輪詢接收訊息，每則訊息各自在一個 task 中處理：
//! 判斷觸發類型 ([`trigger`])，需要報價時即時查詢一次，再以 [`reply`] 組成回覆。

use std::{sync::Arc, time::Duration};

use anyhow::Result;

use crate::{
    config::App,
    crawler::{HttpSource, PriceSource, Quoter},
    logging,
};

pub mod reply;
pub mod telegram;
pub mod trigger;

use telegram::{Telegram, Update};
use trigger::{Command, Trigger};

const MARKDOWN: &str = "Markdown";

/// 輪詢失敗後的等待時間
const RETRY_PAUSE: Duration = Duration::from_secs(3);

/// Everything an update handler needs, shared across tasks.
pub struct Handler<S> {
    telegram: Telegram,
    quoter: Quoter<S>,
    keywords_enabled: bool,
}

impl<S: PriceSource> Handler<S> {
    pub fn new(telegram: Telegram, quoter: Quoter<S>, keywords_enabled: bool) -> Self {
        Handler {
            telegram,
            quoter,
            keywords_enabled,
        }
    }

    /// Answers one update. Updates without text or trigger are ignored.
    pub async fn handle(&self, update: Update) -> Result<()> {
        let Some(message) = update.message else {
            return Ok(());
        };
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let Some(trigger) = trigger::classify(text, self.keywords_enabled) else {
            return Ok(());
        };

        let chat_id = message.chat.id;
        let currency = self.quoter.currency();
        logging::info_file_async(format!(
            "chat {} message {} triggered {:?}",
            chat_id, message.message_id, trigger
        ));

        let text = match trigger {
            Trigger::Command(Command::Start) => reply::welcome(currency),
            Trigger::Command(Command::Help) => reply::help(currency),
            Trigger::Command(Command::Gold) | Trigger::Keyword => {
                self.telegram
                    .send_message(chat_id, reply::FETCHING, None)
                    .await?;
                let result = self.quoter.quote().await;
                if let Err(why) = &result {
                    let stage = if why.is_fetch() { "fetch" } else { "extract" };
                    logging::warn_file_async(format!(
                        "chat {} gets the failure reply, {} failed: {}",
                        chat_id, stage, why
                    ));
                }
                reply::quote_message(&result, currency)
            }
        };

        self.telegram
            .send_message(chat_id, &text, Some(MARKDOWN))
            .await?;

        Ok(())
    }
}

/// Polls Telegram until Ctrl-C.
pub async fn run(app: &App) -> Result<()> {
    let telegram = Telegram::new(&app.bot.telegram.token);
    let quoter = Quoter::new(HttpSource::new(&app.gold), &app.gold.currency);
    let handler = Arc::new(Handler::new(
        telegram.clone(),
        quoter,
        app.gold.keywords_enabled(),
    ));
    let poll_timeout = app.bot.telegram.poll_timeout_secs;
    let mut offset = 0;

    logging::info_file_async(format!(
        "Gold price bot polling ({} mode, {})",
        app.gold.mode, app.gold.currency
    ));

    loop {
        let updates = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                logging::info_file_async("Gold price bot stopped".to_string());
                return Ok(());
            }
            res = telegram.get_updates(offset, poll_timeout) => res,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(why) => {
                logging::error_file_async(format!("Failed to get_updates because {:?}", why));
                tokio::time::sleep(RETRY_PAUSE).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            let handler = Arc::clone(&handler);

            tokio::spawn(async move {
                let update_id = update.update_id;
                if let Err(why) = handler.handle(update).await {
                    logging::error_file_async(format!(
                        "Failed to handle update {} because {:?}",
                        update_id, why
                    ));
                }
            });
        }
    }
}
