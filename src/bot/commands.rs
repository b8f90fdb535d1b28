use std::sync::Arc;

use teloxide::{prelude::*, utils::command::BotCommands};

use crate::config::Config;

use super::HandlerError;

#[derive(BotCommands, Clone)]
#[command(
    rename_rule = "lowercase",
    description = "These commands are supported:"
)]
pub enum Command {
    #[command(description = "explain what this bot does.")]
    Start,
    #[command(description = "display this help.")]
    Help,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    command: Command,
    config: Arc<Config>,
) -> Result<(), HandlerError> {
    let text = match command {
        Command::Start => start_text(config.expiry_hours),
        Command::Help => Command::descriptions().to_string(),
    };

    bot.send_message(msg.chat.id, text).await?;

    Ok(())
}

fn start_text(expiry_hours: u64) -> String {
    format!(
        "Send me a document, video or audio file and I will reply with a download link.\n\
         Links stay valid for {expiry_hours} hours."
    )
}
