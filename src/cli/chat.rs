//! questlog chat command implementations.

use serde::Serialize;

use crate::chat::{ChatLog, ChatMessage, ChatRelay, ChatSender};
use crate::cli::CliContext;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

#[derive(Serialize)]
struct HistoryOutput {
    total: usize,
    messages: Vec<ChatMessage>,
}

pub fn run_send(ctx: &CliContext, options: OutputOptions, text: &str) -> Result<()> {
    let user = ctx.require_user()?;
    let log = ChatLog::new(ctx.store.clone(), &user.uid, &user.email);
    let relay = ChatRelay::new(ctx.config.chat.endpoint.clone());

    let reply = log.exchange(&relay, text)?;

    let mut human = HumanOutput::new("Reply");
    human.push_detail(reply.text.clone());

    emit_success(options, "chat send", &reply, Some(&human))
}

pub fn run_history(ctx: &CliContext, options: OutputOptions) -> Result<()> {
    let user = ctx.require_user()?;
    let log = ChatLog::new(ctx.store.clone(), &user.uid, &user.email);

    let messages = log.history()?;
    let output = HistoryOutput {
        total: messages.len(),
        messages: messages.clone(),
    };

    let mut human = HumanOutput::new("Chat history");
    human.push_summary("Messages", messages.len().to_string());
    for message in &messages {
        let who = match message.sender {
            ChatSender::User => "you",
            ChatSender::Bot => "bot",
        };
        human.push_detail(format!("[{who}] {}", message.text));
    }

    emit_success(options, "chat history", &output, Some(&human))
}
