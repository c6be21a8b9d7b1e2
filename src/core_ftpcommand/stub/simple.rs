use super::StubReply;
use crate::core_ftpcommand::command::{Command, ParameterError};
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::session::Session;
use async_trait::async_trait;

#[derive(Debug, Clone)]
struct RecordedParameter {
    index: usize,
    key: &'static str,
    required: bool,
}

/// Configurable stub for verbs that only need a canned reply.
///
/// Named parameters are copied into the invocation record; a missing required
/// one is answered with 501 (the invocation is still recorded). Recorded
/// values, in declaration order, fill the `{n}` placeholders of the reply.
#[derive(Debug)]
pub struct StubCommandHandler {
    reply: StubReply,
    parameters: Vec<RecordedParameter>,
    history: InvocationHistory,
}

impl StubCommandHandler {
    pub fn new(reply_code: u16) -> Self {
        Self {
            reply: StubReply::new(reply_code),
            parameters: Vec::new(),
            history: InvocationHistory::new(),
        }
    }

    /// Records parameter `index` as `key`; the command is rejected without it.
    pub fn requiring(mut self, index: usize, key: &'static str) -> Self {
        self.parameters.push(RecordedParameter {
            index,
            key,
            required: true,
        });
        self
    }

    /// Records parameter `index` as `key` when present.
    pub fn recording(mut self, index: usize, key: &'static str) -> Self {
        self.parameters.push(RecordedParameter {
            index,
            key,
            required: false,
        });
        self
    }
}

impl_stub_reply_builders!(StubCommandHandler);

#[async_trait]
impl CommandHandler for StubCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command, session.client_host());
        let mut values = Vec::new();
        let mut missing: Option<ParameterError> = None;

        for parameter in &self.parameters {
            match command.required_param(parameter.index) {
                Ok(value) => {
                    record.set(parameter.key, value);
                    values.push(value);
                }
                Err(e) if parameter.required && missing.is_none() => missing = Some(e),
                Err(_) => {}
            }
        }
        self.history.push(record);

        if let Some(e) = missing {
            return reply_parameter_error(session, e).await;
        }
        self.reply.send(session, &values).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_reply::{codes, ReplyCatalog};
    use std::sync::Arc;
    use tokio::io::{duplex, AsyncReadExt};

    async fn run(handler: &StubCommandHandler, line: &str) -> String {
        let (mut client, server) = duplex(4096);
        let mut session = Session::new(server, Arc::new(ReplyCatalog::default()));
        handler
            .handle(&Command::parse(line).unwrap(), &mut session)
            .await
            .unwrap();
        drop(session);
        let mut output = String::new();
        client.read_to_string(&mut output).await.unwrap();
        output
    }

    #[tokio::test]
    async fn test_records_parameter_and_replies() {
        let handler = StubCommandHandler::new(codes::FILE_ACTION_OK).requiring(0, "pathname");
        let reply = run(&handler, "CWD /pub").await;
        assert!(reply.starts_with("250 "));

        let record = handler.invocations().unwrap().get(0).unwrap();
        assert_eq!(record.get_text("pathname"), Some("/pub"));
    }

    #[tokio::test]
    async fn test_missing_required_parameter() {
        let handler = StubCommandHandler::new(codes::FILE_ACTION_OK).requiring(0, "pathname");
        let reply = run(&handler, "CWD").await;
        assert!(reply.starts_with("501 "));
        assert_eq!(handler.invocations().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_overrides_and_placeholders() {
        let handler = StubCommandHandler::new(codes::PATHNAME_CREATED)
            .requiring(0, "pathname")
            .with_reply_text("\"{0}\" created.");
        assert_eq!(run(&handler, "MKD docs").await, "257 \"docs\" created.\r\n");

        let handler = StubCommandHandler::new(codes::FILE_ACTION_OK)
            .with_reply_code(codes::FILE_UNAVAILABLE);
        assert!(run(&handler, "DELE x").await.starts_with("550 "));
    }
}
