use super::StubReply;
use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::{receive_upload, reply_parameter_error};
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;
use chrono::Local;
use log::info;

/// Stub STOR/APPE/STOU: reads the upload and keeps it in the invocation
/// record under `file_contents` instead of storing it anywhere.
#[derive(Debug)]
pub struct StorStubHandler {
    unique: bool,
    filename: Option<String>,
    reply: StubReply,
    history: InvocationHistory,
}

impl StorStubHandler {
    /// STOR and APPE: a pathname is required.
    pub fn new() -> Self {
        Self {
            unique: false,
            filename: None,
            reply: StubReply::new(codes::TRANSFER_COMPLETE),
            history: InvocationHistory::new(),
        }
    }

    /// STOU: no pathname; the completion reply names the file the server
    /// "created".
    pub fn unique() -> Self {
        Self {
            unique: true,
            reply: StubReply::with_text(
                codes::TRANSFER_COMPLETE,
                "Transfer complete. Unique file name: {0}",
            ),
            ..Self::new()
        }
    }

    /// Fixes the name reported by STOU instead of generating one per upload.
    pub fn with_filename(mut self, filename: &str) -> Self {
        self.filename = Some(filename.to_string());
        self
    }
}

impl Default for StorStubHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl_stub_reply_builders!(StorStubHandler);

#[async_trait]
impl CommandHandler for StorStubHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let mut record = InvocationRecord::new(command, session.client_host());
        let name = if self.unique {
            let filename = self.filename.clone().unwrap_or_else(|| {
                format!("stou-{}", Local::now().format("%Y%m%d%H%M%S%3f"))
            });
            record.set("filename", filename.as_str());
            filename
        } else {
            match command.required_param(0) {
                Ok(pathname) => {
                    record.set("pathname", pathname);
                    pathname.to_string()
                }
                Err(e) => {
                    self.history.push(record);
                    return reply_parameter_error(session, e).await;
                }
            }
        };

        let contents = receive_upload(session).await?;
        let Some(contents) = contents else {
            self.history.push(record);
            return Ok(());
        };

        info!("Stub received {} bytes for {}", contents.len(), name);
        record.set("file_contents", contents);
        self.history.push(record);
        self.reply.send(session, &[name.as_str()]).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
