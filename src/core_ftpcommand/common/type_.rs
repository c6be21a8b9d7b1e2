use crate::core_ftpcommand::command::Command;
use crate::core_ftpcommand::handlers::{CommandHandler, HandlerError};
use crate::core_ftpcommand::invocation::{InvocationHistory, InvocationRecord};
use crate::core_ftpcommand::utils::reply_parameter_error;
use crate::core_reply::codes;
use crate::session::Session;
use async_trait::async_trait;

/// Handles the TYPE FTP command.
///
/// Sets the transfer type to ASCII, EBCDIC, Image or Local byte. The argument
/// is `<type> [<format or byte size>]`, e.g. `TYPE I` or `TYPE L 8`.
#[derive(Debug, Default)]
pub struct TypeCommandHandler {
    history: InvocationHistory,
}

impl TypeCommandHandler {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandHandler for TypeCommandHandler {
    async fn handle(&self, command: &Command, session: &mut Session) -> Result<(), HandlerError> {
        let arg = match command.required_param(0) {
            Ok(arg) => arg,
            Err(e) => return reply_parameter_error(session, e).await,
        };

        let mut record = InvocationRecord::new(command, session.client_host());
        record.set("type", arg);
        self.history.push(record);

        let parts: Vec<&str> = arg.split_whitespace().collect();
        let primary_type = parts.first().map(|s| s.to_uppercase()).unwrap_or_default();
        let second_arg = parts.get(1);

        let (code, text) = match primary_type.as_str() {
            "A" | "E" | "I" => {
                session.type_ = primary_type.clone();
                session.byte_size = None;
                (codes::COMMAND_OK, format!("Type set to {}.", primary_type))
            }
            "L" => match second_arg.map(|size| size.parse::<u8>()) {
                Some(Ok(byte_size)) if byte_size > 0 => {
                    session.type_ = "L".to_string();
                    session.byte_size = Some(byte_size);
                    (codes::COMMAND_OK, format!("Type set to L ({}).", byte_size))
                }
                Some(_) => (
                    codes::NOT_IMPLEMENTED_FOR_PARAMETER,
                    "Invalid byte size parameter.".to_string(),
                ),
                None => (
                    codes::NOT_IMPLEMENTED_FOR_PARAMETER,
                    "Byte size parameter required for TYPE L.".to_string(),
                ),
            },
            _ => (
                codes::NOT_IMPLEMENTED_FOR_PARAMETER,
                session.catalog().text(codes::NOT_IMPLEMENTED_FOR_PARAMETER).to_string(),
            ),
        };

        session.send_reply(code, &text).await?;
        Ok(())
    }

    fn invocations(&self) -> Option<&InvocationHistory> {
        Some(&self.history)
    }
}
