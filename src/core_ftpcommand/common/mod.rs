// Handlers whose behaviour is the same in stub and fake mode.
pub mod help;
pub mod noop;
pub mod quit;
pub mod require_login;
pub mod syst;
pub mod type_;
pub mod unsupported;

pub use help::HelpCommandHandler;
pub use noop::NoopCommandHandler;
pub use quit::QuitCommandHandler;
pub use require_login::RequireLogin;
pub use syst::SystCommandHandler;
pub use type_::TypeCommandHandler;
pub use unsupported::UnsupportedCommandHandler;
