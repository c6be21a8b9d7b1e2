pub mod core_auth;
pub mod helper;

pub use self::core_auth::{AccountStore, InMemoryAccountStore, UserAccount};
