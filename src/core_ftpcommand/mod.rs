// Command model, handler registry and the handler families.
pub mod command;
pub mod common;
pub mod fake;
pub mod handlers;
pub mod invocation;
pub mod stub;

// The utils and common functions are here
pub mod utils;
