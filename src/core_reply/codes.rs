// RFC 959 reply codes used by the handlers.

pub const FILE_STATUS_OK: u16 = 150;
pub const COMMAND_OK: u16 = 200;
pub const SYSTEM_STATUS: u16 = 211;
pub const FILE_STATUS: u16 = 213;
pub const HELP_MESSAGE: u16 = 214;
pub const SYSTEM_TYPE: u16 = 215;
pub const SERVICE_READY: u16 = 220;
pub const CLOSING_CONTROL: u16 = 221;
pub const TRANSFER_COMPLETE: u16 = 226;
pub const ENTERING_PASSIVE_MODE: u16 = 227;
pub const USER_LOGGED_IN: u16 = 230;
pub const FILE_ACTION_OK: u16 = 250;
pub const PATHNAME_CREATED: u16 = 257;
pub const NEED_PASSWORD: u16 = 331;
pub const PENDING_FURTHER_INFO: u16 = 350;
pub const CANT_OPEN_DATA_CONNECTION: u16 = 425;
pub const TRANSFER_ABORTED: u16 = 426;
pub const LOCAL_ERROR: u16 = 451;
pub const SYNTAX_ERROR: u16 = 500;
pub const SYNTAX_ERROR_IN_PARAMETERS: u16 = 501;
pub const COMMAND_NOT_IMPLEMENTED: u16 = 502;
pub const BAD_SEQUENCE: u16 = 503;
pub const NOT_IMPLEMENTED_FOR_PARAMETER: u16 = 504;
pub const NOT_LOGGED_IN: u16 = 530;
pub const FILE_UNAVAILABLE: u16 = 550;
pub const FILE_NAME_NOT_ALLOWED: u16 = 553;
