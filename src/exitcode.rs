//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (invalid form, bad fixture)
pub const DATAERR: i32 = 65;

/// Cannot open input (unknown node id)
pub const NOINPUT: i32 = 66;

/// System error (e.g., no working directory)
pub const OSERR: i32 = 71;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
