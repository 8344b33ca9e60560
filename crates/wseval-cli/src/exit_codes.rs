//! Process exit codes of the `wseval` binary.

pub const SUCCESS: i32 = 0;
pub const NO_RECORDS: i32 = 1; // An evaluation ran on an empty dataset
pub const CONFIG_ERROR: i32 = 2; // Bad arguments, missing endpoint, unreadable data
