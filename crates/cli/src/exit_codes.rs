//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! | Code | Trigger                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 2    | Usage error (bad arguments)                     |
//! | 3    | IO error (cannot read input, cannot write out)  |
//! | 4    | Config or input parse error                     |
//! | 5    | No shared sequences between compared rankings   |
//! | 6    | Join produced zero data points                  |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// IO error - unreadable input or unwritable output.
pub const EXIT_IO: u8 = 3;

/// Config or CSV parse error.
pub const EXIT_PARSE: u8 = 4;

/// Compared rankings share no canonical sequence.
pub const EXIT_NO_OVERLAP: u8 = 5;

/// The join produced zero data points.
pub const EXIT_EMPTY_JOIN: u8 = 6;
