//! Verbosity-gated logging for the search engine.
//!
//! Messages go to stderr and cost nothing when the configured verbosity is
//! below the macro's level:
//! - 0: SILENT
//! - 1: PROGRESS (search start, goal found, budget exhaustion)
//! - 2: EXPANSIONS (every state popped and expanded)
//! - 3: DEBUG (every generated successor)

pub const VERBOSITY_SILENT: u8 = 0;
pub const VERBOSITY_PROGRESS: u8 = 1;
pub const VERBOSITY_EXPANSIONS: u8 = 2;
pub const VERBOSITY_DEBUG: u8 = 3;

/// Log at PROGRESS level (verbosity >= 1).
#[macro_export]
macro_rules! log_progress {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_PROGRESS {
            eprintln!("[astar] {}", format_args!($($arg)*));
        }
    };
}

/// Log at EXPANSIONS level (verbosity >= 2).
#[macro_export]
macro_rules! log_expansions {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_EXPANSIONS {
            eprintln!("[astar]   {}", format_args!($($arg)*));
        }
    };
}

/// Log at DEBUG level (verbosity >= 3).
#[macro_export]
macro_rules! log_debug {
    ($verbosity:expr, $($arg:tt)*) => {
        if $verbosity >= $crate::logging::VERBOSITY_DEBUG {
            eprintln!("[astar]     {}", format_args!($($arg)*));
        }
    };
}
