//! Leveled fail-fast assertions for the recstream codec stack.
//!
//! Every fatal condition in the stream layers routes through here. A violated
//! assertion emits full diagnostic context — the failed condition as written,
//! operand values for comparisons, the source location, and the enclosing
//! operation — and then aborts the process. There is no unwind and no
//! recoverable path.
//!
//! Assertions at levels 1–3 execute only when the process-wide verbosity is at
//! least that level; [`fail!`] and [`check!`] always execute.

use std::fmt;
use std::sync::OnceLock;

/// Environment variable consulted for the default verbosity.
pub const VERBOSITY_ENV: &str = "RECSTREAM_DEBUG_LEVEL";

/// Highest meaningful verbosity level.
pub const MAX_VERBOSITY: u8 = 3;

static VERBOSITY: OnceLock<u8> = OnceLock::new();

/// Set the process-wide verbosity (clamped to `0..=3`).
///
/// The first call wins; later calls (including the implicit environment
/// lookup) are ignored. Intended to be called once at process start.
pub fn set_verbosity(level: u8) {
    let _ = VERBOSITY.set(level.min(MAX_VERBOSITY));
}

/// Current process-wide verbosity.
///
/// Initialized on first use from `RECSTREAM_DEBUG_LEVEL` if
/// [`set_verbosity`] was never called; defaults to 0.
pub fn verbosity() -> u8 {
    *VERBOSITY.get_or_init(|| {
        std::env::var(VERBOSITY_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u8>().ok())
            .map(|v| v.min(MAX_VERBOSITY))
            .unwrap_or(0)
    })
}

/// Emit diagnostic context and abort. Prefer the [`fail!`] macro, which
/// captures the source location.
pub fn fail_at(op: &str, detail: fmt::Arguments<'_>, file: &str, line: u32) -> ! {
    tracing::error!(target: "recstream::diag", op, file, line, "{detail}");
    eprintln!("FATAL [{op}] {detail}\n\t{file}:{line}");
    std::process::abort();
}

/// Report a fatal condition and abort the process.
///
/// `op` identifies the enclosing operation; the remaining arguments are a
/// format string describing the violation.
#[macro_export]
macro_rules! fail {
    ($op:expr, $($msg:tt)+) => {
        $crate::fail_at($op, ::core::format_args!($($msg)+), ::core::file!(), ::core::line!())
    };
}

/// Unconditional assertion. On violation, reports the condition as written
/// plus the caller's message, then aborts.
#[macro_export]
macro_rules! check {
    ($cond:expr, $op:expr, $($msg:tt)+) => {
        if !$cond {
            $crate::fail!(
                $op,
                "assertion failed: {}; {}",
                ::core::stringify!($cond),
                ::core::format_args!($($msg)+)
            );
        }
    };
}

/// Comparison assertion. On violation, reports both expressions as written
/// and their actual values.
#[macro_export]
macro_rules! check_eq {
    ($lhs:expr, $rhs:expr, $op:expr) => {{
        let lhs = &$lhs;
        let rhs = &$rhs;
        if lhs != rhs {
            $crate::fail!(
                $op,
                "expected {} == {}; actual {:?} vs {:?}",
                ::core::stringify!($lhs),
                ::core::stringify!($rhs),
                lhs,
                rhs
            );
        }
    }};
}

/// Assertion executed only when `verbosity() >= 1`.
#[macro_export]
macro_rules! check1 {
    ($cond:expr, $op:expr, $($msg:tt)+) => {
        if $crate::verbosity() >= 1 {
            $crate::check!($cond, $op, $($msg)+);
        }
    };
}

/// Assertion executed only when `verbosity() >= 2`.
#[macro_export]
macro_rules! check2 {
    ($cond:expr, $op:expr, $($msg:tt)+) => {
        if $crate::verbosity() >= 2 {
            $crate::check!($cond, $op, $($msg)+);
        }
    };
}

/// Assertion executed only when `verbosity() >= 3`.
#[macro_export]
macro_rules! check3 {
    ($cond:expr, $op:expr, $($msg:tt)+) => {
        if $crate::verbosity() >= 3 {
            $crate::check!($cond, $op, $($msg)+);
        }
    };
}
