//! ExecResult and the 0/1 return code.

use std::fmt;

/// The outcome a handler reports back to the evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i64,
    /// Text output.
    pub out: String,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
        }
    }

    /// Create a failed result. Non-empty messages are newline-terminated.
    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        let mut out = msg.into();
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        Self { code, out }
    }

    /// True if the exit code is 0.
    pub fn ok(&self) -> bool {
        self.code == 0
    }
}

/// The session's last return code. Only success or failure exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReturnCode {
    #[default]
    Success,
    Failure,
}

impl ReturnCode {
    /// Collapse an exit code: 0 is success, anything else failure.
    pub fn from_exit(code: i64) -> Self {
        if code == 0 {
            ReturnCode::Success
        } else {
            ReturnCode::Failure
        }
    }

    pub fn is_success(self) -> bool {
        self == ReturnCode::Success
    }

    pub fn as_i32(self) -> i32 {
        match self {
            ReturnCode::Success => 0,
            ReturnCode::Failure => 1,
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}
