//! Terminal control-sequence filtering.
//!
//! Applied to intermediate pipeline output and command-substitution results,
//! nowhere else.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// ESC or 8-bit CSI, optional parameter/intermediate bytes, then either a
/// BEL-terminated string (OSC titles, hyperlinks) or a final byte.
static CONTROL_SEQUENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\x1b\x{9b}][\[\]()#;?]*(?:(?:(?:[a-zA-Z\d]*(?:;[-a-zA-Z\d/#&.:=?%@~_]*)*)?\x07)|(?:(?:\d{1,4}(?:;\d{0,4})*)?[\dA-PR-TZcf-ntqry=><~]))",
    )
    .expect("control sequence pattern is valid")
});

/// Remove every terminal control sequence from `text`.
pub fn strip_control_sequences(text: &str) -> Cow<'_, str> {
    CONTROL_SEQUENCE.replace_all(text, "")
}
