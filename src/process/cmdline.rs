// ── Command-line splitting ────────────────────────────────────────────────────
//
// Companion-tool commands arrive from configuration as one argument string.
// They are split here with the same rules `CommandLineToArgvW` applies, so a
// string that works in a Windows shortcut works everywhere.

use std::{ffi::OsString, iter, mem};

/// Split `line` into arguments.
///
/// * Spaces and tabs separate arguments outside double quotes.
/// * `2n` backslashes before `"` become `n` backslashes and the quote toggles
///   quoting; `2n + 1` backslashes become `n` backslashes and a literal `"`.
/// * Backslashes not followed by `"` are literal.
/// * `""` inside a quoted run is a literal `"`.
pub(crate) fn split_command_line(line: &str) -> Vec<OsString> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ' ' | '\t' if !in_quotes => {
                if in_arg {
                    args.push(OsString::from(mem::take(&mut current)));
                    in_arg = false;
                }
            }
            '\\' => {
                in_arg = true;
                let mut count = 1;
                while chars.peek() == Some(&'\\') {
                    chars.next();
                    count += 1;
                }
                if chars.peek() == Some(&'"') {
                    current.extend(iter::repeat('\\').take(count / 2));
                    if count % 2 == 1 {
                        chars.next();
                        current.push('"');
                    }
                } else {
                    current.extend(iter::repeat('\\').take(count));
                }
            }
            '"' => {
                in_arg = true;
                if in_quotes && chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            _ => {
                in_arg = true;
                current.push(c);
            }
        }
    }

    if in_arg {
        args.push(OsString::from(current));
    }
    args
}

// ── Tests ─────────────────────────────────────────────────────────────────────
