use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Everything needed to start the companion interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildInvocation {
    pub interpreter: PathBuf,
    pub script: PathBuf,
    pub forwarded: Vec<OsString>, // caller's argv minus argv[0], untouched
    pub env: BTreeMap<OsString, OsString>,
}

impl ChildInvocation {
    /// Arguments after the program: the script, then every forwarded argument.
    pub fn child_args(&self) -> impl Iterator<Item = &OsStr> {
        std::iter::once(self.script.as_os_str()).chain(self.forwarded.iter().map(OsString::as_os_str))
    }

    /// The argv the child will see, program first.
    pub fn argv(&self) -> Vec<OsString> {
        std::iter::once(self.interpreter.as_os_str())
            .chain(self.child_args())
            .map(OsStr::to_os_string)
            .collect()
    }

    /// Single-string form of the invocation, for diagnostics only.
    ///
    /// Tokens containing whitespace, and empty tokens, are wrapped in double
    /// quotes. Embedded double quotes are not escaped; nothing executes this
    /// string, the child is started from [`ChildInvocation::argv`].
    pub fn render_command_line(&self) -> String {
        let mut line = String::new();
        for token in self.argv() {
            if !line.is_empty() {
                line.push(' ');
            }
            let text = token.to_string_lossy();
            if requires_quoting(&text) {
                line.push('"');
                line.push_str(&text);
                line.push('"');
            } else {
                line.push_str(&text);
            }
        }
        line
    }
}

pub fn requires_quoting(token: &str) -> bool {
    token.is_empty() || token.chars().any(char::is_whitespace)
}

/// Splits a line produced by [`ChildInvocation::render_command_line`].
pub fn split_command_line(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                quoted = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() || quoted {
                    out.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() || quoted {
        out.push(current);
    }

    out
}
