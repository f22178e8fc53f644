//! # Prompt Expansion
//!
//! Fills template tokens in at delivery time.
//!
//! - `$(files)` becomes the concatenated contents of the selected files.
//! - `$(<command>)` becomes the trimmed stdout of the command, provided the
//!   command's program is allowed by the `CommandPolicy` (only `git` by default).
//!
//! Neither expander fails: unreadable files and failed commands are replaced
//! by inline markers so the user still gets a usable prompt.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, warn};
use thiserror::Error;

pub const FILES_TOKEN: &str = "$(files)";

/// Used when a file prompt's template was left empty.
pub const DEFAULT_FILE_TEMPLATE: &str = "Please analyze these files:\n\n$(files)";

pub const NOT_ALLOWED_MARKER: &str = "[only 'git' commands are allowed]";
pub const COMMAND_ERROR_MARKER: &str = "[error executing git command]";

// ============================================================================
// File contents
// ============================================================================

/// Replace every `$(files)` in `template` with a `// File: <path>` header and
/// the contents of each file, in order.
pub fn expand_files<'a>(template: &str, files: impl IntoIterator<Item = &'a Path>) -> String {
    let template = if template.is_empty() {
        DEFAULT_FILE_TEMPLATE
    } else {
        template
    };
    if !template.contains(FILES_TOKEN) {
        return template.to_string();
    }

    let mut contents = String::new();
    for path in files {
        match fs::read(path) {
            Ok(bytes) => {
                contents.push_str(&format!(
                    "// File: {}\n{}\n\n",
                    path.display(),
                    String::from_utf8_lossy(&bytes)
                ));
            }
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                contents.push_str(&format!("// Error reading {}: {}\n\n", path.display(), e));
            }
        }
    }

    template.replace(FILES_TOKEN, &contents)
}

// ============================================================================
// Command substitution
// ============================================================================

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{program} exited with {status}")]
    Failed { program: String, status: String },
}

/// Runs a program and returns its standard output.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError>;
}

/// Runs commands as subprocesses in a fixed working directory.
pub struct SystemRunner {
    dir: PathBuf,
}

impl SystemRunner {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        debug!("Running {} {:?} in {}", program, args, self.dir.display());
        let output = Command::new(program)
            .args(args)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Programs that may appear as the first word of a substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPolicy {
    allowed: Vec<String>,
}

impl Default for CommandPolicy {
    fn default() -> Self {
        Self::allowing(&["git"])
    }
}

impl CommandPolicy {
    pub fn allowing(programs: &[&str]) -> Self {
        Self {
            allowed: programs.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn permits(&self, program: &str) -> bool {
        self.allowed.iter().any(|p| p == program)
    }
}

/// Replace every `$(...)` token, line by line and left to right.
///
/// A `$(` without a closing `)` on the same line ends scanning of that line
/// and is left as-is. Substituted output is never scanned again.
pub fn expand_commands(text: &str, runner: &dyn CommandRunner, policy: &CommandPolicy) -> String {
    text.split('\n')
        .map(|line| expand_line(line, runner, policy))
        .collect::<Vec<_>>()
        .join("\n")
}

fn expand_line(line: &str, runner: &dyn CommandRunner, policy: &CommandPolicy) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(start) = rest.find("$(") {
        let inner = &rest[start + 2..];
        let Some(end) = inner.find(')') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push_str(&substitute(&inner[..end], runner, policy));
        rest = &inner[end + 1..];
    }

    out.push_str(rest);
    out
}

fn substitute(command: &str, runner: &dyn CommandRunner, policy: &CommandPolicy) -> String {
    let words = split_command(command).unwrap_or_default();
    let Some((program, args)) = words.split_first() else {
        return NOT_ALLOWED_MARKER.to_string();
    };
    if !policy.permits(program) {
        debug!("Rejected substitution: {}", command);
        return NOT_ALLOWED_MARKER.to_string();
    }

    match runner.run(program, args) {
        Ok(stdout) => stdout.trim().to_string(),
        Err(e) => {
            warn!("Substitution `{}` failed: {}", command, e);
            COMMAND_ERROR_MARKER.to_string()
        }
    }
}

/// Split a command line into words, honouring single quotes, double quotes
/// and backslash escapes. `None` when a quote is left open.
pub fn split_command(command: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                    in_word = true;
                }
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedRunner, temp_tree};

    #[test]
    fn test_expand_files_with_no_files_empties_token() {
        let empty: [&Path; 0] = [];
        assert_eq!(expand_files("$(files)", empty), "");
    }

    #[test]
    fn test_expand_files_headers_and_errors_in_order() {
        let dir = temp_tree(&["a.txt"]);
        let present = dir.path().join("a.txt");
        let missing = dir.path().join("missing.txt");

        let out = expand_files(
            "Review:\n$(files)",
            [missing.as_path(), present.as_path()],
        );

        let error_at = out.find(&format!("// Error reading {}", missing.display())).unwrap();
        let file_at = out.find(&format!("// File: {}\na.txt\n", present.display())).unwrap();
        assert!(out.starts_with("Review:\n"));
        assert!(error_at < file_at);
    }

    #[test]
    fn test_expand_files_replaces_every_token() {
        let dir = temp_tree(&["a.txt"]);
        let path = dir.path().join("a.txt");
        let out = expand_files("$(files)|$(files)", [path.as_path()]);
        assert_eq!(out.matches("// File:").count(), 2);
    }

    #[test]
    fn test_expand_files_empty_template_uses_default() {
        let empty: [&Path; 0] = [];
        assert_eq!(expand_files("", empty), "Please analyze these files:\n\n");
    }

    #[test]
    fn test_git_command_output_is_trimmed() {
        let runner = ScriptedRunner::new().with("git log --oneline -1", Ok("abc123 fix\n"));
        let out = expand_commands(
            "Last: $(git log --oneline -1)!",
            &runner,
            &CommandPolicy::default(),
        );
        assert_eq!(out, "Last: abc123 fix!");
    }

    #[test]
    fn test_disallowed_command_is_marked_and_not_run() {
        let runner = ScriptedRunner::new();
        let out = expand_commands("$(rm -rf /)", &runner, &CommandPolicy::default());
        assert_eq!(out, NOT_ALLOWED_MARKER);
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_failed_command_uses_error_marker() {
        let runner = ScriptedRunner::new();
        let out = expand_commands("x $(git diff HEAD~1) y", &runner, &CommandPolicy::default());
        assert_eq!(out, format!("x {COMMAND_ERROR_MARKER} y"));
    }

    #[test]
    fn test_multiple_tokens_per_line() {
        let runner = ScriptedRunner::new()
            .with("git a", Ok("one"))
            .with("git b", Ok("two"));
        let out = expand_commands("$(git a) and $(git b)", &runner, &CommandPolicy::default());
        assert_eq!(out, "one and two");
    }

    #[test]
    fn test_unterminated_token_is_left_alone() {
        let runner = ScriptedRunner::new().with("git a", Ok("one"));
        let out = expand_commands(
            "$(git a) then $(git b\nnext",
            &runner,
            &CommandPolicy::default(),
        );
        assert_eq!(out, "one then $(git b\nnext");
    }

    #[test]
    fn test_output_is_not_rescanned() {
        let runner = ScriptedRunner::new().with("git show", Ok("$(git show)"));
        let out = expand_commands("$(git show)", &runner, &CommandPolicy::default());
        assert_eq!(out, "$(git show)");
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_system_runner_with_permissive_policy() {
        let runner = SystemRunner::new(".");
        let policy = CommandPolicy::allowing(&["git", "echo"]);
        assert_eq!(expand_commands("$(echo hi)", &runner, &policy), "hi");
        assert_eq!(
            expand_commands("$(echo hi)", &runner, &CommandPolicy::default()),
            NOT_ALLOWED_MARKER
        );
    }

    #[test]
    fn test_split_command_quotes() {
        assert_eq!(
            split_command("git log -n 3 --pretty=format:%s").unwrap(),
            vec!["git", "log", "-n", "3", "--pretty=format:%s"]
        );
        assert_eq!(
            split_command(r#"git commit -m "two words" 'single q' a\ b"#).unwrap(),
            vec!["git", "commit", "-m", "two words", "single q", "a b"]
        );
        assert_eq!(split_command("  ").unwrap(), Vec::<String>::new());
        assert_eq!(split_command("git log \"open"), None);
    }
}
