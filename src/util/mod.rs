#![allow(clippy::module_name_repetitions)]
//! Small utilities: process execution and shell-style quoting for log previews.

pub mod exec;

pub use exec::{ExecOutput, ExecRequest, ExecService};

pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|a| shell_escape(a))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn shell_escape(s: &str) -> String {
    if s.is_empty() {
        "''".to_string()
    } else if s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "-_=./:@".contains(c))
    {
        s.to_string()
    } else {
        let escaped = s.replace('\'', "'\"'\"'");
        format!("'{}'", escaped)
    }
}

/// Render a command preview like `sqlite3 ./db/boxing.db < ./sql/init_db.sql`.
pub fn command_preview(req: &ExecRequest, stdin: Option<&std::path::Path>) -> String {
    let mut words = vec![req.program().to_string_lossy().into_owned()];
    words.extend(req.arg_list().iter().map(|a| a.to_string_lossy().into_owned()));
    let mut out = shell_join(&words);
    if let Some(path) = stdin {
        out.push_str(" < ");
        out.push_str(&shell_escape(&path.display().to_string()));
    }
    out
}
