//! Language inference for untagged code blocks
//!
//! When a fence carries no language tag, the extractor falls back to a
//! heuristic scan of the block's content. The heuristics are deliberately a
//! replaceable strategy (a plain function pointer) rather than fixed logic:
//! backends that support more languages can plug in their own table. The
//! default table below is pinned by golden tests and checked in order:
//! shebang lines first, then command lines that invoke a Python toolchain
//! (those are shell, not Python), then Python syntax markers, then shell
//! syntax markers.

/// A pluggable inference strategy. Returns `None` when the language cannot be
/// determined; callers normalize that to an empty string, never the literal
/// sentinel `"unknown"`.
pub type LanguageInference = fn(&str) -> Option<String>;

const PYTHON_INVOCATIONS: [&str; 4] = ["python ", "python3 ", "pip ", "pip3 "];
const SHELL_LINE_STARTS: [&str; 5] = ["echo ", "cd ", "ls ", "export ", "$ "];

/// The default heuristic table.
pub fn infer_language(code: &str) -> Option<String> {
    let first_line = code.lines().find(|line| !line.trim().is_empty())?;

    if let Some(interpreter) = first_line.strip_prefix("#!") {
        if interpreter.contains("python") {
            return Some("python".to_string());
        }
        if interpreter.ends_with("sh") || interpreter.contains("sh ") {
            return Some("sh".to_string());
        }
    }

    // A command line that runs the Python toolchain is a shell snippet.
    if PYTHON_INVOCATIONS
        .iter()
        .any(|prefix| first_line.starts_with(prefix))
    {
        return Some("sh".to_string());
    }

    if code.lines().any(is_python_line) {
        return Some("python".to_string());
    }

    if code
        .lines()
        .any(|line| SHELL_LINE_STARTS.iter().any(|p| line.starts_with(p)))
    {
        return Some("sh".to_string());
    }

    None
}

fn is_python_line(line: &str) -> bool {
    line.starts_with("def ")
        || line.starts_with("class ")
        || line.starts_with("import ")
        || (line.starts_with("from ") && line.contains(" import "))
        || line.trim_start().starts_with("print(")
}
