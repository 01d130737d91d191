//! Typed Jupyter notebook document tree.
//!
//! The notebook is assembled as plain structs and serialized once with
//! `serde_json`. Interpolated values go through the Python-literal helpers
//! below, so a quote, backslash, or newline in a config value can never
//! corrupt the produced document.

use serde::Serialize;
use serde_json::Value;

/// A complete nbformat-4 notebook document.
#[derive(Debug, Clone, Serialize)]
pub struct Notebook {
    /// Ordered cells.
    pub cells: Vec<NotebookCell>,
    /// Notebook-level metadata (kernel, language).
    pub metadata: NotebookMetadata,
    /// Major format version.
    pub nbformat: u32,
    /// Minor format version.
    pub nbformat_minor: u32,
}

impl Notebook {
    /// Wrap cells in a Colab-flavored nbformat-4 document.
    #[must_use]
    pub fn from_cells(cells: Vec<NotebookCell>) -> Self {
        Self {
            cells,
            metadata: NotebookMetadata::colab(),
            nbformat: 4,
            nbformat_minor: 0,
        }
    }

    /// Serialize the document once, pretty-printed.
    ///
    /// # Errors
    ///
    /// Returns `serde_json::Error` if serialization fails (it cannot for
    /// this tree, but the signature keeps the caller honest).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Notebook-level metadata block.
#[derive(Debug, Clone, Serialize)]
pub struct NotebookMetadata {
    /// Colab provenance marker.
    pub colab: Value,
    /// Kernel specification.
    pub kernelspec: Value,
    /// Language info.
    pub language_info: Value,
}

impl NotebookMetadata {
    fn colab() -> Self {
        Self {
            colab: serde_json::json!({ "provenance": [] }),
            kernelspec: serde_json::json!({ "display_name": "Python 3", "name": "python3" }),
            language_info: serde_json::json!({ "name": "python" }),
        }
    }
}

/// One notebook cell.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "cell_type", rename_all = "snake_case")]
pub enum NotebookCell {
    /// Markdown prose cell.
    Markdown {
        /// Cell metadata carrying the stable cell id.
        metadata: CellMetadata,
        /// Source lines, newline-terminated except the last.
        source: Vec<String>,
    },
    /// Executable Python cell.
    Code {
        /// Always null for a never-executed notebook.
        execution_count: Option<u32>,
        /// Cell metadata carrying the stable cell id.
        metadata: CellMetadata,
        /// Always empty for a never-executed notebook.
        outputs: Vec<Value>,
        /// Source lines, newline-terminated except the last.
        source: Vec<String>,
    },
}

impl NotebookCell {
    /// Build a markdown cell from logical lines.
    #[must_use]
    pub fn markdown(id: &str, lines: &[String]) -> Self {
        Self::Markdown {
            metadata: CellMetadata { id: id.to_owned() },
            source: join_lines(lines),
        }
    }

    /// Build a code cell from logical lines.
    #[must_use]
    pub fn code(id: &str, lines: &[String]) -> Self {
        Self::Code {
            execution_count: None,
            metadata: CellMetadata { id: id.to_owned() },
            outputs: Vec::new(),
            source: join_lines(lines),
        }
    }
}

/// Per-cell metadata.
#[derive(Debug, Clone, Serialize)]
pub struct CellMetadata {
    /// Stable cell identifier.
    pub id: String,
}

/// Terminate every line but the last with `\n`, per nbformat convention.
fn join_lines(lines: &[String]) -> Vec<String> {
    let last = lines.len().saturating_sub(1);
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            if i == last {
                line.clone()
            } else {
                format!("{line}\n")
            }
        })
        .collect()
}

/// Render a Rust string as a double-quoted Python string literal.
///
/// The escape set is the JSON one, which Python accepts unchanged, so the
/// same literal stays valid in the serialized document and in the running
/// notebook.
#[must_use]
pub fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render a bool as a Python literal.
#[must_use]
pub fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}
