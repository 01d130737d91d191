//! Notebook document construction and rendering.
//!
//! The generated document is the single hand-off artifact between the
//! dashboard and the external training environment.

pub mod document;
pub mod renderer;

pub use document::{Notebook, NotebookCell};
pub use renderer::{render, render_document, NotebookSpec};
