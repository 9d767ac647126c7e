//! Non-fatal parse and assembly findings.
//!
//! Parsers never print on their own; they hand every finding to a
//! [`DiagnosticSink`]. The convenience entry points use [`LogSink`], tests
//! collect into a `Vec<Diagnostic>`.

use std::fmt;

use crate::mesh::Attribute;

#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// Keyword not part of the grammar; the line was skipped.
    UnknownDirective { line: usize, keyword: String },
    /// Known keyword without its required argument; the line was skipped.
    MissingArgument { line: usize, keyword: String },
    /// MTL directive appearing before any `newmtl`.
    OrphanDirective { line: usize, keyword: String },
    /// Face with fewer than three corners.
    DegenerateFace { line: usize, corners: usize },
    /// A group mixed corners with and without this attribute; gaps were
    /// filled with defaults.
    SynthesizedAttribute { material: String, attribute: Attribute },
    /// Only some vertices of a group carried a color.
    ColorStreamDropped {
        material: String,
        colored: usize,
        vertices: usize,
    },
    /// Group material missing from every library; default material used.
    UnresolvedMaterial { name: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownDirective { line, keyword } => {
                write!(f, "Ignoring unknown directive '{}' on line {}", keyword, line)
            }
            Diagnostic::MissingArgument { line, keyword } => {
                write!(f, "Ignoring '{}' without argument on line {}", keyword, line)
            }
            Diagnostic::OrphanDirective { line, keyword } => {
                write!(f, "Ignoring '{}' before any newmtl on line {}", keyword, line)
            }
            Diagnostic::DegenerateFace { line, corners } => {
                write!(f, "Skipping face with {} corner(s) on line {}", corners, line)
            }
            Diagnostic::SynthesizedAttribute { material, attribute } => write!(
                f,
                "Group '{}' mixes corners with and without {}s, filled with defaults",
                material, attribute
            ),
            Diagnostic::ColorStreamDropped {
                material,
                colored,
                vertices,
            } => write!(
                f,
                "Dropping color stream of group '{}': {} of {} vertices colored",
                material, colored, vertices
            ),
            Diagnostic::UnresolvedMaterial { name } => {
                write!(f, "Material '{}' not found, using default", name)
            }
        }
    }
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards every diagnostic to `log::warn!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}
