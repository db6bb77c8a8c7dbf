//! Compiler for the bundled definition-file format.
//!
//! # Definition file format
//!
//! ```text
//! +++
//! extension = ".ts"      # output extension (required)
//! name      = "models"   # optional; defaults to the file stem
//! +++
//! // {{FILE_NAME}} in {{NAMESPACE}}
//! {{#types}}export interface {{name}} {} // {{kind}}
//! {{/types}}
//! ```
//!
//! The header is TOML between two `+++` lines. Everything after the closing
//! delimiter is the body; see [`crate::renderer`] for the placeholders.

use std::path::Path;

use regen_core::{
    application::ports::TemplateCompiler,
    domain::{CompiledTemplate, DomainError, Extension},
    error::RegenResult,
};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::renderer::{TYPES_CLOSE, TYPES_OPEN};

/// Header delimiter line.
pub const HEADER_DELIMITER: &str = "+++";

/// `+++` header of a definition file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Header {
    extension: String,
    name: Option<String>,
}

/// Parses `+++`-headed definition files into [`CompiledTemplate`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct TomlTemplateCompiler;

impl TomlTemplateCompiler {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateCompiler for TomlTemplateCompiler {
    #[instrument(skip_all, fields(path = %path.display()))]
    fn compile(&self, path: &Path, source: &str) -> RegenResult<CompiledTemplate> {
        let invalid = |reason: String| DomainError::invalid_template(path.display().to_string(), reason);

        let (header, body) = split_header(source).ok_or_else(|| {
            invalid(format!("missing '{HEADER_DELIMITER}' header"))
        })?;

        let header: Header =
            toml::from_str(header).map_err(|e| invalid(format!("bad header: {}", e.message())))?;
        let extension = Extension::new(&header.extension)?;

        check_sections(body).map_err(invalid)?;

        let name = header
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_default();

        debug!(%name, %extension, "template compiled");
        Ok(CompiledTemplate::new(name, extension, body))
    }
}

/// Split a source into `(header, body)`. The first non-blank line must be the
/// opening delimiter.
fn split_header(source: &str) -> Option<(&str, &str)> {
    let source = source.trim_start_matches('\u{feff}').trim_start();
    let rest = source.strip_prefix(HEADER_DELIMITER)?;
    let rest = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == HEADER_DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// `{{#types}}` sections must be balanced and may not nest.
fn check_sections(body: &str) -> Result<(), String> {
    let mut open = false;
    let mut rest = body;
    loop {
        let next = [(rest.find(TYPES_OPEN), true), (rest.find(TYPES_CLOSE), false)]
            .into_iter()
            .filter_map(|(at, opening)| at.map(|at| (at, opening)))
            .min_by_key(|(at, _)| *at);

        match next {
            None => break,
            Some((at, true)) => {
                if open {
                    return Err(format!("nested '{TYPES_OPEN}' section"));
                }
                open = true;
                rest = &rest[at + TYPES_OPEN.len()..];
            }
            Some((at, false)) => {
                if !open {
                    return Err(format!("'{TYPES_CLOSE}' without '{TYPES_OPEN}'"));
                }
                open = false;
                rest = &rest[at + TYPES_CLOSE.len()..];
            }
        }
    }
    if open {
        return Err(format!("unterminated '{TYPES_OPEN}' section"));
    }
    Ok(())
}
