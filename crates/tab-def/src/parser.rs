//! Definition file parser.
//!
//! Line-oriented: header metadata lines may appear anywhere; every other
//! non-blank line declares one variable, tagged by its first character.

use tab_model::{Definition, Dimension, Increment, KeyLocator, Variable};

use crate::error::{DefError, Result};

/// Literal marker of generated comment rows; such lines carry no variable.
const COMMENT_ROW_MARKER: &str = "LINHA_COMENTARIO";

/// Parser for definition files.
///
/// By default a malformed line is logged and skipped so one bad declaration
/// never aborts the whole file; `propagate_errors` turns line failures into
/// hard errors instead.
#[derive(Debug, Clone, Default)]
pub struct DefParser {
    propagate_errors: bool,
}

impl DefParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail on the first malformed line instead of logging and skipping.
    pub fn propagate_errors(mut self) -> Self {
        self.propagate_errors = true;
        self
    }

    pub fn parse(&self, name: &str, text: &str) -> Result<Definition> {
        let mut state = ParseState::default();

        for (index, raw) in text.lines().enumerate() {
            if let Err(message) = state.parse_line(raw) {
                if self.propagate_errors {
                    return Err(DefError::Line {
                        line: index + 1,
                        message,
                    });
                }
                tracing::error!(
                    file = name,
                    line = index + 1,
                    content = raw,
                    %message,
                    "skipping malformed definition line"
                );
            }
        }

        Ok(Definition {
            name: name.to_string(),
            description: state.description,
            variables: state.variables,
            record_pattern: state.record_pattern,
            help_reference: state.help_reference,
        })
    }
}

#[derive(Default)]
struct ParseState {
    description: Option<String>,
    record_pattern: Option<String>,
    help_reference: Option<String>,
    variables: Vec<Variable>,
}

impl ParseState {
    fn parse_line(&mut self, raw: &str) -> std::result::Result<(), String> {
        let trimmed = raw.trim();

        // The first comment line is the file description.
        if trimmed.starts_with(';') {
            if self.description.is_none() {
                self.description = Some(
                    trimmed
                        .trim_matches(|c| c == ';' || c == ' ')
                        .trim_end()
                        .to_string(),
                );
            }
            return Ok(());
        }
        if let Some(rest) = trimmed.strip_prefix('A') {
            self.record_pattern = Some(rest.to_string());
            return Ok(());
        }
        if let Some(rest) = trimmed.strip_prefix('?') {
            self.help_reference = Some(rest.to_string());
            return Ok(());
        }

        let line = strip_comments(raw);
        if line.trim().is_empty() {
            return Ok(());
        }
        if line.contains(COMMENT_ROW_MARKER) {
            return Ok(());
        }

        let mut chars = line.chars();
        let kind = chars
            .next()
            .map(|c| c.to_ascii_uppercase())
            .ok_or_else(|| "empty line".to_string())?;
        let parts: Vec<&str> = chars.as_str().split(',').map(str::trim).collect();
        let part = |at: usize| {
            parts
                .get(at)
                .copied()
                .ok_or_else(|| format!("expected at least {} comma-separated fields", at + 1))
        };

        match kind {
            'I' | 'E' => {
                let variable = Increment::new(kind, part(0)?, part(1)?);
                self.variables.push(Variable::Increment(variable));
            }
            'G' => {
                let field = part(0)?;
                self.variables
                    .push(Variable::Increment(Increment::new('G', field, field)));
            }
            // Internal marker variables carry no data.
            'X' if parts.first().is_some_and(|p| p.starts_with('*')) => {}
            'L' | 'C' | 'X' | 'T' | 'S' | 'D' | 'Q' => {
                let variable = Dimension::new(
                    kind,
                    part(0)?,
                    part(1)?,
                    parse_locator(part(2)?)?,
                    part(3)?,
                );
                self.variables.push(Variable::Dimension(variable));
            }
            // HTML content and other presentation-only lines.
            'F' | 'H' | 'R' => {}
            other => {
                tracing::warn!(kind = %other, content = line, "unknown variable kind");
            }
        }

        Ok(())
    }
}

/// A digit start position is declared 1-based; anything else names the
/// field holding the already-decoded key.
fn parse_locator(start: &str) -> std::result::Result<KeyLocator, String> {
    if !start.is_empty() && start.chars().all(|c| c.is_ascii_digit()) {
        let position: usize = start
            .parse()
            .map_err(|_| format!("invalid start position: {start}"))?;
        position
            .checked_sub(1)
            .map(KeyLocator::Offset)
            .ok_or_else(|| format!("start position must be 1-based: {start}"))
    } else {
        Ok(KeyLocator::Field(start.to_string()))
    }
}

fn strip_comments(line: &str) -> &str {
    match line.find(';') {
        Some(at) => &line[..at],
        None => line,
    }
}
