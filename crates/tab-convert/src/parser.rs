//! Conversion file parser.
//!
//! The grammar is line-oriented: a comment/header block, then fixed-column
//! body lines carrying one category (or continuation) each. Header and
//! body-line shape failures abort the file; count mismatches are logged.

use tab_model::{Category, ValueRange};

use crate::error::{ConvertError, Result};
use crate::file::CnvFile;
use crate::lookup::FileShape;

/// Column widths of a body line: subtotal marker, order number, description.
/// One separator character sits between order and description; values take
/// the remainder.
struct BodyLayout {
    subtotal: usize,
    order: usize,
    description: usize,
}

const SHORT_LAYOUT: BodyLayout = BodyLayout {
    subtotal: 3,
    order: 4,
    description: 52,
};

/// Selected by `FORMAT == "N"` in the header.
const LONG_LAYOUT: BodyLayout = BodyLayout {
    subtotal: 4,
    order: 5,
    description: 101,
};

/// Parse conversion file text into a [`CnvFile`].
pub fn parse_cnv(name: &str, text: &str) -> Result<CnvFile> {
    CnvParser::new(name).parse(text)
}

struct Header {
    format: String,
    category_count: usize,
    value_length: usize,
    type_tag: String,
}

struct CnvParser {
    name: String,
    description: Vec<String>,
    slots: Vec<Option<Category>>,
    has_range: bool,
    only_numeric_values: bool,
    all_single_valued: bool,
}

impl CnvParser {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: Vec::new(),
            slots: Vec::new(),
            has_range: false,
            only_numeric_values: true,
            all_single_valued: true,
        }
    }

    fn parse(mut self, text: &str) -> Result<CnvFile> {
        let mut lines = text.lines().enumerate();

        let header = self.parse_header(&mut lines)?;
        let layout = if header.format == "N" {
            LONG_LAYOUT
        } else {
            SHORT_LAYOUT
        };

        self.slots = vec![None; header.category_count];
        for (index, raw) in lines {
            self.parse_body_line(&layout, index + 1, raw)?;
        }

        if let Some(missing) = self.slots.iter().position(Option::is_none) {
            tracing::error!(
                file = %self.name,
                category = missing + 1,
                declared = header.category_count,
                "missing category; the declared count does not match the parsed categories"
            );
        }

        let shape = FileShape {
            format: header.format,
            type_tag: header.type_tag,
            value_length: header.value_length,
            has_range: self.has_range,
            only_numeric_values: self.only_numeric_values,
            all_single_valued: self.all_single_valued,
        };
        let description = if self.description.is_empty() {
            None
        } else {
            Some(self.description.join("\n"))
        };

        Ok(CnvFile::assemble(
            self.name,
            description,
            header.category_count,
            header.value_length,
            self.slots,
            &shape,
        ))
    }

    /// Consume comment (`;`) and skipped (`:`) lines up to the header line.
    fn parse_header<'t>(
        &mut self,
        lines: &mut impl Iterator<Item = (usize, &'t str)>,
    ) -> Result<Header> {
        for (index, raw) in lines {
            let line = raw.trim();
            if let Some(comment) = line.strip_prefix(';') {
                self.description.push(comment.trim().to_string());
                continue;
            }
            if line.starts_with(':') || line.is_empty() {
                continue;
            }

            return parse_header_line(strip_comments(line)).ok_or_else(|| {
                ConvertError::MalformedHeader {
                    line: index + 1,
                    content: raw.to_string(),
                }
            });
        }

        Err(ConvertError::MalformedHeader {
            line: 0,
            content: String::new(),
        })
    }

    fn parse_body_line(&mut self, layout: &BodyLayout, line_no: usize, raw: &str) -> Result<()> {
        let line = raw.trim_end().trim_end_matches('\u{1a}');
        let line = strip_comments(line);
        if line.trim().is_empty() {
            return Ok(());
        }

        let malformed = || ConvertError::MalformedBodyLine {
            line: line_no,
            content: raw.to_string(),
        };

        let chars: Vec<char> = line.chars().collect();
        let fixed_width = layout.subtotal + layout.order + 1 + layout.description;
        if chars.len() <= fixed_width {
            return Err(malformed());
        }

        let region = |from: usize, to: usize| chars[from..to].iter().collect::<String>();
        let digits_or_blank =
            |s: &str| s.chars().all(|c| c.is_ascii_digit() || c.is_whitespace());

        let subtotal_marker = region(0, layout.subtotal);
        let order_field = region(layout.subtotal, layout.subtotal + layout.order);
        let separator = chars[layout.subtotal + layout.order];
        let description = region(layout.subtotal + layout.order + 1, fixed_width);

        if !digits_or_blank(&subtotal_marker)
            || !digits_or_blank(&order_field)
            || !separator.is_whitespace()
        {
            return Err(malformed());
        }

        // The values region is the longest prefix over the permitted charset.
        let values_region: String = chars[fixed_width..]
            .iter()
            .take_while(|c| is_value_char(**c))
            .collect();
        if values_region.is_empty() {
            return Err(malformed());
        }

        let order: u32 = order_field.trim().parse().map_err(|_| malformed())?;
        let values = self.parse_values(values_region.trim_end());

        self.add_line(
            line_no,
            raw,
            !subtotal_marker.trim().is_empty(),
            order,
            description.trim().to_string(),
            values,
        )
    }

    /// Place a parsed line into its order slot, or merge a continuation.
    fn add_line(
        &mut self,
        line_no: usize,
        raw: &str,
        subtotal: bool,
        order: u32,
        description: String,
        values: Vec<Option<ValueRange>>,
    ) -> Result<()> {
        let index = (order as usize)
            .checked_sub(1)
            .filter(|i| *i < self.slots.len())
            .ok_or(ConvertError::MalformedBodyLine {
                line: line_no,
                content: raw.to_string(),
            })?;

        let has_empty = values.iter().any(|v| v.as_ref().is_none_or(ValueRange::is_blank));
        let declared: Vec<ValueRange> = values.into_iter().flatten().collect();

        match &mut self.slots[index] {
            None => {
                self.slots[index] = Some(Category {
                    order,
                    description,
                    values: declared,
                    subtotal,
                    has_empty,
                });
            }
            Some(existing) => {
                self.all_single_valued = false;
                if existing.description != description && !subtotal {
                    tracing::warn!(
                        file = %self.name,
                        order,
                        existing = %existing.description,
                        replacement = %description,
                        "categories share an order number but differ in description"
                    );
                }
                existing.description = description;
                existing.has_empty |= has_empty;
                existing.values.extend(declared);
            }
        }
        Ok(())
    }

    fn parse_values(&mut self, values: &str) -> Vec<Option<ValueRange>> {
        values.split(',').map(|token| self.parse_value(token)).collect()
    }

    /// `None` marks an empty token: tracked as the category's empty marker
    /// but never materialized as a value.
    fn parse_value(&mut self, token: &str) -> Option<ValueRange> {
        if let Some((start, end)) = split_range(token) {
            self.has_range = true;
            self.all_single_valued = false;
            return Some(ValueRange::new(start, end));
        }

        if token.is_empty() {
            return None;
        }
        if !token.chars().all(|c| c.is_ascii_digit()) {
            self.only_numeric_values = false;
        }
        Some(ValueRange::single(token))
    }
}

/// Everything from the first `;` to the end of the line is a comment.
fn strip_comments(line: &str) -> &str {
    match line.find(';') {
        Some(at) => &line[..at],
        None => line,
    }
}

fn is_value_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ',' || c == '.' || c == '-' || c.is_whitespace()
}

/// Header line: `FORMAT? count length TYPE?`, whitespace-flexible.
fn parse_header_line(line: &str) -> Option<Header> {
    let line = line.trim();

    let (format, rest) = take_prefix(line, |c| c.is_ascii_uppercase());
    let (count, rest) = take_prefix(rest.trim_start(), |c| c.is_ascii_digit());
    if count.is_empty() {
        return None;
    }
    let (length, rest) = take_prefix(rest.trim_start(), |c| c.is_ascii_digit());
    if length.is_empty() {
        return None;
    }
    let (type_tag, _) = take_prefix(rest.trim_start(), |c| c.is_ascii_uppercase());

    Some(Header {
        format: format.to_string(),
        category_count: count.parse().ok()?,
        value_length: length.parse().ok()?,
        type_tag: type_tag.to_string(),
    })
}

fn take_prefix(s: &str, pred: impl Fn(char) -> bool) -> (&str, &str) {
    let end = s
        .char_indices()
        .find(|(_, c)| !pred(*c))
        .map_or(s.len(), |(at, _)| at);
    s.split_at(end)
}

/// A range token is `alnum-run '-' alnum-run`; spaces are allowed inside a
/// run but the runs must start with an alphanumeric character.
fn split_range(token: &str) -> Option<(&str, &str)> {
    fn alnum_run(s: &str) -> bool {
        s.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == ' ')
    }

    let (start, end) = token.split_once('-')?;
    (alnum_run(start) && alnum_run(end)).then_some((start, end))
}
