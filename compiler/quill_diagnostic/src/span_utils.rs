//! Line and column lookup for rendering diagnostics.

use quill_ir::Span;

/// Byte offsets of each line start in a source text.
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// `offsets[0] = 0`; `offsets[n]` is the byte after the n-th newline.
    offsets: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                offsets.push(u32::try_from(i + 1).unwrap_or(u32::MAX));
            }
        }
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    #[inline]
    pub fn line_from_offset(&self, offset: u32) -> u32 {
        let line_idx = match self.offsets.binary_search(&offset) {
            Ok(exact) => exact,
            Err(insert) => insert.saturating_sub(1),
        };
        u32::try_from(line_idx).unwrap_or(u32::MAX - 1) + 1
    }

    /// 1-based (line, column), with the column counted in characters.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line_from_offset(offset);
        let line_start = self.line_start(line);
        let end = (offset as usize).min(source.len());
        let col = source
            .get(line_start..end)
            .map_or(0, |text| text.chars().count());
        (line, u32::try_from(col).unwrap_or(u32::MAX - 1) + 1)
    }

    /// Text of 1-based `line`, without its newline.
    pub fn line_text<'s>(&self, source: &'s str, line: u32) -> &'s str {
        let start = self.line_start(line);
        let end = self
            .offsets
            .get(line as usize)
            .map_or(source.len(), |&next| (next as usize).saturating_sub(1));
        source.get(start..end.max(start)).unwrap_or("").trim_end_matches('\r')
    }

    fn line_start(&self, line: u32) -> usize {
        self.offsets
            .get(line.saturating_sub(1) as usize)
            .copied()
            .unwrap_or(0) as usize
    }
}

/// Characters of `span` that lie on the same line as its start, for
/// underlining. Zero-width spans underline one column.
pub fn underline_width(source: &str, span: Span) -> usize {
    let text = source.get(span.to_range()).unwrap_or("");
    let first_line = text.split('\n').next().unwrap_or("");
    first_line.chars().count().max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col() {
        let source = "a + b\nfoo(1)\n";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
        assert_eq!(table.offset_to_line_col(source, 4), (1, 5));
        assert_eq!(table.offset_to_line_col(source, 6), (2, 1));
        assert_eq!(table.line_text(source, 2), "foo(1)");
        assert_eq!(table.line_text(source, 1), "a + b");
    }

    #[test]
    fn test_columns_count_characters() {
        let source = "'é' + x";
        let table = LineOffsetTable::build(source);
        // 'é' is two bytes; `+` starts at byte 5.
        assert_eq!(table.offset_to_line_col(source, 5), (1, 5));
    }

    #[test]
    fn test_underline_width() {
        assert_eq!(underline_width("abc def", Span::new(4, 7)), 3);
        assert_eq!(underline_width("abc", Span::point(3)), 1);
        assert_eq!(underline_width("ab\ncd", Span::new(0, 5)), 2);
    }
}
