use crate::core_api::{CoreError, CoreErrorCode};

/// Half-open range of 0-based line indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.start..self.end).contains(&line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    /// Text the editor does not own and keeps verbatim.
    Passthrough,
    /// Index into the symbol list the layout was built from.
    Symbol(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub id: BlockId,
    pub range: LineRange,
}

/// Partition of a source file into owned symbol blocks and passthrough text.
#[derive(Debug, Clone)]
pub struct FileLayout {
    pub line_count: usize,
    pub blocks: Vec<BlockLayout>,
}

impl FileLayout {
    /// Builds a layout from symbol blocks, filling the gaps with passthrough.
    /// `symbols` pairs each symbol index with its block and may be unsorted.
    pub fn from_symbol_blocks(
        line_count: usize,
        mut symbols: Vec<(usize, LineRange)>,
    ) -> Result<Self, CoreError> {
        symbols.sort_by_key(|(_, range)| range.start);

        let mut blocks = Vec::with_capacity(symbols.len() * 2 + 1);
        let mut cursor = 0usize;
        for (index, range) in symbols {
            if range.start < cursor {
                return Err(CoreError::new(
                    CoreErrorCode::Parse,
                    format!(
                        "symbol block at lines {}..{} overlaps the previous block",
                        range.start + 1,
                        range.end
                    ),
                ));
            }
            if range.start > cursor {
                blocks.push(BlockLayout {
                    id: BlockId::Passthrough,
                    range: LineRange {
                        start: cursor,
                        end: range.start,
                    },
                });
            }
            blocks.push(BlockLayout {
                id: BlockId::Symbol(index),
                range,
            });
            cursor = range.end;
        }
        if cursor < line_count {
            blocks.push(BlockLayout {
                id: BlockId::Passthrough,
                range: LineRange {
                    start: cursor,
                    end: line_count,
                },
            });
        }

        let layout = Self { line_count, blocks };
        layout.validate()?;
        Ok(layout)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        let mut expected = 0usize;
        for block in &self.blocks {
            if block.range.start != expected {
                return Err(layout_error(format!(
                    "layout gap/overlap around block {:?}: expected start {}, got {}",
                    block.id, expected, block.range.start
                )));
            }
            if block.range.end < block.range.start {
                return Err(layout_error(format!(
                    "invalid block range {:?}: {}..{}",
                    block.id, block.range.start, block.range.end
                )));
            }
            expected = block.range.end;
        }

        if expected != self.line_count {
            return Err(layout_error(format!(
                "layout does not cover file: ended at line {}, file has {} lines",
                expected, self.line_count
            )));
        }

        Ok(())
    }

    pub fn passthrough(&self) -> impl Iterator<Item = LineRange> + '_ {
        self.blocks
            .iter()
            .filter(|block| block.id == BlockId::Passthrough)
            .map(|block| block.range)
    }
}

fn layout_error(message: String) -> CoreError {
    CoreError::new(CoreErrorCode::Parse, message)
}
