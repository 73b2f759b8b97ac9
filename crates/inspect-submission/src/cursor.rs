//! Category cursor: a bounded position over `0..len`

use inspect_core::{InspectError, InspectResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCursor {
    index: usize,
    len: usize,
}

impl CategoryCursor {
    /// Cursor at the first of `len` categories
    pub fn new(len: usize) -> InspectResult<Self> {
        Self::at(0, len)
    }

    pub fn at(index: usize, len: usize) -> InspectResult<Self> {
        if len == 0 {
            return Err(InspectError::Validation("cursor over zero categories".to_string()));
        }
        let mut cursor = Self { index: 0, len };
        cursor.jump_to(index)?;
        Ok(cursor)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.len
    }

    /// Step forward; false when already at the last category
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Step back; false when already at the first category
    pub fn prev(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        true
    }

    pub fn jump_to(&mut self, index: usize) -> InspectResult<()> {
        if index >= self.len {
            return Err(InspectError::out_of_range(index as i64, 0, self.len as i64 - 1));
        }
        self.index = index;
        Ok(())
    }
}
