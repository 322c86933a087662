//! Selection notifications delivered by the host editor

use super::ViewId;

/// The selection a view reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Caret or text range, in document char offsets
    Text { offset: usize, length: usize },
    /// Anything that is not a text selection (tree items, images, ...)
    Other,
}

impl Selection {
    /// Collapsed caret at `offset`
    pub fn at(offset: usize) -> Self {
        Selection::Text { offset, length: 0 }
    }

    pub fn range(offset: usize, length: usize) -> Self {
        Selection::Text { offset, length }
    }

    /// Effective caret: the start offset of a text selection
    pub fn caret(&self) -> Option<usize> {
        match self {
            Selection::Text { offset, .. } => Some(*offset),
            Selection::Other => None,
        }
    }
}

/// A selection change in one view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionEvent {
    pub view: ViewId,
    pub selection: Selection,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caret_offset_uses_range_start() {
        assert_eq!(Selection::at(4).caret(), Some(4));
        assert_eq!(Selection::range(17, 3).caret(), Some(17));
        assert_eq!(Selection::Other.caret(), None);
    }
}
