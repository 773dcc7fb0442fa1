use std::{cell::Cell, rc::Rc};

use cli_common::SyntaxErrorKind;

/// Tracks how many more nested expressions the parser may enter.
pub struct RecursionGuard {
    remaining: Rc<Cell<usize>>,
}

impl RecursionGuard {
    pub fn new(max_depth: usize) -> Self {
        RecursionGuard {
            remaining: Rc::new(Cell::new(max_depth)),
        }
    }

    /// Enter one level. The level is released when the returned guard drops.
    pub fn try_descend(&self) -> Result<DepthGuard, SyntaxErrorKind> {
        let remaining = self.remaining.get();

        if remaining == 0 {
            return Err(SyntaxErrorKind::MaximumRecursionDepthReached);
        }

        self.remaining.set(remaining - 1);

        Ok(DepthGuard {
            remaining: Rc::clone(&self.remaining),
        })
    }

    #[cfg(test)]
    pub fn remaining(&self) -> usize {
        self.remaining.get()
    }
}

pub struct DepthGuard {
    remaining: Rc<Cell<usize>>,
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        self.remaining.set(self.remaining.get() + 1);
    }
}
