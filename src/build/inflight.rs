//! Cycle detection for recursive resolution.
//!
//! Every path being resolved sits on a shared stack until its guard drops,
//! whatever way the resolution exits. Entering a path already on the stack
//! is a cycle.

use indexmap::IndexSet;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default, Clone)]
pub struct InFlight {
    stack: Rc<RefCell<IndexSet<String>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `path`. `None` if it is already being resolved.
    pub fn enter(&self, path: &str) -> Option<InFlightGuard> {
        let mut stack = self.stack.borrow_mut();
        if !stack.insert(path.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            stack: Rc::clone(&self.stack),
            path: path.to_string(),
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.stack.borrow().contains(path)
    }

    pub fn is_empty(&self) -> bool {
        self.stack.borrow().is_empty()
    }

    /// Paths currently being resolved, outermost first.
    pub fn chain(&self) -> Vec<String> {
        self.stack.borrow().iter().cloned().collect()
    }
}

/// Pops its path from the in-flight stack on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    stack: Rc<RefCell<IndexSet<String>>>,
    path: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.stack.borrow_mut().shift_remove(&self.path);
    }
}
