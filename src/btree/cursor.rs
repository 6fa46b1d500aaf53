//! Detached traversal cursor.
//!
//! A cursor remembers its position as a path of child indices from the root
//! instead of holding references, so it does not borrow the tree between
//! steps. It records the tree's version when created; any later step, read
//! or reset against a tree whose version moved on fails with
//! [`TreeError::VersionChanged`] rather than yielding from a stale shape.

use std::collections::VecDeque;

use crate::block::Block;
use crate::btree::BTree;
use crate::error::{Result, TreeError};
use crate::types::{Direction, TraverseMethod};

/// What a traversal yields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    /// Every stored entry
    Entries,
    /// Every block
    Blocks,
}

/// One step of a block's visiting plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Entry(usize),
    Child(usize),
    Visit,
}

/// Traversal order, direction and granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Plan {
    method: TraverseMethod,
    direction: Direction,
    granularity: Granularity,
}

impl Plan {
    /// Action for `step` inside a block with `len` entries.
    ///
    /// Forward plans are written out below; a backward plan is the forward
    /// plan with entry and child indices mirrored, so siblings are walked
    /// right to left and in-order output comes out descending.
    fn action(self, len: usize, leaf: bool, step: usize) -> Option<Action> {
        let children = if leaf { 0 } else { len + 1 };
        let forward = match (self.method, self.granularity) {
            (TraverseMethod::PreOrder, Granularity::Entries) => {
                if step < len {
                    Action::Entry(step)
                } else if step < len + children {
                    Action::Child(step - len)
                } else {
                    return None;
                }
            }
            (TraverseMethod::PreOrder, Granularity::Blocks) => {
                if step == 0 {
                    Action::Visit
                } else if step <= children {
                    Action::Child(step - 1)
                } else {
                    return None;
                }
            }
            (TraverseMethod::PostOrder, Granularity::Entries) => {
                if step < children {
                    Action::Child(step)
                } else if step < children + len {
                    Action::Entry(step - children)
                } else {
                    return None;
                }
            }
            (TraverseMethod::PostOrder, Granularity::Blocks) => {
                if step < children {
                    Action::Child(step)
                } else if step == children {
                    Action::Visit
                } else {
                    return None;
                }
            }
            (TraverseMethod::InOrder, Granularity::Entries) => {
                if leaf {
                    if step < len {
                        Action::Entry(step)
                    } else {
                        return None;
                    }
                } else if step < 2 * len + 1 {
                    if step % 2 == 0 {
                        Action::Child(step / 2)
                    } else {
                        Action::Entry(step / 2)
                    }
                } else {
                    return None;
                }
            }
            (TraverseMethod::InOrder, Granularity::Blocks) => {
                // The block sits where its first entry would in entry order.
                match step {
                    0 if leaf => Action::Visit,
                    0 => Action::Child(0),
                    1 if !leaf => Action::Visit,
                    s if !leaf && s <= children => Action::Child(s - 1),
                    _ => return None,
                }
            }
            (TraverseMethod::LevelOrder, _) => return None,
        };
        Some(self.mirror(forward, len, children))
    }

    fn mirror(self, action: Action, len: usize, children: usize) -> Action {
        if !self.direction.is_backward() {
            return action;
        }
        match action {
            Action::Entry(i) => Action::Entry(len - 1 - i),
            Action::Child(i) => Action::Child(children - 1 - i),
            Action::Visit => Action::Visit,
        }
    }

    fn entry_index(self, step: usize, len: usize) -> usize {
        if self.direction.is_backward() {
            len - 1 - step
        } else {
            step
        }
    }
}

/// A block waiting to be (or being) expanded
#[derive(Debug, Clone)]
struct Frame {
    path: Vec<usize>,
    step: usize,
}

/// Where a cursor currently points
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Position {
    path: Vec<usize>,
    entry: Option<usize>,
}

/// Follow a path of child indices down from `root`
pub(crate) fn resolve<'a, E>(root: &'a Block<E>, path: &[usize]) -> Option<&'a Block<E>> {
    path.iter().try_fold(root, |block, &index| block.child(index))
}

/// A forward-only, restartable cursor over a tree
#[derive(Debug, Clone)]
pub struct Cursor {
    plan: Plan,
    version: u64,
    started: bool,
    /// Depth-first frames, innermost last
    stack: Vec<Frame>,
    /// Level order: block being drained
    active: Option<Frame>,
    /// Level order: blocks not yet reached
    queue: VecDeque<Vec<usize>>,
    current: Option<Position>,
}

impl Cursor {
    pub(crate) fn new(
        version: u64,
        method: TraverseMethod,
        direction: Direction,
        granularity: Granularity,
    ) -> Self {
        Self {
            plan: Plan {
                method,
                direction,
                granularity,
            },
            version,
            started: false,
            stack: Vec::new(),
            active: None,
            queue: VecDeque::new(),
            current: None,
        }
    }

    /// Traversal order
    pub fn method(&self) -> TraverseMethod {
        self.plan.method
    }

    /// Traversal direction
    pub fn direction(&self) -> Direction {
        self.plan.direction
    }

    /// What the cursor yields
    pub fn granularity(&self) -> Granularity {
        self.plan.granularity
    }

    /// Version of the tree this cursor was created against
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Check if the cursor is positioned at an item
    pub fn is_valid(&self) -> bool {
        self.current.is_some()
    }

    /// Depth of the current block (the root is depth 0)
    pub fn depth(&self) -> Option<usize> {
        self.current.as_ref().map(|p| p.path.len())
    }

    /// Advance to the next item; `false` once the traversal is exhausted
    pub fn move_next<E, C>(&mut self, tree: &BTree<E, C>) -> Result<bool> {
        self.check(tree)?;
        Ok(self.advance(tree.root()))
    }

    /// The entry at the current position (entry cursors only)
    pub fn entry<'a, E, C>(&self, tree: &'a BTree<E, C>) -> Result<Option<&'a E>> {
        self.check(tree)?;
        Ok(tree.root().and_then(|root| self.resolve_entry(root)))
    }

    /// The block at the current position
    ///
    /// For entry cursors this is the block holding the current entry.
    pub fn block<'a, E, C>(&self, tree: &'a BTree<E, C>) -> Result<Option<&'a Block<E>>> {
        self.check(tree)?;
        Ok(tree.root().and_then(|root| self.resolve_block(root)))
    }

    /// Rewind to before the first item
    pub fn reset<E, C>(&mut self, tree: &BTree<E, C>) -> Result<()> {
        self.check(tree)?;
        self.rewind();
        Ok(())
    }

    pub(crate) fn rewind(&mut self) {
        self.started = false;
        self.stack.clear();
        self.active = None;
        self.queue.clear();
        self.current = None;
    }

    fn check<E, C>(&self, tree: &BTree<E, C>) -> Result<()> {
        if tree.version() != self.version {
            return Err(TreeError::VersionChanged {
                expected: self.version,
                actual: tree.version(),
            });
        }
        Ok(())
    }

    /// Step without a version check; used where a borrow pins the tree.
    pub(crate) fn advance<E>(&mut self, root: Option<&Block<E>>) -> bool {
        let Some(root) = root else {
            self.current = None;
            return false;
        };
        if !self.started {
            self.started = true;
            match self.plan.method {
                TraverseMethod::LevelOrder => self.queue.push_back(Vec::new()),
                _ => self.stack.push(Frame {
                    path: Vec::new(),
                    step: 0,
                }),
            }
        }

        self.current = match self.plan.method {
            TraverseMethod::LevelOrder => self.advance_level(root),
            _ => self.advance_depth(root),
        };
        self.current.is_some()
    }

    fn advance_depth<E>(&mut self, root: &Block<E>) -> Option<Position> {
        let plan = self.plan;
        loop {
            let frame = self.stack.last_mut()?;
            let block = resolve(root, &frame.path)?;
            let action = plan.action(block.len(), block.is_leaf(), frame.step);
            frame.step += 1;

            match action {
                None => {
                    self.stack.pop();
                }
                Some(Action::Child(index)) => {
                    let mut path = frame.path.clone();
                    path.push(index);
                    self.stack.push(Frame { path, step: 0 });
                }
                Some(Action::Entry(index)) => {
                    return Some(Position {
                        path: frame.path.clone(),
                        entry: Some(index),
                    });
                }
                Some(Action::Visit) => {
                    return Some(Position {
                        path: frame.path.clone(),
                        entry: None,
                    });
                }
            }
        }
    }

    fn advance_level<E>(&mut self, root: &Block<E>) -> Option<Position> {
        let plan = self.plan;
        loop {
            let Some(frame) = self.active.as_mut() else {
                let path = self.queue.pop_front()?;
                self.active = Some(Frame { path, step: 0 });
                continue;
            };

            let block = resolve(root, &frame.path)?;
            let step = frame.step;
            frame.step += 1;

            match plan.granularity {
                Granularity::Blocks if step == 0 => {
                    return Some(Position {
                        path: frame.path.clone(),
                        entry: None,
                    });
                }
                Granularity::Entries if step < block.len() => {
                    return Some(Position {
                        path: frame.path.clone(),
                        entry: Some(plan.entry_index(step, block.len())),
                    });
                }
                _ => {
                    let count = block.children().len();
                    for i in 0..count {
                        let index = if plan.direction.is_backward() {
                            count - 1 - i
                        } else {
                            i
                        };
                        let mut path = frame.path.clone();
                        path.push(index);
                        self.queue.push_back(path);
                    }
                    self.active = None;
                }
            }
        }
    }

    pub(crate) fn resolve_entry<'a, E>(&self, root: &'a Block<E>) -> Option<&'a E> {
        let position = self.current.as_ref()?;
        resolve(root, &position.path)?.entry(position.entry?)
    }

    pub(crate) fn resolve_block<'a, E>(&self, root: &'a Block<E>) -> Option<&'a Block<E>> {
        let position = self.current.as_ref()?;
        resolve(root, &position.path)
    }
}
