use std::collections::VecDeque;

use crate::canvas::Canvas;

pub const DEFAULT_UNDO_STEPS: usize = 64;

/// LIFO stack of canvas snapshots holding at most `depth` entries.
/// When full, pushing drops the oldest snapshot.
#[derive(Debug)]
pub struct History {
    snapshots: VecDeque<Canvas>,
    depth: usize,
}

impl History {
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(1);
        Self {
            snapshots: VecDeque::with_capacity(depth.min(DEFAULT_UNDO_STEPS)),
            depth,
        }
    }

    pub fn push(&mut self, snapshot: Canvas) {
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
            log::trace!("undo history full, dropped oldest snapshot");
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn pop(&mut self) -> Option<Canvas> {
        self.snapshots.pop_back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_STEPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn marked(width: u32) -> Canvas {
        Canvas::new(width, 1).unwrap()
    }

    #[test]
    fn pops_in_reverse_order() {
        let mut history = History::new(4);
        history.push(marked(1));
        history.push(marked(2));
        assert_eq!(history.pop().map(|c| c.width()), Some(2));
        assert_eq!(history.pop().map(|c| c.width()), Some(1));
        assert!(history.pop().is_none());
    }

    #[test]
    fn drops_oldest_beyond_depth() {
        let mut history = History::new(3);
        for width in 1..=5 {
            history.push(marked(width));
        }
        assert_eq!(history.len(), 3);
        let widths: Vec<u32> = std::iter::from_fn(|| history.pop()).map(|c| c.width()).collect();
        assert_eq!(widths, vec![5, 4, 3]);
    }

    #[test]
    fn zero_depth_keeps_one_snapshot() {
        let mut history = History::new(0);
        assert_eq!(history.depth(), 1);
        history.push(marked(1));
        history.push(marked(2));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn snapshot_is_independent_copy() {
        let mut canvas = Canvas::new(2, 2).unwrap();
        let mut history = History::default();
        history.push(canvas.clone());
        canvas.set(0, 0, Rgba([1, 2, 3, 255]));
        let restored = history.pop().unwrap();
        assert_eq!(restored.get(0, 0), Some(Rgba([0, 0, 0, 0])));
    }
}
