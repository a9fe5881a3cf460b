// crates/sparse-septree/src/tree.rs

//! Binary separator tree: construction from an elimination-tree parent
//! vector, shape queries, and the raw wire layout used for broadcast.

use std::cell::Cell;

use crate::error::TreeError;

/// A binary separator tree over `[0, nbsep)`. Every node has 0 or 2
/// children; exactly one node has no parent.
///
/// The node attributes (`sep_end`, `pa`, `lch`, `rch`) are stored
/// consecutively in a single contiguous `i64` buffer of length
/// `4*nbsep+1`, so that the whole tree can be broadcast or persisted as
/// one block (see [`Self::to_wire`]/[`Self::from_wire`]).
#[derive(Debug)]
pub struct SeparatorTree {
    data: Vec<i64>,
    nbsep: usize,
    root: Cell<Option<usize>>,
}

impl Clone for SeparatorTree {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            nbsep: self.nbsep,
            root: Cell::new(self.root.get()),
        }
    }
}

impl PartialEq for SeparatorTree {
    fn eq(&self, other: &Self) -> bool {
        self.nbsep == other.nbsep && self.data == other.data
    }
}

impl Eq for SeparatorTree {}

impl SeparatorTree {
    /// An empty tree (`nbsep == 0`).
    #[must_use]
    pub fn empty() -> Self {
        Self {
            data: vec![0],
            nbsep: 0,
            root: Cell::new(None),
        }
    }

    pub(crate) fn raw_buffer(&self) -> &[i64] {
        &self.data
    }

    pub(crate) fn from_raw_buffer(data: Vec<i64>, nbsep: usize) -> Self {
        Self {
            data,
            nbsep,
            root: Cell::new(None),
        }
    }

    pub(crate) fn with_capacity(nbsep: usize) -> Self {
        if nbsep == 0 {
            return Self::empty();
        }
        let mut data = vec![-1i64; 4 * nbsep + 1];
        data[0] = 0;
        Self {
            data,
            nbsep,
            root: Cell::new(None),
        }
    }

    /// Number of separators (tree nodes), including binarization
    /// virtual nodes.
    #[must_use]
    pub const fn separators(&self) -> usize {
        self.nbsep
    }

    const fn pa_off(&self) -> usize {
        self.nbsep + 1
    }

    const fn lch_off(&self) -> usize {
        self.pa_off() + self.nbsep
    }

    const fn rch_off(&self) -> usize {
        self.lch_off() + self.nbsep
    }

    /// Prefix sums of separator size: separator `i` spans rows/columns
    /// `[sep_end[i], sep_end[i+1])`. Length `nbsep + 1`.
    #[must_use]
    pub fn sep_end(&self) -> &[i64] {
        &self.data[0..=self.nbsep]
    }

    /// Parent index per node, `-1` for the root.
    #[must_use]
    pub fn pa(&self) -> &[i64] {
        &self.data[self.pa_off()..self.pa_off() + self.nbsep]
    }

    /// Left child index per node, `-1` for leaves.
    #[must_use]
    pub fn lch(&self) -> &[i64] {
        &self.data[self.lch_off()..self.lch_off() + self.nbsep]
    }

    /// Right child index per node, `-1` for leaves.
    #[must_use]
    pub fn rch(&self) -> &[i64] {
        &self.data[self.rch_off()..self.rch_off() + self.nbsep]
    }

    pub(crate) fn set_sep_end(&mut self, i: usize, v: i64) {
        self.data[i] = v;
    }

    pub(crate) fn set_pa(&mut self, i: usize, v: i64) {
        let off = self.pa_off();
        self.data[off + i] = v;
    }

    pub(crate) fn set_lch(&mut self, i: usize, v: i64) {
        let off = self.lch_off();
        self.data[off + i] = v;
    }

    pub(crate) fn set_rch(&mut self, i: usize, v: i64) {
        let off = self.rch_off();
        self.data[off + i] = v;
    }

    /// Size (row/column count) of separator `i`.
    #[must_use]
    pub fn size(&self, i: usize) -> i64 {
        self.sep_end()[i + 1] - self.sep_end()[i]
    }

    /// The unique node with no parent.
    ///
    /// # Panics
    /// Panics if `separators() == 0`, or if no node has `pa == -1`
    /// (malformed tree).
    #[must_use]
    pub fn root(&self) -> usize {
        if let Some(r) = self.root.get() {
            return r;
        }
        let r = self
            .pa()
            .iter()
            .position(|&p| p == -1)
            .expect("separator tree has no root: exactly one node must have pa == -1");
        self.root.set(Some(r));
        r
    }

    /// Depth of node `i`'s subtree (a leaf has level 1).
    #[must_use]
    pub fn level(&self, i: usize) -> u32 {
        let mut lvl = 0;
        if self.lch()[i] != -1 {
            lvl = self.level(self.lch()[i] as usize);
        }
        if self.rch()[i] != -1 {
            lvl = lvl.max(self.level(self.rch()[i] as usize));
        }
        lvl + 1
    }

    /// Height of the whole tree; `0` for an empty tree.
    #[must_use]
    pub fn levels(&self) -> u32 {
        if self.nbsep == 0 {
            0
        } else {
            self.level(self.root())
        }
    }

    /// Validate invariants T1-T6.
    ///
    /// # Errors
    /// Returns [`TreeError::InvariantViolation`] describing the first
    /// violation found.
    pub fn check(&self) -> Result<(), TreeError> {
        if self.nbsep == 0 {
            return Ok(());
        }
        let roots = self.pa().iter().filter(|&&p| p == -1).count();
        if roots != 1 {
            return Err(TreeError::InvariantViolation(format!(
                "expected exactly 1 root, found {roots}"
            )));
        }
        let mut mark = vec![false; self.nbsep];
        self.mark_reachable(self.root(), &mut mark);
        if mark.iter().any(|&m| !m) {
            return Err(TreeError::InvariantViolation(
                "not all nodes are reachable from the root".into(),
            ));
        }
        let mut leaves = 0usize;
        for i in 0..self.nbsep {
            let (pa, lch, rch) = (self.pa()[i], self.lch()[i], self.rch()[i]);
            if pa != -1 && !(0..self.nbsep as i64).contains(&pa) {
                return Err(TreeError::InvariantViolation(format!("pa[{i}] = {pa} out of range")));
            }
            if lch != -1 && !(0..self.nbsep as i64).contains(&lch) {
                return Err(TreeError::InvariantViolation(format!("lch[{i}] = {lch} out of range")));
            }
            if rch != -1 && !(0..self.nbsep as i64).contains(&rch) {
                return Err(TreeError::InvariantViolation(format!("rch[{i}] = {rch} out of range")));
            }
            if (lch == -1) != (rch == -1) {
                return Err(TreeError::InvariantViolation(format!(
                    "node {i} has exactly one child (lch={lch}, rch={rch})"
                )));
            }
            if pa != -1 {
                let pa = pa as usize;
                if self.lch()[pa] != i as i64 && self.rch()[pa] != i as i64 {
                    return Err(TreeError::InvariantViolation(format!(
                        "node {i} is not a recorded child of its parent {pa}"
                    )));
                }
            }
            if lch == -1 && rch == -1 {
                leaves += 1;
            }
        }
        if 2 * leaves - 1 != self.nbsep {
            return Err(TreeError::InvariantViolation(format!(
                "2*leaves-1 ({}) != nbsep ({})",
                2 * leaves - 1,
                self.nbsep
            )));
        }
        if self.sep_end().windows(2).any(|w| w[1] < w[0]) {
            return Err(TreeError::InvariantViolation("sep_end is not non-decreasing".into()));
        }
        Ok(())
    }

    fn mark_reachable(&self, node: usize, mark: &mut [bool]) {
        mark[node] = true;
        if self.lch()[node] != -1 {
            self.mark_reachable(self.lch()[node] as usize, mark);
        }
        if self.rch()[node] != -1 {
            self.mark_reachable(self.rch()[node] as usize, mark);
        }
    }

    /// Emit summary statistics (node count, levels, average/imbalance of
    /// separator sizes) as a `tracing` event, in place of the source's
    /// `.m` file dump.
    pub fn printm(&self, name: &str) {
        if self.nbsep == 0 {
            tracing::info!(tree = name, nbsep = 0, "empty separator tree");
            return;
        }
        let mut avg = 0.0f64;
        let mut empty = 0usize;
        for i in 0..self.nbsep {
            let s = self.size(i);
            avg += s as f64;
            if s == 0 {
                empty += 1;
            }
        }
        avg /= self.nbsep as f64;
        let mut subtree = vec![0i64; self.nbsep];
        let mut imbalance = vec![1.0f64; self.nbsep];
        self.compute_subtree_stats(self.root(), &mut subtree, &mut imbalance);
        let avg_imbalance = imbalance.iter().sum::<f64>() / self.nbsep as f64;
        let max_imbalance = imbalance.iter().cloned().fold(0.0f64, f64::max);
        tracing::info!(
            tree = name,
            nbsep = self.nbsep,
            levels = self.levels(),
            avg_size = avg,
            empty_nodes = empty,
            avg_imbalance,
            max_imbalance,
            "separator tree statistics"
        );
    }

    fn compute_subtree_stats(&self, node: usize, subtree: &mut [i64], imbalance: &mut [f64]) -> i64 {
        let mut total = self.size(node);
        let (lch, rch) = (self.lch()[node], self.rch()[node]);
        if lch != -1 {
            total += self.compute_subtree_stats(lch as usize, subtree, imbalance);
        }
        if rch != -1 {
            total += self.compute_subtree_stats(rch as usize, subtree, imbalance);
        }
        subtree[node] = total;
        if lch != -1 && rch != -1 {
            let (a, b) = (subtree[lch as usize] as f64, subtree[rch as usize] as f64);
            imbalance[node] = a.max(b) / a.min(b).max(1.0);
        }
        total
    }
}

struct RawSep {
    pa: i64,
    lch: i64,
    rch: i64,
    sep_end: i64,
}

/// Build a binary separator tree from an elimination-tree parent vector.
///
/// `etree[i]` gives the parent of node `i`, or `etree.len()` for a root.
/// Multiple roots are canonicalized into a single tree via virtual
/// merge nodes before binarization; nodes with a third child get a new
/// virtual sibling node inserted ahead of them.
/// Virtual nodes (index `>= etree.len()`) contribute size 0.
#[must_use]
pub fn from_elimination_tree(etree_in: &[i64]) -> SeparatorTree {
    let n = etree_in.len();
    if n == 0 {
        return SeparatorTree::empty();
    }
    let n_i64 = n as i64;
    let mut etree: Vec<i64> = etree_in.iter().map(|&p| if p == n_i64 { -1 } else { p }).collect();

    let nr_roots = etree.iter().filter(|&&p| p == -1).count();
    if nr_roots > 1 {
        for _ in 0..nr_roots - 1 {
            let mut hi = etree.len() - 1;
            while etree[hi] != -1 {
                hi -= 1;
            }
            let root_right = hi;
            hi -= 1;
            while etree[hi] != -1 {
                hi -= 1;
            }
            let root_left = hi;
            let merge = etree.len() as i64;
            etree.push(-1);
            etree[root_right] = merge;
            etree[root_left] = merge;
        }
    }

    let new_n = etree.len();
    let mut count = vec![0i64; new_n];
    let mut lchild = vec![-1i64; new_n];
    let mut rchild = vec![-1i64; new_n];
    for (i, &p) in etree.iter().enumerate().take(new_n) {
        if p == -1 {
            continue;
        }
        let pu = p as usize;
        count[pu] += 1;
        match count[pu] {
            1 => lchild[pu] = i as i64,
            2 => rchild[pu] = i as i64,
            3 => {
                let v = lchild.len() as i64;
                lchild.push(lchild[pu]);
                rchild.push(rchild[pu]);
                lchild[pu] = v;
                rchild[pu] = i as i64;
                count[pu] -= 1;
            }
            _ => unreachable!("count[p] cannot exceed 3: case 3 always folds back to 2"),
        }
    }

    let mut seps: Vec<RawSep> = Vec::new();
    let mut s: Vec<i64> = Vec::new();
    let mut l: Vec<i64> = Vec::new();
    let root_idx = etree.iter().position(|&p| p == -1).expect("canonicalization leaves exactly one root") as i64;
    s.push(root_idx);
    let mut prev: i64 = -1;
    while let Some(&i) = s.last() {
        let iu = i as usize;
        let moving_down = prev == -1 || lchild[prev as usize] == i || rchild[prev as usize] == i;
        if moving_down {
            if lchild[iu] != -1 {
                s.push(lchild[iu]);
            } else if rchild[iu] != -1 {
                s.push(rchild[iu]);
            }
        } else if lchild[iu] == prev {
            if rchild[iu] != -1 {
                l.push(seps.len() as i64 - 1);
                s.push(rchild[iu]);
            }
        } else {
            let has_two = lchild[iu] != -1 && rchild[iu] != -1;
            let has_none = lchild[iu] == -1 && rchild[iu] == -1;
            if has_two || has_none {
                let pid = seps.len();
                let lch_ref = if lchild[iu] != -1 { *l.last().expect("left child was visited") } else { -1 };
                let rch_ref = if rchild[iu] != -1 { pid as i64 - 1 } else { -1 };
                let base = seps.last().map_or(0, |s| s.sep_end);
                seps.push(RawSep { pa: -1, lch: lch_ref, rch: rch_ref, sep_end: base });
                if lchild[iu] != -1 {
                    let lidx = l.pop().expect("left child was visited") as usize;
                    seps[lidx].pa = pid as i64;
                }
                if rchild[iu] != -1 {
                    seps[pid - 1].pa = pid as i64;
                }
            }
            if iu < n {
                seps.last_mut().expect("a real node always has a current separator").sep_end += 1;
            }
            s.pop();
        }
        prev = i;
    }

    let nbsep = seps.len();
    let mut tree = SeparatorTree::with_capacity(nbsep);
    tree.set_sep_end(0, 0);
    for (i, sep) in seps.iter().enumerate() {
        tree.set_sep_end(i + 1, sep.sep_end);
        tree.set_pa(i, sep.pa);
        tree.set_lch(i, sep.lch);
        tree.set_rch(i, sep.rch);
    }
    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_node_tree() {
        let t = from_elimination_tree(&[1]);
        assert_eq!(t.separators(), 1);
        assert_eq!(t.pa(), &[-1]);
        assert_eq!(t.lch(), &[-1]);
        assert_eq!(t.rch(), &[-1]);
        assert_eq!(t.sep_end(), &[0, 1]);
        t.check().unwrap();
    }

    #[test]
    fn empty_tree() {
        let t = from_elimination_tree(&[]);
        assert_eq!(t.separators(), 0);
        t.check().unwrap();
        assert_eq!(t.levels(), 0);
    }

    /// `etree = [4,4,5,5,5,-1]`: one root (5) with a third
    /// child, so binarization inserts exactly one virtual node.
    #[test]
    fn binarizes_three_child_node() {
        let t = from_elimination_tree(&[4, 4, 5, 5, 5, -1]);
        t.check().unwrap();
        // one real root (node 5) plus the six original nodes, plus one
        // virtual node introduced to split node 5's three children.
        assert_eq!(t.separators(), 7);
        let sizes: Vec<i64> = (0..t.separators()).map(|i| t.size(i)).collect();
        assert_eq!(sizes, vec![1, 1, 0, 1, 1, 1, 1]);
        assert_eq!(sizes.iter().sum::<i64>(), 6);
        // exactly one virtual (zero-size) node from the single binarization.
        assert_eq!(sizes.iter().filter(|&&s| s == 0).count(), 1);
        let root = t.root();
        assert_eq!(t.pa()[root], -1);
        assert_eq!(t.levels(), 3);
    }

    proptest::proptest! {
        /// Tree shape invariants hold for any well-formed elimination
        /// vector, and the tree is post-ordered (every node's index
        /// exceeds both of its children's).
        #[test]
        fn tree_shape_holds(n in 1usize..60) {
            // standard heap-array parent encoding: node i>0 has parent
            // (i-1)/2, node 0 is the root. Always a single connected
            // tree with no cycles, regardless of n.
            let mut etree = vec![0i64; n];
            etree[0] = n as i64;
            for i in 1..n {
                etree[i] = ((i - 1) / 2) as i64;
            }
            let t = from_elimination_tree(&etree);
            t.check().unwrap();
            if t.separators() > 0 {
                prop_assert!(t.levels() >= 1);
            }
            for i in 0..t.separators() {
                if t.lch()[i] != -1 {
                    prop_assert!((t.lch()[i] as usize) < i);
                }
                if t.rch()[i] != -1 {
                    prop_assert!((t.rch()[i] as usize) < i);
                }
            }
        }
    }
}
