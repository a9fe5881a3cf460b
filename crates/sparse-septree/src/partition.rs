// crates/sparse-septree/src/partition.rs

//! Subtree extraction and top-tree construction, for splitting a
//! separator tree across `P` parallel workers.

use crate::tree::SeparatorTree;

impl SeparatorTree {
    /// Extract the `p`-th of up to `big_p` subtrees obtained by
    /// repeatedly splitting the root (and any currently-marked subtree
    /// root with two children) until there are `big_p` subtree roots or
    /// no further split is possible. Returns an independent,
    /// renumbered tree in post-order.
    #[must_use]
    pub fn subtree(&self, p: usize, big_p: usize) -> SeparatorTree {
        if self.nbsep == 0 {
            return SeparatorTree::empty();
        }
        let mut mark = vec![false; self.nbsep];
        let root = self.root();
        mark[root] = true;
        let mut nr_subtrees = 1usize;
        while nr_subtrees < big_p && nr_subtrees < self.nbsep {
            self.find_subtree_roots(root, &mut mark, &mut nr_subtrees, big_p);
        }
        let mut sub_root = None;
        let mut seen = 0usize;
        for (i, &marked) in mark.iter().enumerate() {
            if marked {
                if seen == p {
                    sub_root = Some(i);
                    break;
                }
                seen += 1;
            }
        }
        let Some(sub_root) = sub_root else {
            return SeparatorTree::empty();
        };
        let sub_size = self.count_nodes(sub_root);
        if sub_size == 0 {
            return SeparatorTree::empty();
        }
        let mut sub = SeparatorTree::with_capacity(sub_size);
        sub.set_sep_end(0, 0);
        let mut id = 0usize;
        self.fill_sub(sub_root, &mut sub, &mut id);
        sub.set_pa(sub_size - 1, -1);
        sub
    }

    fn find_subtree_roots(&self, node: usize, mark: &mut [bool], nr_subtrees: &mut usize, big_p: usize) {
        if mark[node] {
            if *nr_subtrees < big_p && self.lch()[node] != -1 && self.rch()[node] != -1 {
                mark[self.lch()[node] as usize] = true;
                mark[self.rch()[node] as usize] = true;
                mark[node] = false;
                *nr_subtrees += 1;
            }
        } else {
            if self.lch()[node] != -1 {
                self.find_subtree_roots(self.lch()[node] as usize, mark, nr_subtrees, big_p);
            }
            if self.rch()[node] != -1 {
                self.find_subtree_roots(self.rch()[node] as usize, mark, nr_subtrees, big_p);
            }
        }
    }

    fn count_nodes(&self, node: usize) -> usize {
        let mut c = 1;
        if self.lch()[node] != -1 {
            c += self.count_nodes(self.lch()[node] as usize);
        }
        if self.rch()[node] != -1 {
            c += self.count_nodes(self.rch()[node] as usize);
        }
        c
    }

    fn fill_sub(&self, node: usize, sub: &mut SeparatorTree, id: &mut usize) {
        let mut left_root = 0i64;
        if self.lch()[node] != -1 {
            self.fill_sub(self.lch()[node] as usize, sub, id);
            left_root = *id as i64 - 1;
        } else {
            sub.set_lch(*id, -1);
        }
        if self.rch()[node] != -1 {
            self.fill_sub(self.rch()[node] as usize, sub, id);
            sub.set_rch(*id, *id as i64 - 1);
            sub.set_pa(*id - 1, *id as i64);
        } else {
            sub.set_rch(*id, -1);
        }
        if self.lch()[node] != -1 {
            sub.set_lch(*id, left_root);
            sub.set_pa(left_root as usize, *id as i64);
        }
        let delta = self.size(node);
        let base = sub.sep_end()[*id];
        sub.set_sep_end(*id + 1, base + delta);
        *id += 1;
    }

    /// Extract the tree formed by the top `min(2*big_p-1, nbsep)` nodes
    /// around the root, i.e. a tree with `big_p` leaves, each leaf
    /// corresponding to the root of one of the subtrees [`subtree`]
    /// would produce for the same `big_p`.
    #[must_use]
    pub fn toptree(&self, big_p: usize) -> SeparatorTree {
        if big_p == 0 || self.nbsep == 0 {
            return SeparatorTree::empty();
        }
        let top_nodes = (2 * big_p - 1).min(self.nbsep);
        let mut top = SeparatorTree::with_capacity(top_nodes);
        let mut mark = vec![false; self.nbsep];
        let root = self.root();
        mark[root] = true;
        let mut nr_leafs = 1usize;
        while nr_leafs < big_p && nr_leafs < self.nbsep {
            self.mark_top_tree(root, &mut mark, &mut nr_leafs, big_p);
        }
        let mut tid: i64 = top_nodes as i64 - 1;
        self.fill_top(root, &mut top, &mut tid, &mark);
        top.set_pa(top_nodes - 1, -1);
        let root_sep_end = self.sep_end()[root + 1];
        top.set_sep_end(top_nodes, root_sep_end);
        top
    }

    fn mark_top_tree(&self, node: usize, mark: &mut [bool], nr_leafs: &mut usize, big_p: usize) {
        if *nr_leafs >= big_p {
            return;
        }
        let (l, r) = (self.lch()[node], self.rch()[node]);
        if l != -1 && r != -1 && !mark[l as usize] && !mark[r as usize] {
            mark[l as usize] = true;
            mark[r as usize] = true;
            *nr_leafs += 1;
        } else {
            if l != -1 {
                self.mark_top_tree(l as usize, mark, nr_leafs, big_p);
            }
            if r != -1 {
                self.mark_top_tree(r as usize, mark, nr_leafs, big_p);
            }
        }
    }

    fn leftmost_sep_start(&self, node: usize) -> i64 {
        if self.lch()[node] != -1 {
            self.leftmost_sep_start(self.lch()[node] as usize)
        } else {
            self.sep_end()[node]
        }
    }

    fn fill_top(&self, node: usize, top: &mut SeparatorTree, tid: &mut i64, mark: &[bool]) {
        let mytid = *tid;
        *tid -= 1;
        let mytid_u = mytid as usize;
        if self.rch()[node] != -1 && mark[self.rch()[node] as usize] {
            top.set_rch(mytid_u, *tid);
            top.set_pa(*tid as usize, mytid);
            self.fill_top(self.rch()[node] as usize, top, tid, mark);
        } else {
            top.set_rch(mytid_u, -1);
        }
        if self.lch()[node] != -1 && mark[self.lch()[node] as usize] {
            top.set_lch(mytid_u, *tid);
            top.set_pa(*tid as usize, mytid);
            self.fill_top(self.lch()[node] as usize, top, tid, mark);
        } else {
            top.set_lch(mytid_u, -1);
        }
        if top.rch()[mytid_u] == -1 {
            top.set_sep_end(mytid_u, self.leftmost_sep_start(node));
            top.set_sep_end(mytid_u + 1, self.sep_end()[node + 1]);
        } else {
            let base = top.sep_end()[mytid_u];
            top.set_sep_end(mytid_u + 1, base + self.sep_end()[node + 1] - self.sep_end()[node]);
        }
    }
}
