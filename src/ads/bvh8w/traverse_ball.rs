//! Ball overlap traversal.

use super::{child_node_ptr, is_ptr_empty, is_ptr_leaf, leaf_node_ptr, Bvh8w};
use crate::math::intersect::{test_ball_aabb, test_ball_tri};
use crate::math::shapes::Ball;

const STACK_SIZE: usize = 128;

// subtrees at or below this triangle count are gathered wholesale
const TREAT_NODE_AS_LEAF_TRIS: u32 = 16;

fn gather_tris(ads: &Bvh8w, ball: &Ball, t0: u32, count: u32, out: &mut Vec<u32>) {
    let mut t = 0u32;
    while t < count {
        let slot = (t0 + t) as usize;
        let (a, b, c, n) = ads.load_tri_cluster(slot);
        let m = test_ball_tri(ball, &a, &b, &c, &n);

        let lanes = (count - t).min(8);
        for i in 0..lanes as usize {
            if m.bit(i) {
                let id = ads.slot_ids[slot + i];
                if !out.contains(&id) {
                    out.push(id);
                }
            }
        }
        t += 8;
    }
}

// bulk-accepts every triangle of a subtree without further filtering
fn gather_all(ads: &Bvh8w, t0: u32, count: u32, out: &mut Vec<u32>) {
    for t in 0..count {
        let id = ads.slot_ids[(t0 + t) as usize];
        if !out.contains(&id) {
            out.push(id);
        }
    }
}

impl Bvh8w {
    /// Gathers the original ids of all triangles that may overlap the
    /// ball.
    pub fn intersect_ball(&self, ball: &Ball) -> Vec<u32> {
        let mut out = Vec::new();
        if is_ptr_empty(self.root) {
            return out;
        }

        let mut stack = [self.root; STACK_SIZE];
        let mut s = 1usize;

        while s > 0 {
            let ptr = stack[s - 1];
            s -= 1;

            if is_ptr_leaf(ptr) {
                let leaf = *self.leaf_node(leaf_node_ptr(ptr));
                gather_tris(self, ball, leaf.tris_ptr, leaf.count, &mut out);
                continue;
            }

            let n = self.node(child_node_ptr(ptr));

            if n.tris_count <= TREAT_NODE_AS_LEAF_TRIS {
                gather_tris(self, ball, n.tris_start, n.tris_count, &mut out);
                continue;
            }

            let aabbs = Bvh8w::node_aabbs(n);
            let m = test_ball_aabb(ball, &aabbs.min, &aabbs.max);

            for i in 0..8 {
                let child = n.child_ptrs[i];
                if is_ptr_empty(child) {
                    continue;
                }
                if m.bit(i) {
                    debug_assert!(s < STACK_SIZE, "bvh8w ball traversal stack overflow");
                    stack[s] = child;
                    s += 1;
                }
            }
        }

        out
    }

    /// Gathers every triangle of the subtree at `ptr` without filtering;
    /// used when the caller knows the subtree is fully covered.
    pub fn gather_subtree(&self, ptr: i32, out: &mut Vec<u32>) {
        if is_ptr_empty(ptr) {
            return;
        }
        let (t0, count) = if is_ptr_leaf(ptr) {
            let leaf = self.leaf_node(leaf_node_ptr(ptr));
            (leaf.tris_ptr, leaf.count)
        } else {
            let n = self.node(child_node_ptr(ptr));
            (n.tris_start, n.tris_count)
        };
        gather_all(self, t0, count, out);
    }
}
