//! BVH8W construction.
//!
//! Deterministic median-split builder: a node's triangle set is split
//! three times at the median along the largest centroid-bounds axis,
//! fanning out into up to eight children. Identical input always produces
//! an identical tree.

use super::{
    make_leaf_ptr, make_node_ptr, Bvh8w, Bvh8wAabbs, Bvh8wNode, LeafNode, TriangleSoa,
    PTR_EMPTY,
};
use crate::ads::Triangle;
use crate::math::shapes::Aabb;
use crate::math::simd::Vec3x8;
use crate::math::Float;

/// Maximum triangles per leaf; leaf runs are padded up to this width.
const LEAF_WIDTH: usize = 8;

struct Builder {
    triangles: Vec<Triangle>,
    slot_ids: Vec<u32>,
    soa: TriangleSoa,
    nodes: Vec<Bvh8wNode>,
    leaves: Vec<LeafNode>,
    max_depth: usize,
}

impl Builder {
    // appends an 8-aligned, padded leaf run and returns its leaf pointer
    fn emit_leaf(&mut self, ids: &[u32]) -> i32 {
        debug_assert!(!ids.is_empty() && ids.len() <= LEAF_WIDTH);

        let tris_ptr = self.soa.len() as u32;
        for &id in ids {
            self.slot_ids.push(id);
            let t = self.triangles[id as usize].clone();
            self.soa.push(&t);
        }
        // pad the run to the lane width with the last real triangle
        let last = *ids.last().unwrap();
        for _ in ids.len()..LEAF_WIDTH {
            self.slot_ids.push(last);
            let t = self.triangles[last as usize].clone();
            self.soa.push(&t);
        }

        self.leaves.push(LeafNode {
            tris_ptr,
            count: ids.len() as u32,
        });
        make_leaf_ptr(self.leaves.len() - 1)
    }

    // splits `ids` at the median of the largest centroid-bounds axis
    fn median_split(&self, ids: &mut [u32]) -> usize {
        let mut cb = Aabb::null();
        for &id in ids.iter() {
            cb.expand(&self.triangles[id as usize].centroid());
        }
        let axis = cb.largest_axis();

        let mid = ids.len() / 2;
        ids.select_nth_unstable_by(mid, |&l, &r| {
            let cl = self.triangles[l as usize].centroid()[axis];
            let cr = self.triangles[r as usize].centroid()[axis];
            cl.partial_cmp(&cr)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(l.cmp(&r))
        });
        mid
    }

    fn build_node(&mut self, ids: &mut [u32], depth: usize) -> i32 {
        self.max_depth = self.max_depth.max(depth);

        if ids.len() <= LEAF_WIDTH {
            return self.emit_leaf(ids);
        }

        // fan out into 8 buckets with three median-split levels
        let mut bounds = [0usize; 9];
        bounds[8] = ids.len();
        let h = self.median_split(ids);
        bounds[4] = h;
        for (lo, hi, out) in [(0usize, bounds[4], 2usize), (bounds[4], bounds[8], 6)] {
            let q = self.median_split(&mut ids[lo..hi]);
            bounds[out] = lo + q;
        }
        for (lo, hi, out) in [
            (0usize, bounds[2], 1usize),
            (bounds[2], bounds[4], 3),
            (bounds[4], bounds[6], 5),
            (bounds[6], bounds[8], 7),
        ] {
            let q = self.median_split(&mut ids[lo..hi]);
            bounds[out] = lo + q;
        }

        let tris_start = self.soa.len() as u32;

        let mut child_ptrs = [PTR_EMPTY; 8];
        let mut mins = Vec3x8::splat(&crate::math::Vec3::splat(Float::INFINITY));
        let mut maxs = Vec3x8::splat(&crate::math::Vec3::splat(Float::NEG_INFINITY));

        // reserve our node slot before the children so parents precede
        // children in the array
        let node_idx = self.nodes.len();
        self.nodes.push(Bvh8wNode {
            aabbs: Bvh8wAabbs {
                min: mins,
                max: maxs,
            },
            child_ptrs,
            tris_start,
            tris_count: 0,
        });

        for c in 0..8 {
            let (lo, hi) = (bounds[c], bounds[c + 1]);
            if lo == hi {
                continue;
            }

            let mut child_aabb = Aabb::null();
            for &id in &ids[lo..hi] {
                child_aabb = child_aabb.union(&self.triangles[id as usize].aabb());
            }
            mins.write(c, &child_aabb.min);
            maxs.write(c, &child_aabb.max);

            child_ptrs[c] = self.build_node(&mut ids[lo..hi], depth + 1);
        }

        let tris_count = self.soa.len() as u32 - tris_start;
        let node = &mut self.nodes[node_idx];
        node.aabbs = Bvh8wAabbs {
            min: mins,
            max: maxs,
        };
        node.child_ptrs = child_ptrs;
        node.tris_count = tris_count;

        make_node_ptr(node_idx)
    }
}

impl Bvh8w {
    /// Builds the hierarchy over a triangle soup.
    pub fn build(triangles: Vec<Triangle>) -> Self {
        let mut world_aabb = Aabb::null();
        for t in &triangles {
            world_aabb = world_aabb.union(&t.aabb());
        }

        let mut builder = Builder {
            triangles,
            slot_ids: Vec::new(),
            soa: TriangleSoa::default(),
            nodes: Vec::new(),
            leaves: Vec::new(),
            max_depth: 0,
        };

        let root = if builder.triangles.is_empty() {
            PTR_EMPTY
        } else {
            let mut ids: Vec<u32> = (0..builder.triangles.len() as u32).collect();
            builder.build_node(&mut ids, 1)
        };

        log::debug!(
            "built bvh8w: {} triangles, {} nodes, {} leaves, depth {}",
            builder.triangles.len(),
            builder.nodes.len(),
            builder.leaves.len(),
            builder.max_depth
        );

        Bvh8w {
            triangles: builder.triangles,
            slot_ids: builder.slot_ids,
            soa: builder.soa,
            nodes: builder.nodes,
            leaves: builder.leaves,
            root,
            world_aabb,
            max_depth: builder.max_depth,
        }
    }

    /// Loads the 8-lane triangle cluster starting at a traversal slot.
    #[inline]
    pub(crate) fn load_tri_cluster(&self, slot: usize) -> (Vec3x8, Vec3x8, Vec3x8, Vec3x8) {
        let s = &self.soa;
        (
            Vec3x8::from_slices(&s.ax[slot..], &s.ay[slot..], &s.az[slot..]),
            Vec3x8::from_slices(&s.bx[slot..], &s.by[slot..], &s.bz[slot..]),
            Vec3x8::from_slices(&s.cx[slot..], &s.cy[slot..], &s.cz[slot..]),
            Vec3x8::from_slices(&s.nx[slot..], &s.ny[slot..], &s.nz[slot..]),
        )
    }

    /// The node's child AABB octet.
    #[inline]
    pub(crate) fn node_aabbs(n: &Bvh8wNode) -> &Bvh8wAabbs {
        &n.aabbs
    }
}
