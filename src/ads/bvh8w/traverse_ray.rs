//! Ray traversal.

use super::{child_node_ptr, is_ptr_empty, is_ptr_leaf, leaf_node_ptr, Bvh8w};
use crate::interaction::IntersectionSurface;
use crate::math::intersect::{intersect_ray_aabb_fast, intersect_ray_tri_8w, test_ray_tri_8w};
use crate::math::shapes::Ray;
use crate::math::simd::Vec3x8;
use crate::math::{Float, Range, Vec2};
use crate::stats;

// subtrees at or below this triangle count are tested directly
const TREAT_NODE_AS_LEAF_TRIS: u32 = 16;

const STACK_SIZE: usize = 64;

#[derive(Copy, Clone)]
struct StackEntry {
    min_range: Float,
    ptr: i32,
}

// simple insertion sort, descending by min_range
#[inline]
fn stack_sorter(stack: &mut [StackEntry]) {
    for i in 1..stack.len() {
        let p = stack[i];
        let mut j = i;
        while j > 0 && p.min_range > stack[j - 1].min_range {
            stack[j] = stack[j - 1];
            j -= 1;
        }
        stack[j] = p;
    }
}

struct RayWork {
    range: Range,
    dist: Float,
    slot: u32,
    bary: Vec2,
    front_face: bool,
}

struct RayClusterData {
    ro: Vec3x8,
    rd: Vec3x8,
    rinvd: Vec3x8,
}

impl RayClusterData {
    fn new(ray: &Ray) -> Self {
        Self {
            ro: Vec3x8::splat(&ray.o),
            rd: Vec3x8::splat(&ray.d),
            rinvd: Vec3x8::splat(&ray.invd),
        }
    }
}

fn gather_tris<const SHADOW: bool>(
    ads: &Bvh8w,
    rdata: &RayClusterData,
    t0: u32,
    count: u32,
    record: &mut RayWork,
) -> bool {
    let mut intersects = false;
    let mut t = 0u32;
    while t < count {
        let slot = (t0 + t) as usize;
        let (a, b, c, n) = ads.load_tri_cluster(slot);
        let lanes = (count - t).min(8) as usize;

        if SHADOW {
            let m = test_ray_tri_8w(&rdata.ro, &rdata.rd, &a, &b, &c, &record.range, lanes);
            if m.any() {
                record.dist = record.range.min;
                return true;
            }
            t += 8;
            continue;
        }

        let range = Range::new(record.range.min, record.dist.min(record.range.max));
        let hits = intersect_ray_tri_8w(&rdata.ro, &rdata.rd, &a, &b, &c, &range);
        let front = n.dot(&rdata.rd);
        for i in 0..lanes {
            let dist = hits.dist.read(i);
            if dist != Float::NEG_INFINITY && dist < record.dist {
                record.dist = dist;
                record.slot = (slot + i) as u32;
                record.bary = Vec2::new(hits.bary_x.read(i), hits.bary_y.read(i));
                record.front_face = front.read(i) <= 0.0;
                intersects = true;
            }
        }
        t += 8;
    }

    intersects
}

fn traverse<const SHADOW: bool>(
    ads: &Bvh8w,
    ray: &Ray,
    record: &mut RayWork,
    nodes_visited: &mut u32,
) -> bool {
    if is_ptr_empty(ads.root) {
        return false;
    }

    let rdata = RayClusterData::new(ray);

    let mut stack = [StackEntry {
        min_range: 0.0,
        ptr: ads.root,
    }; STACK_SIZE];
    let mut s = 1usize;

    while s > 0 {
        let top = stack[s - 1];

        if is_ptr_leaf(top.ptr) {
            let leaf = *ads.leaf_node(leaf_node_ptr(top.ptr));
            s -= 1;

            let intr = gather_tris::<SHADOW>(ads, &rdata, leaf.tris_ptr, leaf.count, record);
            if intr {
                if SHADOW {
                    return true;
                }
                // unwind entries beyond the tightened distance
                while s > 0 && stack[s - 1].min_range >= record.dist {
                    s -= 1;
                }
            }
            continue;
        }

        let n = ads.node(child_node_ptr(top.ptr));
        s -= 1;

        if n.tris_count <= TREAT_NODE_AS_LEAF_TRIS {
            let intr = gather_tris::<SHADOW>(ads, &rdata, n.tris_start, n.tris_count, record);
            if intr {
                if SHADOW {
                    return true;
                }
                while s > 0 && stack[s - 1].min_range >= record.dist {
                    s -= 1;
                }
            }
            continue;
        }

        *nodes_visited += 1;

        let aabbs = Bvh8w::node_aabbs(n);
        let r = intersect_ray_aabb_fast(
            &rdata.ro,
            &rdata.rinvd,
            &aabbs.min,
            &aabbs.max,
            &Range::new(0.0, record.dist.min(record.range.max)),
        );
        stats::on_ray_aabb_8w_test();

        // gather intersected children
        let begin = s;
        for i in 0..8 {
            if r.mask.bit(i) && !is_ptr_empty(n.child_ptrs[i]) {
                debug_assert!(s < STACK_SIZE, "bvh8w ray traversal stack overflow");
                stack[s] = StackEntry {
                    min_range: r.min_t.read(i),
                    ptr: n.child_ptrs[i],
                };
                s += 1;
            }
        }
        // sort pushed children in descending distance
        stack_sorter(&mut stack[begin..s]);
    }

    record.dist < Float::INFINITY
}

impl Bvh8w {
    /// Closest ray intersection within `[tmin, tmax]`.
    pub fn intersect_ray(&self, ray: &Ray, range: &Range) -> Option<IntersectionSurface> {
        debug_assert!(range.max > 0.0);

        let start = stats::filter_timer_start();
        let mut work = RayWork {
            range: *range,
            dist: Float::INFINITY,
            slot: 0,
            bary: Vec2::new(0.0, 0.0),
            front_face: true,
        };

        let mut nodes = 0u32;
        let hit = traverse::<false>(self, ray, &mut work, &mut nodes);
        stats::on_ray_cast(hit, false, start, nodes);

        if !hit {
            return None;
        }
        Some(self.surface_for_slot(work.slot, work.dist, &work.bary, ray, work.front_face))
    }

    /// TRUE when any triangle blocks the ray within `[tmin, tmax]`.
    pub fn shadow_ray(&self, ray: &Ray, range: &Range) -> bool {
        let start = stats::filter_timer_start();
        let mut work = RayWork {
            range: *range,
            dist: Float::INFINITY,
            slot: 0,
            bary: Vec2::new(0.0, 0.0),
            front_face: true,
        };

        let mut nodes = 0u32;
        let hit = traverse::<true>(self, ray, &mut work, &mut nodes);
        stats::on_ray_cast(hit, true, start, nodes);
        hit
    }

    pub(crate) fn surface_for_slot(
        &self,
        slot: u32,
        dist: Float,
        bary: &Vec2,
        ray: &Ray,
        front_face: bool,
    ) -> IntersectionSurface {
        let id = self.slot_ids[slot as usize];
        let tri = self.triangle(id);
        let p = ray.propagate(dist);
        IntersectionSurface {
            p,
            ng: tri.n,
            ns: tri.shading_normal(bary),
            wo: -ray.d,
            uv: tri.uv(bary),
            tangent_frame: crate::interaction::SurfaceDifferentials {
                dpdu: tri.b - tri.a,
                dpdv: tri.c - tri.a,
            },
            dist,
            triangle: id,
            front_face,
        }
    }
}
