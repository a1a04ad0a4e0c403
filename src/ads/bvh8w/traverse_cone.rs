//! Elliptic-cone traversal.

use super::{child_node_ptr, is_ptr_empty, is_ptr_leaf, leaf_node_ptr, Bvh8w, IntersectOpts};
use crate::interaction::IntersectionSurface;
use crate::math::intersect::{intersect_cone_tri, test_cone_tri};
use crate::math::shapes::EllipticCone;
use crate::math::simd::{Mask8, Vec3x8, WideVec3Mask, F8};
use crate::math::{Float, Range, Vec3};
use crate::stats;

const STACK_SIZE: usize = 128;

#[derive(Copy, Clone)]
struct StackEntry {
    min_range: Float,
    ptr: i32,
}

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

/// Result of a cone sweep: the closest intersection distance, the set of
/// triangles intersecting the search window, and the reconstructed surface
/// at the closest hit.
pub struct ConeIntersectionRecord {
    /// Distance along the cone axis to the closest intersection.
    pub dist: Float,
    /// TRUE when the closest triangle faces the cone.
    pub front_face: bool,
    /// Original ids of every triangle intersecting the search window.
    pub triangles: Vec<u32>,
    /// Surface of the closest hit.
    pub surface: Option<IntersectionSurface>,
}

impl ConeIntersectionRecord {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

struct ConeWork {
    range0: Range,
    z_search_range_scale: Float,

    intr_dist: Float,
    front_face: bool,
    closest: Option<(u32, Vec3)>,
    triangles: Vec<u32>,
}

impl ConeWork {
    fn new(range: Range, z_scale: Float) -> Self {
        Self {
            range0: range,
            z_search_range_scale: z_scale,
            intr_dist: Float::INFINITY,
            front_face: true,
            closest: None,
            triangles: Vec::new(),
        }
    }

    // the current gather window; shrinks as hits tighten the far bound
    fn search_range(&self) -> Range {
        if self.intr_dist.is_finite() {
            Range::new(
                self.range0.min,
                (self.intr_dist / self.z_search_range_scale).min(self.range0.max),
            )
        } else {
            self.range0
        }
    }
}

struct ConeClusterData {
    ro: Vec3x8,
    rd: Vec3x8,
    rinvd: Vec3x8,
    signs: WideVec3Mask<8>,
    ta: F8,
    ix: F8,
}

impl ConeClusterData {
    fn new(cone: &EllipticCone) -> Self {
        let rinvd = Vec3x8::splat(&cone.ray().invd);
        Self {
            ro: Vec3x8::splat(&cone.o()),
            rd: Vec3x8::splat(&cone.d()),
            signs: WideVec3Mask::from_signs(&rinvd),
            rinvd,
            ta: F8::splat(cone.tan_alpha()),
            ix: F8::splat(cone.x0()),
        }
    }
}

struct ClusterHit {
    tmins: F8,
    mask: Mask8,
}

// ray-octet test against AABBs grown per slab by the cone's aperture at
// the far slab
fn cone_cluster_intersect(
    range: &Range,
    data: &ConeClusterData,
    mins: &Vec3x8,
    maxs: &Vec3x8,
) -> ClusterHit {
    let aabb_o_min = *mins - data.ro;
    let aabb_o_max = *maxs - data.ro;

    // farthest corner along the axis
    let b = aabb_o_max.blendv(&aabb_o_min, &data.signs);
    let dot_d_b = data.rd.dot(&b);
    let maxz = dot_d_b.clamp(&F8::zero(), &F8::splat(range.max));

    // cone cross section at maxz
    let enlr = maxz.mul_add(&data.ta, &data.ix);

    // slab test against the enlarged AABBs
    let gmin = aabb_o_min - Vec3x8::splat_wide(&enlr);
    let gmax = aabb_o_max + Vec3x8::splat_wide(&enlr);

    let near = gmin.blendv(&gmax, &data.signs);
    let far = gmax.blendv(&gmin, &data.signs);
    let dmin = near * data.rinvd;
    let dmax = far * data.rinvd;

    let mut tmin = F8::zero();
    let mut tmax = dmax.x;
    tmin = tmin.max(&dmin.x);
    tmax = tmax.min(&dmax.y);
    tmin = tmin.max(&dmin.y);
    tmax = tmax.min(&dmax.z);
    tmin = tmin.max(&dmin.z);

    let cond1 = tmin.le(&tmax);
    let cond2 = tmax.ge(&F8::splat(range.min));
    let cond3 = tmin.le(&F8::splat(range.max));

    ClusterHit {
        tmins: tmin,
        mask: cond1 & cond2 & cond3,
    }
}

// scalar cone-triangle tests over a slot run; by far the slowest part of
// cone traversal
fn gather_tris<const SHADOW: bool>(
    ads: &Bvh8w,
    cone: &EllipticCone,
    range: &Range,
    t0: u32,
    count: u32,
    record: &mut ConeWork,
) -> bool {
    let mut found = false;

    for t in 0..count {
        let slot = t0 + t;
        let id = ads.slot_ids[slot as usize];
        let tri = ads.triangle(id);

        if SHADOW {
            if test_cone_tri(cone, &tri.a, &tri.b, &tri.c, range) {
                record.intr_dist = range.min;
                return true;
            }
            continue;
        }

        debug_assert!(range.min >= 0.0);

        if let Some(intr) = intersect_cone_tri(cone, &tri.a, &tri.b, &tri.c, &tri.n, range) {
            // can exceed the window due to numerics
            if intr.dist > range.max {
                continue;
            }

            if intr.dist < record.intr_dist {
                record.intr_dist = intr.dist;
                record.front_face = tri.n.dot(&-cone.ray().d) > 0.0;
                record.closest = Some((id, intr.p));
            }
            found = true;

            if !record.triangles.contains(&id) {
                record.triangles.push(id);
            }
        }
    }

    !SHADOW && found
}

fn traverse<const SHADOW: bool>(
    ads: &Bvh8w,
    cone: &EllipticCone,
    record: &mut ConeWork,
    internal_nodes: &mut u32,
    leaf_nodes: &mut u32,
) -> bool {
    if is_ptr_empty(ads.root) {
        return false;
    }

    let cluster_data = ConeClusterData::new(cone);
    let mut range = record.search_range();

    let mut stack = [StackEntry {
        min_range: 0.0,
        ptr: ads.root,
    }; STACK_SIZE];
    let mut s = 1usize;

    while s > 0 {
        let top = stack[s - 1];

        if is_ptr_leaf(top.ptr) {
            *leaf_nodes += 1;

            let leaf = *ads.leaf_node(leaf_node_ptr(top.ptr));
            s -= 1;

            let intr =
                gather_tris::<SHADOW>(ads, cone, &range, leaf.tris_ptr, leaf.count, record);
            if intr {
                if SHADOW {
                    return true;
                }
                // shrink the window and unwind nodes past it
                range = record.search_range();
                while s > 0 && stack[s - 1].min_range >= range.max {
                    s -= 1;
                }
            }
            continue;
        }

        *internal_nodes += 1;

        let n = ads.node(child_node_ptr(top.ptr));
        let aabbs = Bvh8w::node_aabbs(n);
        s -= 1;

        let r = cone_cluster_intersect(&range, &cluster_data, &aabbs.min, &aabbs.max);
        stats::on_ray_aabb_8w_test();

        let begin = s;
        for i in 0..8 {
            let ptr = n.child_ptrs[i];
            if !r.mask.bit(i) || is_ptr_empty(ptr) {
                continue;
            }
            let t = r.tmins.read(i);
            if t >= range.max {
                continue;
            }
            debug_assert!(s < STACK_SIZE, "bvh8w cone traversal stack overflow");
            stack[s] = StackEntry {
                min_range: t,
                ptr,
            };
            s += 1;
        }
        stack_sorter(&mut stack[begin..s]);
    }

    !record.triangles.is_empty()
}

impl Bvh8w {
    /// Sweeps an elliptic cone through the scene, gathering every triangle
    /// intersecting the search window around the closest hit.
    pub fn intersect_cone(
        &self,
        cone: &EllipticCone,
        traversal_range: &Range,
        opts: &IntersectOpts,
    ) -> ConeIntersectionRecord {
        debug_assert!(traversal_range.max > 0.0);

        let start = stats::filter_timer_start();
        let mut work = ConeWork::new(*traversal_range, opts.z_search_range_scale);

        let mut internal = 0u32;
        let mut leaf = 0u32;
        traverse::<false>(self, cone, &mut work, &mut internal, &mut leaf);

        let surface = work.closest.map(|(id, p)| {
            let tri = self.triangle(id);
            let bary = tri.barycentric_of_point(&p);
            IntersectionSurface {
                p,
                ng: tri.n,
                ns: tri.shading_normal(&bary),
                wo: -cone.d(),
                uv: tri.uv(&bary),
                tangent_frame: crate::interaction::SurfaceDifferentials {
                    dpdu: tri.b - tri.a,
                    dpdv: tri.c - tri.a,
                },
                dist: work.intr_dist,
                triangle: id,
                front_face: work.front_face,
            }
        });

        stats::on_cone_cast(!work.triangles.is_empty(), start, internal, leaf);

        ConeIntersectionRecord {
            dist: work.intr_dist,
            front_face: work.front_face,
            triangles: work.triangles,
            surface,
        }
    }

    /// TRUE when the cone sweep is unobstructed over the range.
    pub fn cone_unobstructed(&self, cone: &EllipticCone, traversal_range: &Range) -> bool {
        if traversal_range.is_empty() {
            return true;
        }

        let start = stats::filter_timer_start();
        let mut work = ConeWork::new(*traversal_range, 1.0);

        let mut internal = 0u32;
        let mut leaf = 0u32;
        traverse::<true>(self, cone, &mut work, &mut internal, &mut leaf);

        let found = work.intr_dist.is_finite();
        stats::on_shadow_cone_cast(found, start, internal, leaf);

        debug_assert!(!found || traversal_range.contains(work.intr_dist));
        !found
    }

    /// Shadow form of the cone sweep: TRUE when any triangle intersects.
    pub fn shadow_cone(&self, cone: &EllipticCone, traversal_range: &Range) -> bool {
        !self.cone_unobstructed(cone, traversal_range)
    }
}
