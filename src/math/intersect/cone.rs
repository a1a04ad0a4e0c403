//! Elliptic-cone kernels.

use super::{
    intersect_edge_ellipse, intersect_edge_plane, intersect_line_plane, intersect_ray_aabb,
    intersect_ray_tri, is_point_in_triangle, test_ray_aabb,
};
use crate::math::shapes::{Aabb, EllipticCone, Ray};
use crate::math::simd::{Vec3x4, Vec3x8, F8};
use crate::math::{diff_prod, sqr, Dir3, Float, Range, Vec2, Vec3};

/// An edge/ray/line-cone intersection: the covered z range along the cone
/// axis and one or two boundary points (in the caller's coordinates).
#[derive(Copy, Clone, Debug)]
pub struct ConeEdgeHit {
    pub range: Range,
    pub pts: u32,
    pub p0: Vec3,
    pub p1: Vec3,
}

/// A cone-plane intersection: the z range and the near/far contact points
/// on the cone boundary (the far point may be the "infinite" point when one
/// conic root lies behind the apex).
#[derive(Copy, Clone, Debug)]
pub struct ConePlaneHit {
    pub range: Range,
    pub near: Vec3,
    pub far: Vec3,
}

/// A cone-triangle intersection: minimal axial distance and the point.
#[derive(Copy, Clone, Debug)]
pub struct ConeTriHit {
    pub dist: Float,
    pub p: Vec3,
}

/// Boolean scalar ray-triangle helper for the cone fast paths.
fn test_ray_tri_scalar(ray: &Ray, a: &Vec3, b: &Vec3, c: &Vec3, range: &Range) -> bool {
    intersect_ray_tri(ray, a, b, c, range).is_some()
}

/// Edge-cone intersection.
///
/// * `in_local` - `p0`/`p1` are already in the cone's local frame.
/// * `as_ray`   - treat `p0`,`p1` as a ray from `p0` through `p1`.
/// * `as_line`  - treat them as an infinite line (implies `as_ray`).
pub fn intersect_cone_edge(
    cone: &EllipticCone,
    p0: &Vec3,
    p1: &Vec3,
    range: &Range,
    in_local: bool,
    as_ray: bool,
    as_line: bool,
) -> Option<ConeEdgeHit> {
    debug_assert!(!as_line || as_ray, "a line must also be flagged as a ray");

    let frame = cone.frame();
    let (mut lp0, mut lp1) = if in_local {
        (*p0, *p1)
    } else {
        (
            frame.to_local(&(*p0 - cone.o())),
            frame.to_local(&(*p1 - cone.o())),
        )
    };

    let p0closer = lp1.z > lp0.z;
    if !p0closer {
        std::mem::swap(&mut lp0, &mut lp1);
    }

    let p = lp0;
    let l = lp1 - lp0;
    let x0 = cone.x0();
    let ta = cone.tan_alpha();
    let e = cone.e();

    // quadratic in the line parameter against x² + (ey)² = (x0 + ta·z)²,
    // with error-free products where cancellation looms
    let cs = p.z * ta + x0;
    let epy = e * p.y;
    let ely = e * l.y;
    let lzta = l.z * ta;

    let c = sqr(p.x) + diff_prod(epy, epy, cs, cs);
    let b = 2.0
        * (crate::math::dot_eft(
            &Vec3::new(p.x, epy, -lzta),
            &Vec3::new(l.x, ely, cs),
        ));
    let a = sqr(l.x) + diff_prod(ely, ely, lzta, lzta);

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }

    let sqrt_d = disc.sqrt();
    let mut t1 = if b >= 0.0 {
        (-b - sqrt_d) / (2.0 * a)
    } else {
        (-b + sqrt_d) / (2.0 * a)
    };
    let mut t2 = (-b / a) - t1;

    // cull roots behind the apex
    let zapex = cone.z_apex();
    if p.z + t1 * l.z <= zapex {
        t1 = Float::INFINITY;
    }
    if p.z + t2 * l.z < zapex {
        t2 = Float::INFINITY;
    }

    if t2 < t1 {
        std::mem::swap(&mut t1, &mut t2);
    }
    let mut z1 = if t1 < Float::INFINITY {
        p.z + t1 * l.z
    } else {
        Float::NEG_INFINITY
    };
    let mut z2 = if t2 < Float::INFINITY {
        p.z + t2 * l.z
    } else {
        Float::INFINITY
    };
    debug_assert!(z2 >= z1);

    if z1 > range.max || z2 < range.min || (!z1.is_finite() && !z2.is_finite()) {
        return None;
    }

    // repair crossings against the near/far clip planes
    if range.min > zapex && z1 < range.min {
        if let Some(tmin) = intersect_line_plane(
            &p,
            &(p + l),
            &Vec3::new(0.0, 0.0, range.min),
            &Dir3::new(0.0, 0.0, 1.0),
        ) {
            t1 = tmin;
            z1 = range.min;
        }
    }
    if z2 > range.max {
        if let Some(tmax) = intersect_line_plane(
            &p,
            &(p + l),
            &Vec3::new(0.0, 0.0, range.max),
            &Dir3::new(0.0, 0.0, 1.0),
        ) {
            t2 = tmax;
            z2 = range.max;
        }
    }

    // clamp the parameters to the primitive (segment/ray/line) and rebuild
    // the boundary points in the caller's coordinates
    let base = if p0closer { *p0 } else { *p1 };
    let dirv = if p0closer { *p1 - *p0 } else { *p0 - *p1 };

    let valid = |t: Float| as_line || (t >= 0.0 && (as_ray || t <= 1.0));
    let v1 = if valid(t1) {
        Some(base + dirv * t1)
    } else {
        z1 = z2;
        None
    };
    let v2 = if valid(t2) {
        Some(base + dirv * t2)
    } else {
        z2 = z1;
        None
    };

    match (v1, v2) {
        (None, None) => None,
        (a, b) => {
            let pts = if a.is_some() && b.is_some() { 2 } else { 1 };
            let first = a.or(b).unwrap();
            Some(ConeEdgeHit {
                range: Range::new(z1, z2),
                pts,
                p0: first,
                p1: b.unwrap_or(first),
            })
        }
    }
}

/// Ray-cone intersection.
pub fn intersect_cone_ray(
    cone: &EllipticCone,
    ray: &Ray,
    range: &Range,
) -> Option<ConeEdgeHit> {
    intersect_cone_edge(cone, &ray.o, &(ray.o + ray.d), range, false, true, false)
}

/// Line-cone intersection.
pub fn intersect_cone_line(
    cone: &EllipticCone,
    p0: &Vec3,
    p1: &Vec3,
    range: &Range,
) -> Option<ConeEdgeHit> {
    intersect_cone_edge(cone, p0, p1, range, false, true, true)
}

/// Boolean edge-cone test.
pub fn test_cone_edge(
    cone: &EllipticCone,
    p0: &Vec3,
    p1: &Vec3,
    range: &Range,
    in_local: bool,
) -> bool {
    intersect_cone_edge(cone, p0, p1, range, in_local, false, false).is_some()
}

/// Cone-plane intersection. Returns an empty range when no intersection
/// occurs; contact points are always on the cone boundary (in the cone's
/// local frame when `in_local`, world otherwise).
pub fn intersect_cone_plane(
    cone: &EllipticCone,
    n: &Dir3,
    d: Float,
    range: &Range,
    in_local: bool,
) -> ConePlaneHit {
    let frame = cone.frame();
    let (n, d) = if in_local {
        (*n, d)
    } else {
        (frame.to_local(n), d - cone.o().dot(n))
    };

    let x0 = cone.x0();
    let ta = cone.tan_alpha();
    let e = cone.one_over_e();

    // cross-sectional position where the extremal contact occurs
    let v_denom2 = sqr(n.x) + sqr(e * n.y);
    let v = if v_denom2 > 0.0 {
        Vec2::new(n.x, e * n.y) / v_denom2.sqrt()
    } else {
        Vec2::new(0.0, 0.0)
    };
    let u = Vec2::new(v.x, v.y * e);
    let nu = n.x * u.x + n.y * u.y;

    let zapex = cone.z_apex();
    let mut z01 = (d - x0 * nu) / (n.z + ta * nu);
    let mut z02 = (d + x0 * nu) / (n.z - ta * nu);

    // classify and order
    let has_z01 = z01 >= zapex && !z01.is_nan();
    let has_z02 = z02 >= zapex && !z02.is_nan();
    if !has_z01 {
        z01 = Float::INFINITY;
    }
    if !has_z02 {
        z02 = Float::INFINITY;
    }
    let mut p1 = if has_z01 {
        Vec3::new(
            (z01 * ta + x0) * u.x,
            (z01 * ta + x0) * u.y,
            z01,
        )
    } else {
        Vec3::splat(Float::INFINITY)
    };
    let mut p2 = if has_z02 {
        Vec3::new(
            -(z02 * ta + x0) * u.x,
            -(z02 * ta + x0) * u.y,
            z02,
        )
    } else {
        Vec3::splat(Float::INFINITY)
    };
    if z01 > z02 {
        std::mem::swap(&mut z01, &mut z02);
        std::mem::swap(&mut p1, &mut p2);
    }

    let mut rng = Range::new(z01, z02);
    let empty = (!has_z01 && !has_z02) || (rng & *range).is_empty();
    if empty {
        return ConePlaneHit {
            range: Range::null(),
            near: Vec3::splat(Float::INFINITY),
            far: Vec3::splat(Float::INFINITY),
        };
    }

    // point on the plane-plane intersection at height z closest to the axis
    let closest_point_plane_plane = |z: Float, u: Vec2, n: Dir3, d: Float| -> Vec3 {
        let (x0p, y0p);
        if n.y.abs() > n.x.abs() {
            y0p = (d - n.z * z) / n.y;
            x0p = if n.x != 0.0 {
                (d - n.z * z - n.y * y0p) / n.x
            } else {
                0.0
            };
        } else {
            x0p = (d - n.z * z) / n.x;
            y0p = if n.y != 0.0 {
                (d - n.z * z - n.x * x0p) / n.y
            } else {
                0.0
            };
        }
        let s = x0p * u.x + y0p * u.y;
        Vec3::new(s * u.x, s * u.y, z)
    };

    // clamp to the queried z window and transform out, if needed
    if rng.min.is_finite() {
        if rng.min < range.min {
            p1 = closest_point_plane_plane(range.min, v, n, d);
            rng.min = range.min;
        }
        if !in_local {
            p1 = cone.o() + frame.to_world(&p1);
        }
    }
    // when one contact is behind and one in front of the apex, the plane's
    // infinite point is contained in the cone
    let has_infinite = has_z01 != has_z02;
    if rng.max.is_finite() || has_infinite {
        debug_assert!(!has_infinite || !rng.max.is_finite());
        if rng.max > range.max {
            p2 = closest_point_plane_plane(range.max, v, n, d);
            rng.max = range.max;
        }
        if !in_local {
            p2 = cone.o() + frame.to_world(&p2);
        }
    }

    ConePlaneHit {
        range: rng,
        near: p1,
        far: p2,
    }
}

/// Boolean cone-plane test.
pub fn test_cone_plane(
    cone: &EllipticCone,
    n: &Dir3,
    d: Float,
    range: &Range,
    in_local: bool,
) -> bool {
    !intersect_cone_plane(cone, n, d, range, in_local).range.is_empty()
}

// Conservative reject: per-axis overlap between the cone's envelope AABB
// (dilated by the aperture at the far slab) and the box. Returns false only
// when the AABB can never intersect.
fn fast_check_cone_aabb(cone: &EllipticCone, aabb: &Aabb, range: &Range) -> bool {
    let f = cone.frame();

    let c = aabb.centre() - cone.o();
    let e = aabb.extent() * 0.5;
    let rz = e.dot(&f.n.abs()).abs();
    let rx = e.dot(&f.t.abs()).abs();
    let ry = e.dot(&f.b.abs()).abs();

    let cz = c.dot(&f.n);
    let minz = cz - rz;
    let maxz = cz + rz;
    let axes = cone.axes(maxz);

    let x = c.dot(&f.t);
    let y = c.dot(&f.b);
    Range::new(minz, maxz).overlaps(range)
        && Range::new(x - rx, x + rx).overlaps(&Range::new(-axes.x, axes.x))
        && Range::new(y - ry, y + ry).overlaps(&Range::new(-axes.y, axes.y))
}

// the 8 AABB vertices, one per lane (bit0 -> x, bit1 -> y, bit2 -> z)
fn aabb_vertices_8w(aabb: &Aabb) -> Vec3x8 {
    Vec3x8 {
        x: F8::splat(aabb.min.x).select::<0xaa>(&F8::splat(aabb.max.x)),
        y: F8::splat(aabb.min.y).select::<0xcc>(&F8::splat(aabb.max.y)),
        z: F8::splat(aabb.min.z).select::<0xf0>(&F8::splat(aabb.max.z)),
    }
}

const BOX_EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 3),
    (2, 3),
    (0, 2),
    (4, 5),
    (5, 7),
    (6, 7),
    (4, 6),
    (0, 4),
    (1, 5),
    (3, 7),
    (2, 6),
];

/// Conservative cone-AABB intersection test.
pub fn test_cone_aabb(cone: &EllipticCone, aabb: &Aabb, range_input: &Range) -> bool {
    // growing the range by the box size avoids testing faces
    let grow = aabb.extent().dot(&cone.d()).abs();
    let range = range_input.grow(grow);

    // fast accepts
    if aabb.contains(&(cone.o() + cone.d() * range.min))
        || (range.max.is_finite() && aabb.contains(&(cone.o() + cone.d() * range.max)))
    {
        return true;
    }
    if test_ray_aabb(cone.ray(), aabb, &range) {
        return true;
    }
    if cone.is_ray() {
        return false;
    }

    // fast reject on the envelope AABB
    if !fast_check_cone_aabb(cone, aabb, range_input) {
        return false;
    }

    // vertex containment, 8-wide
    let verts = aabb_vertices_8w(aabb);
    let local_verts = cone
        .frame()
        .to_local_wide(&(verts - Vec3x8::splat(&cone.o())));
    if cone.contains_local(&local_verts, &range).any() {
        return true;
    }

    // the 12 box edges
    for (i, j) in BOX_EDGES {
        let p0 = verts.read(i);
        let p1 = verts.read(j);
        if test_cone_edge(cone, &p0, &p1, &range, false) {
            return true;
        }
    }

    false
}

/// Cone-AABB intersection: the covered z range, used by traversal to
/// prune. An empty range means no intersection.
pub fn intersect_cone_aabb(cone: &EllipticCone, aabb: &Aabb, range: &Range) -> Range {
    if cone.is_ray() {
        return intersect_ray_aabb(cone.ray(), aabb) & *range;
    }

    if !fast_check_cone_aabb(cone, aabb, range) {
        return Range::null();
    }

    let frame = cone.frame();
    let o = cone.o();

    let verts = aabb_vertices_8w(aabb);
    let local_verts = frame.to_local_wide(&(verts - Vec3x8::splat(&o)));
    let vs_z = local_verts.z;

    // vertices inside the cone
    let contains_mask = cone.contains_local(&local_verts, range);

    // parallel min/max of all-z (lower half) and contained-z (upper half)
    let pinf = F8::inf();
    let minf = -pinf;
    let z_or_pinf = pinf.blendv(&vs_z, &contains_mask);
    let z_or_minf = minf.blendv(&vs_z, &contains_mask);

    let maxz_h = F8::permute2f::<0x21>(&vs_z, &z_or_minf);
    let maxz_l = F8::permute2f::<0x30>(&vs_z, &z_or_minf);
    let minz_h = F8::permute2f::<0x21>(&vs_z, &z_or_pinf);
    let minz_l = F8::permute2f::<0x30>(&vs_z, &z_or_pinf);
    let maxz_lh = maxz_l.max(&maxz_h);
    let minz_lh = minz_l.min(&minz_h);

    // z range spanned by the vertices
    let mut possible_range = Range::new(
        minz_lh.extract_lower_half().hmin(),
        maxz_lh.extract_lower_half().hmax(),
    );
    // z range of the vertices inside the cone
    let mut ret = Range::new(
        minz_lh.extract_upper_half().hmin(),
        maxz_lh.extract_upper_half().hmax(),
    );

    possible_range &= *range;
    if possible_range.is_empty() {
        return Range::null();
    }

    if aabb.contains(&(o + cone.d() * range.min)) {
        ret |= Range::point(range.min);
    }
    if range.max < Float::INFINITY && aabb.contains(&(o + cone.d() * range.max)) {
        ret |= Range::point(range.max);
    }

    // box edges against the cone surface
    for (i, j) in BOX_EDGES {
        if contains_mask.bit(i) && contains_mask.bit(j) {
            continue;
        }
        let p0 = verts.read(i);
        let p1 = verts.read(j);
        if let Some(ice) = intersect_cone_edge(cone, &p0, &p1, &Range::all(), false, false, false)
        {
            ret |= Range::new(
                ice.range.min,
                if ice.pts == 1 {
                    ice.range.min
                } else {
                    ice.range.max
                },
            );
        }
    }

    // box faces against the cone boundary, filtered by point-in-box
    for i in 0..6 {
        let a = aabb.face_vertex(i);
        let fn_world = Aabb::face_normal(i);

        let n = frame.to_local(&fn_world);
        let d = (a - o).dot(&fn_world);

        let icp = intersect_cone_plane(cone, &n, d, range, true);
        if icp.range.is_empty() {
            continue;
        }

        let point_in_aabb = |wp: &Vec3, ln: &Vec3| -> bool {
            for axis in 0..3 {
                if ln[axis] != 0.0 {
                    continue;
                }
                if aabb.min[axis] > wp[axis] || aabb.max[axis] < wp[axis] {
                    return false;
                }
            }
            true
        };

        if icp.range.min.is_finite() {
            let wp = frame.to_world(&icp.near) + o;
            if point_in_aabb(&wp, &fn_world) {
                ret |= Range::point(icp.range.min);
            }
        }
        if icp.range.length() > 0.0 && icp.range.max.is_finite() {
            let wp = frame.to_world(&icp.far) + o;
            if point_in_aabb(&wp, &fn_world) {
                ret |= Range::point(icp.range.max);
            }
        }
    }

    ret & possible_range
}

/// Boolean cone-triangle intersection test.
pub fn test_cone_tri(
    cone: &EllipticCone,
    a: &Vec3,
    b: &Vec3,
    c: &Vec3,
    range: &Range,
) -> bool {
    if test_ray_tri_scalar(cone.ray(), a, b, c, range) {
        return true;
    }

    let o = cone.o();
    // triangle in the cone's local frame; the 4th lane is padding
    let tri4 = Vec3x4::from_points(a, b, c, &Vec3::zero());
    let o4 = Vec3x4::splat(&o);
    let verts = cone.frame().to_local_wide(&(tri4 - o4));
    let vs_z = verts.z;

    // z-range early reject
    let zmax = vs_z.read(0).max(vs_z.read(1)).max(vs_z.read(2));
    let zmin = vs_z.read(0).min(vs_z.read(1)).min(vs_z.read(2));
    if zmax < range.min || zmin > range.max {
        return false;
    }

    let contains = cone.contains_local(&verts, range);

    let v0 = verts.read(0);
    let v1 = verts.read(1);
    let v2 = verts.read(2);
    if contains.bit(0)
        || contains.bit(1)
        || contains.bit(2)
        || test_cone_edge(cone, &v0, &v1, range, true)
        || test_cone_edge(cone, &v0, &v2, range, true)
        || test_cone_edge(cone, &v1, &v2, range, true)
    {
        return true;
    }

    if range.min <= 0.0 {
        return false;
    }

    // does the triangle cross the near/far clip ellipses?
    let mut ns: [Vec2; 2] = [Vec2::new(0.0, 0.0); 2];
    let mut fs: [Vec2; 2] = [Vec2::new(0.0, 0.0); 2];
    let mut ns_n = 0usize;
    let mut fs_n = 0usize;
    let up = Dir3::new(0.0, 0.0, 1.0);
    for i in 0..3 {
        let j = (i + 1) % 3;
        let vsi = verts.read(i);
        let vsj = verts.read(j);

        if range.min > 0.0 {
            if let Some(np) =
                intersect_edge_plane(&vsi, &vsj, &Vec3::new(0.0, 0.0, range.min), &up)
            {
                if ns_n < 2 {
                    ns[ns_n] = Vec2::new(np.x, np.y);
                    ns_n += 1;
                }
            }
        }
        if range.max < Float::INFINITY {
            if let Some(fp) =
                intersect_edge_plane(&vsi, &vsj, &Vec3::new(0.0, 0.0, range.max), &up)
            {
                if fs_n < 2 {
                    fs[fs_n] = Vec2::new(fp.x, fp.y);
                    fs_n += 1;
                }
            }
        }
    }
    if ns_n == 2 {
        let axes = cone.axes(range.min);
        if intersect_edge_ellipse(&ns[0], &ns[1], axes.x, axes.y).points > 0 {
            return true;
        }
    }
    if fs_n == 2 {
        let axes = cone.axes(range.max);
        if intersect_edge_ellipse(&fs[0], &fs[1], axes.x, axes.y).points > 0 {
            return true;
        }
    }

    false
}

/// Cone-triangle intersection: the minimal distance along the cone axis
/// and the intersection point, if any.
pub fn intersect_cone_tri(
    cone: &EllipticCone,
    a: &Vec3,
    b: &Vec3,
    c: &Vec3,
    n: &Dir3,
    range: &Range,
) -> Option<ConeTriHit> {
    if cone.is_ray() {
        // degenerate case: ray-triangle intersection
        let cr = intersect_ray_tri(cone.ray(), a, b, c, range)?;
        return Some(ConeTriHit {
            dist: cr.dist,
            p: cone.ray().propagate(cr.dist),
        });
    }

    let frame = cone.frame();
    let o = cone.o();
    let tri4 = Vec3x4::from_points(a, b, c, &Vec3::zero());
    let verts = frame.to_local_wide(&(tri4 - Vec3x4::splat(&o)));
    let vs_z = verts.z;
    let vs0 = verts.read(0);
    let vs1 = verts.read(1);
    let vs2 = verts.read(2);
    let ln = frame.to_local(n);

    let contains = cone.contains_local(&verts, range);

    // fast reject: all points before the near clip or beyond the far clip
    let closest_z = vs_z.read(0).min(vs_z.read(1)).min(vs_z.read(2));
    let farthest_z = vs_z.read(0).max(vs_z.read(1)).max(vs_z.read(2));
    if farthest_z < range.min || closest_z > range.max {
        return None;
    }

    // fast accept: closest vertex inside
    for i in 0..3 {
        if contains.bit(i) && vs_z.read(i) == closest_z {
            let p = verts.read(i);
            return Some(ConeTriHit {
                dist: closest_z,
                p: frame.to_world(&p) + o,
            });
        }
    }

    // closest point on the cone-plane conic section, if inside the triangle
    let icp = intersect_cone_plane(cone, &ln, vs0.dot(&ln), range, true);
    if !icp.range.is_empty() && is_point_in_triangle(&icp.near, &vs0, &vs1, &vs2) {
        return Some(ConeTriHit {
            dist: icp.range.min,
            p: frame.to_world(&icp.near) + o,
        });
    }

    // the triangle edges
    let mut best: Option<Vec3> = None;
    for i in 0..3 {
        let j = (i + 1) % 3;
        let pa = verts.read(i);
        let pb = verts.read(j);

        if contains.bit(i) && contains.bit(j) {
            continue;
        }
        if pa.z > range.max && pb.z > range.max {
            continue;
        }
        if pa.z < range.min && pb.z < range.min {
            continue;
        }

        if let Some(cp) = intersect_cone_edge(cone, &pa, &pb, range, true, false, false) {
            if best.map_or(true, |p| p.z > cp.p0.z) {
                best = Some(cp.p0);
            }
        }
    }

    best.map(|p| ConeTriHit {
        dist: p.z,
        p: frame.to_world(&p) + o,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_cone(aperture: Float) -> EllipticCone {
        EllipticCone::circular(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0), 0.0, aperture)
    }

    #[test]
    fn zero_aperture_cone_matches_ray() {
        let cone = axis_cone(0.0);
        assert!(cone.is_ray());
        let a = Vec3::new(-1.0, -1.0, 5.0);
        let b = Vec3::new(1.0, -1.0, 5.0);
        let c = Vec3::new(0.0, 2.0, 5.0);
        let n = Vec3::new(0.0, 0.0, -1.0);
        let hit = intersect_cone_tri(&cone, &a, &b, &c, &n, &Range::new(0.0, 100.0)).unwrap();
        assert!((hit.dist - 5.0).abs() < 1e-9);
        assert!((hit.p - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-9);
    }

    #[test]
    fn cone_hits_offset_triangle_the_ray_misses() {
        // triangle offset from the axis, inside the cone's aperture
        let cone = EllipticCone::circular(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0), 0.05, 0.3);
        let a = Vec3::new(0.8, -0.2, 5.0);
        let b = Vec3::new(1.2, -0.2, 5.0);
        let c = Vec3::new(1.0, 0.2, 5.0);
        let n = Vec3::new(0.0, 0.0, -1.0);
        let range = Range::new(0.0, 100.0);

        assert!(intersect_ray_tri(cone.ray(), &a, &b, &c, &range).is_none());
        assert!(test_cone_tri(&cone, &a, &b, &c, &range));
        let hit = intersect_cone_tri(&cone, &a, &b, &c, &n, &range).unwrap();
        assert!((hit.dist - 5.0).abs() < 0.5);
    }

    #[test]
    fn cone_misses_far_off_axis_triangle() {
        let cone = EllipticCone::circular(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0), 0.05, 0.1);
        let a = Vec3::new(10.0, 0.0, 5.0);
        let b = Vec3::new(11.0, 0.0, 5.0);
        let c = Vec3::new(10.5, 1.0, 5.0);
        let n = Vec3::new(0.0, 0.0, -1.0);
        let range = Range::new(0.0, 100.0);
        assert!(!test_cone_tri(&cone, &a, &b, &c, &range));
        assert!(intersect_cone_tri(&cone, &a, &b, &c, &n, &range).is_none());
    }

    #[test]
    fn cone_plane_straight_on() {
        // cone along +z against the plane z = 4 (local frame)
        let cone = axis_cone(0.2);
        let icp = intersect_cone_plane(
            &cone,
            &Dir3::new(0.0, 0.0, 1.0),
            4.0,
            &Range::new(0.0, 100.0),
            true,
        );
        assert!(!icp.range.is_empty());
        assert!((icp.range.min - 4.0).abs() < 1e-9);
        assert!((icp.range.max - 4.0).abs() < 1e-9);
    }

    #[test]
    fn cone_aabb_prunes_and_accepts() {
        let cone = EllipticCone::circular(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0), 0.1, 0.2);
        let range = Range::new(0.0, 100.0);

        let on_axis = Aabb::new(Vec3::new(-0.5, -0.5, 4.0), Vec3::new(0.5, 0.5, 5.0));
        assert!(test_cone_aabb(&cone, &on_axis, &range));
        let r = intersect_cone_aabb(&cone, &on_axis, &range);
        assert!(!r.is_empty());
        assert!(r.min >= 3.0 && r.max <= 6.0, "{r:?}");

        let far = Aabb::new(Vec3::new(50.0, 50.0, 4.0), Vec3::new(51.0, 51.0, 5.0));
        assert!(!test_cone_aabb(&cone, &far, &range));
        assert!(intersect_cone_aabb(&cone, &far, &range).is_empty());
    }

    #[test]
    fn edge_through_cone() {
        let cone = EllipticCone::circular(Vec3::zero(), Vec3::new(0.0, 0.0, 1.0), 0.0, 0.5);
        // horizontal segment crossing the axis at z=2 (radius there = 1)
        let p0 = Vec3::new(-3.0, 0.0, 2.0);
        let p1 = Vec3::new(3.0, 0.0, 2.0);
        let hit =
            intersect_cone_edge(&cone, &p0, &p1, &Range::new(0.0, 100.0), false, false, false)
                .unwrap();
        assert_eq!(hit.pts, 2);
        assert!((hit.p0.x.abs() - 1.0).abs() < 1e-6);
        assert!((hit.p1.x.abs() - 1.0).abs() < 1e-6);
        // outside the aperture at z=2
        let miss = Vec3::new(-3.0, 2.5, 2.0);
        assert!(!test_cone_edge(
            &cone,
            &miss,
            &Vec3::new(3.0, 2.5, 2.0),
            &Range::new(0.0, 100.0),
            false
        ));
    }
}
