use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::contact::ContactList;
use crate::error::Result;
use crate::shape::{BoxShape, Circle};
use crate::types::*;

/// Exact pairwise routines: circle-circle, box-circle and box-box SAT.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn test_circle_circle(a: &Circle, b: &Circle) -> bool {
        let rsum = a.radius() + b.radius();
        (a.center() - b.center()).length_squared() <= rsum * rsum
    }

    fn find_circle_circle(a: &Circle, b: &Circle, contacts: &mut ContactList) -> Result<()> {
        let (ra, rb) = (a.radius(), b.radius());
        let delta = a.center() - b.center();
        let dist2 = delta.length_squared();
        let rsum = ra + rb;
        if dist2 > rsum * rsum {
            return Ok(());
        }
        if dist2 == 0.0 {
            // Coincident centers: any direction separates them equally well.
            return contacts.add_contact(a.center(), Vec2::X, rsum);
        }
        let dist = dist2.sqrt();
        let normal = delta / dist; // from B into A
        let position = a.center() + normal * (0.5 * (rb - ra - dist));
        contacts.add_contact(position, normal, rsum - dist)
    }

    fn test_box_circle(a: &BoxShape, b: &Circle) -> bool {
        let local = a.to_local(b.center());
        let clamped = local.clamp(-a.extent(), a.extent());
        if clamped == local {
            return true;
        }
        (local - clamped).length_squared() <= b.radius() * b.radius()
    }

    fn find_box_circle(a: &BoxShape, b: &Circle, contacts: &mut ContactList) -> Result<()> {
        let e = a.extent();
        let r = b.radius();
        let local = a.to_local(b.center());
        let clamped = local.clamp(-e, e);

        if clamped != local {
            let diff = local - clamped;
            let dist = diff.length();
            let depth = r - dist;
            if depth >= 0.0 {
                let outward = a.axis().rotate(diff / dist);
                contacts.add_contact(a.to_world(clamped), -outward, depth)?;
            }
            return Ok(());
        }

        // Center inside: push out through the face with least penetration.
        let px = e.x - local.x.abs();
        let py = e.y - local.y.abs();
        let (face_dir, face_point, pen) = if px <= py {
            let s = if local.x >= 0.0 { 1.0 } else { -1.0 };
            (Vec2::new(s, 0.0), Vec2::new(s * e.x, local.y), px)
        } else {
            let s = if local.y >= 0.0 { 1.0 } else { -1.0 };
            (Vec2::new(0.0, s), Vec2::new(local.x, s * e.y), py)
        };
        let normal = -a.axis().rotate(face_dir);
        contacts.add_contact(b.center(), normal, pen)?;
        contacts.add_contact(a.to_world(face_point), normal, pen + r)
    }

    fn test_box_box(a: &BoxShape, b: &BoxShape) -> Option<SatResult> {
        let d = b.center() - a.center();
        let a_axes = [a.axis(), a.side_axis()];
        let b_axes = [b.axis(), b.side_axis()];
        let candidates = [(true, 0, a_axes[0]), (true, 1, a_axes[1]), (false, 0, b_axes[0]), (false, 1, b_axes[1])];

        let mut best: Option<SatResult> = None;
        for (on_a, local_axis, u) in candidates {
            let ra = projected_radius(a.extent(), a_axes, u);
            let rb = projected_radius(b.extent(), b_axes, u);
            let s = d.dot(u);
            let overlap = ra + rb - s.abs();
            if overlap < 0.0 {
                return None;
            }
            if best.is_none_or(|bst| overlap < bst.depth) {
                // Reference normal points from the owning box toward the other one.
                let positive = if on_a { s >= 0.0 } else { s <= 0.0 };
                best = Some(SatResult { axis: SatAxis::new(on_a, local_axis, positive), depth: overlap });
            }
        }
        best
    }

    fn find_box_box(
        a: &BoxShape,
        b: &BoxShape,
        sat: &SatResult,
        contacts: &mut ContactList,
    ) -> Result<()> {
        let (reference, incident) = if sat.axis.on_a() { (a, b) } else { (b, a) };
        let face = ReferenceFace::new(reference, sat.axis);
        let [v0, v1] = incident_face(incident, face.normal);

        let rc = reference.center();
        let Some(clipped) = clip_segment([v0, v1], face.tangent, face.tangent.dot(rc) + face.half_length)
            .and_then(|seg| clip_segment(seg, -face.tangent, -face.tangent.dot(rc) + face.half_length))
        else {
            return Ok(());
        };

        // Contact normals run from B toward A.
        let normal = if sat.axis.on_a() { -face.normal } else { face.normal };
        let mut emitted: Option<Vec2> = None;
        for p in clipped {
            let depth = face.offset - face.normal.dot(p - rc);
            if depth < 0.0 || emitted == Some(p) {
                continue;
            }
            // Midway between the incident point and the reference face, so the
            // position does not depend on which box supplied the reference.
            contacts.add_contact(p + face.normal * (0.5 * depth), normal, depth)?;
            emitted = Some(p);
        }
        Ok(())
    }
}

/// Half-width of a box projected onto `u`.
fn projected_radius(extent: Vec2, axes: [Vec2; 2], u: Vec2) -> f32 {
    extent.x * axes[0].dot(u).abs() + extent.y * axes[1].dot(u).abs()
}

/// Face of the reference box selected by the winning SAT axis.
struct ReferenceFace {
    /// Outward face normal, toward the incident box.
    normal: Vec2,
    /// Distance from the box center to the face along `normal`.
    offset: f32,
    tangent: Vec2,
    /// Half-length of the face along `tangent`.
    half_length: f32,
}

impl ReferenceFace {
    fn new(b: &BoxShape, axis: SatAxis) -> Self {
        let sign = if axis.positive() { 1.0 } else { -1.0 };
        let e = b.extent();
        if axis.local_axis() == 0 {
            Self { normal: b.axis() * sign, offset: e.x, tangent: b.side_axis(), half_length: e.y }
        } else {
            Self { normal: b.side_axis() * sign, offset: e.y, tangent: b.axis(), half_length: e.x }
        }
    }
}

/// Endpoints of the incident box's face most anti-parallel to `n`.
fn incident_face(b: &BoxShape, n: Vec2) -> [Vec2; 2] {
    let e = b.extent();
    let (x, y) = (b.axis(), b.side_axis());
    let (dx, dy) = (x.dot(n), y.dot(n));
    let (face_normal, offset, tangent, half) = if dx.abs() >= dy.abs() {
        (if dx > 0.0 { -x } else { x }, e.x, y, e.y)
    } else {
        (if dy > 0.0 { -y } else { y }, e.y, x, e.x)
    };
    let mid = b.center() + face_normal * offset;
    [mid - tangent * half, mid + tangent * half]
}

/// Keep the part of segment `v` with `n·p <= offset`.
///
/// Returns `None` when the whole segment is clipped away. A segment that only
/// touches the plane collapses to that single point, repeated.
fn clip_segment(v: [Vec2; 2], n: Vec2, offset: f32) -> Option<[Vec2; 2]> {
    let d0 = n.dot(v[0]) - offset;
    let d1 = n.dot(v[1]) - offset;
    let mut out = [Vec2::ZERO; 2];
    let mut count = 0;
    if d0 <= 0.0 {
        out[count] = v[0];
        count += 1;
    }
    if d1 <= 0.0 {
        out[count] = v[1];
        count += 1;
    }
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out[count] = v[0] + (v[1] - v[0]) * t;
        count += 1;
    }
    match count {
        0 => None,
        1 => Some([out[0], out[0]]),
        _ => Some(out),
    }
}
