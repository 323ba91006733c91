//! Shape-pair routing.
//!
//! Two square tables indexed by `[kind_a][kind_b]` hold the overlap predicate
//! and the contact generator for every kind pair. Mirrored pairs reuse one
//! routine by swapping the arguments and toggling the contact list's normal
//! inversion, so normals always come out oriented for the requested order.

use crate::api::NarrowphaseApi;
use crate::contact::ContactList;
use crate::error::Result;
use crate::narrowphase::Narrowphase;
use crate::shape::{BoxShape, Composite, Shape};
use crate::terrain::Terrain;
use crate::types::ShapeKind;

pub type TestFn = fn(&Shape, &Shape) -> bool;
pub type FindFn = fn(&Shape, &Shape, &mut ContactList) -> Result<()>;

const N: usize = ShapeKind::COUNT;

//                         Box               Circle            Terrain           Composite
static TESTS: [[TestFn; N]; N] = [
    /* Box       */ [test_box_box, test_box_circle, test_x_terrain, test_x_composite],
    /* Circle    */ [test_circle_box, test_circle_circle, test_x_terrain, test_x_composite],
    /* Terrain   */ [test_terrain_x, test_terrain_x, test_never, test_terrain_x],
    /* Composite */ [test_composite_x, test_composite_x, test_composite_x, test_composite_x],
];

static FINDS: [[FindFn; N]; N] = [
    /* Box       */ [find_box_box, find_box_circle, find_x_terrain, find_x_composite],
    /* Circle    */ [find_circle_box, find_circle_circle, find_x_terrain, find_x_composite],
    /* Terrain   */ [find_terrain_x, find_terrain_x, find_nothing, find_terrain_x],
    /* Composite */ [find_composite_x, find_composite_x, find_composite_x, find_composite_x],
];

/// Overlap predicate with the AABB fast reject in front.
pub fn test(a: &Shape, b: &Shape) -> bool {
    if !a.bounds().intersects(&b.bounds()) {
        return false;
    }
    TESTS[a.kind().index()][b.kind().index()](a, b)
}

/// Append the contacts of `a` against `b` to `contacts`.
///
/// Returns how many contacts this call added. Normals point from `b` toward `a`.
pub fn find(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<usize> {
    if !a.bounds().intersects(&b.bounds()) {
        return Ok(0);
    }
    let before = contacts.len();
    FINDS[a.kind().index()][b.kind().index()](a, b, contacts)?;
    let added = contacts.len() - before;
    tracing::trace!(a = ?a.kind(), b = ?b.kind(), added, "pair contacts");
    Ok(added)
}

/// Run `f` with normal inversion toggled, restoring it afterwards.
fn swapped(contacts: &mut ContactList, f: impl FnOnce(&mut ContactList) -> Result<()>) -> Result<()> {
    contacts.toggle_normal_inversion();
    let res = f(contacts);
    contacts.toggle_normal_inversion();
    res
}

fn test_never(_: &Shape, _: &Shape) -> bool {
    false
}

fn find_nothing(_: &Shape, _: &Shape, _: &mut ContactList) -> Result<()> {
    Ok(())
}

// --- Box / circle ----------------------------------------------------------

fn test_box_box(a: &Shape, b: &Shape) -> bool {
    let (Shape::Box(a), Shape::Box(b)) = (a, b) else { return false };
    Narrowphase::test_box_box(a, b).is_some()
}

fn find_box_box(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    let (Shape::Box(a), Shape::Box(b)) = (a, b) else { return Ok(()) };
    box_box(a, b, contacts)
}

fn box_box(a: &BoxShape, b: &BoxShape, contacts: &mut ContactList) -> Result<()> {
    match Narrowphase::test_box_box(a, b) {
        Some(sat) => Narrowphase::find_box_box(a, b, &sat, contacts),
        None => Ok(()),
    }
}

fn test_box_circle(a: &Shape, b: &Shape) -> bool {
    let (Shape::Box(a), Shape::Circle(b)) = (a, b) else { return false };
    Narrowphase::test_box_circle(a, b)
}

fn find_box_circle(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    let (Shape::Box(a), Shape::Circle(b)) = (a, b) else { return Ok(()) };
    Narrowphase::find_box_circle(a, b, contacts)
}

fn test_circle_box(a: &Shape, b: &Shape) -> bool {
    test_box_circle(b, a)
}

fn find_circle_box(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    swapped(contacts, |c| find_box_circle(b, a, c))
}

fn test_circle_circle(a: &Shape, b: &Shape) -> bool {
    let (Shape::Circle(a), Shape::Circle(b)) = (a, b) else { return false };
    Narrowphase::test_circle_circle(a, b)
}

fn find_circle_circle(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    let (Shape::Circle(a), Shape::Circle(b)) = (a, b) else { return Ok(()) };
    Narrowphase::find_circle_circle(a, b, contacts)
}

// --- Terrain ---------------------------------------------------------------
//
// A terrain is a run of line segments. Only the span under the other shape's
// AABB is visited, and each segment goes through the box routines.

fn segment_test(segment: &BoxShape, other: &Shape) -> bool {
    if !segment.bounds().intersects(&other.bounds()) {
        return false;
    }
    match other {
        Shape::Box(b) => Narrowphase::test_box_box(segment, b).is_some(),
        Shape::Circle(c) => Narrowphase::test_box_circle(segment, c),
        Shape::Terrain(_) => false,
        Shape::Composite(comp) => comp.members().iter().any(|m| m.with(|s| segment_test(segment, s))),
    }
}

fn segment_find(segment: &BoxShape, other: &Shape, contacts: &mut ContactList) -> Result<()> {
    if !segment.bounds().intersects(&other.bounds()) {
        return Ok(());
    }
    match other {
        Shape::Box(b) => box_box(segment, b, contacts),
        Shape::Circle(c) => Narrowphase::find_box_circle(segment, c, contacts),
        Shape::Terrain(_) => Ok(()),
        Shape::Composite(comp) => {
            for m in comp.members() {
                m.with(|s| segment_find(segment, s, contacts))?;
            }
            Ok(())
        }
    }
}

fn candidate_segments<'t>(terrain: &'t Terrain, other: &Shape) -> &'t [BoxShape] {
    let b = other.bounds();
    match terrain.index_range(b.left, b.right) {
        Some((lo, hi)) => &terrain.segments()[lo..=hi],
        None => &[],
    }
}

fn test_terrain_x(a: &Shape, b: &Shape) -> bool {
    let Shape::Terrain(t) = a else { return false };
    candidate_segments(t, b).iter().any(|seg| segment_test(seg, b))
}

fn find_terrain_x(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    let Shape::Terrain(t) = a else { return Ok(()) };
    for seg in candidate_segments(t, b) {
        segment_find(seg, b, contacts)?;
    }
    Ok(())
}

fn test_x_terrain(a: &Shape, b: &Shape) -> bool {
    test_terrain_x(b, a)
}

fn find_x_terrain(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    swapped(contacts, |c| find_terrain_x(b, a, c))
}

// --- Composite -------------------------------------------------------------

fn composite_of(s: &Shape) -> Option<&Composite> {
    match s {
        Shape::Composite(c) => Some(c),
        _ => None,
    }
}

fn test_composite_x(a: &Shape, b: &Shape) -> bool {
    let Some(comp) = composite_of(a) else { return false };
    comp.members().iter().any(|m| m.with(|child| test(child, b)))
}

fn find_composite_x(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    let Some(comp) = composite_of(a) else { return Ok(()) };
    for m in comp.members() {
        m.with(|child| find(child, b, contacts))?;
    }
    Ok(())
}

fn test_x_composite(a: &Shape, b: &Shape) -> bool {
    let Some(comp) = composite_of(b) else { return false };
    comp.members().iter().any(|m| m.with(|child| test(a, child)))
}

fn find_x_composite(a: &Shape, b: &Shape, contacts: &mut ContactList) -> Result<()> {
    let Some(comp) = composite_of(b) else { return Ok(()) };
    for m in comp.members() {
        m.with(|child| find(a, child, contacts))?;
    }
    Ok(())
}
