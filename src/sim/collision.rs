//! Circle overlap test used by the narrow phase
//!
//! Every collidable in the game is a circle, so a contact is just the two
//! surface points facing each other plus the penetration depth.

use glam::Vec2;

/// Result of an overlapping circle pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleContact {
    /// Point on A's surface facing B
    pub a_point: Vec2,
    /// Point on B's surface facing A
    pub b_point: Vec2,
    /// Unit vector from A toward B (zero when the centers coincide)
    pub normal: Vec2,
    pub penetration: f32,
}

/// Test two circles for strict overlap (`distance < ra + rb`).
///
/// Coincident centers count as full overlap; with no direction to offset
/// along, each contact point sits on its own center.
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<CircleContact> {
    let v_ab = b_pos - a_pos;
    let distance = v_ab.length();
    let reach = a_radius + b_radius;

    if distance >= reach {
        return None;
    }

    if distance <= f32::EPSILON {
        return Some(CircleContact {
            a_point: a_pos,
            b_point: b_pos,
            normal: Vec2::ZERO,
            penetration: reach,
        });
    }

    let normal = v_ab / distance;
    Some(CircleContact {
        a_point: a_pos + normal * a_radius,
        b_point: b_pos - normal * b_radius,
        normal,
        penetration: reach - distance,
    })
}
