//! Ledge probing: decides between climbing, getting up, vaulting or nothing.

use glam::Vec3;

use crate::collision::{Capsule, PhysicsWorld};
use crate::config::VaultConfig;
use crate::geometry::{flatten, yaw_from_direction};

/// Where the actor is moved and for how long it stays out of physics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VaultMove {
    pub target: Vec3,
    /// Yaw facing the wall
    pub yaw: f32,
    pub duration: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VaultOutcome {
    /// Tall wall with room above the head
    Climb(VaultMove),
    /// Low, thick wall
    GetUp(VaultMove),
    /// Low, thin wall
    Vault(VaultMove),
    /// Wall found but no way over it
    Blocked,
    NoWall,
}

impl VaultOutcome {
    pub fn movement(&self) -> Option<VaultMove> {
        match *self {
            VaultOutcome::Climb(m) | VaultOutcome::GetUp(m) | VaultOutcome::Vault(m) => Some(m),
            VaultOutcome::Blocked | VaultOutcome::NoWall => None,
        }
    }
}

/// Probe the geometry in front of the actor. Pure query, no side effects.
pub fn classify(
    world: &PhysicsWorld,
    position: Vec3,
    forward: Vec3,
    capsule: Capsule,
    config: &VaultConfig,
) -> VaultOutcome {
    let forward = flatten(forward).normalize_or_zero();
    if forward == Vec3::ZERO {
        return VaultOutcome::NoWall;
    }

    // 1: wall face ahead, from below the actor origin
    let start = position - Vec3::Y * config.probe_drop;
    let Some(wall) = world.line_trace(start, start + forward * config.reach) else {
        return VaultOutcome::NoWall;
    };
    let into_wall = -flatten(wall.normal).normalize_or_zero();
    if into_wall == Vec3::ZERO {
        return VaultOutcome::NoWall;
    }
    let probe_top = position.y + config.head_clearance;

    // 2: top of the wall just behind the face
    let lip = wall.point + into_wall * 10.0;
    let Some(top) = world.line_trace(
        Vec3::new(lip.x, probe_top, lip.z),
        Vec3::new(lip.x, wall.point.y, lip.z),
    ) else {
        return VaultOutcome::Blocked;
    };
    let about_to_climb = top.point.y - wall.point.y > config.climb_height;

    // 3: same probe deeper in decides thickness
    let deep = wall.point + into_wall * config.thickness_probe;
    let thick = world
        .line_trace(
            Vec3::new(deep.x, probe_top, deep.z),
            Vec3::new(deep.x, wall.point.y - config.thickness_probe, deep.z),
        )
        .is_some_and(|far| top.point.y - far.point.y <= config.thick_tolerance);

    let yaw = yaw_from_direction(into_wall);
    let standing = capsule.half_height + 1.0;

    if about_to_climb {
        // 4: something at head height blocks the climb
        let head = position + Vec3::Y * config.head_clearance;
        if world.line_trace(head, head + forward * config.reach).is_some() {
            return VaultOutcome::Blocked;
        }
        let over = wall.point + into_wall * config.thickness_probe;
        return VaultOutcome::Climb(VaultMove {
            target: Vec3::new(over.x, top.point.y + standing, over.z),
            yaw,
            duration: config.climb_duration,
        });
    }

    if thick {
        let over = wall.point + into_wall * config.thickness_probe;
        VaultOutcome::GetUp(VaultMove {
            target: Vec3::new(over.x, top.point.y + standing, over.z),
            yaw,
            duration: config.get_up_duration,
        })
    } else {
        let beyond = wall.point + into_wall * (config.thickness_probe + capsule.radius);
        VaultOutcome::Vault(VaultMove {
            target: Vec3::new(beyond.x, top.point.y + standing, beyond.z),
            yaw,
            duration: config.vault_duration,
        })
    }
}
