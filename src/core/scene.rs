//! Decorative room geometry drawn behind the virtual window.
//!
//! A wireframe box extruded from the screen rectangle away from the viewer,
//! a floor grid, a few depth rings and some floating markers. It exists so
//! the parallax is visible; none of it feeds back into the projection.

use super::constants::{MARKER_COUNT, MARKER_SIZE, ROOM_DEPTH_RINGS, ROOM_GRID_LINES};
use super::screen::ScreenPlane;
use glam::Vec3;
use rand::prelude::*;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

const FRAME_COLOR: [f32; 4] = [0.85, 0.9, 1.0, 1.0];
const WALL_COLOR: [f32; 4] = [0.35, 0.5, 0.8, 1.0];
const GRID_COLOR: [f32; 4] = [0.2, 0.3, 0.5, 1.0];
const RING_COLOR: [f32; 4] = [0.25, 0.35, 0.6, 0.8];

fn push_line(out: &mut Vec<LineVertex>, a: Vec3, b: Vec3, color: [f32; 4]) {
    out.push(LineVertex {
        pos: a.to_array(),
        color,
    });
    out.push(LineVertex {
        pos: b.to_array(),
        color,
    });
}

fn push_rect(out: &mut Vec<LineVertex>, corners: [Vec3; 4], color: [f32; 4]) {
    for i in 0..4 {
        push_line(out, corners[i], corners[(i + 1) % 4], color);
    }
}

/// Line-list vertices for the room behind `plane`. Empty if the plane is
/// degenerate.
pub fn build_room(plane: &ScreenPlane, depth: f32, seed: u64) -> Vec<LineVertex> {
    let right = plane.pb - plane.pa;
    let up = plane.pc - plane.pa;
    let Some(normal) = right.cross(up).try_normalize() else {
        return Vec::new();
    };
    let back = -normal * depth;
    // bottom-left, bottom-right, top-right, top-left
    let front = [plane.pa, plane.pb, plane.pd(), plane.pc];
    let far = front.map(|c| c + back);

    let mut out = Vec::with_capacity(64 + ROOM_GRID_LINES * 4 + MARKER_COUNT * 6);
    push_rect(&mut out, front, FRAME_COLOR);
    push_rect(&mut out, far, WALL_COLOR);
    for i in 0..4 {
        push_line(&mut out, front[i], far[i], WALL_COLOR);
    }

    for ring in 1..ROOM_DEPTH_RINGS {
        let t = ring as f32 / ROOM_DEPTH_RINGS as f32;
        push_rect(&mut out, front.map(|c| c + back * t), RING_COLOR);
    }

    // Floor grid: lines running into the room, then lines across it.
    for i in 1..ROOM_GRID_LINES {
        let t = i as f32 / ROOM_GRID_LINES as f32;
        let a = plane.pa + right * t;
        push_line(&mut out, a, a + back, GRID_COLOR);
        let b = plane.pa + back * t;
        push_line(&mut out, b, b + right, GRID_COLOR);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let rn = right.normalize();
    let un = up.normalize();
    for _ in 0..MARKER_COUNT {
        let center = plane.pa
            + right * rng.gen_range(0.1..0.9)
            + up * rng.gen_range(0.1..0.9)
            + back * rng.gen_range(0.05..0.95);
        let color = [
            rng.gen_range(0.5..1.0),
            rng.gen_range(0.4..0.9),
            rng.gen_range(0.3..0.8),
            1.0,
        ];
        for axis in [rn, un, normal] {
            push_line(
                &mut out,
                center - axis * MARKER_SIZE,
                center + axis * MARKER_SIZE,
                color,
            );
        }
    }
    out
}
