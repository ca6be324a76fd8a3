//! Off-axis (asymmetric frustum) projection.
//!
//! Given the three corners of the virtual screen and an eye position, this
//! builds a projection whose near-plane bounds are the screen rectangle seen
//! from the eye, and a camera transform whose axes are locked to the screen.
//! The camera never looks "at" anything: its forward axis is always the
//! screen normal, so the screen rectangle stays fixed in the image while the
//! eye moves.

use super::camera::Camera;
use super::constants::MIN_EYE_DISTANCE;
use super::error::{GeometryError, ProjectionError};
use super::screen::ScreenPlane;
use glam::{Mat4, Vec3, Vec4};

// Cross products shorter than this are treated as collinear corners.
const DEGENERATE_EPS: f32 = 1e-8;

/// Orthonormal frame of the screen: right, up, and the normal facing the eye.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenBasis {
    pub vr: Vec3,
    pub vu: Vec3,
    pub vn: Vec3,
}

impl ScreenBasis {
    /// Derive the basis from the corners and flip the normal towards `eye`.
    ///
    /// `vu` is made perpendicular to `vr` before the normal is taken, which
    /// leaves rectangular screens untouched and keeps skewed ones orthonormal.
    pub fn compute(pa: Vec3, pb: Vec3, pc: Vec3, eye: Vec3) -> Result<Self, GeometryError> {
        let vr = (pb - pa)
            .try_normalize()
            .ok_or(GeometryError::DegenerateScreen)?;
        let up_edge = pc - pa;
        if vr.cross(up_edge).length_squared() <= DEGENERATE_EPS * up_edge.length_squared() {
            return Err(GeometryError::DegenerateScreen);
        }
        let vu = (up_edge - vr * vr.dot(up_edge))
            .try_normalize()
            .ok_or(GeometryError::DegenerateScreen)?;
        let mut vn = vr
            .cross(vu)
            .try_normalize()
            .ok_or(GeometryError::DegenerateScreen)?;
        if -(pa - eye).dot(vn) < 0.0 {
            vn = -vn;
        }
        Ok(Self { vr, vu, vn })
    }

    pub fn of_plane(plane: &ScreenPlane, eye: Vec3) -> Result<Self, GeometryError> {
        Self::compute(plane.pa, plane.pb, plane.pc, eye)
    }
}

/// Near-plane bounds of an off-center perspective frustum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    /// GL-style off-center perspective matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        let Frustum {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;
        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * n / (t - b), 0.0, 0.0),
            Vec4::new((r + l) / (r - l), (t + b) / (t - b), -(f + n) / (f - n), -1.0),
            Vec4::new(0.0, 0.0, -2.0 * f * n / (f - n), 0.0),
        )
    }

    /// Closed-form inverse of [`Frustum::projection_matrix`].
    pub fn projection_inverse(&self) -> Mat4 {
        let Frustum {
            left: l,
            right: r,
            bottom: b,
            top: t,
            near: n,
            far: f,
        } = *self;
        Mat4::from_cols(
            Vec4::new((r - l) / (2.0 * n), 0.0, 0.0, 0.0),
            Vec4::new(0.0, (t - b) / (2.0 * n), 0.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, -(f - n) / (2.0 * f * n)),
            Vec4::new((r + l) / (2.0 * n), (t + b) / (2.0 * n), -1.0, (f + n) / (2.0 * f * n)),
        )
    }
}

/// Everything the engine derives for one eye position.
#[derive(Clone, Copy, Debug)]
pub struct OffAxisProjection {
    pub basis: ScreenBasis,
    /// Eye-to-plane distance after clamping.
    pub distance: f32,
    pub frustum: Frustum,
    pub projection: Mat4,
    pub projection_inverse: Mat4,
    pub world: Mat4,
    pub world_inverse: Mat4,
}

impl OffAxisProjection {
    pub fn compute(
        eye: Vec3,
        plane: &ScreenPlane,
        near: f32,
        far: f32,
    ) -> Result<Self, GeometryError> {
        let basis = ScreenBasis::of_plane(plane, eye)?;
        let ScreenBasis { vr, vu, vn } = basis;

        let va = plane.pa - eye;
        let vb = plane.pb - eye;
        let vc = plane.pc - eye;

        // An eye on or behind the plane gets a best-effort frustum.
        let distance = (-va.dot(vn)).max(MIN_EYE_DISTANCE);
        let scale = near / distance;

        let frustum = Frustum {
            left: vr.dot(va) * scale,
            right: vr.dot(vb) * scale,
            bottom: vu.dot(va) * scale,
            top: vu.dot(vc) * scale,
            near,
            far,
        };

        let world = Mat4::from_cols(
            vr.extend(0.0),
            vu.extend(0.0),
            vn.extend(0.0),
            eye.extend(1.0),
        );

        Ok(Self {
            basis,
            distance,
            frustum,
            projection: frustum.projection_matrix(),
            projection_inverse: frustum.projection_inverse(),
            world,
            world_inverse: world.inverse(),
        })
    }
}

/// Recompute the off-axis projection and write it into `camera`.
///
/// The camera must already be externally driven; otherwise nothing is
/// written and [`ProjectionError::CameraNotExternallyDriven`] is returned.
pub fn update_off_axis_camera(
    camera: &mut Camera,
    eye: Vec3,
    plane: &ScreenPlane,
    near: f32,
    far: f32,
) -> Result<OffAxisProjection, ProjectionError> {
    if !camera.is_externally_driven() {
        return Err(ProjectionError::CameraNotExternallyDriven);
    }
    let p = OffAxisProjection::compute(eye, plane, near, far)?;
    camera.write_matrices(p.projection, p.projection_inverse, p.world, p.world_inverse)?;
    Ok(p)
}
