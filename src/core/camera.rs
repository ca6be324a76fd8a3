//! Camera state shared between the orchestrator and the renderer.
//!
//! In its default mode the camera derives its matrices from a look-at pose
//! and a symmetric perspective. Once marked externally driven, that
//! derivation is suspended and only the off-axis engine writes the matrices.
//! All matrices use the GL clip convention (depth in \[-1, 1\]); the renderer
//! remaps depth for its own API.

use super::error::ProjectionError;
use glam::{Mat4, Vec3};

/// Look-at description used outside off-axis mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub pose: CameraPose,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
    projection: Mat4,
    projection_inverse: Mat4,
    world: Mat4,
    world_inverse: Mat4,
    externally_driven: bool,
}

impl Camera {
    pub fn new(pose: CameraPose, aspect: f32, fovy_radians: f32, znear: f32, zfar: f32) -> Self {
        let mut camera = Self {
            pose,
            aspect,
            fovy_radians,
            znear,
            zfar,
            projection: Mat4::IDENTITY,
            projection_inverse: Mat4::IDENTITY,
            world: Mat4::IDENTITY,
            world_inverse: Mat4::IDENTITY,
            externally_driven: false,
        };
        camera.update_matrices();
        camera
    }

    /// Rebuild projection and world matrices from the pose. Does nothing
    /// while the camera is externally driven.
    pub fn update_matrices(&mut self) {
        if self.externally_driven {
            return;
        }
        let aspect = if self.aspect > 0.0 { self.aspect } else { 1.0 };
        self.projection = Mat4::perspective_rh_gl(self.fovy_radians, aspect, self.znear, self.zfar);
        self.projection_inverse = self.projection.inverse();
        self.world_inverse = Mat4::look_at_rh(self.pose.eye, self.pose.target, self.pose.up);
        self.world = self.world_inverse.inverse();
    }

    pub fn set_externally_driven(&mut self, driven: bool) {
        self.externally_driven = driven;
        if !driven {
            self.update_matrices();
        }
    }

    pub fn is_externally_driven(&self) -> bool {
        self.externally_driven
    }

    /// Write projection and world matrices together with their inverses.
    pub fn write_matrices(
        &mut self,
        projection: Mat4,
        projection_inverse: Mat4,
        world: Mat4,
        world_inverse: Mat4,
    ) -> Result<(), ProjectionError> {
        if !self.externally_driven {
            return Err(ProjectionError::CameraNotExternallyDriven);
        }
        self.projection = projection;
        self.projection_inverse = projection_inverse;
        self.world = world;
        self.world_inverse = world_inverse;
        Ok(())
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn projection_inverse(&self) -> Mat4 {
        self.projection_inverse
    }

    /// Camera-to-world transform.
    pub fn world_matrix(&self) -> Mat4 {
        self.world
    }

    /// World-to-camera transform.
    pub fn view_matrix(&self) -> Mat4 {
        self.world_inverse
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.world_inverse
    }

    /// Camera position, taken from the world transform's translation.
    pub fn position(&self) -> Vec3 {
        self.world.w_axis.truncate()
    }
}
