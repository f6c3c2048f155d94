use cgmath::{Deg, Matrix4 as Mat4, Point3, Rad, Transform, Vector3 as Vec3};

use crate::config::CameraConfig;

#[derive(Debug)]
pub struct Frustum {
    mat: Mat4<f32>,
}

impl Frustum {
    #[rustfmt::skip]
    pub fn new(near: f32, aspect: f32, far: f32, fovy: f32) -> Self {
        let tan_half_fovy = (fovy / 2.0).tan();
        let a = 1.0 / (aspect * tan_half_fovy);
        let b = 1.0 / tan_half_fovy;
        let c = -(far + near) / (far - near);
        let d = -2.0 * far * near / (far - near);

        // projection
        let mat = Mat4::new(
            a,    0.0,   0.0,   0.0,
            0.0,  b,     0.0,   0.0,
            0.0,  0.0,   c,    -1.0,
            0.0,  0.0,   d,     0.0,
        );

        Self { mat }
    }

    pub fn get_mat(&self) -> &Mat4<f32> {
        &self.mat
    }
}

/// 绕目标点旋转的相机
pub struct Camera {
    frustum: Frustum,
    pub(crate) target: Vec3<f32>,
    pub(crate) distance: f32,
    pub(crate) height: f32,
    pub(crate) yaw: Rad<f32>,
}

impl Camera {
    pub fn new(near: f32, far: f32, aspect: f32, fovy: f32) -> Self {
        Self {
            frustum: Frustum::new(near, aspect, far, fovy),
            target: Vec3::new(0.0, 0.0, 0.0),
            distance: 5.0,
            height: 0.0,
            yaw: Rad(0.0),
        }
    }

    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self::new(
            config.near,
            config.far,
            aspect,
            config.fovy.to_radians(),
        );
        camera.target = config.target.into();
        camera.distance = config.distance;
        camera.height = config.height;
        camera.set_rotation(Deg(config.yaw).into());
        camera
    }

    pub fn get_frustum(&self) -> &Frustum {
        &self.frustum
    }

    pub fn set_rotation(&mut self, angle: Rad<f32>) {
        self.yaw = angle;
    }

    pub fn orbit(&mut self, delta: Rad<f32>) {
        self.yaw += delta;
    }

    pub fn eye(&self) -> Vec3<f32> {
        let rotation = Mat4::from_angle_y(self.yaw);
        let offset = rotation.transform_point(Point3::new(0.0, self.height, self.distance));
        self.target + Vec3::new(offset.x, offset.y, offset.z)
    }

    pub fn get_view_mat(&self) -> Mat4<f32> {
        let eye = self.eye();
        let target = self.target;
        Mat4::look_at_rh(
            Point3::new(eye.x, eye.y, eye.z),
            Point3::new(target.x, target.y, target.z),
            Vec3::new(0.0, 1.0, 0.0),
        )
    }

    pub fn get_view_proj_mat(&self) -> Mat4<f32> {
        self.frustum.get_mat() * self.get_view_mat()
    }
}
