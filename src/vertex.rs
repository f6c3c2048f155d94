use cgmath::{InnerSpace, Vector2 as Vec2, Vector3 as Vec3, Vector4 as Vec4, Zero};

/// 带颜色信息的顶点（模型空间）
#[derive(Debug, Clone, Copy)]
pub struct ColoredVertex {
    pub pos: Vec3<f32>,
    pub color: Vec3<f32>,
    pub normal: Vec3<f32>,
}

/// 顶点着色之后、透视除法之前的顶点
#[derive(Debug, Clone, Copy)]
pub struct ClipSpaceVertex {
    pub position: Vec4<f32>,
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub color: Vec3<f32>,
}

/// 光栅化阶段的 2D 点（带颜色和深度）
#[derive(Debug, Clone, Copy)]
pub struct RasterPoint {
    pub pos: Vec2<f32>,
    pub z: f32,
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub color: Vec3<f32>,
}

#[derive(Debug, Clone, Copy)]
pub struct RasterTriangle {
    pub vertices: [RasterPoint; 3],
}

#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [ColoredVertex; 3],
    pub normal: Vec3<f32>,
}

impl Triangle {
    fn compute_normal(v0: &ColoredVertex, v1: &ColoredVertex, v2: &ColoredVertex) -> Vec3<f32> {
        let edge1 = v1.pos - v0.pos;
        let edge2 = v2.pos - v0.pos;
        edge1.cross(edge2).normalize()
    }

    pub fn new(v0: ColoredVertex, v1: ColoredVertex, v2: ColoredVertex) -> Self {
        let normal = Self::compute_normal(&v0, &v1, &v2);
        Self {
            vertices: [v0, v1, v2],
            normal,
        }
    }

    pub fn get_center(&self) -> Vec3<f32> {
        (self.vertices[0].pos + self.vertices[1].pos + self.vertices[2].pos) / 3.0
    }
}

impl Default for ColoredVertex {
    fn default() -> Self {
        ColoredVertex {
            pos: Vec3::zero(),
            color: Vec3::new(1.0, 1.0, 1.0),
            normal: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}
