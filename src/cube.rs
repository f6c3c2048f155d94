use crate::vertex::{ColoredVertex, Triangle};
use cgmath::{InnerSpace, Vector3 as Vec3};

pub const CUBE_INDEX_COUNT: usize = 36;

#[rustfmt::skip]
const CORNERS: [[f32; 3]; 8] = [
    // 前面
    [-0.5, -0.5,  0.5],
    [ 0.5, -0.5,  0.5],
    [ 0.5,  0.5,  0.5],
    [-0.5,  0.5,  0.5],
    // 后面
    [-0.5, -0.5, -0.5],
    [ 0.5, -0.5, -0.5],
    [ 0.5,  0.5, -0.5],
    [-0.5,  0.5, -0.5],
];

#[rustfmt::skip]
const INDICES: [u32; CUBE_INDEX_COUNT] = [
    0, 1, 2, 2, 3, 0, // 前
    4, 5, 6, 6, 7, 4, // 后
    0, 3, 7, 7, 4, 0, // 左
    1, 5, 6, 6, 2, 1, // 右
    3, 2, 6, 6, 7, 3, // 上
    0, 4, 5, 5, 1, 0, // 下
];

// 每个面一个调试色，顺序同 INDICES
const FACE_COLORS: [[f32; 3]; 6] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [1.0, 0.0, 1.0],
    [0.0, 1.0, 1.0],
    [0.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
];

/// 以原点为中心、边长为 1 的立方体，所有身体部件共用这一份网格。
#[derive(Debug, Clone)]
pub struct CubeMesh {
    pub positions: [Vec3<f32>; 8],
    pub indices: [u32; CUBE_INDEX_COUNT],
    triangles: Vec<Triangle>,
}

impl Default for CubeMesh {
    fn default() -> Self {
        Self::unit()
    }
}

impl CubeMesh {
    pub fn unit() -> Self {
        let positions = CORNERS.map(|[x, y, z]| Vec3::new(x, y, z));
        let triangles = build_triangles(&positions, &INDICES);
        Self {
            positions,
            indices: INDICES,
            triangles,
        }
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }
}

fn build_triangles(positions: &[Vec3<f32>; 8], indices: &[u32]) -> Vec<Triangle> {
    indices
        .chunks_exact(3)
        .enumerate()
        .map(|(i, tri)| {
            let color: Vec3<f32> = FACE_COLORS[i / 2].into();
            let mut p = [
                positions[tri[0] as usize],
                positions[tri[1] as usize],
                positions[tri[2] as usize],
            ];
            // 索引表里的绕序不统一，统一成从外侧看逆时针
            let center = (p[0] + p[1] + p[2]) / 3.0;
            if (p[1] - p[0]).cross(p[2] - p[0]).dot(center) < 0.0 {
                p.swap(1, 2);
            }
            let normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
            let vertex = |pos| ColoredVertex { pos, color, normal };
            Triangle::new(vertex(p[0]), vertex(p[1]), vertex(p[2]))
        })
        .collect()
}
