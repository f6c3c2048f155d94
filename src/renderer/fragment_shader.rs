use cgmath::{ElementWise, InnerSpace, Vector3 as Vec3};
use serde::Deserialize;

use crate::renderer::Light;

#[derive(Debug)]
pub struct FragmentData {
    pub world_pos: Vec3<f32>,
    pub normal: Vec3<f32>,
    pub color: Vec3<f32>,      // 顶点颜色插值结果
    pub base_color: Vec3<f32>, // 部件颜色
    pub camera_pos: Vec3<f32>,
}

// 定义 Shader 的通用行为
pub trait FragmentShader: Sync {
    // 输入插值后的片元数据，输出最终的颜色 (0.0 ~ 1.0 范围的 Vec3)
    fn shade(&self, data: FragmentData) -> Vec3<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaderKind {
    #[default]
    Lambert,
    Toon,
    /// 每个面用调试色
    Faces,
    Normal,
}

impl ShaderKind {
    pub fn build(self, light: Light) -> Box<dyn FragmentShader> {
        match self {
            ShaderKind::Lambert => Box::new(LambertShader { light }),
            ShaderKind::Toon => Box::new(ToonShader { light }),
            ShaderKind::Faces => Box::new(FaceColorShader { light }),
            ShaderKind::Normal => Box::new(NormalDebugShader),
        }
    }
}

fn clamp_color(mut c: Vec3<f32>) -> Vec3<f32> {
    c.x = c.x.clamp(0.0, 1.0);
    c.y = c.y.clamp(0.0, 1.0);
    c.z = c.z.clamp(0.0, 1.0);
    c
}

fn diffuse_term(light: &Light, normal: Vec3<f32>) -> f32 {
    normal.normalize().dot(-light.direction.normalize()).max(0.0)
}

pub struct LambertShader {
    pub light: Light,
}

impl FragmentShader for LambertShader {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        let ambient = self.light.ambient_color * self.light.ambient_strength;
        let diffuse = self.light.color * self.light.intensity * diffuse_term(&self.light, data.normal);
        clamp_color(data.base_color.mul_element_wise(ambient + diffuse))
    }
}

//非线性漫反射：卡通风格渲染
pub struct ToonShader {
    pub light: Light,
}

impl FragmentShader for ToonShader {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        let ambient = self.light.ambient_color * self.light.ambient_strength;
        let diff = diffuse_term(&self.light, data.normal);
        let diffuse = if diff > 0.6 {
            self.light.color * self.light.intensity * 1.1
        } else if diff > 0.2 {
            self.light.color * self.light.intensity * 0.8
        } else {
            self.light.color * self.light.intensity * 0.5
        };

        // 边缘：视线几乎与表面平行时压暗
        let view_dir = (data.camera_pos - data.world_pos).normalize();
        let rim = if data.normal.normalize().dot(view_dir) < 0.15 { 0.4 } else { 1.0 };

        clamp_color(data.base_color.mul_element_wise(ambient + diffuse) * rim)
    }
}

pub struct FaceColorShader {
    pub light: Light,
}

impl FragmentShader for FaceColorShader {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        let ambient = self.light.ambient_color * self.light.ambient_strength;
        let diffuse = self.light.color * self.light.intensity * diffuse_term(&self.light, data.normal);
        clamp_color(data.color.mul_element_wise(ambient + diffuse))
    }
}

pub struct NormalDebugShader;

impl FragmentShader for NormalDebugShader {
    fn shade(&self, data: FragmentData) -> Vec3<f32> {
        (data.normal.normalize() + Vec3::new(1.0, 1.0, 1.0)) * 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(normal: Vec3<f32>) -> FragmentData {
        FragmentData {
            world_pos: Vec3::new(0.0, 0.0, 0.0),
            normal,
            color: Vec3::new(0.0, 1.0, 0.0),
            base_color: Vec3::new(1.0, 0.5, 0.25),
            camera_pos: Vec3::new(0.0, 0.0, 5.0),
        }
    }

    fn light() -> Light {
        let mut light = Light::default();
        light.direction = Vec3::new(0.0, 0.0, -1.0);
        light.ambient_strength = 0.2;
        light
    }

    #[test]
    fn lambert_is_brighter_facing_the_light() {
        let shader = ShaderKind::Lambert.build(light());
        let lit = shader.shade(fragment(Vec3::new(0.0, 0.0, 1.0)));
        let unlit = shader.shade(fragment(Vec3::new(0.0, 0.0, -1.0)));
        assert!(lit.x > unlit.x);
        assert!((unlit.x - 0.2).abs() < 1e-6);
        assert!(lit.x <= 1.0);
    }

    #[test]
    fn face_shader_uses_vertex_color() {
        let shader = ShaderKind::Faces.build(light());
        let c = shader.shade(fragment(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(c.x, 0.0);
        assert!(c.y > 0.9);
    }

    #[test]
    fn normal_shader_maps_to_unit_range() {
        let c = ShaderKind::Normal.build(light()).shade(fragment(Vec3::new(0.0, 0.0, 1.0)));
        assert_eq!(c, Vec3::new(0.5, 0.5, 1.0));
    }
}
