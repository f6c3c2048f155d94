pub mod clip;
pub mod fragment_shader;
pub mod vertex_shader;

use crate::camera::Camera;
use crate::config::{LightConfig, PaletteConfig};
use crate::cube::CubeMesh;
use crate::framebuffer::FrameBuffer;
use crate::matrix::Matrix4;
use crate::rasterizer;
use crate::skeleton::{BodyPart, RenderSink};
use crate::vertex::{ClipSpaceVertex, RasterPoint, RasterTriangle, Triangle};
use cgmath::{InnerSpace, Matrix, Matrix4 as Mat4, SquareMatrix, Vector2 as Vec2, Vector3 as Vec3};
use log::warn;

use self::clip::{Clipper, SimpleClipper};
use self::fragment_shader::{FragmentData, FragmentShader, ShaderKind};
use self::vertex_shader::{DefaultVertexShader, VertexShader, VertexShaderUniforms};

pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct Light {
    pub direction: Vec3<f32>,
    pub color: Vec3<f32>,
    pub intensity: f32,
    pub ambient_strength: f32,
    pub ambient_color: Vec3<f32>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.4, -0.6, -1.0).normalize(),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            ambient_strength: 0.35,
            ambient_color: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Light {
    pub fn set_light(&mut self, config: &LightConfig) {
        self.color = config.color.into();
        self.direction = Vec3::from(config.direction).normalize();
        self.ambient_strength = config.ambient;
    }
}

/// 软光栅渲染器。作为 `RenderSink`，每收到一个部件矩阵就画一次立方体。
pub struct Renderer {
    pub(crate) camera: Camera,
    pub(crate) framebuffer: FrameBuffer,
    pub(crate) viewport: Viewport,
    pub(crate) light: Light,
    palette: PaletteConfig,
    shader: Box<dyn FragmentShader>,
    draw_calls: usize,
}

impl Renderer {
    pub fn new(camera: Camera, w: usize, h: usize) -> Self {
        let light = Light::default();
        let palette = PaletteConfig::default();
        Self {
            camera,
            framebuffer: FrameBuffer::new(w, h),
            viewport: Viewport {
                x: 0,
                y: 0,
                w: w as i32,
                h: h as i32,
            },
            light,
            shader: palette.shader.build(light),
            palette,
            draw_calls: 0,
        }
    }

    pub fn set_light(&mut self, config: &LightConfig) {
        self.light.set_light(config);
        self.shader = self.palette.shader.build(self.light);
    }

    pub fn set_palette(&mut self, palette: PaletteConfig) {
        self.shader = palette.shader.build(self.light);
        self.palette = palette;
    }

    pub fn set_shader(&mut self, kind: ShaderKind) {
        self.palette.shader = kind;
        self.shader = kind.build(self.light);
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// 清屏并重置本帧计数
    pub fn begin_frame(&mut self, background: u32) {
        self.framebuffer.clear(background);
        self.draw_calls = 0;
    }

    pub fn draw_calls(&self) -> usize {
        self.draw_calls
    }

    pub fn render_triangles(&mut self, triangles: &[Triangle], model: &Mat4<f32>, base_color: Vec3<f32>) {
        let Some(inverse) = model.invert() else {
            warn!("模型矩阵不可逆，跳过绘制");
            return;
        };
        let normal_matrix = inverse.transpose();
        let view_matrix = self.camera.get_view_mat();
        let mvp_matrix = self.camera.get_frustum().get_mat() * view_matrix * model;
        let eye = self.camera.eye();

        let vertex_shader = DefaultVertexShader;
        let clipper = SimpleClipper;
        let uniforms = VertexShaderUniforms {
            model_matrix: model,
            mvp_matrix: &mvp_matrix,
            normal_matrix: &normal_matrix,
        };

        for triangle in triangles {
            // 背面剔除（世界空间）
            let world_pos = (*model * triangle.vertices[0].pos.extend(1.0)).truncate();
            let view_dir = eye - world_pos;
            let tri_normal = (normal_matrix * triangle.normal.extend(0.0)).truncate();
            if view_dir.dot(tri_normal) <= 0.0 {
                continue;
            }

            let clip_space_triangle = vertex_shader.shade_triangle(triangle, &uniforms);
            for clipped in clipper.clip_triangle(&clip_space_triangle) {
                let raster_triangle = self.viewport_transform(&clipped);
                self.rasterize_triangle(&raster_triangle, base_color, eye);
            }
        }
    }

    fn viewport_transform(&self, clip_triangle: &[ClipSpaceVertex; 3]) -> RasterTriangle {
        let vertices = clip_triangle.map(|clip_v| {
            let ndc = clip_v.position / clip_v.position.w;
            let screen_x = (ndc.x + 1.0) * 0.5 * self.viewport.w as f32 + self.viewport.x as f32;
            let screen_y = self.viewport.h as f32 - (ndc.y + 1.0) * 0.5 * self.viewport.h as f32
                + self.viewport.y as f32;

            RasterPoint {
                pos: Vec2::new(screen_x, screen_y),
                z: (ndc.z + 1.0) * 0.5,
                world_pos: clip_v.world_pos,
                normal: clip_v.normal,
                color: clip_v.color,
            }
        });
        RasterTriangle { vertices }
    }

    fn rasterize_triangle(&mut self, triangle: &RasterTriangle, base_color: Vec3<f32>, eye: Vec3<f32>) {
        let points = &triangle.vertices;
        let screen = [points[0].pos, points[1].pos, points[2].pos];
        let (min_x, min_y, max_x, max_y) = rasterizer::get_box(&screen);

        // 裁到视口范围内
        let min_x = min_x.max(0);
        let min_y = min_y.max(0);
        let max_x = max_x.min(self.framebuffer.width as i32 - 1);
        let max_y = max_y.min(self.framebuffer.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if !rasterizer::is_inside_triangle(&screen, &p) {
                    continue;
                }
                let Some(bary) = rasterizer::get_barycentric_coords(&screen, &p) else {
                    continue;
                };

                let depth = rasterizer::interpolate_depth(points, bary);
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }

                let fragment = FragmentData {
                    world_pos: rasterizer::interpolate_world_pos(points, bary),
                    normal: rasterizer::interpolate_normal(points, bary),
                    color: rasterizer::interpolate_color(points, bary),
                    base_color,
                    camera_pos: eye,
                };
                let c = self.shader.shade(fragment);

                let color = 0xFF000000
                    | ((c.x * 255.0) as u32) << 16
                    | ((c.y * 255.0) as u32) << 8
                    | ((c.z * 255.0) as u32);
                self.framebuffer.put_pixel(x as usize, y as usize, color, depth);
            }
        }
    }
}

impl RenderSink for Renderer {
    fn draw(&mut self, part: BodyPart, model: &Matrix4, mesh: &CubeMesh) {
        let base_color = Vec3::from(self.palette.color_of(part));
        let model: Mat4<f32> = (*model).into();
        self.render_triangles(mesh.triangles(), &model, base_color);
        self.draw_calls += 1;
    }
}
