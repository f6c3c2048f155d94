use crate::animation::{DEFAULT_JUMP_SPEED, DEFAULT_WALK_SPEED};
use crate::error::{Error, Result};
use crate::renderer::fragment_shader::ShaderKind;
use crate::skeleton::{BodyPart, BodyPartSizes};
use log::info;
use serde::Deserialize;
use serde_json::from_reader;
use std::{fs::File, io::BufReader, path::Path};

/// SSAA 倍数上限，再大内部缓冲区就失控了
pub const MAX_SSAA: usize = 8;

/// 场景配置，所有字段都有默认值，json 里只写需要改的部分即可
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct JsonConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub animation: AnimationConfig,
    pub sizes: BodyPartSizes,
    pub palette: PaletteConfig,
    pub light: LightConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: usize,
    pub height: usize,
    pub ssaa: usize,
    pub background: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            ssaa: 1,
            background: 0xFF1A1A26,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fovy: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
    pub height: f32,
    pub target: [f32; 3],
    /// 角度制
    pub yaw: f32,
    pub orbit_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fovy: 45.0,
            near: 0.1,
            far: 100.0,
            distance: 7.0,
            height: 0.5,
            target: [0.0, -0.3, 0.0],
            yaw: 20.0,
            orbit_speed: 60.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    pub walk_speed: f32,
    pub jump_speed: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            walk_speed: DEFAULT_WALK_SPEED,
            jump_speed: DEFAULT_JUMP_SPEED,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaletteConfig {
    pub shader: ShaderKind,
    pub skin: [f32; 3],
    pub shirt: [f32; 3],
    pub trousers: [f32; 3],
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            shader: ShaderKind::Lambert,
            skin: [0.93, 0.76, 0.62],
            shirt: [0.85, 0.2, 0.2],
            trousers: [0.2, 0.3, 0.7],
        }
    }
}

impl PaletteConfig {
    pub fn color_of(&self, part: BodyPart) -> [f32; 3] {
        match part {
            BodyPart::Head | BodyPart::RightForearm | BodyPart::LeftForearm => self.skin,
            BodyPart::Torso | BodyPart::RightUpperArm | BodyPart::LeftUpperArm => self.shirt,
            BodyPart::RightThigh
            | BodyPart::RightLowerLeg
            | BodyPart::LeftThigh
            | BodyPart::LeftLowerLeg => self.trousers,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub color: [f32; 3],
    pub direction: [f32; 3],
    pub ambient: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            direction: [-0.4, -0.6, -1.0],
            ambient: 0.35,
        }
    }
}

impl JsonConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(Error::InvalidArgument("窗口尺寸必须大于 0".into()));
        }
        if !(1..=MAX_SSAA).contains(&self.window.ssaa) {
            return Err(Error::InvalidArgument(format!(
                "SSAA值必须在 1..={} 之间: {}",
                MAX_SSAA, self.window.ssaa
            )));
        }
        self.render_size()?;
        if !(self.camera.near > 0.0 && self.camera.far > self.camera.near) {
            return Err(Error::InvalidArgument(format!(
                "相机裁剪面无效: near={} far={}",
                self.camera.near, self.camera.far
            )));
        }
        if !(self.camera.fovy > 0.0 && self.camera.fovy < 180.0) {
            return Err(Error::InvalidArgument(format!(
                "视场角必须在 (0, 180) 之间: {}",
                self.camera.fovy
            )));
        }
        if !(self.camera.distance.is_finite() && self.camera.distance > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "相机距离必须为正数: {}",
                self.camera.distance
            )));
        }
        let speeds = [self.animation.walk_speed, self.animation.jump_speed];
        if speeds.iter().any(|v| !(v.is_finite() && *v >= 0.0)) {
            return Err(Error::InvalidArgument(format!(
                "动画速度必须为非负有限值: walk={} jump={}",
                self.animation.walk_speed, self.animation.jump_speed
            )));
        }
        let s = &self.sizes;
        let all = [
            s.head,
            s.torso_width,
            s.torso_height,
            s.torso_depth,
            s.upper_arm,
            s.forearm,
            s.thigh,
            s.lower_leg,
        ];
        if all.iter().any(|v| !(v.is_finite() && *v > 0.0)) {
            return Err(Error::InvalidArgument("身体部件尺寸必须为正数".into()));
        }
        Ok(())
    }

    /// 超采样后的内部渲染尺寸，乘法溢出时报错
    pub fn render_size(&self) -> Result<(usize, usize)> {
        let w = &self.window;
        let size = w
            .width
            .checked_mul(w.ssaa)
            .zip(w.height.checked_mul(w.ssaa))
            .filter(|(width, height)| width.checked_mul(*height).is_some());
        size.ok_or_else(|| {
            Error::InvalidArgument(format!(
                "渲染尺寸溢出: {}x{} x{}",
                w.width, w.height, w.ssaa
            ))
        })
    }
}

pub fn parse_json(path: &Path) -> Result<JsonConfig> {
    let file = File::open(path)?;
    let config: JsonConfig = from_reader(BufReader::new(file))?;
    config.validate()?;
    info!("成功读取配置 {}", path.display());
    Ok(config)
}
