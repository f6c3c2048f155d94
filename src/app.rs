use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use cgmath::Deg;
use log::{debug, info};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::animation::{AnimationMode, AnimationState};
use crate::camera::Camera;
use crate::config::JsonConfig;
use crate::error::Result;
use crate::framebuffer::FrameBuffer;
use crate::matrix::MatrixStack;
use crate::renderer::Renderer;
use crate::skeleton::Human;

/// 一个人形 + 动画状态 + 渲染器，每帧：推进 → 清屏 → 组合 → 出图
pub struct Scene {
    human: Human,
    state: AnimationState,
    renderer: Renderer,
    background: u32,
    ssaa: usize,
    orbit_speed: f32,
}

impl Scene {
    pub fn new(config: &JsonConfig) -> Result<Self> {
        let ssaa = config.window.ssaa.max(1);
        let (width, height) = config.render_size()?;
        let camera = Camera::from_config(&config.camera, width as f32 / height as f32);

        let mut renderer = Renderer::new(camera, width, height);
        renderer.set_light(&config.light);
        renderer.set_palette(config.palette.clone());

        Ok(Self {
            human: Human::new(config.sizes),
            state: AnimationState::new(config.animation.walk_speed, config.animation.jump_speed),
            renderer,
            background: config.window.background,
            ssaa,
            orbit_speed: config.camera.orbit_speed,
        })
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn set_mode(&mut self, mode: AnimationMode) {
        if self.state.set_mode(mode) {
            info!("切换动画模式: {}", mode);
        }
    }

    pub fn step(&mut self, dt: f32) {
        self.state.advance(dt);
    }

    pub fn orbit(&mut self, direction: f32, dt: f32) {
        let delta = Deg(direction * self.orbit_speed * dt);
        self.renderer.camera_mut().orbit(delta.into());
    }

    /// 每帧从单位矩阵重新建栈，组合完整个人形
    pub fn render(&mut self) {
        self.renderer.begin_frame(self.background);
        let mut stack = MatrixStack::new();
        self.human.draw(&mut stack, &self.state, &mut self.renderer);
        debug_assert_eq!(stack.depth(), 1, "骨架遍历后矩阵栈未回到根");
        debug!(
            "mode={} walk={:.3} jump={:.3} draw_calls={}",
            self.state.mode,
            self.state.walk_cycle,
            self.state.jump_height,
            self.renderer.draw_calls()
        );
    }

    /// 降采样后的输出帧
    pub fn frame(&self) -> FrameBuffer {
        self.renderer.framebuffer().ssaa(self.ssaa)
    }
}

pub fn mode_for_key(key: Key) -> Option<AnimationMode> {
    match key {
        Key::Key1 | Key::I => Some(AnimationMode::Idle),
        Key::Key2 | Key::W => Some(AnimationMode::Walk),
        Key::Key3 | Key::J => Some(AnimationMode::Jump),
        _ => None,
    }
}

pub fn run_window(config: &JsonConfig, mode: AnimationMode) -> Result<()> {
    let (width, height) = (config.window.width, config.window.height);
    let mut window = Window::new(
        "humangl - 1/I 静止  2/W 行走  3/J 跳跃  ←/→ 旋转  Esc 退出",
        width,
        height,
        WindowOptions::default(),
    )?;
    window.set_target_fps(60);

    let mut scene = Scene::new(config)?;
    scene.set_mode(mode);
    info!("窗口已创建 {}x{}", width, height);

    let mut last = Instant::now();
    while window.is_open() && !window.is_key_down(Key::Escape) {
        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;

        for key in window.get_keys_pressed(KeyRepeat::No) {
            if let Some(mode) = mode_for_key(key) {
                scene.set_mode(mode);
            }
        }
        if window.is_key_down(Key::Left) {
            scene.orbit(-1.0, dt);
        }
        if window.is_key_down(Key::Right) {
            scene.orbit(1.0, dt);
        }

        scene.step(dt);
        scene.render();
        let frame = scene.frame();
        window.update_with_buffer(&frame.data, frame.width, frame.height)?;
    }

    info!("窗口已关闭");
    Ok(())
}

#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    pub frames: usize,
    pub fps: f32,
    pub out_dir: PathBuf,
    pub mode: AnimationMode,
}

/// 不开窗口，按固定步长渲染若干帧并保存为 png，返回写出的文件
pub fn run_headless(config: &JsonConfig, options: &HeadlessOptions) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(&options.out_dir)?;
    let dt = 1.0 / options.fps;

    let mut scene = Scene::new(config)?;
    scene.set_mode(options.mode);

    let mut written = Vec::with_capacity(options.frames);
    for i in 0..options.frames {
        scene.render();
        let path = options.out_dir.join(format!("frame_{:03}.png", i));
        scene.frame().save_to_image(&path)?;
        debug!("已保存 {}", path.display());
        written.push(path);
        scene.step(dt);
    }

    info!("已渲染完成，共 {} 帧 -> {}", written.len(), options.out_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn small_config() -> JsonConfig {
        let mut config = JsonConfig::default();
        config.window.width = 48;
        config.window.height = 40;
        config.window.ssaa = 2;
        config
    }

    #[test]
    fn keys_switch_modes() {
        assert_eq!(mode_for_key(Key::Key2), Some(AnimationMode::Walk));
        assert_eq!(mode_for_key(Key::J), Some(AnimationMode::Jump));
        assert_eq!(mode_for_key(Key::I), Some(AnimationMode::Idle));
        assert_eq!(mode_for_key(Key::Space), None);
    }

    #[test]
    fn scene_renders_figure() {
        let config = small_config();
        let mut scene = Scene::new(&config).unwrap();
        scene.render();
        let frame = scene.frame();
        assert_eq!((frame.width, frame.height), (48, 40));
        assert!(frame.data.iter().any(|&c| c != config.window.background));
    }

    #[test]
    fn scene_steps_only_active_phase() {
        let mut scene = Scene::new(&small_config()).unwrap();
        scene.set_mode(AnimationMode::Jump);
        scene.step(0.5);
        assert!((scene.state().jump_height - 2.0).abs() < 1e-6);
        assert_eq!(scene.state().walk_cycle, 0.0);
    }

    #[test]
    fn oversized_render_target_is_rejected() {
        let mut config = small_config();
        config.window.ssaa = usize::MAX / 2;
        assert!(matches!(Scene::new(&config), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn headless_writes_numbered_frames() {
        let dir = tempfile::tempdir().unwrap();
        let options = HeadlessOptions {
            frames: 3,
            fps: 10.0,
            out_dir: dir.path().join("frames"),
            mode: AnimationMode::Walk,
        };
        let written = run_headless(&small_config(), &options).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[2].ends_with("frame_002.png"));
        for path in &written {
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), (48, 40));
        }
    }
}
