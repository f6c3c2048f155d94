use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;

pub const DEFAULT_WALK_SPEED: f32 = 3.0;
pub const DEFAULT_JUMP_SPEED: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    #[default]
    Idle,
    Walk,
    Jump,
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnimationMode::Idle => "idle",
            AnimationMode::Walk => "walk",
            AnimationMode::Jump => "jump",
        };
        f.write_str(name)
    }
}

/// 动画状态：模式 + 两个相位。每帧组合前推进一次，组合期间只读。
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    pub mode: AnimationMode,
    pub walk_cycle: f32,
    pub jump_height: f32,
    pub walk_speed: f32,
    pub jump_speed: f32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self::new(DEFAULT_WALK_SPEED, DEFAULT_JUMP_SPEED)
    }
}

impl AnimationState {
    pub fn new(walk_speed: f32, jump_speed: f32) -> Self {
        Self {
            mode: AnimationMode::Idle,
            walk_cycle: 0.0,
            jump_height: 0.0,
            walk_speed,
            jump_speed,
        }
    }

    /// 切换模式，返回模式是否发生变化
    pub fn set_mode(&mut self, mode: AnimationMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    /// 只推进当前模式的相位。负数或非有限的 dt 和速度都视为 0，保证相位单调。
    pub fn advance(&mut self, dt: f32) {
        let dt = non_negative(dt);
        match self.mode {
            AnimationMode::Idle => {}
            AnimationMode::Walk => self.walk_cycle += dt * non_negative(self.walk_speed),
            AnimationMode::Jump => self.jump_height += dt * non_negative(self.jump_speed),
        }
    }

    /// 根节点的竖直偏移
    pub fn root_offset(&self) -> f32 {
        match self.mode {
            AnimationMode::Idle => 0.0,
            AnimationMode::Walk => 0.05 * (1.0 + (2.0 * self.walk_cycle).sin()),
            AnimationMode::Jump => 0.5 * (1.0 + self.jump_height.sin()),
        }
    }
}

fn non_negative(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}
