use clap::Parser;
use std::path::PathBuf;

use crate::animation::AnimationMode;
use crate::config::JsonConfig;

#[derive(Parser, Debug)]
#[command(name = "humangl")]
#[command(about = "用矩阵栈组合立方体人形并做行走/跳跃动画的软光栅演示", long_about = None)]
#[command(version)]
pub struct Cli {
    /// 场景配置 json 路径，不填则使用默认值
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 不开窗口，直接把帧渲染成 png
    #[arg(long)]
    pub headless: bool,

    /// headless 模式下渲染的帧数
    #[arg(long, default_value_t = 60)]
    pub frames: usize,

    /// headless 模式下的帧率（决定每帧的 dt）
    #[arg(long, default_value_t = 30.0)]
    pub fps: f32,

    /// headless 模式的输出目录
    #[arg(short, long, default_value = "output")]
    pub out: PathBuf,

    /// 初始动画模式
    #[arg(short, long, value_enum, default_value_t = AnimationMode::Idle)]
    pub mode: AnimationMode,

    /// 覆盖配置里的窗口宽度
    #[arg(long)]
    pub width: Option<usize>,

    /// 覆盖配置里的窗口高度
    #[arg(long)]
    pub height: Option<usize>,

    /// 覆盖配置里的 SSAA 倍数
    #[arg(long)]
    pub ssaa: Option<usize>,

    /// 日志详细程度（可重复）
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// 只输出错误
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// 命令行参数优先于配置文件
    pub fn apply_overrides(&self, config: &mut JsonConfig) {
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if let Some(ssaa) = self.ssaa {
            config.window.ssaa = ssaa;
        }
    }

    pub fn fps_is_valid(&self) -> bool {
        self.fps.is_finite() && self.fps > 0.0
    }
}
