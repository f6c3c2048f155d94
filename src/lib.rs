//! humangl：用矩阵栈把立方体组合成层级人形，并用软光栅渲染出来。
//!
//! 核心是 [`matrix`]、[`skeleton`] 和 [`animation`]，它们不依赖任何窗口或渲染代码；
//! 渲染器只是实现了 [`skeleton::RenderSink`] 的一个外部协作者。

pub mod animation;
pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod cube;
pub mod error;
pub mod framebuffer;
pub mod matrix;
pub mod rasterizer;
pub mod renderer;
pub mod skeleton;
pub mod vertex;

pub use animation::{AnimationMode, AnimationState};
pub use error::{Error, Result};
pub use matrix::{Matrix4, MatrixStack};
pub use skeleton::{BodyPart, BodyPartSizes, Human, RenderSink};
