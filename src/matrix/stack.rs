use super::Matrix4;
use log::warn;

/// 矩阵栈。栈底永远存在，深度最小为 1。
#[derive(Debug, Clone)]
pub struct MatrixStack {
    stack: Vec<Matrix4>,
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}

impl MatrixStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Matrix4::identity()],
        }
    }

    pub fn current(&self) -> Matrix4 {
        // 栈不可能为空，最后一个元素总是存在
        self.stack[self.stack.len() - 1]
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// 复制栈顶并压入
    pub fn push(&mut self) {
        let top = self.current();
        self.stack.push(top);
    }

    /// 弹出栈顶；深度为 1 时什么都不做。
    pub fn pop(&mut self) {
        if self.stack.len() > 1 {
            self.stack.pop();
        } else if cfg!(debug_assertions) {
            warn!("矩阵栈下溢：在深度 1 处调用了 pop，push/pop 未配对");
        }
    }

    /// 栈顶 = 栈顶 * local
    pub fn apply(&mut self, local: Matrix4) {
        let last = self.stack.len() - 1;
        self.stack[last] = self.stack[last].multiply(&local);
    }

    pub fn translate(&mut self, x: f32, y: f32, z: f32) {
        self.apply(Matrix4::translate(x, y, z));
    }

    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.apply(Matrix4::scale(x, y, z));
    }

    pub fn rotate_x(&mut self, angle: f32) {
        self.apply(Matrix4::rotate_x(angle));
    }

    pub fn rotate_y(&mut self, angle: f32) {
        self.apply(Matrix4::rotate_y(angle));
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.apply(Matrix4::rotate_z(angle));
    }
}
