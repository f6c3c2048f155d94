use std::io;
use thiserror::Error;

/// 外层（配置、窗口、图片输出）可能出现的错误。骨架和矩阵栈本身不会出错。
#[derive(Debug, Error)]
pub enum Error {
    #[error("读写文件失败: {0}")]
    Io(#[from] io::Error),

    #[error("配置文件格式错误: {0}")]
    Config(#[from] serde_json::Error),

    #[error("图片保存失败: {0}")]
    Image(#[from] image::ImageError),

    #[error("窗口错误: {0}")]
    Window(#[from] minifb::Error),

    #[error("参数无效: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_share_the_log_language() {
        let err = Error::InvalidArgument("SSAA值必须在 1..=8 之间: 9".into());
        assert_eq!(err.to_string(), "参数无效: SSAA值必须在 1..=8 之间: 9");

        let err: Error = io::Error::new(io::ErrorKind::NotFound, "scene.json").into();
        assert!(err.to_string().starts_with("读写文件失败"));
    }
}
