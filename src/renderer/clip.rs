use crate::vertex::ClipSpaceVertex;

pub trait Clipper {
    // 返回裁剪后剩下的零个、一个或多个三角形
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]>;
}

/// 只做整体丢弃：任何一个顶点在相机后面（w <= 0）就丢掉整个三角形。
/// 人形始终在相机前方，不需要真正的多边形裁剪。
pub struct SimpleClipper;

impl Clipper for SimpleClipper {
    fn clip_triangle(&self, triangle: &[ClipSpaceVertex; 3]) -> Vec<[ClipSpaceVertex; 3]> {
        if triangle.iter().any(|v| v.position.w <= 0.0) {
            vec![]
        } else {
            vec![*triangle]
        }
    }
}
