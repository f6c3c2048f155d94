//! 人形骨架：固定的层级结构，用矩阵栈逐个部件组合出模型矩阵。
//!
//! 骨架写成一张描述表（每条分支一个根段 + 可选的子段），
//! 由同一个深度优先遍历函数处理。子段不经过 pop 直接叠加在父段累积的坐标系上
//! （包括父段的缩放），肘部和膝盖的联动就是这样得到的。

use crate::animation::{AnimationMode, AnimationState};
use crate::cube::CubeMesh;
use crate::matrix::{Matrix4, MatrixStack};
use log::trace;
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyPart {
    Torso,
    Head,
    RightUpperArm,
    RightForearm,
    LeftUpperArm,
    LeftForearm,
    RightThigh,
    RightLowerLeg,
    LeftThigh,
    LeftLowerLeg,
}

impl BodyPart {
    /// 遍历时的输出顺序
    pub const ALL: [BodyPart; 10] = [
        BodyPart::Torso,
        BodyPart::Head,
        BodyPart::RightUpperArm,
        BodyPart::RightForearm,
        BodyPart::LeftUpperArm,
        BodyPart::LeftForearm,
        BodyPart::RightThigh,
        BodyPart::RightLowerLeg,
        BodyPart::LeftThigh,
        BodyPart::LeftLowerLeg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BodyPart::Torso => "torso",
            BodyPart::Head => "head",
            BodyPart::RightUpperArm => "right_upper_arm",
            BodyPart::RightForearm => "right_forearm",
            BodyPart::LeftUpperArm => "left_upper_arm",
            BodyPart::LeftForearm => "left_forearm",
            BodyPart::RightThigh => "right_thigh",
            BodyPart::RightLowerLeg => "right_lower_leg",
            BodyPart::LeftThigh => "left_thigh",
            BodyPart::LeftLowerLeg => "left_lower_leg",
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 各部件尺寸，一个人形实例的生命周期内保持不变
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct BodyPartSizes {
    pub head: f32,
    pub torso_width: f32,
    pub torso_height: f32,
    pub torso_depth: f32,
    pub upper_arm: f32,
    pub forearm: f32,
    pub thigh: f32,
    pub lower_leg: f32,
}

impl Default for BodyPartSizes {
    fn default() -> Self {
        Self {
            head: 0.5,
            torso_width: 1.0,
            torso_height: 1.5,
            torso_depth: 0.5,
            upper_arm: 0.7,
            forearm: 0.6,
            thigh: 0.8,
            lower_leg: 0.7,
        }
    }
}

/// 一个部件在父坐标系中的局部变换：平移 → （行走时）绕 Z 摆动 → 缩放
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub part: BodyPart,
    pub offset: [f32; 3],
    /// 带符号的摆幅，角度 = swing * sin(walk_cycle)
    pub swing: Option<f32>,
    pub scale: [f32; 3],
}

impl Segment {
    fn fixed(part: BodyPart, offset: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            part,
            offset,
            swing: None,
            scale,
        }
    }

    fn swinging(part: BodyPart, offset: [f32; 3], swing: f32, scale: [f32; 3]) -> Self {
        Self {
            part,
            offset,
            swing: Some(swing),
            scale,
        }
    }

    /// 当前状态下的摆动角度；非行走模式或固定部件为 0
    pub fn angle(&self, state: &AnimationState) -> f32 {
        match (state.mode, self.swing) {
            (AnimationMode::Walk, Some(amplitude)) => amplitude * state.walk_cycle.sin(),
            _ => 0.0,
        }
    }
}

/// 从根坐标系出发的一条分支
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch {
    pub root: Segment,
    pub child: Option<Segment>,
}

impl Branch {
    fn single(root: Segment) -> Self {
        Self { root, child: None }
    }

    fn limb(root: Segment, child: Segment) -> Self {
        Self {
            root,
            child: Some(child),
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        std::iter::once(&self.root).chain(self.child.iter())
    }
}

/// 由尺寸生成整张骨架描述表
pub fn skeleton(s: &BodyPartSizes) -> Vec<Branch> {
    let arm_y = s.torso_height / 4.0;
    let arm_x = s.torso_width / 2.0 + s.upper_arm / 2.0;
    let arm_scale = [s.upper_arm, s.upper_arm / 2.0, s.upper_arm / 2.0];
    let forearm_offset = [0.0, -s.upper_arm / 2.0, 0.0];
    let forearm_scale = [1.0, s.forearm / s.upper_arm, 1.0];

    let hip_x = s.torso_width / 4.0;
    let hip_y = -s.torso_height / 2.0 - s.thigh / 2.0;
    let thigh_scale = [s.thigh / 2.0, s.thigh, s.thigh / 2.0];
    let shin_offset = [0.0, -s.thigh / 2.0 - s.lower_leg / 2.0, 0.0];
    let shin_scale = [1.0, s.lower_leg / s.thigh, 1.0];

    vec![
        Branch::single(Segment::fixed(
            BodyPart::Torso,
            [0.0, 0.0, 0.0],
            [s.torso_width, s.torso_height, s.torso_depth],
        )),
        Branch::single(Segment::fixed(
            BodyPart::Head,
            [0.0, s.torso_height / 2.0 + s.head / 2.0, 0.0],
            [s.head, s.head, s.head],
        )),
        Branch::limb(
            Segment::swinging(BodyPart::RightUpperArm, [-arm_x, arm_y, 0.0], 0.3, arm_scale),
            Segment::swinging(BodyPart::RightForearm, forearm_offset, 0.3, forearm_scale),
        ),
        Branch::limb(
            Segment::swinging(BodyPart::LeftUpperArm, [arm_x, arm_y, 0.0], -0.3, arm_scale),
            Segment::swinging(BodyPart::LeftForearm, forearm_offset, -0.3, forearm_scale),
        ),
        Branch::limb(
            Segment::swinging(BodyPart::RightThigh, [-hip_x, hip_y, 0.0], -0.3, thigh_scale),
            Segment::swinging(BodyPart::RightLowerLeg, shin_offset, 0.6, shin_scale),
        ),
        Branch::limb(
            Segment::swinging(BodyPart::LeftThigh, [hip_x, hip_y, 0.0], 0.3, thigh_scale),
            Segment::swinging(BodyPart::LeftLowerLeg, shin_offset, -0.6, shin_scale),
        ),
    ]
}

/// 接收每个部件的模型矩阵。实现者负责上传矩阵并绘制立方体。
pub trait RenderSink {
    fn draw(&mut self, part: BodyPart, model: &Matrix4, mesh: &CubeMesh);
}

impl RenderSink for Vec<(BodyPart, Matrix4)> {
    fn draw(&mut self, part: BodyPart, model: &Matrix4, _mesh: &CubeMesh) {
        self.push((part, *model));
    }
}

#[derive(Debug, Clone)]
pub struct Human {
    mesh: CubeMesh,
    sizes: BodyPartSizes,
    branches: Vec<Branch>,
}

impl Default for Human {
    fn default() -> Self {
        Self::new(BodyPartSizes::default())
    }
}

impl Human {
    pub fn new(sizes: BodyPartSizes) -> Self {
        Self {
            mesh: CubeMesh::unit(),
            sizes,
            branches: skeleton(&sizes),
        }
    }

    pub fn sizes(&self) -> &BodyPartSizes {
        &self.sizes
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn segment(&self, part: BodyPart) -> Option<&Segment> {
        self.branches
            .iter()
            .flat_map(|b| b.segments())
            .find(|s| s.part == part)
    }

    /// 某个部件当前的摆动角度
    pub fn swing_angle(&self, part: BodyPart, state: &AnimationState) -> f32 {
        self.segment(part).map_or(0.0, |s| s.angle(state))
    }

    /// 深度优先遍历骨架，把每个部件的模型矩阵交给 sink。
    /// 返回时栈深度和栈顶与调用前一致。
    pub fn draw<S: RenderSink + ?Sized>(
        &self,
        stack: &mut MatrixStack,
        state: &AnimationState,
        sink: &mut S,
    ) {
        stack.push();
        if state.mode != AnimationMode::Idle {
            stack.translate(0.0, state.root_offset(), 0.0);
        }

        for branch in &self.branches {
            stack.push();
            for segment in branch.segments() {
                self.draw_segment(stack, state, segment, sink);
            }
            stack.pop();
        }

        stack.pop();
    }

    fn draw_segment<S: RenderSink + ?Sized>(
        &self,
        stack: &mut MatrixStack,
        state: &AnimationState,
        segment: &Segment,
        sink: &mut S,
    ) {
        let [x, y, z] = segment.offset;
        stack.translate(x, y, z);
        if state.mode == AnimationMode::Walk && segment.swing.is_some() {
            stack.rotate_z(segment.angle(state));
        }
        let [sx, sy, sz] = segment.scale;
        stack.scale(sx, sy, sz);

        let model = stack.current();
        trace!("{} depth={} model={:?}", segment.part, stack.depth(), model);
        sink.draw(segment.part, &model, &self.mesh);
    }

    /// 从单位矩阵开始组合一帧，直接返回各部件的模型矩阵
    pub fn pose(&self, state: &AnimationState) -> Vec<(BodyPart, Matrix4)> {
        let mut stack = MatrixStack::new();
        let mut parts = Vec::with_capacity(BodyPart::ALL.len());
        self.draw(&mut stack, state, &mut parts);
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector3 as Vec3;
    use std::f32::consts::FRAC_PI_2;

    const EPS: f32 = 1e-5;

    fn state(mode: AnimationMode, walk_cycle: f32, jump_height: f32) -> AnimationState {
        let mut state = AnimationState::default();
        state.mode = mode;
        state.walk_cycle = walk_cycle;
        state.jump_height = jump_height;
        state
    }

    fn find(pose: &[(BodyPart, Matrix4)], part: BodyPart) -> Matrix4 {
        pose.iter()
            .find(|(p, _)| *p == part)
            .map(|(_, m)| *m)
            .unwrap()
    }

    fn center(m: &Matrix4) -> Vec3<f32> {
        m.transform_point(Vec3::new(0.0, 0.0, 0.0))
    }

    #[test]
    fn emits_every_part_in_order() {
        let human = Human::default();
        let pose = human.pose(&AnimationState::default());
        let order: Vec<BodyPart> = pose.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, BodyPart::ALL.to_vec());
    }

    #[test]
    fn table_has_torso_head_and_four_limbs() {
        let human = Human::default();
        let branches = human.branches();
        assert_eq!(branches.len(), 6);
        assert_eq!(branches.iter().filter(|b| b.child.is_some()).count(), 4);
        assert_eq!(branches[0].root.part, BodyPart::Torso);
        assert_eq!(branches.iter().map(|b| b.segments().count()).sum::<usize>(), 10);
    }

    #[test]
    fn traversal_leaves_stack_balanced() {
        let human = Human::default();
        let mut stack = MatrixStack::new();
        stack.translate(0.0, 0.0, -4.0);
        stack.push();
        stack.rotate_y(0.5);
        let depth = stack.depth();
        let top = stack.current();

        for mode in [AnimationMode::Idle, AnimationMode::Walk, AnimationMode::Jump] {
            let mut sink: Vec<(BodyPart, Matrix4)> = Vec::new();
            human.draw(&mut stack, &state(mode, 1.3, 0.7), &mut sink);
            assert_eq!(sink.len(), 10);
            assert_eq!(stack.depth(), depth);
            assert_eq!(stack.current(), top);
        }
    }

    #[test]
    fn idle_pose_has_no_offset_or_rotation() {
        let human = Human::default();
        let s = *human.sizes();
        // 相位随便给，idle 下都不应该生效
        let pose = human.pose(&state(AnimationMode::Idle, 2.1, 0.9));

        assert_eq!(
            find(&pose, BodyPart::Torso),
            Matrix4::scale(s.torso_width, s.torso_height, s.torso_depth)
        );

        let arm_x = s.torso_width / 2.0 + s.upper_arm / 2.0;
        let expected_arm = Matrix4::translate(-arm_x, s.torso_height / 4.0, 0.0)
            * Matrix4::scale(s.upper_arm, s.upper_arm / 2.0, s.upper_arm / 2.0);
        assert!(find(&pose, BodyPart::RightUpperArm).approx_eq(&expected_arm, EPS));

        for part in BodyPart::ALL {
            assert_eq!(human.swing_angle(part, &state(AnimationMode::Idle, 2.1, 0.9)), 0.0);
        }
    }

    #[test]
    fn head_sits_on_torso() {
        let human = Human::default();
        let pose = human.pose(&AnimationState::default());
        let head = center(&find(&pose, BodyPart::Head));
        assert!((head.y - 1.0).abs() < EPS);
        assert!(head.x.abs() < EPS);
    }

    #[test]
    fn forearm_composes_onto_upper_arm_frame() {
        let human = Human::default();
        let s = *human.sizes();
        let walk = state(AnimationMode::Walk, 0.8, 0.0);
        let pose = human.pose(&walk);

        let upper = find(&pose, BodyPart::RightUpperArm);
        let angle = 0.3 * 0.8f32.sin();
        let expected = upper
            * Matrix4::translate(0.0, -s.upper_arm / 2.0, 0.0)
            * Matrix4::rotate_z(angle)
            * Matrix4::scale(1.0, s.forearm / s.upper_arm, 1.0);
        assert!(find(&pose, BodyPart::RightForearm).approx_eq(&expected, EPS));
    }

    #[test]
    fn idle_forearm_center_is_scaled_by_parent() {
        let human = Human::default();
        let pose = human.pose(&AnimationState::default());
        let c = center(&find(&pose, BodyPart::RightForearm));
        // 子段的平移在父段缩放后的空间里：0.375 - 0.35 * 0.35
        assert!((c.x + 0.85).abs() < EPS);
        assert!((c.y - 0.2525).abs() < EPS);
        assert!(c.z.abs() < EPS);
    }

    #[test]
    fn walk_swings_are_symmetric() {
        let human = Human::default();
        let walk = state(AnimationMode::Walk, FRAC_PI_2, 0.0);
        let right = human.swing_angle(BodyPart::RightUpperArm, &walk);
        let left = human.swing_angle(BodyPart::LeftUpperArm, &walk);
        assert!((right - 0.3).abs() < EPS);
        assert!((right + left).abs() < EPS);

        let right_shin = human.swing_angle(BodyPart::RightLowerLeg, &walk);
        let right_thigh = human.swing_angle(BodyPart::RightThigh, &walk);
        assert!((right_shin - 0.6).abs() < EPS);
        assert!((right_thigh + 0.3).abs() < EPS);
        assert_eq!(human.swing_angle(BodyPart::Head, &walk), 0.0);
    }

    #[test]
    fn jump_lifts_whole_body() {
        let human = Human::default();
        let rest = human.pose(&AnimationState::default());
        let jump = human.pose(&state(AnimationMode::Jump, 0.0, 0.0));

        for ((part, a), (_, b)) in rest.iter().zip(jump.iter()) {
            let lifted = Matrix4::translate(0.0, 0.5, 0.0) * *a;
            assert!(b.approx_eq(&lifted, EPS), "{part}");
        }
    }

    #[test]
    fn walk_bob_uses_double_frequency() {
        let human = Human::default();
        let walk = state(AnimationMode::Walk, 0.25, 0.0);
        let torso = center(&find(&human.pose(&walk), BodyPart::Torso));
        let expected = 0.05 * (1.0 + (0.5f32).sin());
        assert!((torso.y - expected).abs() < EPS);
    }

    #[test]
    fn sink_receives_shared_cube() {
        struct Counter(usize);
        impl RenderSink for Counter {
            fn draw(&mut self, _part: BodyPart, _model: &Matrix4, mesh: &CubeMesh) {
                assert_eq!(mesh.indices.len(), 36);
                self.0 += 1;
            }
        }

        let human = Human::default();
        let mut counter = Counter(0);
        human.draw(&mut MatrixStack::new(), &AnimationState::default(), &mut counter);
        assert_eq!(counter.0, 10);
    }
}
