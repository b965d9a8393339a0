// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/session.rs - 逐帧追踪会话
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::{convert::Infallible, time::Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{
  Track,
  color::{Chroma, ColorMatcher},
  config::{ConfigError, TrackerConfig},
  motion::{Motion, MotionEstimator},
  spiral::{ScanResult, SizeMode, SpiralTracker},
};
use crate::frame::{FrameViewMut, RgbFrame};

/// 上一帧的追踪结果，作为下一帧的种子
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackState {
  pub x: i32,
  pub y: i32,
  /// 尺寸度量，不大于 0 表示没有在追踪
  pub z: i32,
}

impl TrackState {
  pub fn new(seed: (i32, i32)) -> Self {
    Self {
      x: seed.0,
      y: seed.1,
      z: 0,
    }
  }

  pub fn is_tracking(&self) -> bool {
    self.z > 0
  }
}

/// 水平镜像并裁剪到 `[0, width] x [0, height]`
///
/// 镜像为 `x' = width - x`，是自身的逆变换（在裁剪范围内）。
pub fn mirror_clamp(point: (i32, i32), width: usize, height: usize, mirror: bool) -> (i32, i32) {
  let (w, h) = (width as i32, height as i32);
  let x = if mirror { w - point.0 } else { point.0 };
  (x.clamp(0, w), point.1.clamp(0, h))
}

/// 单帧追踪报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackReport {
  pub frame_index: u64,
  pub timestamp_ms: u64,
  pub track_x: i32,
  pub track_y: i32,
  pub track_z: i32,
  pub result: ScanResult,
  /// 目标丢失的帧为 `None`
  pub motion: Option<Motion>,
  pub size_mode: SizeMode,
  pub elapsed_us: u64,
}

/// 持有配置、匹配缓冲区和追踪状态的会话
#[derive(Debug, Clone)]
pub struct TrackerSession {
  config: TrackerConfig,
  target: Chroma,
  spiral: SpiralTracker,
  state: TrackState,
  motion: MotionEstimator,
}

impl TrackerSession {
  pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
    config.validate()?;
    info!("创建追踪会话: {}", config.summary());

    let matcher = ColorMatcher::new(config.match_mode);
    Ok(Self {
      target: matcher.normalize(config.target),
      spiral: SpiralTracker::new(matcher, config.size_mode).with_radius_cap(config.max_radius),
      state: TrackState::new(config.seed),
      motion: MotionEstimator::new(
        config.movement_start_threshold,
        config.movement_end_threshold,
        config.velocity_3d,
      ),
      config,
    })
  }

  pub fn config(&self) -> &TrackerConfig {
    &self.config
  }

  pub fn state(&self) -> TrackState {
    self.state
  }

  pub fn spiral(&self) -> &SpiralTracker {
    &self.spiral
  }

  /// 由调用方重新指定追踪位置
  pub fn reset(&mut self, seed: (i32, i32)) {
    self.state = TrackState::new(seed);
  }

  /// 更换配置，保留当前追踪状态
  pub fn reconfigure(&mut self, config: TrackerConfig) -> Result<(), ConfigError> {
    config.validate()?;
    info!("更新追踪配置: {}", config.summary());

    let matcher = ColorMatcher::new(config.match_mode);
    self.target = matcher.normalize(config.target);
    self.spiral = SpiralTracker::new(matcher, config.size_mode).with_radius_cap(config.max_radius);
    self.motion.retune(
      config.movement_start_threshold,
      config.movement_end_threshold,
      config.velocity_3d,
    );
    self.config = config;
    Ok(())
  }

  /// 下一帧扫描使用的种子
  pub fn next_seed(&self, width: usize, height: usize) -> (i32, i32) {
    mirror_clamp(
      (self.state.x, self.state.y),
      width,
      height,
      self.config.mirror,
    )
  }

  pub fn track_view(&mut self, frame: &mut FrameViewMut<'_>) -> ScanResult {
    let (width, height) = (frame.width(), frame.height());
    let seed = self.next_seed(width, height);

    let result = self.spiral.track(
      &frame.as_view(),
      seed,
      &self.target,
      self.config.fuzziness,
      self.config.min_match_count,
    );

    if self.config.highlight {
      self.spiral.highlight(frame);
    }

    let was_tracking = self.state.is_tracking();
    let (x, y) = mirror_clamp(result.position(), width, height, self.config.mirror);
    self.state = TrackState {
      x,
      y,
      z: result.extent(),
    };

    if was_tracking && !result.is_found() {
      warn!("目标丢失，种子 {:?}", seed);
    }
    result
  }
}

impl Track for TrackerSession {
  type Frame = RgbFrame;
  type Output = TrackReport;
  type Error = Infallible;

  fn track(&mut self, frame: &mut Self::Frame) -> Result<Self::Output, Self::Error> {
    let start = Instant::now();
    let result = self.track_view(&mut frame.view_mut());
    let motion = self.motion.update(self.state, frame.timestamp_ms());
    let elapsed = start.elapsed();

    Ok(TrackReport {
      frame_index: frame.index(),
      timestamp_ms: frame.timestamp_ms(),
      track_x: self.state.x,
      track_y: self.state.y,
      track_z: self.state.z,
      result,
      motion,
      size_mode: self.config.size_mode,
      elapsed_us: elapsed.as_micros() as u64,
    })
  }
}
