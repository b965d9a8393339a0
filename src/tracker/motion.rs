// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/motion.rs - 速度、加速度与运动起止检测
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

//! # 运动估计
//!
//! 以上一次追踪到的位置为参照，逐帧计算速度（像素/帧）和加速度（速度变化/毫秒）。
//! 速度超过起始阈值时进入运动状态，低于结束阈值时退出。目标丢失的帧不更新。

use serde::{Deserialize, Serialize};
use tracing::info;

use super::session::TrackState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementEvent {
  #[default]
  None,
  Start,
  End,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Motion {
  pub velocity: f64,
  pub acceleration: f64,
  /// 是否处于一次运动之中
  pub going: bool,
  pub event: MovementEvent,
  /// 按当前速度外推的下一帧位置 `(x, y, z)`
  pub predicted: (i32, i32, i32),
}

#[derive(Debug, Clone)]
pub struct MotionEstimator {
  start_threshold: f64,
  end_threshold: f64,
  velocity_3d: bool,
  last: Option<TrackState>,
  last_timestamp_ms: Option<u64>,
  velocity: f64,
  going: bool,
}

impl MotionEstimator {
  pub fn new(start_threshold: u32, end_threshold: u32, velocity_3d: bool) -> Self {
    Self {
      start_threshold: start_threshold as f64,
      end_threshold: end_threshold as f64,
      velocity_3d,
      last: None,
      last_timestamp_ms: None,
      velocity: 0.0,
      going: false,
    }
  }

  /// 更换阈值，保留已有的运动状态
  pub fn retune(&mut self, start_threshold: u32, end_threshold: u32, velocity_3d: bool) {
    self.start_threshold = start_threshold as f64;
    self.end_threshold = end_threshold as f64;
    self.velocity_3d = velocity_3d;
  }

  pub fn is_going(&self) -> bool {
    self.going
  }

  /// 处理一帧的追踪状态，目标丢失时返回 `None`
  pub fn update(&mut self, state: TrackState, timestamp_ms: u64) -> Option<Motion> {
    let elapsed_ms = self
      .last_timestamp_ms
      .replace(timestamp_ms)
      .map(|last| timestamp_ms.saturating_sub(last));

    if !state.is_tracking() {
      return None;
    }

    let previous = self.last.replace(state).unwrap_or(state);
    let (dx, dy, dz) = (
      state.x - previous.x,
      state.y - previous.y,
      state.z - previous.z,
    );
    let squared = if self.velocity_3d {
      dx * dx + dy * dy + dz * dz
    } else {
      dx * dx + dy * dy
    };
    let velocity = (squared as f64).sqrt();
    let acceleration = match elapsed_ms {
      Some(ms) if ms > 0 => (velocity - self.velocity) / ms as f64,
      _ => 0.0,
    };
    self.velocity = velocity;

    let mut event = MovementEvent::None;
    if velocity > self.start_threshold && !self.going {
      self.going = true;
      event = MovementEvent::Start;
      info!("运动开始于 ({}, {}, {})", state.x, state.y, state.z);
    }
    if velocity < self.end_threshold && self.going {
      self.going = false;
      event = MovementEvent::End;
      info!("运动结束于 ({}, {}, {})", state.x, state.y, state.z);
    }

    Some(Motion {
      velocity,
      acceleration,
      going: self.going,
      event,
      predicted: (state.x + dx, state.y + dy, state.z + dz),
    })
  }
}
