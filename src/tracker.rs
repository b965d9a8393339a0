// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker.rs - 颜色目标追踪
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

/// 逐帧追踪器
///
/// 每次调用处理一帧。追踪器可以在帧上写入诊断叠加层，因此帧以可变引用传入。
pub trait Track {
  type Frame;
  type Output;
  type Error;

  fn track(&mut self, frame: &mut Self::Frame) -> Result<Self::Output, Self::Error>;
}

mod color;
mod config;
mod highlight;
mod locate;
mod motion;
mod ring;
mod session;
mod spiral;

pub use self::color::{Chroma, Color, ColorMatcher, MatchMode};
pub use self::config::{ConfigError, TrackerConfig};
pub use self::highlight::{highlight_color, pick};
pub use self::locate::ObjectLocator;
pub use self::motion::{Motion, MotionEstimator, MovementEvent};
pub use self::ring::{COARSE_STEP, Edge, FINE_STEP, RingPoint, RingScanner, bound_radius};
pub use self::session::{TrackReport, TrackState, TrackerSession, mirror_clamp};
pub use self::spiral::{
  MATCHED_CHANNEL, MatchMap, MatchState, NOT_FOUND, REJECTED_CHANNEL, ScanResult, SizeMode,
  SpiralTracker,
};
