// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/spiral.rs - 螺旋细扫描
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

//! # 螺旋细扫描
//!
//! 从种子点（或粗扫描重新捕获的点）出发，以步长 1 逐环向外扫描，累计所有匹配
//! 像素的数量与坐标和，得到目标的质心和尺寸。
//!
//! 扫描在某一环没有新的匹配且累计数已达到下限时停止；累计数未达下限时，即使
//! 遇到空环也继续向外，直到半径上界。
//!
//! 边界记录采用逐环“后写覆盖”：某条边上最后一个匹配点的坐标覆盖该侧的边界值，
//! 并不是真正的包围盒。四条边界都从传入的种子点开始，即使粗扫描把中心移到了
//! 别处；没有任何匹配的边保留种子坐标，因此周长跨度是有符号的，可能为零或负数。

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
  color::{Chroma, ColorMatcher},
  config::ConfigError,
  locate::ObjectLocator,
  ring::{Edge, FINE_STEP, RingScanner},
};
use crate::frame::{FrameView, FrameViewMut};

/// 未找到目标时对外报告的坐标
pub const NOT_FOUND: (i32, i32) = (-1, -1);

/// 叠加层中匹配像素被置为 255 的通道
pub const MATCHED_CHANNEL: usize = 1;
/// 叠加层中未匹配像素被置为 255 的通道
pub const REJECTED_CHANNEL: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum MatchState {
  #[default]
  Unvisited,
  Matched,
  Rejected,
}

/// 每个像素的访问状态
///
/// 按当前帧尺寸分配，分辨率不变时跨帧复用同一块内存。
#[derive(Debug, Clone, Default)]
pub struct MatchMap {
  width: usize,
  height: usize,
  cells: Vec<MatchState>,
}

impl MatchMap {
  /// 清空为全部未访问，必要时调整尺寸
  pub fn reset(&mut self, width: usize, height: usize) {
    self.width = width;
    self.height = height;
    self.cells.clear();
    self.cells.resize(width * height, MatchState::Unvisited);
  }

  pub fn width(&self) -> usize {
    self.width
  }

  pub fn height(&self) -> usize {
    self.height
  }

  pub fn get(&self, x: usize, y: usize) -> MatchState {
    self.cells[y * self.width + x]
  }

  fn record(&mut self, x: usize, y: usize, state: MatchState) {
    let cell = &mut self.cells[y * self.width + x];
    debug_assert_eq!(*cell, MatchState::Unvisited, "像素 ({x}, {y}) 被重复访问");
    *cell = state;
  }

  /// 按行优先遍历 `(x, y, state)`
  pub fn iter(&self) -> impl Iterator<Item = (usize, usize, MatchState)> + '_ {
    let width = self.width.max(1);
    self
      .cells
      .iter()
      .enumerate()
      .map(move |(i, state)| (i % width, i / width, *state))
  }

  pub fn count(&self, state: MatchState) -> usize {
    self.cells.iter().filter(|s| **s == state).count()
  }
}

/// 尺寸度量方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMode {
  /// 匹配像素数
  Surface,
  /// 水平跨度与垂直跨度之和
  #[default]
  Perimeter,
}

impl FromStr for SizeMode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "surface" | "area" => Ok(SizeMode::Surface),
      "perimeter" | "width" | "span" => Ok(SizeMode::Perimeter),
      _ => Err(ConfigError::InvalidParameter {
        key: "size".to_string(),
        value: s.to_string(),
      }),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanResult {
  Found { x: i32, y: i32, extent: i32 },
  NotFound,
}

impl ScanResult {
  pub fn is_found(&self) -> bool {
    matches!(self, ScanResult::Found { .. })
  }

  /// 质心坐标，未找到时为 [`NOT_FOUND`]
  pub fn position(&self) -> (i32, i32) {
    match self {
      ScanResult::Found { x, y, .. } => (*x, *y),
      ScanResult::NotFound => NOT_FOUND,
    }
  }

  pub fn extent(&self) -> i32 {
    match self {
      ScanResult::Found { extent, .. } => *extent,
      ScanResult::NotFound => 0,
    }
  }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
  top: i32,
  right: i32,
  bottom: i32,
  left: i32,
}

impl Bounds {
  fn at(point: (i32, i32)) -> Self {
    Self {
      top: point.1,
      right: point.0,
      bottom: point.1,
      left: point.0,
    }
  }

  fn update(&mut self, edge: Edge, x: i32, y: i32) {
    match edge {
      Edge::Top => self.top = y,
      Edge::Right => self.right = x,
      Edge::Bottom => self.bottom = y,
      Edge::Left => self.left = x,
    }
  }

  fn span(&self) -> i32 {
    (self.right - self.left) + (self.bottom - self.top)
  }
}

#[derive(Debug, Clone)]
pub struct SpiralTracker {
  matcher: ColorMatcher,
  locator: ObjectLocator,
  size_mode: SizeMode,
  radius_cap: Option<u32>,
  map: MatchMap,
}

impl SpiralTracker {
  pub fn new(matcher: ColorMatcher, size_mode: SizeMode) -> Self {
    Self {
      matcher,
      locator: ObjectLocator::new(matcher),
      size_mode,
      radius_cap: None,
      map: MatchMap::default(),
    }
  }

  /// 同时限制粗扫描与细扫描的最大半径
  pub fn with_radius_cap(mut self, cap: Option<u32>) -> Self {
    self.radius_cap = cap;
    self.locator = self.locator.with_radius_cap(cap);
    self
  }

  pub fn size_mode(&self) -> SizeMode {
    self.size_mode
  }

  /// 最近一次扫描的访问记录
  pub fn match_map(&self) -> &MatchMap {
    &self.map
  }

  pub fn track(
    &mut self,
    view: &FrameView<'_>,
    seed: (i32, i32),
    target: &Chroma,
    fuzziness: u32,
    min_match_count: u32,
  ) -> ScanResult {
    let (width, height) = (view.width(), view.height());
    self.map.reset(width, height);
    // 边界从种子开始，不随重新捕获移动
    let mut bounds = Bounds::at(seed);

    let seed_matches = view
      .get(seed.0, seed.1)
      .is_some_and(|color| self.matcher.matches_chroma(color, target, fuzziness));

    let (center, mut z) = if seed_matches {
      (seed, 1u32)
    } else {
      match self.locator.locate(view, seed, target, fuzziness) {
        Some(center) => (center, 0),
        None => return ScanResult::NotFound,
      }
    };

    let scanner =
      RingScanner::new(center, width, height, FINE_STEP).with_radius_cap(self.radius_cap);
    let (mut sum_x, mut sum_y) = (0i64, 0i64);
    let mut hit = true;
    let mut radius = 1;

    while (hit || z < min_match_count) && radius < scanner.max_radius() {
      hit = false;
      for p in scanner.ring(radius) {
        let (x, y) = (p.x as usize, p.y as usize);
        if self
          .matcher
          .matches_chroma(view.sample(x, y), target, fuzziness)
        {
          self.map.record(x, y, MatchState::Matched);
          z += 1;
          hit = true;
          sum_x += p.x as i64;
          sum_y += p.y as i64;
          bounds.update(p.edge, p.x, p.y);
        } else {
          self.map.record(x, y, MatchState::Rejected);
        }
      }
      radius += 1;
    }

    debug!(
      "螺旋扫描: 中心 {:?}, 止于半径 {}, 匹配 {} 个像素",
      center, radius, z
    );

    if z == 0 || z < min_match_count {
      return ScanResult::NotFound;
    }

    let extent = match self.size_mode {
      SizeMode::Surface => z as i32,
      SizeMode::Perimeter => bounds.span(),
    };
    ScanResult::Found {
      x: (sum_x / z as i64) as i32,
      y: (sum_y / z as i64) as i32,
      extent,
    }
  }

  /// 将最近一次扫描的访问记录写回帧
  pub fn highlight(&self, frame: &mut FrameViewMut<'_>) {
    for (x, y, state) in self.map.iter() {
      if x >= frame.width() || y >= frame.height() {
        continue;
      }
      match state {
        MatchState::Matched => frame.poke(x, y, MATCHED_CHANNEL, u8::MAX),
        MatchState::Rejected => frame.poke(x, y, REJECTED_CHANNEL, u8::MAX),
        MatchState::Unvisited => {}
      }
    }
  }
}
