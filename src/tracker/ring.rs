// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/ring.rs - 同心方环遍历
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

/// 粗扫描步长，用于首次定位
pub const COARSE_STEP: usize = 4;
/// 细扫描步长
pub const FINE_STEP: usize = 1;

/// 方环的四条边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
  Top,
  Right,
  Bottom,
  Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingPoint {
  pub x: i32,
  pub y: i32,
  pub edge: Edge,
}

/// 覆盖整帧所需的环半径上界（不含）
pub fn bound_radius(center: (i32, i32), width: usize, height: usize) -> i32 {
  let (cx, cy) = center;
  let (w, h) = (width as i32, height as i32);
  cx.max(w - cx).max(cy).max(h - cy)
}

/// 以某点为中心、按切比雪夫半径逐环向外遍历
///
/// 对半径 `r` 的环，偏移 `i` 取 `[-r, r)` 中按步长递增的值，每个 `i` 依次产生
/// 上边 `(cx+i, cy-r)`、右边 `(cx+r, cy+i)`、下边 `(cx-i, cy+r)`、左边
/// `(cx-r, cy-i)` 四个候选点。步长为 1 时四条边恰好不重不漏地覆盖整个环。
/// 帧外的点直接跳过。
#[derive(Debug, Clone, Copy)]
pub struct RingScanner {
  cx: i32,
  cy: i32,
  width: i32,
  height: i32,
  step: usize,
  max_radius: i32,
}

impl RingScanner {
  pub fn new(center: (i32, i32), width: usize, height: usize, step: usize) -> Self {
    Self {
      cx: center.0,
      cy: center.1,
      width: width as i32,
      height: height as i32,
      step: step.max(1),
      max_radius: bound_radius(center, width, height),
    }
  }

  /// 进一步限制最大半径
  pub fn with_radius_cap(mut self, cap: Option<u32>) -> Self {
    if let Some(cap) = cap {
      self.max_radius = self.max_radius.min(cap.min(i32::MAX as u32) as i32);
    }
    self
  }

  pub fn center(&self) -> (i32, i32) {
    (self.cx, self.cy)
  }

  pub fn max_radius(&self) -> i32 {
    self.max_radius
  }

  /// 所有待遍历的半径，从 1 开始
  pub fn radii(&self) -> std::ops::Range<i32> {
    1..self.max_radius
  }

  pub fn ring(&self, radius: i32) -> impl Iterator<Item = RingPoint> + use<> {
    let Self {
      cx,
      cy,
      width,
      height,
      step,
      ..
    } = *self;

    (-radius..radius)
      .step_by(step)
      .flat_map(move |i| {
        [
          RingPoint {
            x: cx + i,
            y: cy - radius,
            edge: Edge::Top,
          },
          RingPoint {
            x: cx + radius,
            y: cy + i,
            edge: Edge::Right,
          },
          RingPoint {
            x: cx - i,
            y: cy + radius,
            edge: Edge::Bottom,
          },
          RingPoint {
            x: cx - radius,
            y: cy - i,
            edge: Edge::Left,
          },
        ]
      })
      .filter(move |p| p.x >= 0 && p.x < width && p.y >= 0 && p.y < height)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn test_bound_radius() {
    assert_eq!(bound_radius((0, 0), 100, 100), 100);
    assert_eq!(bound_radius((50, 50), 100, 100), 50);
    assert_eq!(bound_radius((10, 70), 100, 80), 90);
    assert_eq!(bound_radius((100, 0), 100, 100), 100);
  }

  #[test]
  fn test_radius_cap() {
    let scanner = RingScanner::new((50, 50), 100, 100, FINE_STEP).with_radius_cap(Some(10));
    assert_eq!(scanner.max_radius(), 10);
    assert_eq!(scanner.radii(), 1..10);

    let scanner = RingScanner::new((50, 50), 100, 100, FINE_STEP).with_radius_cap(Some(500));
    assert_eq!(scanner.max_radius(), 50);
  }

  #[test]
  fn test_first_ring_order() {
    let scanner = RingScanner::new((5, 5), 20, 20, FINE_STEP);
    let points: Vec<(i32, i32, Edge)> = scanner.ring(1).map(|p| (p.x, p.y, p.edge)).collect();
    assert_eq!(
      points,
      vec![
        (4, 4, Edge::Top),
        (6, 4, Edge::Right),
        (6, 6, Edge::Bottom),
        (4, 6, Edge::Left),
        (5, 4, Edge::Top),
        (6, 5, Edge::Right),
        (5, 6, Edge::Bottom),
        (4, 5, Edge::Left),
      ]
    );
  }

  #[test]
  fn test_fine_rings_cover_square_exactly_once() {
    let center = (20, 20);
    let scanner = RingScanner::new(center, 64, 64, FINE_STEP);
    let radius = 7;

    let mut seen = HashSet::new();
    for r in 1..=radius {
      let ring: Vec<RingPoint> = scanner.ring(r).collect();
      assert_eq!(ring.len(), 8 * r as usize);
      for p in ring {
        assert_eq!((p.x - center.0).abs().max((p.y - center.1).abs()), r);
        assert!(seen.insert((p.x, p.y)), "重复访问 ({}, {})", p.x, p.y);
      }
    }

    let side = 2 * radius as usize + 1;
    assert_eq!(seen.len(), side * side - 1);
    assert!(!seen.contains(&center));
  }

  #[test]
  fn test_edges_of_points() {
    let scanner = RingScanner::new((10, 10), 32, 32, FINE_STEP);
    for p in scanner.ring(3) {
      match p.edge {
        Edge::Top => assert_eq!(p.y, 7),
        Edge::Right => assert_eq!(p.x, 13),
        Edge::Bottom => assert_eq!(p.y, 13),
        Edge::Left => assert_eq!(p.x, 7),
      }
    }
  }

  #[test]
  fn test_out_of_frame_points_are_skipped() {
    let scanner = RingScanner::new((0, 0), 10, 10, FINE_STEP);
    let points: Vec<RingPoint> = scanner.ring(2).collect();
    // 只有右边和下边落在帧内
    assert_eq!(points.len(), 5);
    assert!(points.iter().all(|p| p.x >= 0 && p.y >= 0));
    assert!(
      points
        .iter()
        .all(|p| matches!(p.edge, Edge::Right | Edge::Bottom))
    );
  }

  #[test]
  fn test_coarse_step() {
    let scanner = RingScanner::new((50, 50), 100, 100, COARSE_STEP);
    // i 取 -8, -4, 0, 4
    assert_eq!(scanner.ring(8).count(), 16);
    assert_eq!(scanner.ring(1).count(), 4);
  }
}
