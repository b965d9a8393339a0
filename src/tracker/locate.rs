// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/locate.rs - 粗扫描重新捕获目标
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

use tracing::debug;

use super::{
  color::{Chroma, ColorMatcher},
  ring::{COARSE_STEP, RingScanner},
};
use crate::frame::FrameView;

/// 从种子点向外逐环粗扫描，返回第一个匹配的像素
#[derive(Debug, Clone, Copy)]
pub struct ObjectLocator {
  matcher: ColorMatcher,
  step: usize,
  radius_cap: Option<u32>,
}

impl ObjectLocator {
  pub fn new(matcher: ColorMatcher) -> Self {
    Self {
      matcher,
      step: COARSE_STEP,
      radius_cap: None,
    }
  }

  pub fn with_step(mut self, step: usize) -> Self {
    self.step = step.max(1);
    self
  }

  pub fn with_radius_cap(mut self, cap: Option<u32>) -> Self {
    self.radius_cap = cap;
    self
  }

  pub fn locate(
    &self,
    view: &FrameView<'_>,
    seed: (i32, i32),
    target: &Chroma,
    fuzziness: u32,
  ) -> Option<(i32, i32)> {
    let scanner = RingScanner::new(seed, view.width(), view.height(), self.step)
      .with_radius_cap(self.radius_cap);

    let found = scanner.radii().find_map(|r| {
      scanner
        .ring(r)
        .find(|p| {
          let color = view.sample(p.x as usize, p.y as usize);
          self.matcher.matches_chroma(color, target, fuzziness)
        })
        .map(|p| (p.x, p.y))
    });

    match found {
      Some((x, y)) => debug!("粗扫描从 {:?} 重新捕获目标于 ({}, {})", seed, x, y),
      None => debug!(
        "粗扫描从 {:?} 出发，半径 {} 内未找到目标",
        seed,
        scanner.max_radius()
      ),
    }
    found
  }
}
