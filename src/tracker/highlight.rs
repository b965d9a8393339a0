// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/highlight.rs - 全帧颜色高亮与取色
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
  color::{Color, ColorMatcher},
  spiral::{MATCHED_CHANNEL, REJECTED_CHANNEL},
};
use crate::frame::{FrameView, FrameViewMut};

/// 对整帧逐像素匹配并写入高亮，返回匹配像素数
///
/// 用于调试目标颜色与模糊度，与追踪叠加层使用相同的通道约定。
pub fn highlight_color(
  frame: &mut FrameViewMut<'_>,
  matcher: &ColorMatcher,
  target: Color,
  fuzziness: u32,
) -> usize {
  let target = matcher.normalize(target);
  let mut matched = 0;
  for y in 0..frame.height() {
    for x in 0..frame.width() {
      if matcher.matches_chroma(frame.sample(x, y), &target, fuzziness) {
        frame.poke(x, y, MATCHED_CHANNEL, u8::MAX);
        matched += 1;
      } else {
        frame.poke(x, y, REJECTED_CHANNEL, u8::MAX);
      }
    }
  }
  debug!(
    "高亮完成: {} / {} 个像素匹配",
    matched,
    frame.width() * frame.height()
  );
  matched
}

/// 取帧上某点的颜色作为目标颜色
pub fn pick(view: &FrameView<'_>, x: i32, y: i32) -> Option<Color> {
  view.get(x, y)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{frame::RgbFrame, tracker::MatchMode};

  #[test]
  fn test_highlight_color() {
    let mut frame = RgbFrame::filled(10, 10, Color::new(40, 40, 40));
    frame.fill_rect(0, 0, 2, 5, Color::new(30, 30, 200));

    let matcher = ColorMatcher::new(MatchMode::Absolute);
    let count = highlight_color(
      &mut frame.view_mut(),
      &matcher,
      Color::new(30, 30, 200),
      20,
    );
    assert_eq!(count, 10);
    assert_eq!(frame.view().sample(1, 4), Color::new(30, 255, 200));
    assert_eq!(frame.view().sample(2, 4), Color::new(255, 40, 40));
  }

  #[test]
  fn test_pick() {
    let mut frame = RgbFrame::filled(4, 4, Color::new(1, 2, 3));
    frame.fill_rect(3, 3, 1, 1, Color::new(9, 8, 7));
    assert_eq!(pick(&frame.view(), 3, 3), Some(Color::new(9, 8, 7)));
    assert_eq!(pick(&frame.view(), 0, 0), Some(Color::new(1, 2, 3)));
    assert_eq!(pick(&frame.view(), 4, 0), None);
  }
}
