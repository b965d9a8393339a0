// 该文件是 Zhuise （追色） 项目的一部分。
// src/frame.rs - RGB 帧与像素访问
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

use thiserror::Error;

use crate::tracker::Color;

pub const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
  #[error("帧尺寸无效: {width}x{height}")]
  InvalidSize { width: usize, height: usize },
  #[error("每像素字节数无效: {0}（至少为 3）")]
  InvalidBytesPerPixel(usize),
  #[error("行跨度 {stride} 小于一行像素所需的 {min} 字节")]
  InvalidStride { stride: usize, min: usize },
  #[error("缓冲区长度不足: 期望至少 {expected}, 实际 {actual}")]
  BufferTooSmall { expected: usize, actual: usize },
}

/// 帧内存布局
///
/// 像素 `(x, y)` 的首字节位于 `y * stride + x * bytes_per_pixel`，
/// 前三个字节依次为 R、G、B。行跨度可以大于 `width * bytes_per_pixel`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
  pub width: usize,
  pub height: usize,
  pub stride: usize,
  pub bytes_per_pixel: usize,
}

impl FrameLayout {
  /// 紧密排列的 RGB24 布局
  pub fn packed(width: usize, height: usize) -> Self {
    Self {
      width,
      height,
      stride: width * RGB_CHANNELS,
      bytes_per_pixel: RGB_CHANNELS,
    }
  }

  /// 最后一个像素结束处的字节数
  pub fn required_len(&self) -> usize {
    if self.width == 0 || self.height == 0 {
      return 0;
    }
    self.stride * (self.height - 1) + self.width * self.bytes_per_pixel
  }

  pub fn validate(&self, len: usize) -> Result<(), FrameError> {
    if self.width == 0 || self.height == 0 {
      return Err(FrameError::InvalidSize {
        width: self.width,
        height: self.height,
      });
    }
    if self.bytes_per_pixel < RGB_CHANNELS {
      return Err(FrameError::InvalidBytesPerPixel(self.bytes_per_pixel));
    }
    let min = self.width * self.bytes_per_pixel;
    if self.stride < min {
      return Err(FrameError::InvalidStride {
        stride: self.stride,
        min,
      });
    }
    let expected = self.required_len();
    if len < expected {
      return Err(FrameError::BufferTooSmall {
        expected,
        actual: len,
      });
    }
    Ok(())
  }

  #[inline]
  pub fn offset(&self, x: usize, y: usize) -> usize {
    y * self.stride + x * self.bytes_per_pixel
  }

  #[inline]
  pub fn contains(&self, x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
  }
}

/// 只读帧视图
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
  layout: FrameLayout,
  data: &'a [u8],
}

impl<'a> FrameView<'a> {
  pub fn new(data: &'a [u8], layout: FrameLayout) -> Result<Self, FrameError> {
    layout.validate(data.len())?;
    Ok(Self { layout, data })
  }

  pub fn layout(&self) -> FrameLayout {
    self.layout
  }

  pub fn width(&self) -> usize {
    self.layout.width
  }

  pub fn height(&self) -> usize {
    self.layout.height
  }

  #[inline]
  pub fn contains(&self, x: i32, y: i32) -> bool {
    self.layout.contains(x, y)
  }

  /// 读取像素，坐标必须已由调用方检查
  #[inline]
  pub fn sample(&self, x: usize, y: usize) -> Color {
    let offset = self.layout.offset(x, y);
    Color::new(
      self.data[offset],
      self.data[offset + 1],
      self.data[offset + 2],
    )
  }

  pub fn get(&self, x: i32, y: i32) -> Option<Color> {
    self
      .contains(x, y)
      .then(|| self.sample(x as usize, y as usize))
  }
}

/// 可写帧视图，仅用于诊断叠加层
#[derive(Debug)]
pub struct FrameViewMut<'a> {
  layout: FrameLayout,
  data: &'a mut [u8],
}

impl<'a> FrameViewMut<'a> {
  pub fn new(data: &'a mut [u8], layout: FrameLayout) -> Result<Self, FrameError> {
    layout.validate(data.len())?;
    Ok(Self { layout, data })
  }

  pub fn as_view(&self) -> FrameView<'_> {
    FrameView {
      layout: self.layout,
      data: &*self.data,
    }
  }

  pub fn layout(&self) -> FrameLayout {
    self.layout
  }

  pub fn width(&self) -> usize {
    self.layout.width
  }

  pub fn height(&self) -> usize {
    self.layout.height
  }

  #[inline]
  pub fn contains(&self, x: i32, y: i32) -> bool {
    self.layout.contains(x, y)
  }

  #[inline]
  pub fn sample(&self, x: usize, y: usize) -> Color {
    self.as_view().sample(x, y)
  }

  #[inline]
  pub fn write(&mut self, x: usize, y: usize, color: Color) {
    let offset = self.layout.offset(x, y);
    self.data[offset] = color.r;
    self.data[offset + 1] = color.g;
    self.data[offset + 2] = color.b;
  }

  /// 修改单个通道
  #[inline]
  pub fn poke(&mut self, x: usize, y: usize, channel: usize, value: u8) {
    debug_assert!(channel < RGB_CHANNELS);
    let offset = self.layout.offset(x, y);
    self.data[offset + channel] = value;
  }
}

/// 拥有所有权的 RGB 帧，由输入源产生
#[derive(Debug, Clone)]
pub struct RgbFrame {
  data: Box<[u8]>,
  layout: FrameLayout,
  index: u64,
  timestamp_ms: u64,
}

impl RgbFrame {
  pub fn with_shape(height: usize, width: usize) -> Self {
    let layout = FrameLayout::packed(width, height);
    Self {
      data: vec![0u8; layout.stride * height].into_boxed_slice(),
      layout,
      index: 0,
      timestamp_ms: 0,
    }
  }

  pub fn filled(height: usize, width: usize, color: Color) -> Self {
    let mut frame = Self::with_shape(height, width);
    for pixel in frame.data.chunks_exact_mut(RGB_CHANNELS) {
      pixel.copy_from_slice(&[color.r, color.g, color.b]);
    }
    frame
  }

  pub fn from_raw(data: Vec<u8>, layout: FrameLayout) -> Result<Self, FrameError> {
    layout.validate(data.len())?;
    Ok(Self {
      data: data.into_boxed_slice(),
      layout,
      index: 0,
      timestamp_ms: 0,
    })
  }

  pub fn with_index(mut self, index: u64, timestamp_ms: u64) -> Self {
    self.index = index;
    self.timestamp_ms = timestamp_ms;
    self
  }

  pub fn index(&self) -> u64 {
    self.index
  }

  pub fn timestamp_ms(&self) -> u64 {
    self.timestamp_ms
  }

  pub fn layout(&self) -> FrameLayout {
    self.layout
  }

  pub fn width(&self) -> usize {
    self.layout.width
  }

  pub fn height(&self) -> usize {
    self.layout.height
  }

  pub fn view(&self) -> FrameView<'_> {
    FrameView {
      layout: self.layout,
      data: &self.data,
    }
  }

  pub fn view_mut(&mut self) -> FrameViewMut<'_> {
    FrameViewMut {
      layout: self.layout,
      data: &mut self.data,
    }
  }

  /// 以纯色填充矩形区域，超出帧的部分被裁剪
  pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, color: Color) {
    let x_end = (x + width).min(self.layout.width);
    let y_end = (y + height).min(self.layout.height);
    let mut view = self.view_mut();
    for yy in y..y_end {
      for xx in x..x_end {
        view.write(xx, yy, color);
      }
    }
  }
}

impl AsRef<[u8]> for RgbFrame {
  fn as_ref(&self) -> &[u8] {
    &self.data
  }
}

impl AsMut<[u8]> for RgbFrame {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_layout_validation() {
    let layout = FrameLayout::packed(0, 10);
    assert!(matches!(
      layout.validate(100),
      Err(FrameError::InvalidSize { .. })
    ));

    let layout = FrameLayout {
      width: 4,
      height: 2,
      stride: 8,
      bytes_per_pixel: 3,
    };
    assert_eq!(
      layout.validate(100),
      Err(FrameError::InvalidStride { stride: 8, min: 12 })
    );

    let layout = FrameLayout {
      width: 4,
      height: 2,
      stride: 12,
      bytes_per_pixel: 2,
    };
    assert_eq!(layout.validate(100), Err(FrameError::InvalidBytesPerPixel(2)));

    let layout = FrameLayout::packed(4, 2);
    assert_eq!(
      layout.validate(23),
      Err(FrameError::BufferTooSmall {
        expected: 24,
        actual: 23
      })
    );
    assert!(layout.validate(24).is_ok());
  }

  #[test]
  fn test_padded_stride_addressing() {
    // 2x2 帧，每像素 4 字节，每行末尾有 4 字节填充
    let layout = FrameLayout {
      width: 2,
      height: 2,
      stride: 12,
      bytes_per_pixel: 4,
    };
    let data: Vec<u8> = (0..24).collect();
    let view = FrameView::new(&data, layout).unwrap();

    assert_eq!(view.sample(0, 0), Color::new(0, 1, 2));
    assert_eq!(view.sample(1, 0), Color::new(4, 5, 6));
    assert_eq!(view.sample(0, 1), Color::new(12, 13, 14));
    assert_eq!(view.sample(1, 1), Color::new(16, 17, 18));
    assert_eq!(view.get(2, 0), None);
    assert_eq!(view.get(-1, 0), None);
  }

  #[test]
  fn test_short_last_row_is_accepted() {
    // 最后一行不需要完整的行跨度
    let layout = FrameLayout {
      width: 2,
      height: 2,
      stride: 8,
      bytes_per_pixel: 3,
    };
    let data = vec![0u8; 14];
    assert!(FrameView::new(&data, layout).is_ok());
  }

  #[test]
  fn test_write_and_poke() {
    let mut frame = RgbFrame::with_shape(3, 3);
    {
      let mut view = frame.view_mut();
      view.write(1, 1, Color::new(10, 20, 30));
      view.poke(2, 2, 1, 255);
    }
    assert_eq!(frame.view().sample(1, 1), Color::new(10, 20, 30));
    assert_eq!(frame.view().sample(2, 2), Color::new(0, 255, 0));
    assert_eq!(frame.view().sample(0, 0), Color::new(0, 0, 0));
  }

  #[test]
  fn test_fill_rect_clips() {
    let mut frame = RgbFrame::filled(4, 4, Color::new(1, 1, 1));
    frame.fill_rect(2, 2, 10, 10, Color::new(9, 9, 9));
    assert_eq!(frame.view().sample(3, 3), Color::new(9, 9, 9));
    assert_eq!(frame.view().sample(1, 3), Color::new(1, 1, 1));
  }
}
