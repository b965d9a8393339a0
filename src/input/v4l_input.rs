// 该文件是 Zhuise （追色） 项目的一部分。
// src/input/v4l_input.rs - V4L2 摄像头输入
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

use std::{collections::HashMap, time::Instant};

use thiserror::Error;
use tracing::{error, info};
use url::Url;
use v4l::{
  Device, FourCC, buffer::Type, io::mmap::Stream, io::traits::CaptureStream, video::Capture,
};

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FrameError, FrameLayout, RGB_CHANNELS, RgbFrame},
};

#[derive(Error, Debug)]
pub enum V4lInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("不支持的像素格式: {0}")]
  UnsupportedPixelFormat(String),
  #[error("帧错误: {0}")]
  FrameError(#[from] FrameError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PixelFormat {
  Yuyv,
  Rgb3,
}

impl PixelFormat {
  fn fourcc(&self) -> FourCC {
    match self {
      PixelFormat::Yuyv => FourCC::new(b"YUYV"),
      PixelFormat::Rgb3 => FourCC::new(b"RGB3"),
    }
  }
}

/// V4L2 采集，使用内存映射缓冲区
///
/// `v4l:///dev/video0?width=640&height=480&format=yuyv`
pub struct V4lInput {
  // 必须先于 device 释放
  stream: Stream<'static>,
  device: Device,
  pixel_format: PixelFormat,
  width: usize,
  height: usize,
  stride: usize,
  frame_index: u64,
  start_time: Instant,
}

impl FromUrlWithScheme for V4lInput {
  const SCHEME: &'static str = "v4l";
}

impl FromUrl for V4lInput {
  type Error = V4lInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(V4lInputError::SchemeMismatch);
    }

    let device_path = match url.path() {
      "" | "/" => "/dev/video0",
      path => path,
    };
    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let width = query
      .get("width")
      .and_then(|v| v.parse::<u32>().ok())
      .unwrap_or(640);
    let height = query
      .get("height")
      .and_then(|v| v.parse::<u32>().ok())
      .unwrap_or(480);
    let pixel_format = match query.get("format").map(|s| s.to_ascii_lowercase()).as_deref() {
      None | Some("yuyv") => PixelFormat::Yuyv,
      Some("rgb3") | Some("rgb") => PixelFormat::Rgb3,
      Some(other) => return Err(V4lInputError::UnsupportedPixelFormat(other.to_string())),
    };

    Self::open(device_path, width, height, pixel_format)
  }
}

impl V4lInput {
  fn open(
    device_path: &str,
    width: u32,
    height: u32,
    pixel_format: PixelFormat,
  ) -> Result<Self, V4lInputError> {
    let device = Device::with_path(device_path)?;

    let mut format = device.format()?;
    format.width = width;
    format.height = height;
    format.fourcc = pixel_format.fourcc();
    let format = device.set_format(&format)?;
    if format.fourcc != pixel_format.fourcc() {
      return Err(V4lInputError::UnsupportedPixelFormat(format.fourcc.to_string()));
    }

    info!(
      "打开摄像头 {}: {}x{} {} 行跨度 {}",
      device_path, format.width, format.height, format.fourcc, format.stride
    );

    let stream = Stream::with_buffers(&device, Type::VideoCapture, 4)?;

    Ok(Self {
      stream,
      device,
      pixel_format,
      width: format.width as usize,
      height: format.height as usize,
      stride: format.stride as usize,
      frame_index: 0,
      start_time: Instant::now(),
    })
  }

  pub fn device(&self) -> &Device {
    &self.device
  }

  fn capture_frame(&mut self) -> Result<RgbFrame, V4lInputError> {
    let (buffer, _meta) = self.stream.next()?;
    let frame = match self.pixel_format {
      PixelFormat::Rgb3 => {
        // 保留设备的行跨度
        let layout = FrameLayout {
          width: self.width,
          height: self.height,
          stride: self.stride,
          bytes_per_pixel: RGB_CHANNELS,
        };
        RgbFrame::from_raw(buffer.to_vec(), layout)?
      }
      PixelFormat::Yuyv => {
        let rgb = yuyv_to_rgb(buffer, self.width, self.height, self.stride);
        RgbFrame::from_raw(rgb, FrameLayout::packed(self.width, self.height))?
      }
    };

    let timestamp_ms = self.start_time.elapsed().as_millis() as u64;
    let frame = frame.with_index(self.frame_index, timestamp_ms);
    self.frame_index += 1;
    Ok(frame)
  }
}

/// YUYV 4:2:2 转为紧密排列的 RGB24
fn yuyv_to_rgb(yuyv: &[u8], width: usize, height: usize, stride: usize) -> Vec<u8> {
  let mut rgb = Vec::with_capacity(width * height * RGB_CHANNELS);

  let convert = |y: f32, u: f32, v: f32| {
    [
      (y + 1.402 * v).clamp(0.0, 255.0) as u8,
      (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8,
      (y + 1.772 * u).clamp(0.0, 255.0) as u8,
    ]
  };

  for row in yuyv.chunks(stride.max(1)).take(height) {
    let row = &row[..(width * 2).min(row.len())];
    for chunk in row.chunks_exact(4) {
      let y0 = chunk[0] as f32;
      let u = chunk[1] as f32 - 128.0;
      let y1 = chunk[2] as f32;
      let v = chunk[3] as f32 - 128.0;
      rgb.extend_from_slice(&convert(y0, u, v));
      rgb.extend_from_slice(&convert(y1, u, v));
    }
  }

  rgb
}

impl Iterator for V4lInput {
  type Item = RgbFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self.capture_frame() {
      Ok(frame) => Some(frame),
      Err(e) => {
        error!("无法捕获帧: {}", e);
        None
      }
    }
  }
}
