// 该文件是 Zhuise （追色） 项目的一部分。
// src/input/raw_file.rs - 原始帧转储输入
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

use std::{
  collections::HashMap,
  fs::File,
  io::{BufReader, ErrorKind, Read},
  path::Path,
};

use thiserror::Error;
use tracing::{error, info, warn};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::{FrameError, FrameLayout, RGB_CHANNELS, RgbFrame},
};

#[derive(Error, Debug)]
pub enum RawFileInputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("缺少参数: {0}")]
  MissingParameter(&'static str),
  #[error("参数 {key} 的取值无效: {value}")]
  InvalidParameter { key: &'static str, value: String },
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("帧错误: {0}")]
  FrameError(#[from] FrameError),
}

/// 首尾相接的原始帧文件，每帧 `stride * height` 字节
///
/// `raw:///tmp/capture.rgb?width=640&height=480[&stride=1920][&bpp=3]`
pub struct RawFileInput {
  reader: Box<dyn Read + Send>,
  layout: FrameLayout,
  frame_index: u64,
}

impl FromUrlWithScheme for RawFileInput {
  const SCHEME: &'static str = "raw";
}

impl FromUrl for RawFileInput {
  type Error = RawFileInputError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(RawFileInputError::SchemeMismatch);
    }

    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    let param = |key: &'static str| -> Result<Option<usize>, RawFileInputError> {
      query
        .get(key)
        .map(|v| {
          v.parse::<usize>()
            .map_err(|_| RawFileInputError::InvalidParameter {
              key,
              value: v.clone(),
            })
        })
        .transpose()
    };

    let width = param("width")?.ok_or(RawFileInputError::MissingParameter("width"))?;
    let height = param("height")?.ok_or(RawFileInputError::MissingParameter("height"))?;
    let bytes_per_pixel = param("bpp")?.unwrap_or(RGB_CHANNELS);
    let stride = param("stride")?.unwrap_or(width * bytes_per_pixel);

    let layout = FrameLayout {
      width,
      height,
      stride,
      bytes_per_pixel,
    };
    Self::open(url.path(), layout)
  }
}

impl RawFileInput {
  pub fn open<P: AsRef<Path>>(path: P, layout: FrameLayout) -> Result<Self, RawFileInputError> {
    layout.validate(layout.stride * layout.height)?;
    let file = File::open(path.as_ref())?;
    info!(
      "打开原始帧文件 {}: {}x{} 行跨度 {}",
      path.as_ref().display(),
      layout.width,
      layout.height,
      layout.stride
    );
    Ok(Self::from_reader(Box::new(BufReader::new(file)), layout))
  }

  pub fn from_reader(reader: Box<dyn Read + Send>, layout: FrameLayout) -> Self {
    Self {
      reader,
      layout,
      frame_index: 0,
    }
  }

  fn read_frame(&mut self) -> Result<Option<RgbFrame>, RawFileInputError> {
    let frame_size = self.layout.stride * self.layout.height;
    let mut data = vec![0u8; frame_size];
    let mut filled = 0;
    while filled < frame_size {
      match self.reader.read(&mut data[filled..]) {
        Ok(0) => break,
        Ok(n) => filled += n,
        Err(e) if e.kind() == ErrorKind::Interrupted => continue,
        Err(e) => return Err(e.into()),
      }
    }

    if filled == 0 {
      return Ok(None);
    }
    if filled < frame_size {
      warn!(
        "文件末尾有不完整的帧（{} / {} 字节），已忽略",
        filled, frame_size
      );
      return Ok(None);
    }

    let frame = RgbFrame::from_raw(data, self.layout)?.with_index(self.frame_index, 0);
    self.frame_index += 1;
    Ok(Some(frame))
  }
}

impl Iterator for RawFileInput {
  type Item = RgbFrame;

  fn next(&mut self) -> Option<Self::Item> {
    match self.read_frame() {
      Ok(frame) => frame,
      Err(e) => {
        error!("读取原始帧失败: {}", e);
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tracker::Color;

  #[test]
  fn test_padded_frames_with_partial_tail() {
    // 2x2，每像素 4 字节，行跨度 10
    let layout = FrameLayout {
      width: 2,
      height: 2,
      stride: 10,
      bytes_per_pixel: 4,
    };
    let mut bytes = Vec::new();
    for value in [10u8, 20] {
      let mut frame = vec![0u8; 20];
      frame[10..13].copy_from_slice(&[value, value + 1, value + 2]);
      bytes.extend(frame);
    }
    bytes.extend([1, 2, 3]);

    let input = RawFileInput::from_reader(Box::new(std::io::Cursor::new(bytes)), layout);
    let frames: Vec<RgbFrame> = input.collect();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].index(), 1);
    assert_eq!(frames[0].view().sample(0, 1), Color::new(10, 11, 12));
    assert_eq!(frames[1].view().sample(0, 1), Color::new(20, 21, 22));
    assert_eq!(frames[1].view().sample(1, 1), Color::new(0, 0, 0));
  }

  #[test]
  fn test_from_url() {
    let path = std::env::temp_dir().join(format!("zhuise-raw-{}.rgb", std::process::id()));
    std::fs::write(&path, vec![7u8; 4 * 3 * 3]).unwrap();
    let mut url = Url::parse("raw:///").unwrap();
    url.set_path(path.to_str().unwrap());
    url.set_query(Some("width=4&height=3"));

    let frames: Vec<RgbFrame> = RawFileInput::from_url(&url).unwrap().collect();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].view().sample(3, 2), Color::new(7, 7, 7));
  }

  #[test]
  fn test_missing_parameters() {
    let url = Url::parse("raw:///tmp/none.rgb?width=4").unwrap();
    assert!(matches!(
      RawFileInput::from_url(&url),
      Err(RawFileInputError::MissingParameter("height"))
    ));
    let url = Url::parse("raw:///tmp/none.rgb?width=4&height=x").unwrap();
    assert!(matches!(
      RawFileInput::from_url(&url),
      Err(RawFileInputError::InvalidParameter { key: "height", .. })
    ));
  }
}
