// 该文件是 Zhuise （追色） 项目的一部分。
// src/output/save_image_file.rs - 保存图像文件
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

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::RgbFrame,
  output::{Render, draw::Draw},
  tracker::TrackReport,
};

/// 每次渲染覆盖写同一个文件
pub struct SaveImageFileOutput {
  path: PathBuf,
  draw: Draw,
}

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    Ok(SaveImageFileOutput {
      path: PathBuf::from(uri.path()),
      draw: Draw::default(),
    })
  }
}

impl SaveImageFileOutput {
  pub fn path(&self) -> &Path {
    &self.path
  }

  fn save_image(&self, image: RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;
    info!("保存图像到文件: {}", self.path.display());
    Ok(())
  }
}

impl Render<RgbFrame, TrackReport> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &RgbFrame, result: &TrackReport) -> Result<(), Self::Error> {
    let image = self.draw.draw_track(frame, result);
    self.save_image(image)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tracker::{Color, ScanResult, SizeMode};

  #[test]
  fn test_save_tracked_frame() {
    let dir = std::env::temp_dir().join(format!("zhuise-save-{}", std::process::id()));
    let path = dir.join("nested").join("out.png");
    let mut url = Url::parse("image:///").unwrap();
    url.set_path(path.to_str().unwrap());

    let output = SaveImageFileOutput::from_url(&url).unwrap();
    assert_eq!(output.path(), path.as_path());

    let frame = RgbFrame::filled(16, 24, Color::new(10, 20, 30));
    let report = TrackReport {
      frame_index: 0,
      timestamp_ms: 0,
      track_x: 12,
      track_y: 8,
      track_z: 16,
      result: ScanResult::Found {
        x: 12,
        y: 8,
        extent: 16,
      },
      size_mode: SizeMode::Surface,
      motion: None,
      elapsed_us: 0,
    };
    output.render_result(&frame, &report).unwrap();

    let saved = image::open(&path).unwrap().to_rgb8();
    assert_eq!(saved.dimensions(), (24, 16));
    assert_eq!(saved.get_pixel(0, 0), &image::Rgb([10, 20, 30]));
    std::fs::remove_dir_all(&dir).unwrap();
  }

  #[test]
  fn test_scheme_mismatch() {
    let url = Url::parse("folder:///tmp/x").unwrap();
    assert!(matches!(
      SaveImageFileOutput::from_url(&url),
      Err(SaveImageFileError::SchemeMismatch(_))
    ));
  }
}
