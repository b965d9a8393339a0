// 该文件是 Zhuise （追色） 项目的一部分。
// src/output/telemetry.rs - 追踪遥测输出
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

//! 每帧一行 JSON，字段与 [`TrackReport`] 相同。
//!
//! - `telemetry:` 或 `telemetry:-` 写到标准输出
//! - `telemetry:///var/log/track.jsonl` 追加写入文件

use std::{
  fs::OpenOptions,
  io::{self, Write},
  sync::Mutex,
};

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{FromUrl, FromUrlWithScheme, frame::RgbFrame, output::Render, tracker::TrackReport};

#[derive(Error, Debug)]
pub enum TelemetryOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("I/O 错误: {0}")]
  IoError(#[from] io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("遥测输出锁已损坏")]
  Poisoned,
}

pub struct TelemetryOutput {
  writer: Mutex<Box<dyn Write + Send>>,
}

impl FromUrlWithScheme for TelemetryOutput {
  const SCHEME: &'static str = "telemetry";
}

impl FromUrl for TelemetryOutput {
  type Error = TelemetryOutputError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(TelemetryOutputError::SchemeMismatch);
    }

    let writer: Box<dyn Write + Send> = match uri.path() {
      "" | "-" | "/" => Box::new(io::stdout()),
      path => {
        info!("遥测输出到文件: {}", path);
        Box::new(OpenOptions::new().create(true).append(true).open(path)?)
      }
    };
    Ok(Self::from_writer(writer))
  }
}

impl TelemetryOutput {
  pub fn from_writer(writer: Box<dyn Write + Send>) -> Self {
    Self {
      writer: Mutex::new(writer),
    }
  }
}

impl Render<RgbFrame, TrackReport> for TelemetryOutput {
  type Error = TelemetryOutputError;

  fn render_result(&self, _frame: &RgbFrame, result: &TrackReport) -> Result<(), Self::Error> {
    let mut writer = self
      .writer
      .lock()
      .map_err(|_| TelemetryOutputError::Poisoned)?;
    serde_json::to_writer(&mut *writer, result)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tracker::{Color, ScanResult, SizeMode};

  #[test]
  fn test_json_lines() {
    let path = std::env::temp_dir().join(format!("zhuise-telemetry-{}.jsonl", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let mut url = Url::parse("telemetry:///").unwrap();
    url.set_path(path.to_str().unwrap());
    let output = TelemetryOutput::from_url(&url).unwrap();

    let frame = RgbFrame::filled(2, 2, Color::default());
    for (i, result) in [
      ScanResult::Found {
        x: 1,
        y: 2,
        extent: 3,
      },
      ScanResult::NotFound,
    ]
    .into_iter()
    .enumerate()
    {
      let report = TrackReport {
        frame_index: i as u64,
        timestamp_ms: 0,
        track_x: 1,
        track_y: 2,
        track_z: result.extent(),
        result,
        size_mode: SizeMode::Surface,
        motion: None,
        elapsed_us: 10,
      };
      output.render_result(&frame, &report).unwrap();
    }
    drop(output);

    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    let lines: Vec<serde_json::Value> = content
      .lines()
      .map(|l| serde_json::from_str(l).unwrap())
      .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["track_z"], 3);
    assert_eq!(lines[0]["result"]["status"], "found");
    assert_eq!(lines[1]["frame_index"], 1);
    assert_eq!(lines[1]["result"]["status"], "not_found");
  }
}
