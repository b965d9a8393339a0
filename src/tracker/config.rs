// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/config.rs - 追踪参数配置
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

//! # 追踪配置
//!
//! 配置可以来自默认值、JSON 文件或 `track://` URL。URL 的路径部分（如果有）
//! 指向一个 JSON 配置文件，查询参数再覆盖其中的字段：
//!
//! ```text
//! track:///etc/zhuise/red.json?fuzziness=30&min-z=20&match=absolute&no-mirror
//! ```

use std::{collections::HashMap, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};
use url::Url;

use super::{color::Color, color::MatchMode, spiral::SizeMode};
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("URI scheme 不匹配: 期望 '{expected}', 实际 '{found}'")]
  SchemeMismatch {
    expected: &'static str,
    found: String,
  },
  #[error("模糊度必须大于 0")]
  InvalidFuzziness,
  #[error("最小匹配数必须大于 0")]
  InvalidMinMatchCount,
  #[error("运动结束阈值 {end} 不能大于起始阈值 {start}")]
  InvalidMovementThresholds { start: u32, end: u32 },
  #[error("无法解析颜色: {0}")]
  InvalidColor(String),
  #[error("参数 {key} 的取值无效: {value}")]
  InvalidParameter { key: String, value: String },
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
  /// 目标颜色
  pub target: Color,
  /// L1 距离阈值，严格小于该值才算匹配
  pub fuzziness: u32,
  pub match_mode: MatchMode,
  pub size_mode: SizeMode,
  /// 匹配像素数低于该值时视为未找到
  pub min_match_count: u32,
  /// 环半径上限，不设置时覆盖整帧
  pub max_radius: Option<u32>,
  /// 首帧的追踪位置
  pub seed: (i32, i32),
  /// 在追踪状态与下一帧种子之间做水平镜像
  pub mirror: bool,
  /// 将匹配结果写入帧
  pub highlight: bool,
  /// 速度（像素/帧）超过该值时开始一次运动
  pub movement_start_threshold: u32,
  /// 速度低于该值时结束运动
  pub movement_end_threshold: u32,
  /// 速度计算包含尺寸度量的变化
  pub velocity_3d: bool,
}

impl Default for TrackerConfig {
  fn default() -> Self {
    Self {
      target: Color::new(255, 0, 0),
      fuzziness: 50,
      match_mode: MatchMode::default(),
      size_mode: SizeMode::default(),
      min_match_count: 50,
      max_radius: None,
      seed: (0, 0),
      mirror: true,
      highlight: false,
      movement_start_threshold: 20,
      movement_end_threshold: 5,
      velocity_3d: false,
    }
  }
}

impl TrackerConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.fuzziness == 0 {
      return Err(ConfigError::InvalidFuzziness);
    }
    if self.min_match_count == 0 {
      return Err(ConfigError::InvalidMinMatchCount);
    }
    if self.movement_end_threshold > self.movement_start_threshold {
      return Err(ConfigError::InvalidMovementThresholds {
        start: self.movement_start_threshold,
        end: self.movement_end_threshold,
      });
    }
    Ok(())
  }

  pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let content = fs::read_to_string(path.as_ref())?;
    let config: TrackerConfig = serde_json::from_str(&content)?;
    config.validate()?;
    info!("已从 {} 加载追踪配置", path.as_ref().display());
    Ok(config)
  }

  pub fn to_json(&self) -> Result<String, ConfigError> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  /// 单行摘要，用于日志
  pub fn summary(&self) -> String {
    format!(
      "目标颜色 {} 模糊度 {} 模式 {:?}/{:?} 最小匹配 {} 镜像 {}",
      self.target,
      self.fuzziness,
      self.match_mode,
      self.size_mode,
      self.min_match_count,
      self.mirror
    )
  }

  fn apply_query(&mut self, query: &HashMap<String, String>) -> Result<(), ConfigError> {
    fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
      value.parse::<T>().map_err(|_| ConfigError::InvalidParameter {
        key: key.to_string(),
        value: value.to_string(),
      })
    }

    for (key, value) in query {
      match key.as_str() {
        "color" | "target" => self.target = value.parse()?,
        "fuzziness" => self.fuzziness = parse(key, value)?,
        "min-z" | "min_match_count" => self.min_match_count = parse(key, value)?,
        "match" => self.match_mode = value.parse()?,
        "size" => self.size_mode = value.parse()?,
        "max-radius" => self.max_radius = Some(parse(key, value)?),
        "seed" => {
          let (x, y) = value
            .split_once(',')
            .ok_or_else(|| ConfigError::InvalidParameter {
              key: key.clone(),
              value: value.clone(),
            })?;
          self.seed = (parse(key, x.trim())?, parse(key, y.trim())?);
        }
        "highlight" => self.highlight = value.is_empty() || parse(key, value)?,
        "mirror" => self.mirror = value.is_empty() || parse(key, value)?,
        "no-mirror" => self.mirror = false,
        "smov" | "movement-start" => self.movement_start_threshold = parse(key, value)?,
        "emov" | "movement-end" => self.movement_end_threshold = parse(key, value)?,
        "velocity-3d" => self.velocity_3d = value.is_empty() || parse(key, value)?,
        _ => {
          return Err(ConfigError::InvalidParameter {
            key: key.clone(),
            value: value.clone(),
          });
        }
      }
    }
    Ok(())
  }
}

impl FromUrl for TrackerConfig {
  type Error = ConfigError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme 不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ConfigError::SchemeMismatch {
        expected: Self::SCHEME,
        found: url.scheme().to_string(),
      });
    }

    let mut config = match url.path() {
      "" | "/" => TrackerConfig::default(),
      path => TrackerConfig::load_json(path)?,
    };

    let query: HashMap<String, String> = url.query_pairs().into_owned().collect();
    config.apply_query(&query)?;
    config.validate()?;
    Ok(config)
  }
}

impl FromUrlWithScheme for TrackerConfig {
  const SCHEME: &'static str = "track";
}
