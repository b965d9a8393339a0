// 该文件是 Zhuise （追色） 项目的一部分。
// src/tracker/color.rs - 颜色匹配
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

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

impl Color {
  pub const fn new(r: u8, g: u8, b: u8) -> Self {
    Self { r, g, b }
  }

  #[inline]
  pub fn channels(&self) -> [i32; 3] {
    [self.r as i32, self.g as i32, self.b as i32]
  }
}

impl From<[u8; 3]> for Color {
  fn from([r, g, b]: [u8; 3]) -> Self {
    Self { r, g, b }
  }
}

impl From<Color> for [u8; 3] {
  fn from(color: Color) -> Self {
    [color.r, color.g, color.b]
  }
}

impl fmt::Display for Color {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{},{},{}", self.r, self.g, self.b)
  }
}

/// 支持 `r,g,b` 与 `#rrggbb` 两种写法
impl FromStr for Color {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let invalid = || ConfigError::InvalidColor(s.to_string());
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
      if hex.len() != 6 {
        return Err(invalid());
      }
      let value = u32::from_str_radix(hex, 16).map_err(|_| invalid())?;
      return Ok(Color::new(
        (value >> 16) as u8,
        (value >> 8) as u8,
        value as u8,
      ));
    }

    let channels = s
      .split(',')
      .map(|c| c.trim().parse::<u8>())
      .collect::<Result<Vec<_>, _>>()
      .map_err(|_| invalid())?;
    match channels.as_slice() {
      [r, g, b] => Ok(Color::new(*r, *g, *b)),
      _ => Err(invalid()),
    }
  }
}

/// 光度模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
  /// 直接比较通道值
  Absolute,
  /// 先减去三通道的整数均值，对整体亮度不敏感
  #[default]
  Relative,
}

impl FromStr for MatchMode {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "absolute" | "abs" => Ok(MatchMode::Absolute),
      "relative" | "rel" => Ok(MatchMode::Relative),
      _ => Err(ConfigError::InvalidParameter {
        key: "match".to_string(),
        value: s.to_string(),
      }),
    }
  }
}

/// 按匹配模式归一化后的颜色向量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chroma(pub [i32; 3]);

impl Chroma {
  #[inline]
  fn distance(&self, other: &Chroma) -> u32 {
    self
      .0
      .iter()
      .zip(other.0.iter())
      .map(|(a, b)| a.abs_diff(*b))
      .sum()
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorMatcher {
  mode: MatchMode,
}

impl ColorMatcher {
  pub fn new(mode: MatchMode) -> Self {
    Self { mode }
  }

  pub fn mode(&self) -> MatchMode {
    self.mode
  }

  #[inline]
  pub fn normalize(&self, color: Color) -> Chroma {
    let [r, g, b] = color.channels();
    match self.mode {
      MatchMode::Absolute => Chroma([r, g, b]),
      MatchMode::Relative => {
        let avg = (r + g + b) / 3;
        Chroma([r - avg, g - avg, b - avg])
      }
    }
  }

  /// 两色的 L1 距离严格小于 `fuzziness` 时匹配
  pub fn matches(&self, sampled: Color, target: Color, fuzziness: u32) -> bool {
    self.matches_chroma(sampled, &self.normalize(target), fuzziness)
  }

  /// 与 [`ColorMatcher::matches`] 相同，目标已预先归一化
  #[inline]
  pub fn matches_chroma(&self, sampled: Color, target: &Chroma, fuzziness: u32) -> bool {
    self.normalize(sampled).distance(target) < fuzziness
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  fn color() -> impl Strategy<Value = Color> {
    any::<[u8; 3]>().prop_map(Color::from)
  }

  fn mode() -> impl Strategy<Value = MatchMode> {
    prop_oneof![Just(MatchMode::Absolute), Just(MatchMode::Relative)]
  }

  proptest! {
    #[test]
    fn color_matches_itself(c in color(), f in 1u32..1000, m in mode()) {
      prop_assert!(ColorMatcher::new(m).matches(c, c, f));
    }

    #[test]
    fn zero_fuzziness_never_matches(a in color(), b in color(), m in mode()) {
      prop_assert!(!ColorMatcher::new(m).matches(a, b, 0));
    }

    #[test]
    fn relative_mode_ignores_uniform_brightness(
      a in prop::array::uniform3(0u8..=200),
      b in prop::array::uniform3(0u8..=200),
      k in 0u8..=55,
      f in 0u32..300,
    ) {
      let matcher = ColorMatcher::new(MatchMode::Relative);
      let shift = |c: [u8; 3]| Color::new(c[0] + k, c[1] + k, c[2] + k);
      prop_assert_eq!(
        matcher.matches(Color::from(a), Color::from(b), f),
        matcher.matches(shift(a), shift(b), f)
      );
    }

    #[test]
    fn prepared_target_agrees(a in color(), b in color(), f in 0u32..600, m in mode()) {
      let matcher = ColorMatcher::new(m);
      let target = matcher.normalize(b);
      prop_assert_eq!(matcher.matches(a, b, f), matcher.matches_chroma(a, &target, f));
    }
  }

  #[test]
  fn test_threshold_is_strict() {
    let matcher = ColorMatcher::new(MatchMode::Absolute);
    let a = Color::new(100, 100, 100);
    let b = Color::new(110, 95, 100);
    // 距离为 15
    assert!(!matcher.matches(a, b, 15));
    assert!(matcher.matches(a, b, 16));
  }

  #[test]
  fn test_relative_average_truncates() {
    let matcher = ColorMatcher::new(MatchMode::Relative);
    // (10 + 0 + 0) / 3 = 3
    assert_eq!(matcher.normalize(Color::new(10, 0, 0)), Chroma([7, -3, -3]));
    // 灰色归一化后为零向量
    assert_eq!(matcher.normalize(Color::new(77, 77, 77)), Chroma([0, 0, 0]));
  }

  #[test]
  fn test_relative_mode_matches_across_brightness() {
    let dark = Color::new(60, 20, 20);
    let bright = Color::new(200, 160, 160);
    assert!(ColorMatcher::new(MatchMode::Relative).matches(dark, bright, 5));
    assert!(!ColorMatcher::new(MatchMode::Absolute).matches(dark, bright, 5));
  }

  #[test]
  fn test_parse_color() {
    assert_eq!("200,30,30".parse::<Color>().unwrap(), Color::new(200, 30, 30));
    assert_eq!(" 1, 2 ,3 ".parse::<Color>().unwrap(), Color::new(1, 2, 3));
    assert_eq!("#ff8000".parse::<Color>().unwrap(), Color::new(255, 128, 0));
    assert!(matches!(
      "1,2".parse::<Color>(),
      Err(ConfigError::InvalidColor(_))
    ));
    assert!("256,0,0".parse::<Color>().is_err());
    assert!("#12345".parse::<Color>().is_err());
  }

  #[test]
  fn test_parse_match_mode() {
    assert_eq!("abs".parse::<MatchMode>().unwrap(), MatchMode::Absolute);
    assert_eq!("relative".parse::<MatchMode>().unwrap(), MatchMode::Relative);
    assert!("hsv".parse::<MatchMode>().is_err());
  }
}
