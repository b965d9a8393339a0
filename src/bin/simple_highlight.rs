// 该文件是 Zhuise （追色） 项目的一部分。
// src/bin/simple_highlight.rs - 目标颜色高亮调试
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

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use url::Url;

use tracing::info;
use zhuise::{
  FromUrl,
  input::InputWrapper,
  output::draw::ToRgbImage,
  tracker::{Color, ColorMatcher, MatchMode, highlight_color, pick},
};

/// 将整帧中与目标颜色匹配的像素标绿，其余标红
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出图像路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: PathBuf,
  /// 目标颜色，r,g,b 或 #rrggbb
  #[arg(long, value_name = "COLOR", conflicts_with = "pick")]
  pub color: Option<Color>,
  /// 从输入帧的某点取色，x,y
  #[arg(long, value_name = "X,Y")]
  pub pick: Option<String>,
  #[arg(long, default_value_t = 50)]
  pub fuzziness: u32,
  #[arg(long, value_name = "MODE", default_value = "relative")]
  pub match_mode: MatchMode,
}

fn parse_point(s: &str) -> Result<(i32, i32)> {
  let (x, y) = s.split_once(',').context("取色点格式应为 x,y")?;
  Ok((x.trim().parse()?, y.trim().parse()?))
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  info!("输入来源: {}", args.input);

  let mut frame = InputWrapper::from_url(&args.input)?
    .next()
    .context("没有输入帧")?;

  let target = match (args.color, args.pick.as_deref()) {
    (Some(color), _) => color,
    (None, Some(point)) => {
      let (x, y) = parse_point(point)?;
      pick(&frame.view(), x, y).with_context(|| format!("取色点 ({}, {}) 超出帧范围", x, y))?
    }
    (None, None) => bail!("需要 --color 或 --pick"),
  };
  info!("目标颜色: {} 模糊度: {}", target, args.fuzziness);

  let matcher = ColorMatcher::new(args.match_mode);
  let matched = highlight_color(&mut frame.view_mut(), &matcher, target, args.fuzziness);
  info!(
    "匹配像素: {} / {}",
    matched,
    frame.width() * frame.height()
  );

  frame.to_rgb_image().save(&args.output)?;
  info!("保存图像到文件: {}", args.output.display());

  Ok(())
}
