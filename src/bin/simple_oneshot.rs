// 该文件是 Zhuise （追色） 项目的一部分。
// src/bin/simple_oneshot.rs - 单帧追踪
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use tracing::info;
use zhuise::{
  FromUrl,
  input::InputWrapper,
  output::OutputWrapper,
  task::{OneShotTask, Task},
  tracker::{TrackerConfig, TrackerSession},
};

/// 追色单帧追踪
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 追踪配置，例如 track:///etc/zhuise/red.json?fuzziness=30
  #[arg(long, value_name = "TRACKER", default_value = "track:")]
  pub tracker: Url,
  /// 输入来源
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("追踪配置: {}", args.tracker);
  info!("输入来源: {}", args.input);
  info!("输出路径: {}", args.output);

  let input = InputWrapper::from_url(&args.input)?;
  let session = TrackerSession::new(TrackerConfig::from_url(&args.tracker)?)?;
  let output = OutputWrapper::from_url(&args.output)?;

  OneShotTask.run_task(input, session, output)?;

  Ok(())
}
