// 该文件是 Zhuise （追色） 项目的一部分。
// src/bin/simple_continueshot.rs - 连续帧追踪
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
  task::{ContinuousTask, Task},
  tracker::{TrackerConfig, TrackerSession},
};

/// 追色连续追踪
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 追踪配置
  #[arg(long, value_name = "TRACKER", default_value = "track:")]
  pub tracker: Url,
  /// 输入来源，例如 v4l:///dev/video0
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,
  /// 输出路径，可重复指定
  #[arg(long, value_name = "OUTPUT", default_value = "telemetry:")]
  pub output: Vec<Url>,

  #[arg(long, value_name = "FRAME_NUMBER")]
  pub frame_number: Option<usize>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("追踪配置: {}", args.tracker);
  info!("输入来源: {}", args.input);
  for output in &args.output {
    info!("输出路径: {}", output);
  }

  let input = InputWrapper::from_url(&args.input)?;
  let session = TrackerSession::new(TrackerConfig::from_url(&args.tracker)?)?;
  let outputs = args
    .output
    .iter()
    .map(OutputWrapper::from_url)
    .collect::<Result<Vec<_>, _>>()?;

  ContinuousTask::default()
    .with_frame_number(args.frame_number)
    .run_task(input, session, outputs)?;

  Ok(())
}
