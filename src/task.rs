// 该文件是 Zhuise （追色） 项目的一部分。
// src/task.rs - 追踪任务调度
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
  sync::mpsc,
  thread,
  time::{Duration, Instant},
};
use tracing::{info, warn};

use crate::{output::Render, tracker::Track};

pub trait Task<I, T, O>: Sized {
  type Error;
  fn run_task(self, input: I, tracker: T, output: O) -> Result<(), Self::Error>;
}

/// 只处理第一帧
pub struct OneShotTask;

impl<
  F,
  D,
  TE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  T: Track<Frame = F, Output = D, Error = TE>,
  O: Render<F, D, Error = RE>,
> Task<I, T, O> for OneShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, mut tracker: T, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let mut frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始追踪...");
    let now = Instant::now();
    let result = tracker.track(&mut frame)?;
    let elapsed = now.elapsed();
    info!("追踪完成，耗时: {:.2?}", elapsed);
    output.render_result(&frame, &result)?;
    info!("渲染完成，总耗时: {:.2?}", now.elapsed());

    Ok(())
  }
}

/// 对同一帧反复追踪，用于测量单帧耗时
pub struct RepeatShotTask {
  repeat_times: usize,
}

impl Default for RepeatShotTask {
  fn default() -> Self {
    Self { repeat_times: 1000 }
  }
}

impl RepeatShotTask {
  pub fn with_repeat_times(mut self, repeat_times: usize) -> Self {
    self.repeat_times = repeat_times.max(1);
    self
  }
}

impl<
  F: Clone,
  D,
  TE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  T: Track<Frame = F, Output = D, Error = TE>,
  O: Render<F, D, Error = RE>,
> Task<I, T, O> for RepeatShotTask
{
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, mut tracker: T, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始追踪...");
    let mut times = Vec::with_capacity(self.repeat_times);
    for i in 0..self.repeat_times {
      // 叠加层会修改帧，每次从原始帧复制
      let mut working = frame.clone();
      let now = Instant::now();
      let result = tracker.track(&mut working)?;
      let elapsed = now.elapsed();
      info!("({})追踪完成，耗时: {:.2?}", i, elapsed);
      output.render_result(&working, &result)?;
      times.push(elapsed);
    }

    // 跳过前两次预热
    let warm: Vec<Duration> = if times.len() > 2 {
      times.split_off(2)
    } else {
      times
    };
    warn!(
      "平均追踪时间: {:.2?}",
      warm.iter().sum::<Duration>() / warm.len().max(1) as u32
    );

    Ok(())
  }
}

#[derive(Default, Debug)]
pub struct ContinuousTask {
  frame_number: Option<usize>,
}

impl ContinuousTask {
  pub fn with_frame_number(mut self, frame_number: Option<usize>) -> Self {
    self.frame_number = frame_number;
    self
  }
}

impl<
  F,
  D,
  TE: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  T: Track<Frame = F, Output = D, Error = TE>,
  O: Render<F, D, Error = RE>,
> Task<I, T, O> for ContinuousTask
{
  type Error = anyhow::Error;

  fn run_task(self, input: I, mut tracker: T, output: O) -> Result<(), Self::Error> {
    info!("开始任务...");
    let (tx, rx) = mpsc::channel();

    if let Err(e) = ctrlc::set_handler(move || {
      info!("收到中断信号，准备退出...");
      let _ = tx.send(());
      thread::spawn(|| {
        thread::sleep(Duration::from_secs(30));
        warn!("强制退出程序");
        std::process::exit(1);
      });
    }) {
      warn!("无法设置 Ctrl-C 处理函数: {}", e);
    }

    let mut frame_index = 0usize;
    let mut now = Instant::now();
    for mut frame in input {
      frame_index = frame_index.wrapping_add(1);
      info!("处理第 {} 帧图像", frame_index);
      let result = tracker.track(&mut frame)?;
      let elapsed_a = now.elapsed();
      output.render_result(&frame, &result)?;
      let elapsed_b = now.elapsed();
      now = Instant::now();
      info!("追踪完成，耗时: {:.2?} / {:.2?}", elapsed_a, elapsed_b);
      if self.frame_number.is_some_and(|n| frame_index >= n) {
        info!("达到指定帧数 {}, 退出任务循环", frame_index);
        break;
      }
      if rx.try_recv().is_ok() {
        warn!("中断信号接收，退出任务循环");
        break;
      }
    }

    info!("任务完成，共处理 {} 帧", frame_index);
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::{cell::RefCell, convert::Infallible};

  use crate::{
    frame::RgbFrame,
    tracker::{Color, MatchMode, SizeMode, TrackReport, TrackerConfig, TrackerSession},
  };

  #[derive(Default)]
  struct Collect {
    reports: RefCell<Vec<TrackReport>>,
  }

  impl Render<RgbFrame, TrackReport> for &Collect {
    type Error = Infallible;

    fn render_result(&self, _frame: &RgbFrame, result: &TrackReport) -> Result<(), Self::Error> {
      self.reports.borrow_mut().push(result.clone());
      Ok(())
    }
  }

  fn session() -> TrackerSession {
    TrackerSession::new(TrackerConfig {
      target: Color::new(200, 30, 30),
      fuzziness: 30,
      match_mode: MatchMode::Absolute,
      size_mode: SizeMode::Surface,
      min_match_count: 20,
      mirror: false,
      highlight: true,
      ..TrackerConfig::default()
    })
    .unwrap()
  }

  fn frames(n: u64) -> impl Iterator<Item = RgbFrame> {
    (0..n).map(|i| {
      let mut frame = RgbFrame::filled(60, 60, Color::new(50, 50, 50)).with_index(i, i * 33);
      frame.fill_rect(10 + i as usize, 20, 10, 10, Color::new(200, 30, 30));
      frame
    })
  }

  #[test]
  fn test_one_shot() {
    let collect = Collect::default();
    OneShotTask.run_task(frames(3), session(), &collect).unwrap();
    let reports = collect.reports.borrow();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].frame_index, 0);
    assert!(reports[0].result.is_found());
  }

  #[test]
  fn test_one_shot_without_frames() {
    let collect = Collect::default();
    assert!(
      OneShotTask
        .run_task(std::iter::empty(), session(), &collect)
        .is_err()
    );
  }

  #[test]
  fn test_repeat_shot_uses_pristine_frame() {
    let collect = Collect::default();
    RepeatShotTask::default()
      .with_repeat_times(4)
      .run_task(frames(1), session(), &collect)
      .unwrap();
    let reports = collect.reports.borrow();
    assert_eq!(reports.len(), 4);
    // 高亮写入副本，原始帧不变，后续结果稳定
    assert!(reports[1..].iter().all(|r| r.result == reports[1].result));
    assert!(reports.iter().all(|r| r.result.is_found()));
  }

  #[test]
  fn test_continuous_follows_moving_target() {
    let collect = Collect::default();
    ContinuousTask::default()
      .run_task(frames(5), session(), &collect)
      .unwrap();
    let reports = collect.reports.borrow();
    assert_eq!(reports.len(), 5);
    // 第二帧起种子落在目标内部，质心随目标右移
    for (i, report) in reports.iter().enumerate().skip(1) {
      assert_eq!(report.track_x, 14 + i as i32);
      assert_eq!(report.track_y, 24);
    }
  }

  #[test]
  fn test_continuous_frame_limit() {
    let collect = Collect::default();
    ContinuousTask::default()
      .with_frame_number(Some(2))
      .run_task(frames(10), session(), &collect)
      .unwrap();
    assert_eq!(collect.reports.borrow().len(), 2);
  }
}
