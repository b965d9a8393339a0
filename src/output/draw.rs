// 该文件是 Zhuise （追色） 项目的一部分。
// src/output/draw.rs - 追踪结果可视化
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

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::{
  drawing::{draw_cross_mut, draw_hollow_rect_mut},
  rect::Rect,
};

use crate::{
  frame::RgbFrame,
  tracker::{SizeMode, TrackReport},
};

const CROSS_COLOR: [u8; 3] = [255, 255, 0]; // 黄色
const EXTENT_COLOR: [u8; 3] = [0, 0, 255]; // 蓝色
const MIN_BOX_SIDE: u32 = 2;

pub trait ToRgbImage {
  fn to_rgb_image(&self) -> RgbImage;
}

impl ToRgbImage for RgbFrame {
  fn to_rgb_image(&self) -> RgbImage {
    let view = self.view();
    ImageBuffer::from_fn(self.width() as u32, self.height() as u32, |x, y| {
      let color = view.sample(x as usize, y as usize);
      Rgb([color.r, color.g, color.b])
    })
  }
}

pub struct Draw {
  cross_color: [u8; 3],
  extent_color: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      cross_color: CROSS_COLOR,
      extent_color: EXTENT_COLOR,
    }
  }
}

impl Draw {
  /// 由尺寸度量估计方框边长
  fn box_side(report: &TrackReport) -> u32 {
    let extent = report.result.extent().max(0) as u32;
    let side = match report.size_mode {
      SizeMode::Surface => (extent as f64).sqrt().round() as u32,
      // 水平跨度与垂直跨度之和，取平均
      SizeMode::Perimeter => extent / 2,
    };
    side.max(MIN_BOX_SIDE)
  }

  pub fn draw_track_on_image(&self, image: &mut RgbImage, report: &TrackReport) {
    if !report.result.is_found() {
      return;
    }
    let (x, y) = report.result.position();
    draw_cross_mut(image, Rgb(self.cross_color), x, y);

    let side = Self::box_side(report);
    let half = (side / 2) as i32;
    let rect = Rect::at(x - half, y - half).of_size(side, side);
    draw_hollow_rect_mut(image, rect, Rgb(self.extent_color));
  }

  pub fn draw_track(&self, frame: &RgbFrame, report: &TrackReport) -> RgbImage {
    let mut image = frame.to_rgb_image();
    self.draw_track_on_image(&mut image, report);
    image
  }
}
