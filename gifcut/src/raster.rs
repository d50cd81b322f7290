// raster.rs
//
// Copyright (c) 2026  gifcut developers
//
//! Frame scaling through a raster library
use crate::block::Frame;
use crate::document::Document;
use crate::error::{Error, Result};
use image::codecs::gif::GifEncoder;
use image::imageops::FilterType;
use image::ImageFormat;
use log::debug;

/// Raster transform service.
///
/// Decodes a single-frame GIF, scales it, and encodes the result as a new
/// single-frame GIF.
pub trait Rescale {
    /// Rescale a single-frame GIF to a new pixel size
    fn rescale(&self, gif: &[u8], width: u32, height: u32) -> Result<Vec<u8>>;
}

/// Rescaler using the `image` crate
#[derive(Clone, Copy, Debug)]
pub struct ImageRescaler {
    filter: FilterType,
}

impl Default for ImageRescaler {
    fn default() -> Self {
        ImageRescaler {
            filter: FilterType::Triangle,
        }
    }
}

impl ImageRescaler {
    /// Set the resampling filter
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

impl Rescale for ImageRescaler {
    fn rescale(&self, gif: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
        let img = image::load_from_memory_with_format(gif, ImageFormat::Gif)
            .map_err(|_| Error::InvalidImage)?;
        let img = img.resize_exact(width, height, self.filter);
        let mut buf = vec![];
        {
            let mut enc = GifEncoder::new(&mut buf);
            enc.encode_frame(image::Frame::new(img.into_rgba8()))?;
        }
        Ok(buf)
    }
}

/// Scale a dimension, keeping at least one pixel
fn scale_size(v: u16, scale: f64) -> u16 {
    (f64::from(v) * scale).round().clamp(1.0, f64::from(u16::MAX)) as u16
}

/// Scale a position, truncating
fn scale_pos(v: u16, scale: f64) -> u16 {
    (f64::from(v) * scale).clamp(0.0, f64::from(u16::MAX)) as u16
}

impl Document {
    /// Resize all frames to fit a new screen size.
    ///
    /// Uses the default [ImageRescaler].
    ///
    /// [ImageRescaler]: struct.ImageRescaler.html
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.resize_with(&ImageRescaler::default(), width, height)
    }

    /// Resize all frames by a percentage of the screen size
    pub fn resize_ratio(&mut self, percent: f32) -> Result<()> {
        let scale = f64::from(percent) / 100.0;
        let (width, height) = self.size();
        let width = scale_size(width, scale);
        let height = scale_size(height, scale);
        self.resize(width, height)
    }

    /// Resize all frames with a raster transform service.
    ///
    /// On error, the document is not changed.
    pub fn resize_with<R: Rescale>(
        &mut self,
        rescaler: &R,
        width: u16,
        height: u16,
    ) -> Result<()> {
        let (screen_width, screen_height) = self.size();
        let sx = f64::from(width) / f64::from(screen_width.max(1));
        let sy = f64::from(height) / f64::from(screen_height.max(1));
        let mut frames = Vec::with_capacity(self.frames.len());
        for (i, frame) in self.frames.iter().enumerate() {
            debug!("resize frame {}: {}x{}", i, sx, sy);
            frames.push(self.resize_frame(rescaler, frame, sx, sy)?);
        }
        self.frames = frames;
        self.screen_desc.set_screen_size(width, height);
        Ok(())
    }

    /// Resize one frame
    fn resize_frame<R: Rescale>(
        &self,
        rescaler: &R,
        frame: &Frame,
        sx: f64,
        sy: f64,
    ) -> Result<Frame> {
        let desc = &frame.image_desc;
        let (width, height) = (desc.width(), desc.height());
        let gif = self.isolate(frame);
        let buf = rescaler.rescale(
            &gif,
            scale_size(width, sx).into(),
            scale_size(height, sy).into(),
        )?;
        let scaled = Document::from_bytes(&buf);
        let config = scaled.screen_desc.color_table_config();
        let mut out = scaled.frames.into_iter().next().ok_or(Error::InvalidImage)?;
        out.materialize_color_table(&config, &scaled.global_color_table);
        let src = &frame.graphic_control_ext;
        let ctrl = &mut out.graphic_control_ext;
        ctrl.set_disposal_method(src.disposal_method());
        ctrl.set_user_input(src.user_input());
        ctrl.set_delay_time_cs(src.delay_time_cs());
        out.image_desc
            .set_position(scale_pos(desc.left(), sx), scale_pos(desc.top(), sy));
        Ok(out)
    }

    /// Build a single-frame GIF with the screen fitted to the frame
    fn isolate(&self, frame: &Frame) -> Vec<u8> {
        let mut frame = frame.clone();
        let desc = &mut frame.image_desc;
        let (width, height) = (desc.width(), desc.height());
        desc.set_position(0, 0);
        let mut doc = Document {
            header: self.header.clone(),
            screen_desc: self.screen_desc.clone(),
            global_color_table: self.global_color_table.clone(),
            ..Default::default()
        };
        doc.screen_desc.set_screen_size(width, height);
        doc.builder().build_frame(&frame)
    }
}
