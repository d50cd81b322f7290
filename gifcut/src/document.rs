// document.rs
//
// Copyright (c) 2026  gifcut developers
//
use crate::block::*;
use crate::decode::Parser;
use crate::encode::Builder;
use crate::error::{Error, Result};
use log::{debug, info};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Parsed GIF document.
///
/// Header and screen state are kept alongside an ordered list of
/// [Frame]s, whose image data stays compressed.
///
/// ## Example
/// ```
/// use gifcut::Document;
///
/// fn first_frame(gif: &[u8]) -> Option<Vec<u8>> {
///     let doc = Document::from_bytes(gif);
///     doc.slices().next().map(|d| d.to_bytes())
/// }
/// ```
///
/// [Frame]: block/struct.Frame.html
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Document {
    pub header: Header,
    pub screen_desc: LogicalScreenDesc,
    /// Empty if the screen descriptor has no global table
    pub global_color_table: ColorTable,
    /// Looping extension (`NETSCAPE2.0`)
    pub netscape_ext: Option<Application>,
    /// Decoded but otherwise unused
    pub comments: Vec<Comment>,
    /// Decoded but otherwise unused
    pub plain_texts: Vec<PlainText>,
    /// Frames in stream order
    pub frames: Vec<Frame>,
}

/// Iterator of single-frame documents.
///
/// Created by [Document::slices](struct.Document.html#method.slices).
pub struct Slices<'a> {
    doc: &'a Document,
    index: usize,
}

impl<'a> Iterator for Slices<'a> {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        let slice = self.doc.slice(self.index)?;
        self.index += 1;
        Some(slice)
    }
}

impl Document {
    /// Parse a document from a GIF buffer.
    ///
    /// This never fails; malformed or truncated data yields whatever could
    /// be decoded, including a partial (zero-padded) header signature.
    /// Use a strict [Parser] to detect truncation.
    ///
    /// [Parser]: struct.Parser.html
    pub fn from_bytes(buf: &[u8]) -> Self {
        match Parser::new().parse(buf) {
            Ok(doc) => doc,
            Err(_) => Document::default(),
        }
    }

    /// Read and parse a GIF file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let buf = fs::read(path)?;
        Ok(Self::from_bytes(&buf))
    }

    /// Get a builder for serializing with options
    pub fn builder(&self) -> Builder<'_> {
        Builder::new(self)
    }

    /// Serialize to a GIF buffer
    pub fn to_bytes(&self) -> Vec<u8> {
        self.builder().build()
    }

    /// Write the GIF to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::MissingPath);
        }
        fs::write(path, self.to_bytes())?;
        info!("saved {:?}", path);
        Ok(())
    }

    /// Write the GIF stream to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.to_bytes())?;
        Ok(())
    }

    /// Write the GIF, preceded by a content type header
    pub fn display<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(b"Content-Type: image/gif\r\n\r\n")?;
        self.write_to(writer)
    }

    /// Get the logical screen size
    pub fn size(&self) -> (u16, u16) {
        (
            self.screen_desc.screen_width(),
            self.screen_desc.screen_height(),
        )
    }

    /// Get the number of frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Get the frames
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Check for a looping extension
    pub fn is_animated(&self) -> bool {
        self.netscape_ext.is_some()
    }

    /// Get the loop count (zero means forever)
    pub fn loop_count(&self) -> Option<u16> {
        self.netscape_ext.as_ref().and_then(|app| app.loop_count())
    }

    /// Set the loop count, adding a looping extension if needed
    pub fn set_loop_count(&mut self, loop_count: u16) {
        let data = Some(AppData::LoopCount(loop_count));
        self.netscape_ext
            .get_or_insert_with(Application::default)
            .set_app_data(data);
    }

    /// Get the delay time of each frame, in centiseconds
    pub fn delays(&self) -> Vec<u16> {
        self.frames
            .iter()
            .map(|f| f.graphic_control_ext.delay_time_cs())
            .collect()
    }

    /// Set the delay time of one frame, in centiseconds.
    ///
    /// Returns `false` if there is no such frame.
    pub fn set_frame_delay(&mut self, index: usize, delay_time_cs: u16) -> bool {
        match self.frames.get_mut(index) {
            Some(f) => {
                f.graphic_control_ext.set_delay_time_cs(delay_time_cs);
                true
            }
            None => false,
        }
    }

    /// Make a new document containing only one frame.
    ///
    /// The frame's size is clamped to the logical screen.  Returns `None`
    /// when `index` is past the last frame.
    pub fn slice(&self, index: usize) -> Option<Document> {
        let mut frame = self.frames.get(index)?.clone();
        let (width, height) = self.size();
        let desc = &mut frame.image_desc;
        desc.set_size(desc.width().min(width), desc.height().min(height));
        debug!("slice {} of {}", index, self.frames.len());
        let buf = self.builder().build_frame(&frame);
        Some(Document::from_bytes(&buf))
    }

    /// Iterate over single-frame slices, in order
    pub fn slices(&self) -> Slices<'_> {
        Slices {
            doc: self,
            index: 0,
        }
    }

    /// Append all frames of another document at a position.
    ///
    /// Frames without a local color table get a copy of the source's
    /// global table.  The screen descriptor and looping extension of this
    /// document are not changed.
    pub fn add_image(&mut self, source: &Document, left: u16, top: u16) {
        let config = source.screen_desc.color_table_config();
        for frame in &source.frames {
            let mut frame = frame.clone();
            frame.materialize_color_table(&config, &source.global_color_table);
            frame.image_desc.set_position(left, top);
            self.frames.push(frame);
        }
        debug!("added {} frames at {},{}", source.frames.len(), left, top);
    }

    /// Set animation timing for all frames.
    ///
    /// The loop count becomes zero (forever) when `looping`, otherwise one.
    /// The `user_input` flag is accepted but not applied to any frame.
    pub fn set_animation(&mut self, delay_time_cs: u16, user_input: bool, looping: bool) {
        for frame in &mut self.frames {
            frame.graphic_control_ext.set_delay_time_cs(delay_time_cs);
        }
        debug!("animation: delay {} user input {}", delay_time_cs, user_input);
        self.set_loop_count(if looping { 0 } else { 1 });
    }
}
