// encode.rs
//
// Copyright (c) 2026  gifcut developers
//
use crate::block::*;
use crate::document::Document;
use crate::field::{push_u16_le, push_u32_le};
use log::debug;
use pix::rgb::{Rgb, SRgb8};

/// Document builder.
///
/// Serializes a [Document] back into a GIF stream, terminated by exactly
/// one trailer byte.
///
/// [Document]: struct.Document.html
pub struct Builder<'a> {
    /// Document to serialize
    doc: &'a Document,
    /// Emit retained comment and plain text blocks
    comments: bool,
}

impl<'a> Builder<'a> {
    /// Create a new builder
    pub(crate) fn new(doc: &'a Document) -> Self {
        Builder {
            doc,
            comments: false,
        }
    }

    /// Emit comment and plain text blocks after the looping extension.
    ///
    /// Without this, they are dropped from the output.
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }

    /// Build the GIF stream
    pub fn build(&self) -> Vec<u8> {
        let mut buf = self.preamble();
        for frame in &self.doc.frames {
            frame.format(&mut buf);
        }
        finish(buf)
    }

    /// Build a stream with a single frame
    pub(crate) fn build_frame(&self, frame: &Frame) -> Vec<u8> {
        let mut buf = self.preamble();
        frame.format(&mut buf);
        finish(buf)
    }

    /// Format blocks before the first frame
    fn preamble(&self) -> Vec<u8> {
        let doc = self.doc;
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(doc.header.signature());
        doc.screen_desc.format(&mut buf);
        doc.global_color_table.format(&mut buf);
        if let Some(app) = &doc.netscape_ext {
            app.format(&mut buf);
        }
        if self.comments {
            for c in &doc.comments {
                c.format(&mut buf);
            }
            for p in &doc.plain_texts {
                p.format(&mut buf);
            }
        }
        buf
    }
}

/// Strip trailers and append exactly one
fn finish(mut buf: Vec<u8>) -> Vec<u8> {
    while buf.last() == Some(&TRAILER) {
        buf.pop();
    }
    buf.push(TRAILER);
    debug!("built {} bytes", buf.len());
    buf
}

/// Format a chain of sub-blocks, with terminator
fn format_sub_blocks(buf: &mut Vec<u8>, sub_blocks: &[Vec<u8>]) {
    for b in sub_blocks {
        assert!(b.len() < 256);
        buf.push(b.len() as u8); // block size
        buf.extend_from_slice(b);
    }
    buf.push(0); // block size
}

impl LogicalScreenDesc {
    fn format(&self, buf: &mut Vec<u8>) {
        push_u16_le(buf, self.screen_width());
        push_u16_le(buf, self.screen_height());
        buf.push(self.flags());
        buf.push(self.background_color_idx());
        buf.push(self.pixel_aspect_ratio());
    }
}

impl ColorTable {
    fn format(&self, buf: &mut Vec<u8>) {
        for clr in self.colors() {
            let clr: SRgb8 = *clr;
            buf.push(u8::from(Rgb::red(clr)));
            buf.push(u8::from(Rgb::green(clr)));
            buf.push(u8::from(Rgb::blue(clr)));
        }
    }
}

impl GraphicControl {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(ExtensionCode::GraphicControl_.signature());
        buf.push(self.flags());
        push_u16_le(buf, self.delay_time_cs());
        buf.push(self.transparent_color_idx());
        buf.push(0); // block size
    }
}

impl Application {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(ExtensionCode::Application_.signature());
        buf.extend_from_slice(self.app_id());
        buf.extend_from_slice(self.auth_code());
        match self.app_data() {
            Some(AppData::LoopCount(c)) => {
                buf.extend_from_slice(&[3, 1]);
                push_u16_le(buf, *c);
            }
            Some(AppData::Buffering(sz)) => {
                buf.extend_from_slice(&[5, 2]);
                push_u32_le(buf, *sz);
            }
            Some(AppData::Unknown(data)) => {
                assert!(data.len() < 256);
                buf.push(data.len() as u8);
                buf.extend_from_slice(data);
            }
            None => (),
        }
        buf.push(0); // block size
    }
}

impl Comment {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(ExtensionCode::Comment_.signature());
        format_sub_blocks(buf, self.comments());
    }
}

impl PlainText {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(ExtensionCode::PlainText_.signature());
        push_u16_le(buf, self.text_grid_left);
        push_u16_le(buf, self.text_grid_top);
        push_u16_le(buf, self.text_grid_width);
        push_u16_le(buf, self.text_grid_height);
        buf.push(self.cell_width);
        buf.push(self.cell_height);
        buf.push(self.foreground_color_idx);
        buf.push(self.background_color_idx);
        format_sub_blocks(buf, self.sub_blocks());
    }
}

impl ImageDesc {
    fn format(&self, buf: &mut Vec<u8>) {
        buf.push(IMAGE_SEPARATOR);
        push_u16_le(buf, self.left());
        push_u16_le(buf, self.top());
        push_u16_le(buf, self.width());
        push_u16_le(buf, self.height());
        buf.push(self.flags());
    }
}

impl Frame {
    fn format(&self, buf: &mut Vec<u8>) {
        self.graphic_control_ext.format(buf);
        self.image_desc.format(buf);
        if let Some(tbl) = &self.local_color_table {
            tbl.format(buf);
        }
        buf.extend_from_slice(&self.body);
    }
}
