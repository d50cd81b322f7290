// decode.rs
//
// Copyright (c) 2026  gifcut developers
//
use crate::block::*;
use crate::cursor::Cursor;
use crate::document::Document;
use crate::error::{Error, Result};
use log::{debug, warn};
use pix::rgb::SRgb8;

/// GIF parser.
///
/// Decodes the block structure of a GIF into a [Document].  Image data is
/// kept compressed.
///
/// ## Example
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let gif = &[
/// #   0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x02, 0x00,
/// #   0x02, 0x00, 0x80, 0x01, 0x00, 0x00, 0x00, 0x00,
/// #   0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x00, 0x00,
/// #   0x00, 0x00, 0x00, 0x2c, 0x00, 0x00, 0x00, 0x00,
/// #   0x02, 0x00, 0x02, 0x00, 0x00, 0x02, 0x03, 0x0c,
/// #   0x10, 0x05, 0x00, 0x3b,
/// # ][..];
/// let doc = gifcut::Parser::new().strict(true).parse(gif)?;
/// assert_eq!(doc.frame_count(), 1);
/// # Ok(())
/// # }
/// ```
///
/// [Document]: struct.Document.html
#[derive(Clone, Copy, Debug, Default)]
pub struct Parser {
    /// Fail on truncated data instead of returning a partial document
    strict: bool,
}

/// Frame parsing state
enum State {
    /// No frame has started; skipped bytes are discarded
    BeforeFirstFrame { skipped: usize },
    /// Collecting the compressed body of the last frame
    InFrameBody { body: Vec<u8> },
}

impl State {
    /// Check if bytes are being accumulated
    fn is_accumulating(&self) -> bool {
        match self {
            State::BeforeFirstFrame { skipped } => *skipped > 0,
            State::InFrameBody { body } => !body.is_empty(),
        }
    }

    /// Accumulate one byte
    fn push(&mut self, byte: u8) {
        match self {
            State::BeforeFirstFrame { skipped } => *skipped += 1,
            State::InFrameBody { body } => body.push(byte),
        }
    }

    /// Finish the current state when a new frame starts (or data ends).
    ///
    /// Accumulated body bytes are assigned to the last frame.
    fn finish(self, frames: &mut [Frame]) {
        match self {
            State::BeforeFirstFrame { skipped } => {
                if skipped > 0 {
                    warn!("discarded {} bytes before first frame", skipped);
                }
            }
            State::InFrameBody { mut body } => {
                if let Some(frame) = frames.last_mut() {
                    if body.last() == Some(&TRAILER) {
                        body.pop();
                    }
                    debug!("  body   : {} bytes", body.len());
                    frame.body = body;
                }
            }
        }
    }
}

impl Parser {
    /// Create a new lenient parser
    pub fn new() -> Self {
        Parser { strict: false }
    }

    /// Set strict handling of truncated data.
    ///
    /// When lenient (the default), truncation stops parsing and the blocks
    /// decoded so far are returned.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Parse a GIF buffer
    pub fn parse(&self, buf: &[u8]) -> Result<Document> {
        let mut cursor = Cursor::new(buf);
        let mut doc = Document::default();
        match parse_blocks(&mut cursor, &mut doc) {
            Ok(()) => Ok(doc),
            Err(Error::UnexpectedEndOfData) if !self.strict => {
                warn!("truncated GIF at offset {}", cursor.pos());
                Ok(doc)
            }
            Err(e) => Err(e),
        }
    }
}

/// Parse all blocks into a document
fn parse_blocks(cursor: &mut Cursor, doc: &mut Document) -> Result<()> {
    parse_header(cursor, &mut doc.header)?;
    doc.screen_desc = parse_screen_desc(cursor)?;
    let config = doc.screen_desc.color_table_config();
    doc.global_color_table = parse_color_table(cursor, &config)?;
    parse_frames(cursor, doc)
}

/// Parse frames until end of data
fn parse_frames(cursor: &mut Cursor, doc: &mut Document) -> Result<()> {
    let signature = ExtensionCode::GraphicControl_.signature();
    let mut state = State::BeforeFirstFrame { skipped: 0 };
    while !cursor.is_done() {
        if !state.is_accumulating() {
            parse_extensions(cursor, doc)?;
            if cursor.is_done() {
                break;
            }
        }
        if !cursor.starts_with(signature) {
            state.push(cursor.u8()?);
            continue;
        }
        state.finish(&mut doc.frames);
        let frame = parse_frame(cursor, doc)?;
        doc.frames.push(frame);
        state = State::InFrameBody { body: vec![] };
    }
    state.finish(&mut doc.frames);
    Ok(())
}

/// Parse one frame, starting at a graphic control extension
fn parse_frame(cursor: &mut Cursor, doc: &mut Document) -> Result<Frame> {
    let graphic_control_ext = parse_graphic_control(cursor)?;
    parse_extensions(cursor, doc)?;
    let image_desc = parse_image_desc(cursor)?;
    let config = image_desc.color_table_config();
    let local_color_table = if config.is_empty() {
        None
    } else {
        Some(parse_color_table(cursor, &config)?)
    };
    Ok(Frame {
        graphic_control_ext,
        image_desc,
        local_color_table,
        body: vec![],
    })
}

/// Parse any extension blocks at the cursor.
///
/// Loops until none of the probed signatures match.
fn parse_extensions(cursor: &mut Cursor, doc: &mut Document) -> Result<()> {
    while let Some(ext) = parse_extension(cursor)? {
        match ext {
            Extension::Application(b) => {
                if b.is_looping() {
                    doc.netscape_ext = Some(b);
                } else {
                    debug!("skipped application: {:?}", b.app_id());
                }
            }
            Extension::Comment(b) => doc.comments.push(b),
            Extension::PlainText(b) => doc.plain_texts.push(b),
            Extension::GraphicControl(_) => debug!("stray graphic control"),
        }
    }
    Ok(())
}

/// Parse the next probed extension block, if its signature matches
fn parse_extension(cursor: &mut Cursor) -> Result<Option<Extension>> {
    use crate::block::ExtensionCode::*;
    for code in ExtensionCode::PROBED {
        if cursor.starts_with(code.signature()) {
            debug!("  block  : {:?}", code);
            let ext = match code {
                Application_ => parse_application(cursor)?.into(),
                Comment_ => parse_comment(cursor)?.into(),
                PlainText_ => parse_plain_text(cursor)?.into(),
                GraphicControl_ => parse_graphic_control(cursor)?.into(),
            };
            return Ok(Some(ext));
        }
    }
    Ok(None)
}

/// Parse a header block (not validated).
///
/// A truncated signature is kept, zero-padded.
fn parse_header(cursor: &mut Cursor, header: &mut Header) -> Result<()> {
    let mut signature = [0; 6];
    let buf = cursor.read(signature.len());
    signature[..buf.len()].copy_from_slice(buf);
    *header = Header::with_signature(signature);
    if buf.len() < signature.len() {
        return Err(Error::UnexpectedEndOfData);
    }
    Ok(())
}

/// Parse a logical screen descriptor block
fn parse_screen_desc(cursor: &mut Cursor) -> Result<LogicalScreenDesc> {
    let width = cursor.u16_le()?;
    let height = cursor.u16_le()?;
    let flags = cursor.u8()?;
    let bg_color = cursor.u8()?;
    let aspect = cursor.u8()?;
    debug!("  block  : screen {}x{} flags {:08b}", width, height, flags);
    Ok(LogicalScreenDesc::default()
        .with_screen_width(width)
        .with_screen_height(height)
        .with_flags(flags)
        .with_background_color_idx(bg_color)
        .with_pixel_aspect_ratio(aspect))
}

/// Parse a color table (empty if absent)
fn parse_color_table(
    cursor: &mut Cursor,
    config: &ColorTableConfig,
) -> Result<ColorTable> {
    let buf = cursor.read_exact(config.size_bytes())?;
    let colors = buf
        .chunks_exact(CHANNELS)
        .map(|c| SRgb8::new(c[0], c[1], c[2]))
        .collect();
    Ok(ColorTable::with_colors(colors))
}

/// Parse a graphic control extension block
fn parse_graphic_control(cursor: &mut Cursor) -> Result<GraphicControl> {
    cursor.read_exact(ExtensionCode::GraphicControl_.signature().len())?;
    let mut b = GraphicControl::default();
    b.set_flags(cursor.u8()?);
    b.set_delay_time_cs(cursor.u16_le()?);
    b.set_transparent_color_idx(cursor.u8()?);
    let _terminator = cursor.u8()?;
    Ok(b)
}

/// Parse an application extension block
fn parse_application(cursor: &mut Cursor) -> Result<Application> {
    cursor.read_exact(ExtensionCode::Application_.signature().len())?;
    let mut app_id = [0; 8];
    app_id.copy_from_slice(cursor.read_exact(8)?);
    let mut auth_code = [0; 3];
    auth_code.copy_from_slice(cursor.read_exact(3)?);
    let mut b = Application::with_ids(app_id, auth_code);
    let mut sub_blocks = cursor.sub_blocks()?.into_iter();
    if let Some(data) = sub_blocks.next() {
        b.set_app_data(Some(parse_app_data(data)));
    }
    let extra = sub_blocks.count();
    if extra > 0 && b.is_looping() {
        warn!("ignored {} extra application sub-blocks", extra);
    }
    Ok(b)
}

/// Parse the first application sub-block
fn parse_app_data(data: Vec<u8>) -> AppData {
    use crate::field::{u16_le, u32_le, unpack};
    match (unpack(data[0], AppData::EXTENSION_CODE), data.len()) {
        (1, 3) => AppData::LoopCount(u16_le(&data[1..])),
        (2, 5) => AppData::Buffering(u32_le(&data[1..])),
        _ => {
            warn!("unknown application sub-block: {:?}", data);
            AppData::Unknown(data)
        }
    }
}

/// Parse a comment extension block
fn parse_comment(cursor: &mut Cursor) -> Result<Comment> {
    cursor.read_exact(ExtensionCode::Comment_.signature().len())?;
    let mut b = Comment::default();
    for c in cursor.sub_blocks()? {
        b.add_comment(&c);
    }
    Ok(b)
}

/// Parse a plain text extension block
fn parse_plain_text(cursor: &mut Cursor) -> Result<PlainText> {
    cursor.read_exact(ExtensionCode::PlainText_.signature().len())?;
    let mut b = PlainText::default();
    b.text_grid_left = cursor.u16_le()?;
    b.text_grid_top = cursor.u16_le()?;
    b.text_grid_width = cursor.u16_le()?;
    b.text_grid_height = cursor.u16_le()?;
    b.cell_width = cursor.u8()?;
    b.cell_height = cursor.u8()?;
    b.foreground_color_idx = cursor.u8()?;
    b.background_color_idx = cursor.u8()?;
    for sb in cursor.sub_blocks()? {
        b.add_sub_block(&sb);
    }
    Ok(b)
}

/// Parse an image descriptor block
fn parse_image_desc(cursor: &mut Cursor) -> Result<ImageDesc> {
    let separator = cursor.u8()?;
    if separator != IMAGE_SEPARATOR {
        warn!("unexpected image separator: {:02X}", separator);
    }
    let left = cursor.u16_le()?;
    let top = cursor.u16_le()?;
    let width = cursor.u16_le()?;
    let height = cursor.u16_le()?;
    let flags = cursor.u8()?;
    debug!("  block  : image {}x{} at {},{}", width, height, left, top);
    Ok(ImageDesc::default()
        .with_left(left)
        .with_top(top)
        .with_width(width)
        .with_height(height)
        .with_flags(flags))
}

impl From<GraphicControl> for Extension {
    fn from(b: GraphicControl) -> Self {
        Extension::GraphicControl(b)
    }
}

impl From<Application> for Extension {
    fn from(b: Application) -> Self {
        Extension::Application(b)
    }
}

impl From<Comment> for Extension {
    fn from(b: Comment) -> Self {
        Extension::Comment(b)
    }
}

impl From<PlainText> for Extension {
    fn from(b: PlainText) -> Self {
        Extension::PlainText(b)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fixture;

    #[test]
    fn simple_1() {
        let doc = Parser::new().strict(true).parse(fixture::SIMPLE).unwrap();
        assert_eq!(doc.header.signature(), b"GIF89a");
        assert_eq!(doc.size(), (10, 10));
        assert_eq!(doc.global_color_table.len(), 4);
        assert_eq!(doc.global_color_table.colors()[1], SRgb8::new(255, 0, 0));
        assert_eq!(doc.frame_count(), 1);
        assert!(!doc.is_animated());
        let frame = &doc.frames[0];
        assert_eq!(frame.image_desc.width(), 10);
        assert!(frame.local_color_table.is_none());
        // LZW code size, one 22 byte sub-block, terminator; trailer stripped
        assert_eq!(frame.body.len(), 1 + 1 + 22 + 1);
        assert_eq!(frame.body[..2], [0x02, 0x16]);
        assert_eq!(frame.body.last(), Some(&0x00));
    }

    #[test]
    fn animated() {
        let doc = Document::from_bytes(&fixture::animated());
        assert_eq!(doc.frame_count(), 2);
        assert!(doc.is_animated());
        assert_eq!(doc.loop_count(), Some(0));
        assert_eq!(doc.delays(), vec![50, 50]);
        assert_eq!(doc.frames[0].body, doc.frames[1].body);
        assert_eq!(doc.frames[1].image_desc.left(), 0);
        assert_eq!(doc.comments.len(), 1);
        assert_eq!(doc.comments[0].comments()[0], b"gifcut");
    }

    #[test]
    fn color_table_sizes() {
        for size_bits in 0..8u8 {
            let mut gif = b"GIF89a\x01\x00\x01\x00".to_vec();
            gif.push(0x80 | size_bits);
            gif.extend_from_slice(&[0, 0]);
            gif.extend(std::iter::repeat(0x7F).take(3 << (size_bits + 1)));
            gif.push(TRAILER);
            let doc = Parser::new().strict(true).parse(&gif).unwrap();
            assert_eq!(doc.global_color_table.len(), 2 << size_bits);
            assert_eq!(doc.frame_count(), 0);
        }
    }

    #[test]
    fn local_color_table() {
        let mut gif = fixture::SIMPLE.to_vec();
        // image descriptor flags: local table with 2 entries
        let desc = fixture::SIMPLE.len() - 26 - 1;
        gif[desc] = 0x80;
        let lct = [1, 2, 3, 4, 5, 6];
        gif.splice(desc + 1..desc + 1, lct.iter().copied());
        let doc = Parser::new().strict(true).parse(&gif).unwrap();
        let lct = doc.frames[0].local_color_table.as_ref().unwrap();
        assert_eq!(lct.colors(), [SRgb8::new(1, 2, 3), SRgb8::new(4, 5, 6)]);
        assert_eq!(doc.frames[0].body.len(), 25);
    }

    #[test]
    fn no_frames() {
        // GIF87a style: image descriptor without graphic control
        let mut gif = fixture::SIMPLE[..25].to_vec();
        gif.extend_from_slice(&fixture::SIMPLE[33..]);
        let doc = Document::from_bytes(&gif);
        assert_eq!(doc.frame_count(), 0);
        assert_eq!(doc.size(), (10, 10));
    }

    #[test]
    fn truncated() {
        let gif = fixture::animated();
        // cut inside second image descriptor
        let cut = gif.len() - 30;
        assert!(matches!(
            Parser::new().strict(true).parse(&gif[..cut]),
            Err(Error::UnexpectedEndOfData)
        ));
        let doc = Parser::new().parse(&gif[..cut]).unwrap();
        assert_eq!(doc.frame_count(), 1);
        let doc = Document::from_bytes(&gif[..4]);
        assert_eq!(doc.frame_count(), 0);
        let doc = Document::from_bytes(&[]);
        assert_eq!(doc.frame_count(), 0);
    }

    #[test]
    fn extensions_between_blocks() {
        let gif = fixture::with_extensions();
        let doc = Parser::new().strict(true).parse(&gif).unwrap();
        assert_eq!(doc.frame_count(), 1);
        assert_eq!(doc.loop_count(), Some(3));
        assert_eq!(doc.comments.len(), 2);
        assert_eq!(doc.comments[1].comments().len(), 2);
        assert_eq!(doc.plain_texts.len(), 1);
        let pt = &doc.plain_texts[0];
        assert_eq!(pt.text_grid_width, 8);
        assert_eq!(pt.cell_height, 2);
        assert_eq!(pt.sub_blocks()[0], b"hi\0");
        assert_eq!(doc.frames[0].body, fixture::SIMPLE[43..68]);
    }

    #[test]
    fn plain_text() {
        let mut gif = fixture::preamble();
        gif.extend_from_slice(&[0x21, 0x01, 0x0C, 1, 0, 2, 0, 16, 0, 8, 0]);
        gif.extend_from_slice(&[4, 8, 3, 5, 2, b'o', b'k', 0]);
        gif.extend_from_slice(&fixture::SIMPLE[25..]);
        let doc = Parser::new().strict(true).parse(&gif).unwrap();
        let pt = &doc.plain_texts[0];
        assert_eq!((pt.text_grid_left, pt.text_grid_top), (1, 2));
        assert_eq!((pt.text_grid_width, pt.text_grid_height), (16, 8));
        assert_eq!((pt.cell_width, pt.cell_height), (4, 8));
        assert_eq!(pt.foreground_color_idx, 3);
        assert_eq!(pt.background_color_idx, 5);
        assert_eq!(pt.sub_blocks(), [b"ok".to_vec()]);
        assert_eq!(doc.frame_count(), 1);
    }

    #[test]
    fn last_netscape_wins() {
        let mut gif = fixture::preamble();
        gif.extend(fixture::netscape(2));
        gif.extend(fixture::graphic_control(10));
        gif.extend(fixture::netscape(7));
        gif.extend(fixture::image(0, 0));
        gif.push(TRAILER);
        let doc = Parser::new().strict(true).parse(&gif).unwrap();
        assert_eq!(doc.frame_count(), 1);
        assert_eq!(doc.loop_count(), Some(7));
        assert_eq!(doc.delays(), vec![10]);
    }

    #[test]
    fn short_header() {
        let doc = Document::from_bytes(b"GIF8");
        assert_eq!(doc.header.signature(), b"GIF8\0\0");
        assert_eq!(doc.frame_count(), 0);
        let doc = Document::from_bytes(&[]);
        assert_eq!(doc.header.signature(), &[0; 6]);
        assert!(matches!(
            Parser::new().strict(true).parse(b"GIF8"),
            Err(Error::UnexpectedEndOfData)
        ));
    }

    #[test]
    fn app_data() {
        assert_eq!(parse_app_data(vec![1, 5, 1]), AppData::LoopCount(261));
        assert_eq!(
            parse_app_data(vec![2, 0, 0, 1, 0]),
            AppData::Buffering(65536)
        );
        let data = parse_app_data(vec![3, 9]);
        assert_eq!(data, AppData::Unknown(vec![3, 9]));
        assert_eq!(data.code(), 3);
        assert_eq!(parse_app_data(vec![1]), AppData::Unknown(vec![1]));
        assert_eq!(parse_app_data(vec![0x09, 2, 0]), AppData::LoopCount(2));
    }

    #[test]
    fn other_application() {
        let mut gif = fixture::SIMPLE[..25].to_vec();
        gif.extend_from_slice(&[0x21, 0xFF, 0x0B]);
        gif.extend_from_slice(b"XMP DataXMP");
        gif.extend_from_slice(&[3, b'<', b'x', b'>', 0]);
        gif.extend_from_slice(&fixture::SIMPLE[25..]);
        let doc = Parser::new().strict(true).parse(&gif).unwrap();
        assert!(!doc.is_animated());
        assert_eq!(doc.frame_count(), 1);
    }
}
