// block.rs
//
// Copyright (c) 2026  gifcut developers
//
//! GIF blocks and frames
use crate::error::{Error, Result};
use crate::field::{pack, unpack};
use pix::rgb::SRgb8;

/// Number of bytes per color table entry
pub(crate) const CHANNELS: usize = 3;

/// Image separator (0x2C)
pub(crate) const IMAGE_SEPARATOR: u8 = b',';

/// GIF trailer (0x3B)
pub const TRAILER: u8 = b';';

/// Application identifiers which carry a loop count
const LOOPING_APPS: [&[u8; 11]; 2] = [b"NETSCAPE2.0", b"ANIMEXTS1.0"];

/// Color table presence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableExistence {
    Absent,
    Present,
}

/// Color table ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTableOrdering {
    NotSorted,
    Sorted,
}

/// Color table flags as declared in a packed field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTableConfig {
    existence: ColorTableExistence,
    ordering: ColorTableOrdering,
    size_bits: u8, // entries = 2^(size_bits + 1)
}

impl Default for ColorTableConfig {
    fn default() -> Self {
        ColorTableConfig {
            existence: ColorTableExistence::Absent,
            ordering: ColorTableOrdering::NotSorted,
            size_bits: 0,
        }
    }
}

impl ColorTableConfig {
    /// Create a new color table config
    pub fn new(
        existence: ColorTableExistence,
        ordering: ColorTableOrdering,
        size_bits: u8,
    ) -> Self {
        let size_bits = size_bits & 0b0111;
        ColorTableConfig {
            existence,
            ordering,
            size_bits,
        }
    }

    /// Get the table existence
    pub fn existence(&self) -> ColorTableExistence {
        self.existence
    }

    /// Get the table ordering
    pub fn ordering(&self) -> ColorTableOrdering {
        self.ordering
    }

    /// Get the declared size field (3 bits)
    pub fn size_bits(&self) -> u8 {
        self.size_bits
    }

    /// Get the number of entries (zero if absent)
    pub fn len(&self) -> usize {
        match self.existence {
            ColorTableExistence::Absent => 0,
            ColorTableExistence::Present => 2 << self.size_bits,
        }
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the size of the table in bytes
    pub fn size_bytes(&self) -> usize {
        self.len() * CHANNELS
    }
}

/// Table of RGB colors
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorTable {
    colors: Vec<SRgb8>,
}

impl ColorTable {
    /// Create a color table from a list of colors
    pub fn with_colors(colors: Vec<SRgb8>) -> Self {
        ColorTable { colors }
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Check if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Get the colors
    pub fn colors(&self) -> &[SRgb8] {
        &self.colors
    }
}

/// Header block: signature and version
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Header {
    signature: [u8; 6],
}

impl Default for Header {
    fn default() -> Self {
        Header {
            signature: *b"GIF89a",
        }
    }
}

impl Header {
    /// Create a header from its raw bytes (not validated)
    pub fn with_signature(signature: [u8; 6]) -> Self {
        Header { signature }
    }

    /// Get the raw signature bytes
    pub fn signature(&self) -> &[u8; 6] {
        &self.signature
    }

    /// Get the version bytes, such as `89a`
    pub fn version(&self) -> [u8; 3] {
        [self.signature[3], self.signature[4], self.signature[5]]
    }

    /// Check the signature and version.
    ///
    /// Parsing never calls this; headers are accepted as-is.
    pub fn validate(&self) -> Result<[u8; 3]> {
        if &self.signature[..3] != b"GIF" {
            return Err(Error::MalformedHeader);
        }
        let version = self.version();
        match &version {
            b"87a" | b"89a" => Ok(version),
            _ => Err(Error::UnsupportedVersion(version)),
        }
    }
}

/// Logical screen descriptor block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogicalScreenDesc {
    screen_width: u16,
    screen_height: u16,
    flags: u8,
    background_color_idx: u8, // index into global color table
    pixel_aspect_ratio: u8,
}

impl LogicalScreenDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const COLOR_RESOLUTION: u8 = 0b0111_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0000_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn with_screen_width(mut self, screen_width: u16) -> Self {
        self.screen_width = screen_width;
        self
    }

    pub fn screen_width(&self) -> u16 {
        self.screen_width
    }

    pub fn with_screen_height(mut self, screen_height: u16) -> Self {
        self.screen_height = screen_height;
        self
    }

    pub fn screen_height(&self) -> u16 {
        self.screen_height
    }

    pub(crate) fn set_screen_size(&mut self, width: u16, height: u16) {
        self.screen_width = width;
        self.screen_height = height;
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Get the color resolution field (3 bits)
    pub fn color_resolution(&self) -> u8 {
        unpack(self.flags, Self::COLOR_RESOLUTION)
    }

    /// Set the color resolution field (3 bits)
    pub fn with_color_resolution(mut self, resolution: u8) -> Self {
        self.flags = pack(self.flags, Self::COLOR_RESOLUTION, resolution);
        self
    }

    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        };
        let ordering = if self.flags & Self::COLOR_TABLE_ORDERING != 0 {
            ColorTableOrdering::Sorted
        } else {
            ColorTableOrdering::NotSorted
        };
        let size_bits = unpack(self.flags, Self::COLOR_TABLE_SIZE);
        ColorTableConfig::new(existence, ordering, size_bits)
    }

    /// Set color table flags, keeping the color resolution
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        let mut flags = self.flags & Self::COLOR_RESOLUTION;
        flags = pack(flags, Self::COLOR_TABLE_SIZE, tbl.size_bits);
        if tbl.existence == ColorTableExistence::Present {
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        if tbl.ordering == ColorTableOrdering::Sorted {
            flags |= Self::COLOR_TABLE_ORDERING;
        }
        self.flags = flags;
        self
    }

    pub fn with_background_color_idx(mut self, background_color_idx: u8) -> Self {
        self.background_color_idx = background_color_idx;
        self
    }

    pub fn background_color_idx(&self) -> u8 {
        self.background_color_idx
    }

    pub fn with_pixel_aspect_ratio(mut self, pixel_aspect_ratio: u8) -> Self {
        self.pixel_aspect_ratio = pixel_aspect_ratio;
        self
    }

    pub fn pixel_aspect_ratio(&self) -> u8 {
        self.pixel_aspect_ratio
    }
}

/// Disposal method for a frame
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisposalMethod {
    NoAction,
    Keep,
    Background,
    Previous,
    Reserved(u8),
}

impl From<u8> for DisposalMethod {
    fn from(n: u8) -> Self {
        use self::DisposalMethod::*;
        match n & 0b0111 {
            0 => NoAction,
            1 => Keep,
            2 => Background,
            3 => Previous,
            _ => Reserved(n & 0b0111),
        }
    }
}

impl From<DisposalMethod> for u8 {
    fn from(d: DisposalMethod) -> Self {
        use self::DisposalMethod::*;
        match d {
            NoAction => 0,
            Keep => 1,
            Background => 2,
            Previous => 3,
            Reserved(n) => n & 0b0111,
        }
    }
}

/// Graphic control extension block
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphicControl {
    flags: u8,
    delay_time_cs: u16, // delay in centiseconds (hundredths of a second)
    transparent_color_idx: u8,
}

impl GraphicControl {
    const RESERVED: u8 = 0b1110_0000;
    const DISPOSAL_METHOD: u8 = 0b0001_1100;
    const USER_INPUT: u8 = 0b0000_0010;
    const TRANSPARENT_COLOR: u8 = 0b0000_0001;

    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Get the reserved field (3 bits)
    pub fn reserved(&self) -> u8 {
        unpack(self.flags, Self::RESERVED)
    }

    pub fn disposal_method(&self) -> DisposalMethod {
        unpack(self.flags, Self::DISPOSAL_METHOD).into()
    }

    pub fn set_disposal_method(&mut self, disposal_method: DisposalMethod) {
        let d: u8 = disposal_method.into();
        self.flags = pack(self.flags, Self::DISPOSAL_METHOD, d);
    }

    pub fn user_input(&self) -> bool {
        self.flags & Self::USER_INPUT != 0
    }

    pub fn set_user_input(&mut self, user_input: bool) {
        self.flags = pack(self.flags, Self::USER_INPUT, user_input.into());
    }

    pub fn delay_time_cs(&self) -> u16 {
        self.delay_time_cs
    }

    pub fn set_delay_time_cs(&mut self, delay_time_cs: u16) {
        self.delay_time_cs = delay_time_cs;
    }

    /// Get the transparent color index, if the transparency flag is set
    pub fn transparent_color(&self) -> Option<u8> {
        if self.flags & Self::TRANSPARENT_COLOR != 0 {
            Some(self.transparent_color_idx)
        } else {
            None
        }
    }

    pub fn transparent_color_idx(&self) -> u8 {
        self.transparent_color_idx
    }

    pub fn set_transparent_color_idx(&mut self, transparent_color_idx: u8) {
        self.transparent_color_idx = transparent_color_idx;
    }

    pub fn set_transparent_color(&mut self, transparent_color: Option<u8>) {
        match transparent_color {
            Some(t) => {
                self.flags |= Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = t;
            }
            None => {
                self.flags &= !Self::TRANSPARENT_COLOR;
                self.transparent_color_idx = 0;
            }
        }
    }
}

/// Data carried by the first sub-block of a looping application extension
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppData {
    /// Extension code 1: number of times to loop (zero means forever)
    LoopCount(u16),
    /// Extension code 2: buffer size for streaming
    Buffering(u32),
    /// Any other code; raw sub-block bytes, starting with the packed byte
    Unknown(Vec<u8>),
}

impl AppData {
    /// Packed byte {reserved:5, extension code:3} mask
    pub(crate) const EXTENSION_CODE: u8 = 0b0000_0111;

    /// Get the extension code
    pub fn code(&self) -> u8 {
        match self {
            AppData::LoopCount(_) => 1,
            AppData::Buffering(_) => 2,
            AppData::Unknown(d) => {
                d.first().map_or(0, |b| unpack(*b, Self::EXTENSION_CODE))
            }
        }
    }
}

/// Application extension block (`NETSCAPE2.0` looping)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Application {
    app_id: [u8; 8],
    auth_code: [u8; 3],
    app_data: Option<AppData>,
}

impl Default for Application {
    fn default() -> Self {
        Application {
            app_id: *b"NETSCAPE",
            auth_code: *b"2.0",
            app_data: None,
        }
    }
}

impl Application {
    /// Create a `NETSCAPE2.0` block with a loop count
    pub fn with_loop_count(loop_count: u16) -> Self {
        let mut app = Application::default();
        app.set_app_data(Some(AppData::LoopCount(loop_count)));
        app
    }

    pub(crate) fn with_ids(app_id: [u8; 8], auth_code: [u8; 3]) -> Self {
        Application {
            app_id,
            auth_code,
            app_data: None,
        }
    }

    /// Check if identifier and auth code denote a looping extension
    pub fn is_looping(&self) -> bool {
        let mut id = [0; 11];
        id[..8].copy_from_slice(&self.app_id);
        id[8..].copy_from_slice(&self.auth_code);
        LOOPING_APPS.iter().any(|app| **app == id)
    }

    pub fn app_id(&self) -> &[u8; 8] {
        &self.app_id
    }

    pub fn auth_code(&self) -> &[u8; 3] {
        &self.auth_code
    }

    pub fn app_data(&self) -> Option<&AppData> {
        self.app_data.as_ref()
    }

    pub fn set_app_data(&mut self, app_data: Option<AppData>) {
        self.app_data = app_data;
    }

    /// Get the loop count (zero means loop forever)
    pub fn loop_count(&self) -> Option<u16> {
        match self.app_data {
            Some(AppData::LoopCount(c)) => Some(c),
            _ => None,
        }
    }

    /// Get the buffering size
    pub fn buffering_size(&self) -> Option<u32> {
        match self.app_data {
            Some(AppData::Buffering(sz)) => Some(sz),
            _ => None,
        }
    }
}

/// Comment extension block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Comment {
    comments: Vec<Vec<u8>>, // ascii only comments recommended
}

impl Comment {
    pub fn add_comment(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.comments.push(b.to_vec());
    }

    pub fn comments(&self) -> &[Vec<u8>] {
        &self.comments
    }
}

/// Plain text extension block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlainText {
    pub text_grid_left: u16,
    pub text_grid_top: u16,
    pub text_grid_width: u16,
    pub text_grid_height: u16,
    pub cell_width: u8,
    pub cell_height: u8,
    pub foreground_color_idx: u8,
    pub background_color_idx: u8,
    sub_blocks: Vec<Vec<u8>>,
}

impl PlainText {
    pub fn add_sub_block(&mut self, b: &[u8]) {
        assert!(b.len() < 256);
        self.sub_blocks.push(b.to_vec());
    }

    pub fn sub_blocks(&self) -> &[Vec<u8>] {
        &self.sub_blocks
    }
}

/// Image descriptor block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageDesc {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    flags: u8,
}

impl ImageDesc {
    const COLOR_TABLE_PRESENT: u8 = 0b1000_0000;
    const INTERLACED: u8 = 0b0100_0000;
    const COLOR_TABLE_ORDERING: u8 = 0b0010_0000;
    const RESERVED: u8 = 0b0001_1000;
    const COLOR_TABLE_SIZE: u8 = 0b0000_0111;

    pub fn with_left(mut self, left: u16) -> Self {
        self.left = left;
        self
    }

    pub fn left(&self) -> u16 {
        self.left
    }

    pub fn with_top(mut self, top: u16) -> Self {
        self.top = top;
        self
    }

    pub fn top(&self) -> u16 {
        self.top
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = width;
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn with_height(mut self, height: u16) -> Self {
        self.height = height;
        self
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub(crate) fn set_position(&mut self, left: u16, top: u16) {
        self.left = left;
        self.top = top;
    }

    pub(crate) fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn with_flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn interlaced(&self) -> bool {
        self.flags & Self::INTERLACED != 0
    }

    /// Get the reserved field (2 bits)
    pub fn reserved(&self) -> u8 {
        unpack(self.flags, Self::RESERVED)
    }

    pub fn color_table_config(&self) -> ColorTableConfig {
        let existence = if self.flags & Self::COLOR_TABLE_PRESENT != 0 {
            ColorTableExistence::Present
        } else {
            ColorTableExistence::Absent
        };
        let ordering = if self.flags & Self::COLOR_TABLE_ORDERING != 0 {
            ColorTableOrdering::Sorted
        } else {
            ColorTableOrdering::NotSorted
        };
        let size_bits = unpack(self.flags, Self::COLOR_TABLE_SIZE);
        ColorTableConfig::new(existence, ordering, size_bits)
    }

    /// Set color table flags, keeping interlace and reserved bits
    pub fn with_color_table_config(mut self, tbl: &ColorTableConfig) -> Self {
        self.set_color_table_config(tbl);
        self
    }

    pub(crate) fn set_color_table_config(&mut self, tbl: &ColorTableConfig) {
        let mut flags = self.flags & (Self::INTERLACED | Self::RESERVED);
        flags = pack(flags, Self::COLOR_TABLE_SIZE, tbl.size_bits);
        if tbl.existence == ColorTableExistence::Present {
            flags |= Self::COLOR_TABLE_PRESENT;
        }
        if tbl.ordering == ColorTableOrdering::Sorted {
            flags |= Self::COLOR_TABLE_ORDERING;
        }
        self.flags = flags;
    }
}

/// Extension blocks recognized between frames
#[derive(Clone, Debug, PartialEq)]
pub enum Extension {
    GraphicControl(GraphicControl),
    Application(Application),
    Comment(Comment),
    PlainText(PlainText),
}

/// Extension signatures (introducer, label and fixed block size)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ExtensionCode {
    GraphicControl_,
    Application_,
    Comment_,
    PlainText_,
}

impl ExtensionCode {
    /// Codes probed between blocks, in order
    pub const PROBED: [ExtensionCode; 3] = [
        ExtensionCode::Application_,
        ExtensionCode::Comment_,
        ExtensionCode::PlainText_,
    ];

    pub fn signature(self) -> &'static [u8] {
        use self::ExtensionCode::*;
        match self {
            GraphicControl_ => &[0x21, 0xF9, 0x04],
            Application_ => &[0x21, 0xFF, 0x0B],
            Comment_ => &[0x21, 0xFE],
            PlainText_ => &[0x21, 0x01, 0x0C],
        }
    }
}

/// One frame: control block, descriptor, color table and compressed body
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub graphic_control_ext: GraphicControl,
    pub image_desc: ImageDesc,
    pub local_color_table: Option<ColorTable>,
    /// LZW image data sub-blocks, not interpreted
    pub body: Vec<u8>,
}

impl Frame {
    /// Give the frame its own copy of a color table, if it has none.
    ///
    /// Used when a frame leaves the document owning the global table.
    pub(crate) fn materialize_color_table(
        &mut self,
        config: &ColorTableConfig,
        table: &ColorTable,
    ) {
        if self.local_color_table.is_none() && !table.is_empty() {
            let config = ColorTableConfig::new(
                ColorTableExistence::Present,
                config.ordering(),
                config.size_bits(),
            );
            self.image_desc.set_color_table_config(&config);
            self.local_color_table = Some(table.clone());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn color_table_len() {
        for bits in 0..8 {
            let t = ColorTableConfig::new(
                ColorTableExistence::Present,
                ColorTableOrdering::NotSorted,
                bits,
            );
            assert_eq!(t.len(), 1 << (bits + 1));
            assert_eq!(t.size_bytes(), 3 << (bits + 1));
        }
        assert_eq!(ColorTableConfig::default().len(), 0);
    }

    #[test]
    fn screen_flags() {
        let d = LogicalScreenDesc::default().with_flags(0b1011_1010);
        let c = d.color_table_config();
        assert_eq!(c.existence(), ColorTableExistence::Present);
        assert_eq!(c.ordering(), ColorTableOrdering::Sorted);
        assert_eq!(c.size_bits(), 2);
        assert_eq!(c.len(), 8);
        assert_eq!(d.color_resolution(), 3);
        let d = d.with_color_table_config(&ColorTableConfig::default());
        assert_eq!(d.flags(), 0b0011_0000);
    }

    #[test]
    fn image_flags() {
        let d = ImageDesc::default().with_flags(0b0101_1001);
        assert!(d.interlaced());
        assert_eq!(d.reserved(), 0b11);
        assert_eq!(d.color_table_config().len(), 0);
        let c = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::Sorted,
            3,
        );
        let d = d.with_color_table_config(&c);
        assert_eq!(d.flags(), 0b1111_1011);
    }

    #[test]
    fn graphic_control_flags() {
        let mut gc = GraphicControl::default();
        gc.set_flags(0b1110_0000);
        gc.set_disposal_method(DisposalMethod::Background);
        assert_eq!(gc.disposal_method(), DisposalMethod::Background);
        assert_eq!(gc.reserved(), 0b111);
        gc.set_user_input(true);
        assert!(gc.user_input());
        gc.set_transparent_color(Some(5));
        assert_eq!(gc.transparent_color(), Some(5));
        assert_eq!(gc.flags(), 0b1110_1011);
        gc.set_transparent_color(None);
        gc.set_user_input(false);
        assert_eq!(gc.transparent_color(), None);
        assert_eq!(gc.flags(), 0b1110_1000);
        gc.set_flags(0b0001_1100);
        assert_eq!(gc.disposal_method(), DisposalMethod::Reserved(7));
    }

    #[test]
    fn header() {
        assert_eq!(Header::default().validate().unwrap(), *b"89a");
        let h = Header::with_signature(*b"GIF87a");
        assert_eq!(h.validate().unwrap(), *b"87a");
        let h = Header::with_signature(*b"GIF90a");
        assert!(matches!(h.validate(), Err(Error::UnsupportedVersion(_))));
        let h = Header::with_signature(*b"JIF89a");
        assert!(matches!(h.validate(), Err(Error::MalformedHeader)));
    }

    #[test]
    fn loop_count() {
        let b = Application::default();
        assert!(b.is_looping());
        assert_eq!(b.loop_count(), None);
        let b = Application::with_loop_count(0);
        assert_eq!(b.loop_count(), Some(0));
        assert_eq!(b.app_data().map(|d| d.code()), Some(1));
        let b = Application::with_loop_count(4);
        assert_eq!(b.loop_count(), Some(4));
        let b = Application::with_ids(*b"XMP Data", *b"XMP");
        assert!(!b.is_looping());
    }

    #[test]
    fn materialize() {
        let table = ColorTable::with_colors(vec![
            SRgb8::new(0, 0, 0),
            SRgb8::new(255, 255, 255),
        ]);
        let config = ColorTableConfig::new(
            ColorTableExistence::Present,
            ColorTableOrdering::Sorted,
            0,
        );
        let mut frame = Frame::default();
        frame.image_desc = frame.image_desc.with_flags(0b0100_0000);
        frame.materialize_color_table(&config, &table);
        assert_eq!(frame.local_color_table.as_ref(), Some(&table));
        assert_eq!(frame.image_desc.flags(), 0b1110_0000);
        // an existing local table is kept
        let other = ColorTable::default();
        frame.materialize_color_table(&config, &other);
        assert_eq!(frame.local_color_table, Some(table));
    }
}
