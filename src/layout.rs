use image::Rgba;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const NAVY: Rgba<u8> = Rgba([24, 32, 72, 255]);
const INK: Rgba<u8> = Rgba([40, 40, 40, 255]);

pub const CAPTION_FONT: &str = "fonts/Lemon.ttf";

/// Where and how one block of wrapped text is drawn. `start_y` is the first baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextBlock {
    pub font_size: f32,
    pub max_width: f32,
    pub center_x: f32,
    pub start_y: f32,
    pub line_height: f32,
    pub fill: Rgba<u8>,
}

/// Canvas, background and text placement for a single-field caption.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutProfile {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Relative to the assets directory.
    pub background: &'static str,
    pub font: &'static str,
    pub text: TextBlock,
}

static SQUARE: LayoutProfile = LayoutProfile {
    canvas_width: 554,
    canvas_height: 554,
    background: "image/pak_ustad.jpg",
    font: CAPTION_FONT,
    text: TextBlock {
        font_size: 30.0,
        max_width: 405.0,
        center_x: 277.0,
        start_y: 120.0,
        line_height: 35.0,
        fill: BLACK,
    },
};

static PORTRAIT: LayoutProfile = LayoutProfile {
    canvas_width: 720,
    canvas_height: 1065,
    background: "image/pak_ustad2.jpg",
    font: CAPTION_FONT,
    text: TextBlock {
        font_size: 40.0,
        max_width: 500.0,
        center_x: 360.0,
        start_y: 220.0,
        line_height: 45.0,
        fill: BLACK,
    },
};

/// Caption presets selectable through the request's `option` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionStyle {
    Type1,
    Type2,
    /// Missing or unrecognised `option`.
    Standard,
}

impl CaptionStyle {
    pub fn from_option(option: Option<&str>) -> Self {
        match option {
            Some("type1") => CaptionStyle::Type1,
            Some("type2") => CaptionStyle::Type2,
            _ => CaptionStyle::Standard,
        }
    }

    pub fn profile(self) -> &'static LayoutProfile {
        match self {
            CaptionStyle::Type1 | CaptionStyle::Standard => &SQUARE,
            CaptionStyle::Type2 => &PORTRAIT,
        }
    }
}

/// Square slot for the circular profile photo.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoSlot {
    pub x: u32,
    pub y: u32,
    pub size: u32,
}

/// The fixed certificate template: one photo and five independently placed text blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CertificateLayout {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: &'static str,
    pub font: &'static str,
    pub photo: PhotoSlot,
    pub name: TextBlock,
    pub high_school: TextBlock,
    pub jurusan: TextBlock,
    pub desc_bronze: TextBlock,
    pub desc_silver: TextBlock,
}

pub static CERTIFICATE: CertificateLayout = CertificateLayout {
    canvas_width: 1080,
    canvas_height: 1350,
    background: "image/certificate.png",
    font: CAPTION_FONT,
    photo: PhotoSlot { x: 390, y: 170, size: 300 },
    name: TextBlock {
        font_size: 56.0,
        max_width: 900.0,
        center_x: 540.0,
        start_y: 590.0,
        line_height: 60.0,
        fill: NAVY,
    },
    high_school: TextBlock {
        font_size: 36.0,
        max_width: 900.0,
        center_x: 540.0,
        start_y: 670.0,
        line_height: 42.0,
        fill: INK,
    },
    jurusan: TextBlock {
        font_size: 32.0,
        max_width: 900.0,
        center_x: 540.0,
        start_y: 730.0,
        line_height: 38.0,
        fill: INK,
    },
    desc_bronze: TextBlock {
        font_size: 26.0,
        max_width: 430.0,
        center_x: 290.0,
        start_y: 960.0,
        line_height: 32.0,
        fill: INK,
    },
    desc_silver: TextBlock {
        font_size: 26.0,
        max_width: 430.0,
        center_x: 790.0,
        start_y: 960.0,
        line_height: 32.0,
        fill: INK,
    },
};
