use crate::color::HslTriple;

/// A named, ordered palette of base colors used for allocation.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub name: &'static str,
    pub entries: &'static [HslTriple],
}

pub const DEFAULT_PALETTE: &str = "pastel";

const fn t(h: u16, s: u8, l: u8) -> HslTriple {
    HslTriple::new(h, s, l)
}

const PASTEL: &[HslTriple] = &[
    t(340, 70, 75), t(200, 70, 75), t(120, 50, 70), t(45, 80, 70),
    t(280, 60, 75), t(170, 60, 70), t(20, 80, 75), t(240, 60, 78),
    t(90, 50, 70), t(310, 50, 75), t(55, 70, 72), t(190, 50, 70),
];
const NEON: &[HslTriple] = &[
    t(320, 100, 60), t(180, 100, 50), t(90, 100, 50), t(45, 100, 55),
    t(270, 100, 65), t(0, 100, 60), t(200, 100, 55), t(140, 100, 50),
    t(30, 100, 55), t(300, 100, 60),
];
const EARTH: &[HslTriple] = &[
    t(25, 50, 45), t(45, 40, 50), t(90, 30, 40), t(15, 60, 35),
    t(35, 30, 60), t(160, 20, 40), t(0, 40, 40), t(60, 25, 45),
];
const JEWEL: &[HslTriple] = &[
    t(340, 70, 40), t(200, 80, 35), t(150, 70, 35), t(45, 90, 45),
    t(270, 60, 40), t(10, 80, 45), t(180, 70, 35), t(300, 60, 40),
];
const MUTED: &[HslTriple] = &[
    t(0, 25, 55), t(210, 25, 55), t(120, 20, 50), t(40, 30, 55),
    t(280, 20, 55), t(170, 25, 50), t(20, 30, 50), t(330, 20, 55),
];
const JADE: &[HslTriple] = &[
    t(150, 50, 45), t(160, 40, 55), t(140, 60, 35), t(170, 50, 40),
    t(130, 30, 60), t(180, 40, 45),
];
const FOREST: &[HslTriple] = &[
    t(100, 40, 35), t(80, 35, 45), t(120, 30, 30), t(30, 40, 35),
    t(60, 30, 40), t(140, 25, 45),
];
const OCEAN: &[HslTriple] = &[
    t(200, 70, 45), t(180, 60, 40), t(220, 60, 55), t(190, 80, 35),
    t(170, 50, 50), t(210, 40, 65),
];
const SUNSET: &[HslTriple] = &[
    t(15, 90, 55), t(35, 90, 55), t(350, 70, 50), t(50, 90, 60),
    t(320, 50, 50), t(270, 40, 45),
];
const AURORA: &[HslTriple] = &[
    t(160, 80, 50), t(280, 60, 60), t(120, 70, 55), t(200, 80, 60),
    t(320, 60, 60), t(180, 70, 45),
];
const WARM: &[HslTriple] = &[
    t(0, 70, 55), t(20, 80, 55), t(40, 85, 55), t(350, 60, 50),
    t(30, 60, 45), t(10, 50, 65),
];
const COOL: &[HslTriple] = &[
    t(200, 60, 55), t(240, 50, 60), t(180, 50, 45), t(260, 40, 55),
    t(220, 70, 45), t(190, 40, 65),
];
const BERRY: &[HslTriple] = &[
    t(330, 70, 45), t(300, 50, 40), t(350, 80, 50), t(270, 50, 45),
    t(310, 60, 60), t(0, 60, 40),
];
const MONOCHROME: &[HslTriple] = &[
    t(0, 0, 30), t(0, 0, 45), t(0, 0, 60), t(0, 0, 75), t(0, 0, 90),
];
const PROTANOPIA: &[HslTriple] = &[
    t(220, 80, 55), t(45, 90, 50), t(200, 30, 70), t(60, 60, 40),
    t(240, 40, 70), t(30, 20, 50),
];
const DEUTERANOPIA: &[HslTriple] = &[
    t(210, 80, 50), t(40, 90, 55), t(190, 40, 70), t(55, 60, 40),
    t(250, 50, 65), t(25, 30, 50),
];
const TRITANOPIA: &[HslTriple] = &[
    t(0, 80, 55), t(180, 60, 45), t(340, 50, 70), t(170, 40, 65),
    t(10, 40, 40), t(190, 30, 30),
];

const PALETTES: &[Palette] = &[
    Palette { name: "pastel", entries: PASTEL },
    Palette { name: "neon", entries: NEON },
    Palette { name: "earth", entries: EARTH },
    Palette { name: "jewel", entries: JEWEL },
    Palette { name: "muted", entries: MUTED },
    Palette { name: "jade", entries: JADE },
    Palette { name: "forest", entries: FOREST },
    Palette { name: "ocean", entries: OCEAN },
    Palette { name: "sunset", entries: SUNSET },
    Palette { name: "aurora", entries: AURORA },
    Palette { name: "warm", entries: WARM },
    Palette { name: "cool", entries: COOL },
    Palette { name: "berry", entries: BERRY },
    Palette { name: "monochrome", entries: MONOCHROME },
    Palette { name: "protanopia", entries: PROTANOPIA },
    Palette { name: "deuteranopia", entries: DEUTERANOPIA },
    Palette { name: "tritanopia", entries: TRITANOPIA },
];

/// Look up a palette by name (case-insensitive). Unknown names fall back to
/// the pastel palette.
pub fn palette(name: &str) -> Palette {
    PALETTES
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
        .copied()
        .unwrap_or(PALETTES[0])
}

/// All palette names in table order.
pub fn names() -> impl Iterator<Item = &'static str> {
    PALETTES.iter().map(|p| p.name)
}

/// Keyword to hue table for name-based suggestions. Checked in order, so
/// longer or more specific words come before the words they contain.
pub(crate) const NAME_HUES: &[(&str, u16)] = &[
    ("crimson", 348),
    ("scarlet", 5),
    ("ruby", 340),
    ("red", 0),
    ("orange", 30),
    ("amber", 40),
    ("gold", 45),
    ("yellow", 55),
    ("lime", 90),
    ("emerald", 140),
    ("green", 120),
    ("teal", 170),
    ("cyan", 180),
    ("azure", 210),
    ("sky", 200),
    ("blue", 220),
    ("navy", 230),
    ("indigo", 250),
    ("violet", 280),
    ("purple", 270),
    ("magenta", 300),
    ("pink", 330),
    ("rose", 345),
];
