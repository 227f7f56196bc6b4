//! Channel display colours.
//!
//! Each output channel drives LEDs of one colour. These helpers describe that
//! colour as `palette::Srgb` so a status view can show an approximation of the
//! combined light without knowing anything about the fixture.

use palette::{Clamp, Srgb};

pub const ROYAL_BLUE: Srgb = Srgb::new(0.129, 0.588, 0.953);
pub const COOL_WHITE: Srgb = Srgb::new(0.878, 0.878, 0.878);
pub const DEEP_RED: Srgb = Srgb::new(0.957, 0.263, 0.212);
pub const GREEN: Srgb = Srgb::new(0.298, 0.686, 0.314);
pub const ULTRAVIOLET: Srgb = Srgb::new(0.612, 0.153, 0.690);
pub const MOONLIGHT: Srgb = Srgb::new(1.0, 0.843, 0.0);

/// Colours assigned to channels 0..6 by default; further channels repeat them.
pub const CHANNEL_DEFAULTS: [Srgb; 6] = [
    ROYAL_BLUE,
    COOL_WHITE,
    DEEP_RED,
    GREEN,
    ULTRAVIOLET,
    MOONLIGHT,
];

/// Creates a colour from a `0xRRGGBB` value.
#[inline]
pub fn hex(rgb: u32) -> Srgb {
    Srgb::new(
        ((rgb >> 16) & 0xFF) as u8,
        ((rgb >> 8) & 0xFF) as u8,
        (rgb & 0xFF) as u8,
    )
    .into_format()
}

/// Additively mixes channel colours, each scaled by a level in `0.0..=1.0`.
///
/// The sum is clamped, so several bright channels saturate to white-ish
/// rather than overflowing.
pub fn blend<I>(layers: I) -> Srgb
where
    I: IntoIterator<Item = (Srgb, f32)>,
{
    let mixed = layers
        .into_iter()
        .fold(Srgb::new(0.0, 0.0, 0.0), |acc, (color, level)| {
            let level = level.clamp(0.0, 1.0);
            Srgb::new(
                acc.red + color.red * level,
                acc.green + color.green * level,
                acc.blue + color.blue * level,
            )
        });
    Clamp::clamp(mixed)
}
