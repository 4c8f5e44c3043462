use embedded_graphics::{
    mono_font::{MonoFont, MonoTextStyleBuilder},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyleBuilder},
    text::{Baseline, Text},
};

pub fn draw_line<D>(
    target: &mut D,
    start: Point,
    end: Point,
    color: BinaryColor,
    width: u32
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions
{
    Line::new(start, end)
        .into_styled(PrimitiveStyleBuilder::new().stroke_width(width).stroke_color(color).build())
        .draw(target)
}

/// One pixel wide vertical line at column `x`, `half` rows either side of `center_y`.
/// Negative spans are drawn as their magnitude; clipping is left to the target.
pub fn draw_vertical_span<D>(
    target: &mut D,
    x: i32,
    center_y: i32,
    half: i32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    let half = half.saturating_abs();
    draw_line(
        target,
        Point::new(x, center_y.saturating_sub(half)),
        Point::new(x, center_y.saturating_add(half)),
        BinaryColor::On,
        1,
    )
}

pub fn draw_text<D>(
    target: &mut D,
    text: &str,
    x: i32,
    y: i32,
    font: &MonoFont,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor> + OriginDimensions,
{
    Text::with_baseline(
        text,
        Point::new(x, y),
        MonoTextStyleBuilder::new()
            .font(font)
            .text_color(BinaryColor::On)
            .build(),
        Baseline::Top,
    )
    .draw(target)?; // Draw on the passed mutable target reference
    Ok(())
}
