use std::borrow::Cow;

use crate::foundation::core::{Rect, Rgba8, Vec2};
use crate::foundation::error::{PosterError, PosterResult};
use crate::layout::wrap::TextMeasurer;
use crate::render::surface::Surface;
use crate::text::font::{FontSet, FontSpec};

/// Measures and draws single lines of text onto a [`Surface`].
pub trait Typesetter: TextMeasurer {
    /// Draw `text` with its baseline at `baseline`, anchored at `x` per the surface's current
    /// [`crate::TextAlign`].
    fn fill_text(
        &mut self,
        surface: &mut Surface,
        text: &str,
        font: &FontSpec,
        x: f64,
        baseline: f64,
        color: Rgba8,
    ) -> PosterResult<()>;
}

/// Produces a fresh [`Typesetter`] for each render.
///
/// Typesetters carry mutable shaping caches, so renders never share one.
pub trait TypesetterSource: Send + Sync {
    /// Build a typesetter for one render.
    fn typesetter(&self) -> PosterResult<Box<dyn Typesetter>>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color carried through parley layouts.
pub struct TextBrushRgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

struct ShapingFace {
    weight: u16,
    italic: bool,
    font_ctx: parley::FontContext,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

/// Typesetter that shapes with parley from caller-supplied font bytes.
///
/// Every face gets its own font collection, so the face chosen by [`FontSet::best_face_index`]
/// is exactly the one shaped and drawn.
pub struct ParleyTypesetter {
    fonts: FontSet,
    faces: Vec<ShapingFace>,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
}

impl ParleyTypesetter {
    /// Register every face of `fonts`.
    pub fn new(fonts: &FontSet) -> PosterResult<Self> {
        if fonts.is_empty() {
            return Err(PosterError::config("typesetter needs at least one font face"));
        }
        let mut faces = Vec::with_capacity(fonts.faces().len());
        for face in fonts.faces() {
            let mut font_ctx = parley::FontContext::default();
            let families = font_ctx.collection.register_fonts(
                parley::fontique::Blob::from(face.bytes.as_ref().clone()),
                None,
            );
            let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
                PosterError::config("no font families registered from font bytes")
            })?;
            let family_name = font_ctx
                .collection
                .family_name(family_id)
                .ok_or_else(|| PosterError::config("registered font family has no name"))?
                .to_string();
            let font = vello_cpu::peniko::FontData::new(
                vello_cpu::peniko::Blob::from(face.bytes.as_ref().clone()),
                0,
            );
            tracing::debug!(
                family = %family_name,
                weight = face.weight,
                italic = face.italic,
                "registered font face"
            );
            faces.push(ShapingFace {
                weight: face.weight,
                italic: face.italic,
                font_ctx,
                family_name,
                font,
            });
        }

        Ok(Self {
            fonts: fonts.clone(),
            faces,
            layout_ctx: parley::LayoutContext::new(),
        })
    }

    /// Family names of the registered faces, in registration order.
    pub fn family_names(&self) -> Vec<&str> {
        self.faces.iter().map(|f| f.family_name.as_str()).collect()
    }

    fn layout_line(
        &mut self,
        text: &str,
        spec: &FontSpec,
    ) -> PosterResult<(usize, parley::Layout<TextBrushRgba8>)> {
        if !spec.size_px.is_finite() || spec.size_px <= 0.0 {
            return Err(PosterError::validation(
                "text size_px must be finite and > 0",
            ));
        }
        let face_i = self.fonts.best_face_index(spec)?;
        let face = &mut self.faces[face_i];

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut face.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(face.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(spec.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(face.weight)),
        ));
        if face.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok((face_i, layout))
    }
}

impl TextMeasurer for ParleyTypesetter {
    /// Unshapeable text measures as unbounded, so wrapping breaks at every word; drawing the
    /// same text then fails with the shaping error.
    fn measure_width(&mut self, text: &str, font: &FontSpec) -> f64 {
        width_or_unbounded(
            self.layout_line(text, font)
                .map(|(_, layout)| f64::from(layout.width())),
        )
    }
}

fn width_or_unbounded(measured: PosterResult<f64>) -> f64 {
    measured.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "text measurement failed; treating as unbounded width");
        f64::INFINITY
    })
}

impl Typesetter for ParleyTypesetter {
    fn fill_text(
        &mut self,
        surface: &mut Surface,
        text: &str,
        font: &FontSpec,
        x: f64,
        baseline: f64,
        color: Rgba8,
    ) -> PosterResult<()> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let (face_i, layout) = self.layout_line(text, font)?;
        let start_x = surface
            .text_align()
            .start_x(x, f64::from(layout.width()));
        let face_font = &self.faces[face_i].font;

        for line in layout.lines() {
            let line_baseline = f64::from(line.metrics().baseline);
            let origin = Vec2::new(start_x, baseline - line_baseline);
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: u32::from(g.id),
                    x: g.x,
                    y: g.y,
                });
                surface.fill_glyphs(face_font, run.run().font_size(), origin, color, glyphs);
            }
        }
        Ok(())
    }
}

impl TypesetterSource for FontSet {
    fn typesetter(&self) -> PosterResult<Box<dyn Typesetter>> {
        Ok(Box::new(ParleyTypesetter::new(self)?))
    }
}

/// Font-independent typesetter: every character advances `em × size`.
///
/// Non-space characters are drawn as solid blocks from the baseline up to 0.7 em. Output is
/// fully deterministic, which makes it the typesetter of choice for tests and for rendering
/// without font files.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedAdvanceTypesetter {
    em: f64,
}

impl FixedAdvanceTypesetter {
    /// Typesetter advancing `em` font sizes per character.
    pub fn new(em: f64) -> Self {
        Self { em }
    }

    fn advance(&self, font: &FontSpec) -> f64 {
        self.em * f64::from(font.size_px)
    }
}

impl Default for FixedAdvanceTypesetter {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TextMeasurer for FixedAdvanceTypesetter {
    fn measure_width(&mut self, text: &str, font: &FontSpec) -> f64 {
        text.chars().count() as f64 * self.advance(font)
    }
}

impl Typesetter for FixedAdvanceTypesetter {
    fn fill_text(
        &mut self,
        surface: &mut Surface,
        text: &str,
        font: &FontSpec,
        x: f64,
        baseline: f64,
        color: Rgba8,
    ) -> PosterResult<()> {
        let advance = self.advance(font);
        let width = self.measure_width(text, font);
        let start_x = surface.text_align().start_x(x, width);
        let cap = 0.7 * f64::from(font.size_px);
        // Italic faces lean their blocks one tenth of an advance.
        let lean = if font.italic { advance * 0.1 } else { 0.0 };

        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = start_x + i as f64 * advance + lean;
            surface.fill_rect(
                Rect::new(x0, baseline - cap, x0 + advance * 0.8, baseline),
                color,
            );
        }
        Ok(())
    }
}

impl TypesetterSource for FixedAdvanceTypesetter {
    fn typesetter(&self) -> PosterResult<Box<dyn Typesetter>> {
        Ok(Box::new(*self))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/typesetter.rs"]
mod tests;
