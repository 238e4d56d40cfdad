use std::collections::HashMap;
use std::sync::Arc;

use crate::foundation::error::{ReelError, ReelResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Stateful helper for building Parley text layouts from raw font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: Option<String>,
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            family_name: None,
        }
    }

    fn register(&mut self, font_bytes: &[u8]) -> ReelResult<String> {
        if let Some(name) = &self.family_name {
            return Ok(name.clone());
        }
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| ReelError::validation("no font families registered from font bytes"))?;
        let name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| ReelError::validation("registered font family has no name"))?
            .to_string();
        self.family_name = Some(name.clone());
        Ok(name)
    }

    /// Shape and lay out plain text, wrapped at `max_width_px`.
    pub(crate) fn layout_plain(
        &mut self,
        text: &str,
        font_bytes: &[u8],
        size_px: f32,
        brush: TextBrushRgba8,
        max_width_px: f32,
        centered: bool,
    ) -> ReelResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ReelError::validation("text size_px must be finite and > 0"));
        }
        let family_name = self.register(font_bytes)?;

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family_name)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(Some(max_width_px));
        let alignment = if centered {
            parley::Alignment::Center
        } else {
            parley::Alignment::Start
        };
        layout.align(
            Some(max_width_px),
            alignment,
            parley::AlignmentOptions::default(),
        );
        Ok(layout)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct WrapKey {
    text: String,
    max_width_bits: u32,
    size_bits: u32,
}

/// Laid out text plus the font needed to draw its glyphs.
#[derive(Clone)]
pub(crate) struct TextBlock {
    pub(crate) layout: Arc<parley::Layout<TextBrushRgba8>>,
    pub(crate) font: vello_cpu::peniko::FontData,
}

/// Word-wrap cache keyed by `(text, max_width, size)`, so a caption that stays on screen for
/// hundreds of frames is shaped once.
pub struct TextCache {
    engine: TextLayoutEngine,
    font_bytes: Option<Arc<Vec<u8>>>,
    font: Option<vello_cpu::peniko::FontData>,
    layouts: HashMap<WrapKey, Arc<parley::Layout<TextBrushRgba8>>>,
    misses: u64,
    warned_missing_font: bool,
}

impl Default for TextCache {
    fn default() -> Self {
        Self::new(None)
    }
}

impl TextCache {
    pub fn new(font_bytes: Option<Vec<u8>>) -> Self {
        let font_bytes = font_bytes.map(Arc::new);
        let font = font_bytes.as_ref().map(|b| {
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(b.as_ref().clone()), 0)
        });
        Self {
            engine: TextLayoutEngine::new(),
            font_bytes,
            font,
            layouts: HashMap::new(),
            misses: 0,
            warned_missing_font: false,
        }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Number of layouts shaped so far.
    pub fn miss_count(&self) -> u64 {
        self.misses
    }

    /// Layouts currently held.
    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    /// Drop every cached layout. The font stays registered.
    pub fn clear(&mut self) {
        self.layouts.clear();
    }

    /// Wrapped layout for `text`, or `None` when no font is configured.
    pub(crate) fn block(
        &mut self,
        text: &str,
        size_px: f32,
        max_width_px: f32,
        centered: bool,
    ) -> ReelResult<Option<TextBlock>> {
        let (Some(bytes), Some(font)) = (self.font_bytes.clone(), self.font.clone()) else {
            if !self.warned_missing_font {
                tracing::debug!("no font configured; text overlays are skipped");
                self.warned_missing_font = true;
            }
            return Ok(None);
        };
        let key = WrapKey {
            text: text.to_owned(),
            max_width_bits: max_width_px.to_bits(),
            size_bits: size_px.to_bits() ^ u32::from(centered),
        };
        if let Some(layout) = self.layouts.get(&key) {
            return Ok(Some(TextBlock {
                layout: layout.clone(),
                font,
            }));
        }
        let brush = TextBrushRgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        };
        let layout =
            Arc::new(
                self.engine
                    .layout_plain(text, &bytes, size_px, brush, max_width_px, centered)?,
            );
        self.misses = self.misses.saturating_add(1);
        self.layouts.insert(key, layout.clone());
        Ok(Some(TextBlock { layout, font }))
    }
}

/// Split narrative text into sentences, keeping terminal punctuation.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        cur.push(c);
        if matches!(c, '.' | '!' | '?' | '…') {
            let at_break = chars.peek().is_none_or(|n| n.is_whitespace());
            if at_break {
                let s = cur.trim();
                if !s.is_empty() {
                    out.push(s.to_owned());
                }
                cur.clear();
            }
        }
    }
    let s = cur.trim();
    if !s.is_empty() {
        out.push(s.to_owned());
    }
    out
}

/// Distribute sentences across three thirds as evenly as possible, earlier thirds first.
pub fn narrative_thirds(text: &str) -> [String; 3] {
    let sentences = split_sentences(text);
    let n = sentences.len();
    let mut out: [String; 3] = Default::default();
    if n == 0 {
        return out;
    }
    let base = n / 3;
    let extra = n % 3;
    let mut i = 0;
    for (k, slot) in out.iter_mut().enumerate() {
        let take = base + usize::from(k < extra);
        *slot = sentences[i..i + take].join(" ");
        i += take;
    }
    out
}

/// Which narrative third (if any) is visible at `progress` percent.
pub fn active_third(progress: f64, windows: &[[f64; 2]; 3]) -> Option<usize> {
    windows
        .iter()
        .position(|[lo, hi]| progress >= *lo && progress < *hi)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/text.rs"]
mod tests;
