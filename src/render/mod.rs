//! Scannable-code rendering
//!
//! The core treats rendered markup as an opaque blob; everything here
//! sits behind the `CodeRenderer` seam. The default renderer emits a
//! Code 39 barcode as SVG, which is pure and deterministic given the
//! code string, so its output is safe to memoize by code.

use crate::artifact_cache::{BoundedArtifactCache, KeyValueStore};

/// Rendering collaborator: `code -> markup`.
///
/// Implementations must be pure and deterministic; they are assumed
/// potentially expensive, which is what justifies the artifact cache.
pub trait CodeRenderer {
    fn render(&self, code: &str) -> String;
}

/// Code 39 barcode renderer producing SVG markup.
///
/// Codes are uppercased and wrapped in the `*` start/stop sentinel;
/// characters outside the Code 39 alphabet are mapped to `-` so the
/// renderer stays total.
pub struct Code39SvgRenderer {
    /// Width of one narrow module in SVG units
    unit: u32,
    /// Bar height in SVG units
    height: u32,
}

impl Default for Code39SvgRenderer {
    fn default() -> Self {
        Self { unit: 2, height: 50 }
    }
}

// Element widths per symbol, alternating bar/space starting with a bar;
// '1' is wide, '0' is narrow.
const CODE39_TABLE: &[(char, &str)] = &[
    ('0', "000110100"),
    ('1', "100100001"),
    ('2', "001100001"),
    ('3', "101100000"),
    ('4', "000110001"),
    ('5', "100110000"),
    ('6', "001110000"),
    ('7', "000100101"),
    ('8', "100100100"),
    ('9', "001100100"),
    ('A', "100001001"),
    ('B', "001001001"),
    ('C', "101001000"),
    ('D', "000011001"),
    ('E', "100011000"),
    ('F', "001011000"),
    ('G', "000001101"),
    ('H', "100001100"),
    ('I', "001001100"),
    ('J', "000011100"),
    ('K', "100000011"),
    ('L', "001000011"),
    ('M', "101000010"),
    ('N', "000010011"),
    ('O', "100010010"),
    ('P', "001010010"),
    ('Q', "000000111"),
    ('R', "100000110"),
    ('S', "001000110"),
    ('T', "000010110"),
    ('U', "110000001"),
    ('V', "011000001"),
    ('W', "111000000"),
    ('X', "010010001"),
    ('Y', "110010000"),
    ('Z', "011010000"),
    ('-', "010000101"),
    ('.', "110000100"),
    (' ', "011000100"),
    ('*', "010010100"),
];

impl Code39SvgRenderer {
    pub fn new(unit: u32, height: u32) -> Self {
        Self { unit, height }
    }

    fn widths_for(symbol: char) -> &'static str {
        CODE39_TABLE
            .iter()
            .find(|(c, _)| *c == symbol)
            .or_else(|| CODE39_TABLE.iter().find(|(c, _)| *c == '-'))
            .map(|(_, widths)| *widths)
            .unwrap_or("010000101")
    }
}

impl CodeRenderer for Code39SvgRenderer {
    fn render(&self, code: &str) -> String {
        let narrow = self.unit;
        let wide = self.unit * 3;

        let symbols: Vec<char> = std::iter::once('*')
            .chain(code.trim().to_uppercase().chars())
            .chain(std::iter::once('*'))
            .collect();

        let mut rects = String::new();
        let mut x = 0u32;
        for (i, symbol) in symbols.iter().enumerate() {
            let widths = Self::widths_for(*symbol);
            for (element, wide_flag) in widths.chars().enumerate() {
                let w = if wide_flag == '1' { wide } else { narrow };
                // Even elements are bars, odd are spaces
                if element % 2 == 0 {
                    rects.push_str(&format!(
                        "<rect x=\"{}\" y=\"0\" width=\"{}\" height=\"{}\"/>",
                        x, w, self.height
                    ));
                }
                x += w;
            }
            // Inter-character gap, skipped after the stop sentinel
            if i + 1 < symbols.len() {
                x += narrow;
            }
        }

        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
             viewBox=\"0 0 {} {}\" shape-rendering=\"crispEdges\"><g fill=\"#000\">{}</g></svg>",
            x, self.height, x, self.height, rects
        )
    }
}

/// Renderer wired to the artifact cache: cache hit returns the stored
/// markup, miss renders, stores, and returns.
pub struct CachedRenderer<R: CodeRenderer, S: KeyValueStore> {
    renderer: R,
    cache: BoundedArtifactCache<S>,
}

impl<R: CodeRenderer, S: KeyValueStore> CachedRenderer<R, S> {
    pub fn new(renderer: R, cache: BoundedArtifactCache<S>) -> Self {
        Self { renderer, cache }
    }

    pub fn markup_for(&mut self, code: &str) -> String {
        if let Some(markup) = self.cache.get(code) {
            return markup;
        }
        let markup = self.renderer.render(code);
        self.cache.set(code, &markup);
        markup
    }

    /// Wholesale invalidation on data reload; codes may have been
    /// reassigned to different items.
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &BoundedArtifactCache<S> {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact_cache::{CacheSettings, MemoryStore};

    #[test]
    fn rendering_is_deterministic() {
        let renderer = Code39SvgRenderer::default();
        assert_eq!(renderer.render("TC-1001"), renderer.render("TC-1001"));
        assert_ne!(renderer.render("TC-1001"), renderer.render("TC-1002"));
    }

    #[test]
    fn case_and_whitespace_do_not_change_the_symbol() {
        let renderer = Code39SvgRenderer::default();
        assert_eq!(renderer.render(" tc-1001 "), renderer.render("TC-1001"));
    }

    #[test]
    fn unencodable_characters_degrade_to_dash() {
        let renderer = Code39SvgRenderer::default();
        assert_eq!(renderer.render("A_B"), renderer.render("A-B"));
    }

    #[test]
    fn output_is_svg_markup() {
        let markup = Code39SvgRenderer::default().render("TC-1");
        assert!(markup.starts_with("<svg"));
        assert!(markup.ends_with("</svg>"));
        assert!(markup.contains("<rect"));
    }

    #[test]
    fn cached_renderer_serves_hits_from_the_cache() {
        let cache = BoundedArtifactCache::new(MemoryStore::new(), CacheSettings::default());
        let mut cached = CachedRenderer::new(Code39SvgRenderer::default(), cache);
        let first = cached.markup_for("TC-1001");
        assert_eq!(cached.cache().entry_count(), 1);
        let second = cached.markup_for("TC-1001");
        assert_eq!(first, second);
        assert_eq!(cached.cache().entry_count(), 1);
    }

    #[test]
    fn cached_renderer_still_renders_when_cache_is_disabled() {
        // A store this small rejects the very first envelope
        let store = MemoryStore::with_capacity_bytes(8);
        let cache = BoundedArtifactCache::new(store, CacheSettings::default());
        let mut cached = CachedRenderer::new(Code39SvgRenderer::default(), cache);
        let markup = cached.markup_for("TC-1001");
        assert!(markup.starts_with("<svg"));
        assert!(!cached.cache().is_enabled());
    }
}
