//! Print-ready adhesive label output
//!
//! Pure formatting: a small fixed-size printable HTML document embedding
//! the rendered code markup, the code itself, and the first line of the
//! item name truncated to fit a physical label.

use crate::config::LabelConfig;
use crate::models::StockRecord;

/// Truncate to at most `max_chars` characters, on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Produce the printable label document for one selected record.
///
/// `markup` is the rendered code visual, embedded verbatim; record text
/// is escaped. Only the first line of the name is used, truncated to the
/// configured character count.
pub fn render_label(record: &StockRecord, markup: &str, config: &LabelConfig) -> String {
    let name = truncate_chars(record.display_name(), config.name_chars);

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Label {code}</title>\n\
         <style>\n\
         @page {{ size: {w}mm {h}mm; margin: 0; }}\n\
         body {{ width: {w}mm; height: {h}mm; margin: 0; display: flex; \
         flex-direction: column; align-items: center; justify-content: center; \
         font-family: sans-serif; }}\n\
         .code-visual svg {{ max-width: {w_inner}mm; height: auto; }}\n\
         .name {{ font-size: 8pt; white-space: nowrap; }}\n\
         .code {{ font-size: 7pt; letter-spacing: 1px; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <div class=\"code-visual\">{markup}</div>\n\
         <div class=\"code\">{code}</div>\n\
         <div class=\"name\">{name}</div>\n\
         </body>\n\
         </html>\n",
        code = html_escape(&record.code),
        name = html_escape(&name),
        markup = markup,
        w = config.width_mm,
        h = config.height_mm,
        w_inner = config.width_mm.saturating_sub(4),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> LabelConfig {
        LabelConfig {
            width_mm: 62,
            height_mm: 29,
            name_chars: 20,
        }
    }

    fn record(name: &str) -> StockRecord {
        StockRecord {
            code: "TC-1001".to_string(),
            name: name.to_string(),
            quantity_on_hand: 150,
            reserved: 25,
        }
    }

    #[test]
    fn label_embeds_markup_code_and_first_line_of_name() {
        let label = render_label(&record("Tile\nWhite glazed"), "<svg>bars</svg>", &config());
        assert!(label.contains("<svg>bars</svg>"));
        assert!(label.contains(">TC-1001<"));
        assert!(label.contains(">Tile<"));
        assert!(!label.contains("White glazed"));
    }

    #[test]
    fn long_names_are_truncated_to_the_configured_length() {
        let label = render_label(
            &record("An extremely long descriptive item name"),
            "<svg/>",
            &config(),
        );
        assert!(label.contains(">An extremely long de<"));
    }

    #[test]
    fn record_text_is_escaped() {
        let label = render_label(&record("Tile <5mm> & co"), "<svg/>", &config());
        assert!(label.contains("Tile &lt;5mm&gt; &amp; co"));
    }

    #[test]
    fn page_size_follows_config() {
        let label = render_label(&record("Tile"), "<svg/>", &config());
        assert!(label.contains("size: 62mm 29mm"));
    }
}
