//! SVG post-processing for the rasterizer.
//!
//! Mermaid lays out labels as HTML inside `<foreignObject>`, which the
//! rasterizer ignores. Each one is replaced by a plain centered `<text>`
//! element. Mermaid's default pastel node, cluster and edge-label fills are
//! made transparent so the image works on light and dark backgrounds.

use std::sync::LazyLock;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::reader::Reader;
use regex::Regex;

use crate::consts::{BASELINE_OFFSET, LABEL_FONT_FAMILY, LABEL_FONT_SIZE};
use crate::context::Theme;
use crate::error::DiagramError;

/// Default Mermaid fills, in attribute (`fill="..."`) or CSS (`fill: ...`) position.
static DEFAULT_FILL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)((?:fill|background-color)\s*[:=]\s*["']?)(#ececff|#ffffde|#e8e8e8|rgba\(\s*232\s*,\s*232\s*,\s*232\s*,\s*0?\.8\s*\))"#,
    )
    .unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const FOREIGN_OBJECT: &[u8] = b"foreignObject";

/// Prepare renderer SVG output for rasterization under `theme`.
pub fn prepare_svg(svg: &str, theme: Theme) -> Result<String, DiagramError> {
    let svg = replace_foreign_objects(svg, theme)?;
    Ok(clear_default_fills(&svg))
}

/// Replace every `<foreignObject>` with a centered `<text>` label.
///
/// Objects without any text are dropped.
pub fn replace_foreign_objects(svg: &str, theme: Theme) -> Result<String, DiagramError> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::with_capacity(svg.len()));

    loop {
        match reader.read_event().map_err(invalid_svg)? {
            Event::Eof => break,
            Event::Start(e) if e.local_name().as_ref() == FOREIGN_OBJECT => {
                let geometry = Geometry::from_element(&e);
                if let Some(label) = read_label(&mut reader)? {
                    write_label(&mut writer, &geometry, &label, theme)?;
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == FOREIGN_OBJECT => {}
            event => writer.write_event(event).map_err(invalid_svg)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(invalid_svg)
}

/// Rewrite Mermaid's default background fills to `transparent`.
#[must_use]
pub fn clear_default_fills(svg: &str) -> String {
    DEFAULT_FILL_RE
        .replace_all(svg, "${1}transparent")
        .into_owned()
}

fn invalid_svg(err: impl std::fmt::Display) -> DiagramError {
    DiagramError::InvalidSvg(err.to_string())
}

/// Position and size of a `<foreignObject>`; missing attributes count as zero.
#[derive(Debug, Default, PartialEq)]
struct Geometry {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Geometry {
    fn from_element(e: &BytesStart<'_>) -> Self {
        Self {
            x: numeric_attribute(e, "x"),
            y: numeric_attribute(e, "y"),
            width: numeric_attribute(e, "width"),
            height: numeric_attribute(e, "height"),
        }
    }

    fn center(&self) -> (f64, f64) {
        (
            self.x + self.width / 2.0,
            self.y + self.height / 2.0 + BASELINE_OFFSET,
        )
    }
}

fn numeric_attribute(e: &BytesStart<'_>, name: &str) -> f64 {
    e.try_get_attribute(name)
        .ok()
        .flatten()
        .and_then(|attr| {
            std::str::from_utf8(&attr.value)
                .ok()?
                .trim()
                .trim_end_matches("px")
                .parse()
                .ok()
        })
        .unwrap_or(0.0)
}

/// Open element inside a foreign object while looking for its label.
struct Frame {
    is_paragraph: bool,
    text: String,
    has_children: bool,
}

/// Consume events up to the closing `</foreignObject>` and pick its label.
///
/// The first `<p>` wins; otherwise the first element that holds only text.
fn read_label(reader: &mut Reader<&[u8]>) -> Result<Option<String>, DiagramError> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut paragraph: Option<String> = None;
    let mut simple: Option<String> = None;

    loop {
        match reader.read_event().map_err(invalid_svg)? {
            Event::Start(e) => {
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                }
                stack.push(Frame {
                    is_paragraph: e.local_name().as_ref() == b"p",
                    text: String::new(),
                    has_children: false,
                });
            }
            Event::Empty(_) => {
                if let Some(parent) = stack.last_mut() {
                    parent.has_children = true;
                }
            }
            Event::Text(e) => {
                let text = reader.decoder().decode(&e).map_err(invalid_svg)?;
                append_text(&mut stack, &text);
            }
            Event::GeneralRef(e) => {
                let name = reader.decoder().decode(&e).map_err(invalid_svg)?;
                append_text(&mut stack, &decode_entity(&name));
            }
            Event::CData(e) => {
                append_text(&mut stack, &String::from_utf8_lossy(&e));
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    break;
                };
                let text = collapse_whitespace(&frame.text);
                if text.is_empty() {
                    continue;
                }
                if frame.is_paragraph && paragraph.is_none() {
                    paragraph = Some(text.clone());
                }
                if !frame.has_children && simple.is_none() {
                    simple = Some(text);
                }
            }
            Event::Eof => {
                return Err(DiagramError::InvalidSvg(
                    "unterminated <foreignObject>".to_owned(),
                ));
            }
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    Ok(paragraph.or(simple))
}

fn append_text(stack: &mut [Frame], text: &str) {
    for frame in stack {
        frame.text.push_str(text);
    }
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

/// Resolve an entity reference name (`amp`, `#38`, `#x26`) to its text.
fn decode_entity(name: &str) -> String {
    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => name.strip_prefix('#').and_then(|code| {
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }),
    };
    decoded.map_or_else(|| format!("&{name};"), String::from)
}

fn write_label(
    writer: &mut Writer<Vec<u8>>,
    geometry: &Geometry,
    label: &str,
    theme: Theme,
) -> Result<(), DiagramError> {
    let (x, y) = geometry.center();
    let x = x.to_string();
    let y = y.to_string();
    let start = BytesStart::new("text").with_attributes([
        ("x", x.as_str()),
        ("y", y.as_str()),
        ("text-anchor", "middle"),
        ("font-family", LABEL_FONT_FAMILY),
        ("font-size", LABEL_FONT_SIZE),
        ("fill", theme.text_color()),
    ]);

    writer.write_event(Event::Start(start)).map_err(invalid_svg)?;
    writer
        .write_event(Event::Text(BytesText::new(label)))
        .map_err(invalid_svg)?;
    writer
        .write_event(Event::End(BytesEnd::new("text")))
        .map_err(invalid_svg)?;
    Ok(())
}
