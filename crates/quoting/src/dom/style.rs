// ABOUTME: Inline CSS declaration parsing and border resolution for element style attributes.
// ABOUTME: Resolves border shorthands/longhands per side the way a computed style would report them.

//! Inline style handling.
//!
//! Message bodies are never laid out, so "computed" border values are
//! resolved from the element's `style` attribute alone: declarations apply
//! in order, shorthands reset the parts they omit, and a side whose style
//! is `none` or `hidden` has a used width of zero.

use ego_tree::NodeId;
use scraper::Html;

use super::replace_attributes;

/// Line style of one border side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    #[default]
    None,
    Hidden,
    Dotted,
    Dashed,
    Solid,
    Double,
    Groove,
    Ridge,
    Inset,
    Outset,
}

impl LineStyle {
    fn parse(token: &str) -> Option<Self> {
        let style = match token {
            "none" => LineStyle::None,
            "hidden" => LineStyle::Hidden,
            "dotted" => LineStyle::Dotted,
            "dashed" => LineStyle::Dashed,
            "solid" => LineStyle::Solid,
            "double" => LineStyle::Double,
            "groove" => LineStyle::Groove,
            "ridge" => LineStyle::Ridge,
            "inset" => LineStyle::Inset,
            "outset" => LineStyle::Outset,
            _ => return None,
        };
        Some(style)
    }
}

/// An sRGB color, alpha ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parses hex, `rgb()`/`rgba()` and a few named colors.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim().to_ascii_lowercase();
        if let Some(hex) = token.strip_prefix('#') {
            return parse_hex(hex);
        }
        if let Some(args) = token
            .strip_prefix("rgba(")
            .or_else(|| token.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<&str> = args
                .split(|c: char| c == ',' || c == '/' || c.is_whitespace())
                .filter(|p| !p.is_empty())
                .collect();
            if parts.len() < 3 {
                return None;
            }
            return Some(Rgb(
                channel(parts[0])?,
                channel(parts[1])?,
                channel(parts[2])?,
            ));
        }
        match token.as_str() {
            "black" => Some(Rgb(0, 0, 0)),
            "white" => Some(Rgb(255, 255, 255)),
            "gray" | "grey" => Some(Rgb(128, 128, 128)),
            "silver" => Some(Rgb(192, 192, 192)),
            "red" => Some(Rgb(255, 0, 0)),
            "blue" => Some(Rgb(0, 0, 255)),
            _ => None,
        }
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    let digit = |i: usize, len: usize| u8::from_str_radix(hex.get(i..i + len)?, 16).ok();
    match hex.len() {
        3 | 4 => Some(Rgb(
            digit(0, 1)? * 17,
            digit(1, 1)? * 17,
            digit(2, 1)? * 17,
        )),
        6 | 8 => Some(Rgb(digit(0, 2)?, digit(2, 2)?, digit(4, 2)?)),
        _ => None,
    }
}

fn channel(part: &str) -> Option<u8> {
    if let Some(pct) = part.strip_suffix('%') {
        let v: f32 = pct.parse().ok()?;
        return Some((v.clamp(0.0, 100.0) * 2.55).round() as u8);
    }
    let v: f32 = part.parse().ok()?;
    Some(v.clamp(0.0, 255.0).round() as u8)
}

/// Declared border of one side. `width` is `None` for the initial `medium`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BorderSide {
    pub style: LineStyle,
    pub width: Option<f32>,
    pub color: Option<Rgb>,
}

impl BorderSide {
    /// Used width in px; zero whenever the side draws no line.
    pub fn used_width(&self) -> f32 {
        match self.style {
            LineStyle::None | LineStyle::Hidden => 0.0,
            _ => self.width.unwrap_or(3.0),
        }
    }

    pub fn is_zero_width(&self) -> bool {
        self.used_width() == 0.0
    }

    /// Applies a `border`/`border-<side>` shorthand value.
    fn apply_shorthand(&mut self, value: &str) {
        *self = BorderSide::default();
        for token in tokens(value) {
            if let Some(style) = LineStyle::parse(&token) {
                self.style = style;
            } else if let Some(width) = parse_width(&token) {
                self.width = Some(width);
            } else if let Some(color) = Rgb::parse(&token) {
                self.color = Some(color);
            }
        }
    }
}

/// Resolved borders of an element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Borders {
    pub top: BorderSide,
    pub right: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
}

impl Borders {
    /// Resolves borders from an inline `style` attribute value.
    pub fn from_style(style: &str) -> Self {
        let mut borders = Borders::default();
        for (name, value) in declarations(style) {
            let value = strip_important(&value);
            borders.apply(&name, value);
        }
        borders
    }

    fn sides_mut(&mut self) -> [&mut BorderSide; 4] {
        [
            &mut self.top,
            &mut self.right,
            &mut self.bottom,
            &mut self.left,
        ]
    }

    fn side_mut(&mut self, side: &str) -> Option<&mut BorderSide> {
        match side {
            "top" => Some(&mut self.top),
            "right" => Some(&mut self.right),
            "bottom" => Some(&mut self.bottom),
            "left" => Some(&mut self.left),
            _ => None,
        }
    }

    fn apply(&mut self, name: &str, value: &str) {
        let rest = match name.strip_prefix("border") {
            Some(rest) => rest,
            None => return,
        };
        if rest.is_empty() {
            for side in self.sides_mut() {
                side.apply_shorthand(value);
            }
            return;
        }
        let rest = match rest.strip_prefix('-') {
            Some(rest) => rest,
            None => return,
        };

        match rest {
            "style" | "width" | "color" => {
                let values = expand_box(&tokens(value));
                for (side, token) in self.sides_mut().into_iter().zip(values) {
                    set_part(side, rest, &token);
                }
            }
            _ => {
                let (side_name, part) = match rest.split_once('-') {
                    Some((side_name, part)) => (side_name, Some(part)),
                    None => (rest, None),
                };
                if let Some(side) = self.side_mut(side_name) {
                    match part {
                        None => side.apply_shorthand(value),
                        Some(part) => set_part(side, part, value.trim()),
                    }
                }
            }
        }
    }
}

fn set_part(side: &mut BorderSide, part: &str, token: &str) {
    match part {
        "style" => {
            if let Some(style) = LineStyle::parse(&token.to_ascii_lowercase()) {
                side.style = style;
            }
        }
        "width" => {
            if let Some(width) = parse_width(&token.to_ascii_lowercase()) {
                side.width = Some(width);
            }
        }
        "color" => side.color = Rgb::parse(token),
        _ => {}
    }
}

/// Expands 1-4 box values to top, right, bottom, left.
fn expand_box(values: &[String]) -> Vec<String> {
    match values {
        [a] => vec![a.clone(), a.clone(), a.clone(), a.clone()],
        [a, b] => vec![a.clone(), b.clone(), a.clone(), b.clone()],
        [a, b, c] => vec![a.clone(), b.clone(), c.clone(), b.clone()],
        [a, b, c, d, ..] => vec![a.clone(), b.clone(), c.clone(), d.clone()],
        [] => Vec::new(),
    }
}

/// Parses a border width in px; unitless or unknown units keep their number.
fn parse_width(token: &str) -> Option<f32> {
    match token {
        "thin" => return Some(1.0),
        "medium" => return Some(3.0),
        "thick" => return Some(5.0),
        _ => {}
    }
    let end = token
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(token.len());
    if end == 0 {
        return None;
    }
    let number: f32 = token[..end].parse().ok()?;
    let unit = &token[end..];
    let px = match unit {
        "" | "px" => number,
        "pt" => number * 4.0 / 3.0,
        "pc" => number * 16.0,
        "in" => number * 96.0,
        "cm" => number * 96.0 / 2.54,
        "mm" => number * 96.0 / 25.4,
        "em" | "rem" => number * 16.0,
        _ => return None,
    };
    Some(px.max(0.0))
}

/// Splits a value on whitespace, keeping parenthesized groups together.
fn tokens(value: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    for c in value.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current).to_ascii_lowercase());
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current.to_ascii_lowercase());
    }
    out
}

fn strip_important(value: &str) -> &str {
    let trimmed = value.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    match lower.rfind("!important") {
        Some(idx) if lower[idx..].trim() == "!important" => trimmed[..idx].trim_end(),
        _ => trimmed,
    }
}

/// Splits a style attribute into `(lowercase name, trimmed value)` pairs.
pub fn declarations(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_string()))
        })
        .collect()
}

/// Sets one declaration in an element's style attribute, dropping earlier
/// declarations of the same property. Other attributes are kept.
pub fn set_style_property(doc: &mut Html, id: NodeId, property: &str, value: &str) -> bool {
    let mut attrs: Vec<(String, String)> = match doc.tree.get(id).and_then(|n| n.value().as_element()) {
        Some(el) => el
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        None => return false,
    };

    let current = attrs
        .iter()
        .find(|(k, _)| k == "style")
        .map(|(_, v)| v.clone())
        .unwrap_or_default();
    let mut decls: Vec<(String, String)> = declarations(&current)
        .into_iter()
        .filter(|(name, _)| name != property)
        .collect();
    decls.push((property.to_string(), value.to_string()));
    let style = decls
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect::<Vec<_>>()
        .join("; ");

    attrs.retain(|(k, _)| k != "style");
    attrs.push(("style".to_string(), style));
    attrs.sort();
    replace_attributes(doc, id, &attrs)
}
