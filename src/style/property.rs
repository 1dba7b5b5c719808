//! Registered style properties and their values.
//!
//! Properties have dense ids in `[0, N)` in registration order. Values are
//! parsed from declaration tokens according to the property's kind.

use std::fmt;

/// Dense index of a registered style property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StylePropertyId(pub usize);

/// How a property's value is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Color,
    Length,
    Number,
    /// A keyword or a font family string.
    Keyword,
    /// Images and other values that have no textual form.
    Opaque,
}

/// Static description of a style property.
#[derive(Debug, Clone, Copy)]
pub struct StylePropertyInfo {
    pub name: &'static str,
    pub kind: ValueKind,
    pub inherited: bool,
    /// Initial value, in CSS syntax.
    pub initial: &'static str,
}

const fn prop(
    name: &'static str,
    kind: ValueKind,
    inherited: bool,
    initial: &'static str,
) -> StylePropertyInfo {
    StylePropertyInfo {
        name,
        kind,
        inherited,
        initial,
    }
}

/// Every style property the engine knows, in id order.
pub static PROPERTIES: &[StylePropertyInfo] = &[
    prop("color", ValueKind::Color, true, "black"),
    prop("font-family", ValueKind::Keyword, true, "Sans"),
    prop("font-size", ValueKind::Length, true, "10px"),
    prop("background-color", ValueKind::Color, false, "transparent"),
    prop("opacity", ValueKind::Number, false, "1"),
    prop("margin-top", ValueKind::Length, false, "0"),
    prop("margin-right", ValueKind::Length, false, "0"),
    prop("margin-bottom", ValueKind::Length, false, "0"),
    prop("margin-left", ValueKind::Length, false, "0"),
    prop("padding-top", ValueKind::Length, false, "0"),
    prop("padding-right", ValueKind::Length, false, "0"),
    prop("padding-bottom", ValueKind::Length, false, "0"),
    prop("padding-left", ValueKind::Length, false, "0"),
    prop("border-top-width", ValueKind::Length, false, "0"),
    prop("border-right-width", ValueKind::Length, false, "0"),
    prop("border-bottom-width", ValueKind::Length, false, "0"),
    prop("border-left-width", ValueKind::Length, false, "0"),
    prop("min-width", ValueKind::Length, false, "0"),
    prop("min-height", ValueKind::Length, false, "0"),
    prop("-gilt-icon-source", ValueKind::Opaque, false, "none"),
];

/// Shorthands expanding to four sides (top, right, bottom, left).
pub(crate) static BOX_SHORTHANDS: &[(&str, [&str; 4])] = &[
    (
        "margin",
        ["margin-top", "margin-right", "margin-bottom", "margin-left"],
    ),
    (
        "padding",
        ["padding-top", "padding-right", "padding-bottom", "padding-left"],
    ),
    (
        "border-width",
        [
            "border-top-width",
            "border-right-width",
            "border-bottom-width",
            "border-left-width",
        ],
    ),
];

/// Number of registered properties.
pub fn property_count() -> usize {
    PROPERTIES.len()
}

/// Look up a property id by name.
pub fn lookup(name: &str) -> Option<StylePropertyId> {
    PROPERTIES
        .iter()
        .position(|p| p.name == name)
        .map(StylePropertyId)
}

/// The static info for a property id.
///
/// # Panics
///
/// Panics if `id` is out of range.
pub fn info(id: StylePropertyId) -> &'static StylePropertyInfo {
    &PROPERTIES[id.0]
}

/// A computed style value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// A named or hex color, kept as written.
    Color(String),
    /// A length in pixels.
    Length(f32),
    Number(f32),
    Keyword(String),
    /// A value with no textual form.
    Opaque,
}

impl StyleValue {
    /// Parse raw declaration text for a property of the given kind.
    pub fn parse(kind: ValueKind, text: &str) -> Option<StyleValue> {
        let text = text.trim();
        match kind {
            ValueKind::Color => {
                let valid = text.starts_with('#')
                    || text.chars().all(|c| c.is_ascii_alphabetic());
                (valid && !text.is_empty()).then(|| StyleValue::Color(text.to_owned()))
            }
            ValueKind::Length => parse_length(text).map(StyleValue::Length),
            ValueKind::Number => text.parse().ok().map(StyleValue::Number),
            ValueKind::Keyword => {
                let unquoted = text.trim_matches(|c| c == '"' || c == '\'');
                (!unquoted.is_empty()).then(|| StyleValue::Keyword(unquoted.to_owned()))
            }
            ValueKind::Opaque if text == "none" => Some(StyleValue::Keyword("none".into())),
            ValueKind::Opaque => Some(StyleValue::Opaque),
        }
    }

    /// The value in CSS syntax, or `None` when it cannot be printed.
    pub fn to_css_string(&self) -> Option<String> {
        match self {
            StyleValue::Color(c) => Some(c.clone()),
            StyleValue::Length(px) => Some(format!("{}px", trim_float(*px))),
            StyleValue::Number(n) => Some(trim_float(*n)),
            StyleValue::Keyword(k) => Some(k.clone()),
            StyleValue::Opaque => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_css_string() {
            Some(s) => f.write_str(&s),
            None => f.write_str("<unknown>"),
        }
    }
}

fn parse_length(text: &str) -> Option<f32> {
    if let Some(px) = text.strip_suffix("px") {
        return px.parse().ok();
    }
    if let Some(em) = text.strip_suffix("em") {
        // One em is the default 10px font size.
        return em.parse::<f32>().ok().map(|em| em * 10.0);
    }
    text.parse().ok()
}

fn trim_float(n: f32) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_dense_and_named() {
        for (i, p) in PROPERTIES.iter().enumerate() {
            assert_eq!(lookup(p.name), Some(StylePropertyId(i)));
        }
        assert_eq!(lookup("nope"), None);
    }

    #[test]
    fn initial_values_parse() {
        for p in PROPERTIES {
            assert!(
                StyleValue::parse(p.kind, p.initial).is_some(),
                "{} initial does not parse",
                p.name
            );
        }
    }

    #[test]
    fn lengths() {
        assert_eq!(StyleValue::parse(ValueKind::Length, "4px"), Some(StyleValue::Length(4.0)));
        assert_eq!(StyleValue::parse(ValueKind::Length, "1.5em"), Some(StyleValue::Length(15.0)));
        assert_eq!(StyleValue::parse(ValueKind::Length, "3"), Some(StyleValue::Length(3.0)));
        assert_eq!(StyleValue::parse(ValueKind::Length, "big"), None);
    }

    #[test]
    fn colors() {
        assert_eq!(
            StyleValue::parse(ValueKind::Color, "#ff0000"),
            Some(StyleValue::Color("#ff0000".into()))
        );
        assert_eq!(StyleValue::parse(ValueKind::Color, "12"), None);
    }

    #[test]
    fn opaque_values_do_not_print() {
        let v = StyleValue::parse(ValueKind::Opaque, "builtin").unwrap();
        assert_eq!(v.to_css_string(), None);
        assert_eq!(v.to_string(), "<unknown>");
    }

    #[test]
    fn printing() {
        assert_eq!(StyleValue::Length(2.0).to_string(), "2px");
        assert_eq!(StyleValue::Number(0.5).to_string(), "0.5");
        assert_eq!(StyleValue::Keyword("Sans".into()).to_string(), "Sans");
    }
}
