//! Cascade: matches stylesheet rules against CSS nodes and computes styles.

use std::rc::Rc;

use super::node::{ComputedStyle, ComputedValue, CssNode, CssNodeRef, SourceLocation};
use super::parser::{parse_stylesheet, Combinator, Compound, Selector, StyleParseError, StyleSheet};
use super::property::{self, StylePropertyId, StyleValue, PROPERTIES};

/// Holds the loaded stylesheets and restyles nodes.
#[derive(Debug, Default)]
pub struct StyleEngine {
    sheets: Vec<StyleSheet>,
}

/// A matched declaration, ordered for the cascade.
struct Candidate<'a> {
    specificity: (u32, u32, u32),
    order: (usize, usize),
    property: StylePropertyId,
    value: &'a StyleValue,
    source: SourceLocation,
}

impl StyleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and append a stylesheet. Later sheets win ties.
    pub fn add_stylesheet(&mut self, name: &str, css: &str) -> Result<(), StyleParseError> {
        let sheet = parse_stylesheet(name, css)?;
        tracing::debug!(sheet = name, rules = sheet.rules.len(), "stylesheet loaded");
        self.sheets.push(sheet);
        Ok(())
    }

    /// Remove a stylesheet by name. Returns `false` if none matched.
    pub fn remove_stylesheet(&mut self, name: &str) -> bool {
        let before = self.sheets.len();
        self.sheets.retain(|s| s.name != name);
        self.sheets.len() != before
    }

    pub fn stylesheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Compute the style `node` would get under `parent_style`.
    pub fn compute(&self, node: &CssNode, parent_style: Option<&ComputedStyle>) -> ComputedStyle {
        let mut candidates = Vec::new();
        for (sheet_idx, sheet) in self.sheets.iter().enumerate() {
            for (rule_idx, rule) in sheet.rules.iter().enumerate() {
                let Some(specificity) = rule
                    .selectors
                    .iter()
                    .filter(|s| selector_matches(s, node))
                    .map(Selector::specificity)
                    .max()
                else {
                    continue;
                };
                for decl in &rule.declarations {
                    candidates.push(Candidate {
                        specificity,
                        order: (sheet_idx, rule_idx),
                        property: decl.property,
                        value: &decl.value,
                        source: SourceLocation {
                            file: sheet.name.clone(),
                            line: decl.line,
                        },
                    });
                }
            }
        }
        // Stable sort: within a rule, later declarations stay later and win.
        candidates.sort_by_key(|c| (c.specificity, c.order));

        let mut values: Vec<Option<ComputedValue>> = vec![None; PROPERTIES.len()];
        for candidate in candidates {
            values[candidate.property.0] = Some(ComputedValue {
                value: candidate.value.clone(),
                source: Some(candidate.source),
            });
        }

        let initial = ComputedStyle::initial();
        let values = values
            .into_iter()
            .enumerate()
            .map(|(i, declared)| {
                let id = StylePropertyId(i);
                declared.unwrap_or_else(|| match parent_style {
                    Some(parent) if property::info(id).inherited => ComputedValue {
                        value: parent.value(id).clone(),
                        source: None,
                    },
                    _ => initial.get(id).clone(),
                })
            })
            .collect();
        ComputedStyle::from_values(values)
    }

    /// Recompute `node` and its whole subtree unconditionally.
    pub fn restyle(&self, node: &CssNodeRef) {
        node.invalidate();
        self.validate(node);
    }

    /// Recompute every dirty node under (and including) `root`, pre-order,
    /// emitting `style-changed` where the style actually changed.
    pub fn validate(&self, root: &CssNodeRef) {
        let mut stack = vec![Rc::clone(root)];
        while let Some(node) = stack.pop() {
            if node.is_dirty() {
                let parent_style = node.parent().map(|p| p.style());
                let style = self.compute(&node, parent_style.as_deref());
                node.set_style(style);
            }
            for child in node.children().into_iter().rev() {
                stack.push(child);
            }
        }
    }
}

fn compound_matches(compound: &Compound, node: &CssNode) -> bool {
    if let Some(name) = &compound.node_name {
        if *name != node.name() {
            return false;
        }
    }
    if let Some(id) = &compound.id {
        if node.id().as_deref() != Some(id.as_str()) {
            return false;
        }
    }
    compound.classes.iter().all(|c| node.has_class(c)) && node.state().contains(compound.states)
}

fn selector_matches(selector: &Selector, node: &CssNode) -> bool {
    match selector.parts.split_last() {
        Some(((_, last), _)) if !compound_matches(last, node) => false,
        Some(_) => matches_ancestors(&selector.parts, selector.parts.len() - 1, node),
        None => false,
    }
}

/// `parts[idx]` already matched `node`; match `parts[..idx]` against its
/// ancestors.
fn matches_ancestors(parts: &[(Combinator, Compound)], idx: usize, node: &CssNode) -> bool {
    if idx == 0 {
        return true;
    }
    let combinator = parts[idx].0;
    let wanted = &parts[idx - 1].1;
    let mut ancestor = node.parent();
    while let Some(candidate) = ancestor {
        if compound_matches(wanted, &candidate) && matches_ancestors(parts, idx - 1, &candidate) {
            return true;
        }
        if combinator == Combinator::Child {
            return false;
        }
        ancestor = candidate.parent();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::StateFlags;
    use crate::style::property::lookup;

    fn engine(css: &str) -> StyleEngine {
        let mut engine = StyleEngine::new();
        engine.add_stylesheet("test.css", css).unwrap();
        engine
    }

    fn color(node: &CssNode) -> StyleValue {
        node.style().value(lookup("color").unwrap()).clone()
    }

    #[test]
    fn type_selector_applies_with_source() {
        let engine = engine("label {\n  color: red;\n}");
        let node = CssNode::new("label");
        engine.validate(&node);
        assert_eq!(color(&node), StyleValue::Color("red".into()));
        let source = node.style().source(lookup("color").unwrap()).cloned().unwrap();
        assert_eq!(source.to_string(), "test.css:2");
        assert!(node.style().source(lookup("opacity").unwrap()).is_none());
    }

    #[test]
    fn specificity_beats_order() {
        let engine = engine("#main { color: blue; } label { color: red; }");
        let node = CssNode::new("label");
        node.set_id(Some("main"));
        engine.validate(&node);
        assert_eq!(color(&node), StyleValue::Color("blue".into()));
    }

    #[test]
    fn later_rule_wins_tie() {
        let engine = engine(".a { color: blue; } .b { color: green; }");
        let node = CssNode::new("label");
        node.add_class("a");
        node.add_class("b");
        engine.validate(&node);
        assert_eq!(color(&node), StyleValue::Color("green".into()));
    }

    #[test]
    fn inheritance_and_non_inheritance() {
        let engine = engine("box { color: red; background-color: white; }");
        let parent = CssNode::new("box");
        let child = CssNode::new("label");
        parent.append_child(&child);
        engine.validate(&parent);
        assert_eq!(color(&child), StyleValue::Color("red".into()));
        assert_eq!(
            child.style().value(lookup("background-color").unwrap()),
            &StyleValue::Color("transparent".into())
        );
    }

    #[test]
    fn descendant_and_child_combinators() {
        let engine = engine("window label { opacity: 0.5; } box > label { color: red; }");
        let window = CssNode::new("window");
        let inner = CssNode::new("grid");
        let label = CssNode::new("label");
        window.append_child(&inner);
        inner.append_child(&label);
        engine.validate(&window);
        assert_eq!(
            label.style().value(lookup("opacity").unwrap()),
            &StyleValue::Number(0.5)
        );
        assert_eq!(color(&label), StyleValue::Color("black".into()));

        inner.set_name("box");
        engine.validate(&window);
        assert_eq!(color(&label), StyleValue::Color("red".into()));
    }

    #[test]
    fn state_change_restyles_and_emits() {
        let engine = engine("button:hover { color: red; }");
        let node = CssNode::new("button");
        engine.validate(&node);

        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let s = seen.clone();
        node.connect_style_changed(move |_, change| {
            let id = lookup("color").unwrap();
            s.borrow_mut()
                .push((change.old.value(id).clone(), change.new.value(id).clone()));
        });
        node.set_state(StateFlags::PRELIGHT);
        engine.validate(&node);
        assert_eq!(
            *seen.borrow(),
            vec![(
                StyleValue::Color("black".into()),
                StyleValue::Color("red".into())
            )]
        );
    }

    #[test]
    fn validate_skips_clean_nodes() {
        let mut engine = engine("label { color: red; }");
        let node = CssNode::new("label");
        engine.validate(&node);
        engine.add_stylesheet("late.css", "label { color: blue; }").unwrap();
        engine.validate(&node);
        assert_eq!(color(&node), StyleValue::Color("red".into()));
        engine.restyle(&node);
        assert_eq!(color(&node), StyleValue::Color("blue".into()));
    }

    #[test]
    fn remove_stylesheet() {
        let mut engine = engine("label { color: red; }");
        assert!(engine.remove_stylesheet("test.css"));
        assert!(!engine.remove_stylesheet("test.css"));
        assert_eq!(engine.stylesheet_count(), 0);
    }
}
