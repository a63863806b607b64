use ansi_term::{Color, Style};
use std::{borrow::Cow, collections::HashMap};

pub const DEFAULT: Style = Style {
    foreground: None,
    background: None,
    is_bold: false,
    is_dimmed: false,
    is_italic: false,
    is_underline: false,
    is_blink: false,
    is_reverse: false,
    is_hidden: false,
    is_strikethrough: false,
};

lazy_static::lazy_static! {
    pub static ref STYLE_MAP: HashMap<String, Style> = {
        let entries = &[
            ("comment", StyleNode::Base(Color::Cyan.normal())),
            ("extends", StyleNode::Base(Color::Yellow.bold())),
            ("heading", StyleNode::Base(DEFAULT.bold())),
            ("error", StyleNode::Base(Color::Red.bold())),

            ("type", StyleNode::Base(Color::Green.normal())),
            ("type.object", StyleNode::Inherit(Overrides::default().bold(true))),

            ("pool.index", StyleNode::Base(Color::Cyan.bold())),

            ("pool.val", StyleNode::Base(Color::Green.bold())),
            ("pool.val.int", StyleNode::Inherit(Overrides::default())),
            ("pool.val.utf8", StyleNode::Base(Color::Green.normal())),

            ("pool.ref", StyleNode::Base(Color::Yellow.bold())),
            ("pool.ref.member", StyleNode::Inherit(Overrides::default())),
            ("pool.ref.string", StyleNode::Inherit(Overrides::default())),
            ("pool.ref.class", StyleNode::Inherit(Overrides::default())),
            ("pool.ref.name_and_type", StyleNode::Base(Color::Blue.bold())),
            ("pool.ref.dynamic", StyleNode::Base(Color::Purple.normal())),

            ("access", StyleNode::Base(Color::Yellow.normal())),

            ("opcode", StyleNode::Base(Color::Cyan.normal())),
            ("opcode.flow", StyleNode::Base(Color::Yellow.normal().underline())),
            ("opcode.flow.invocation", StyleNode::Inherit(Overrides::default().underline(false))),
            ("opcode.immediate", StyleNode::Base(Color::Yellow.normal())),
        ];

        let entries = entries.iter().map(|&(name, node)| (Cow::from(name), node)).collect::<HashMap<_, _>>();
        let mut resolved = HashMap::new();

        for (path, _) in &entries {
            resolved.insert(path.clone().into(), compute_node(&entries, path).unwrap_or(DEFAULT));
        }

        resolved
    };
}

/// The style registered under `name`, or no styling at all.
pub fn get(name: &str) -> Style {
    STYLE_MAP.get(name).cloned().unwrap_or(DEFAULT)
}

fn compute_node(ctx: &HashMap<Cow<'_, str>, StyleNode>, name: &str) -> Option<Style> {
    match *ctx.get(name)? {
        StyleNode::Base(style) => Some(style),
        StyleNode::Inherit(overrides) => {
            let (pos, _) = name.rmatch_indices('.').next()?;
            compute_node(ctx, &name[..pos]).map(|style| overrides.apply(style))
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Overrides {
    pub is_bold: Option<bool>,
    pub is_underline: Option<bool>,
}

impl Overrides {
    pub fn bold(self, bold: bool) -> Self {
        Overrides {
            is_bold: Some(bold),
            ..self
        }
    }

    pub fn underline(self, underline: bool) -> Self {
        Overrides {
            is_underline: Some(underline),
            ..self
        }
    }

    fn apply(self, style: Style) -> Style {
        Style {
            is_bold: self.is_bold.unwrap_or(style.is_bold),
            is_underline: self.is_underline.unwrap_or(style.is_underline),
            ..style
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StyleNode {
    Base(Style),
    Inherit(Overrides),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherits_from_parent() {
        assert_eq!(get("pool.ref.class"), Color::Yellow.bold());
        assert_eq!(get("type.object"), Color::Green.bold());
        assert_eq!(get("opcode.flow.invocation"), Color::Yellow.normal());
        assert_eq!(get("no.such.style"), DEFAULT);
    }
}
