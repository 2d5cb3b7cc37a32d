use bitflags::bitflags;
use texvc_mathml::attribute::{AttrMap, MathVariant};

use crate::registry::Registry;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct StateFlags: u8 {
        /// Rendering a cell of a table-like environment.
        const INSIDE_MATRIX = 1;
        /// Rendering the argument of `\ce`.
        const CHEMISTRY = 1 << 1;
    }
}

/// State that is inherited by the children of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State {
    pub flags: StateFlags,
    /// Font variant set by an enclosing font macro; wins over any default variant.
    pub variant: Option<MathVariant>,
}

static NO_ATTRS: AttrMap = AttrMap::new();

/// Everything a node needs in order to render itself as MathML.
///
/// Contexts are cheap to copy; modified contexts are passed to children and never written back.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    registry: &'a Registry,
    attrs: &'a AttrMap,
    state: State,
}

impl<'a> RenderContext<'a> {
    /// A context that uses the built-in macro registry.
    pub fn new(attrs: &'a AttrMap) -> Self {
        Self::with_registry(Registry::global(), attrs)
    }

    pub fn with_registry(registry: &'a Registry, attrs: &'a AttrMap) -> Self {
        RenderContext {
            registry,
            attrs,
            state: State::default(),
        }
    }

    #[inline]
    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    /// Attributes for the element the current handler designates.
    #[inline]
    pub fn attrs(&self) -> &'a AttrMap {
        self.attrs
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[must_use]
    pub fn with_flag(self, flag: StateFlags) -> Self {
        RenderContext {
            state: State {
                flags: self.state.flags | flag,
                ..self.state
            },
            ..self
        }
    }

    #[must_use]
    pub fn with_variant(self, variant: MathVariant) -> Self {
        RenderContext {
            state: State {
                variant: Some(variant),
                ..self.state
            },
            ..self
        }
    }

    #[must_use]
    pub fn without_attrs(self) -> Self {
        RenderContext {
            attrs: &NO_ATTRS,
            ..self
        }
    }

    /// Attributes for a token element (`<mi>`, `<mn>`, `<mtext>`).
    ///
    /// The inherited font variant is used if there is one, otherwise `default_variant`.
    pub fn leaf_attrs(&self, default_variant: Option<MathVariant>) -> AttrMap {
        let mut attrs = AttrMap::new();
        if let Some(variant) = self.state.variant.or(default_variant) {
            attrs.insert("mathvariant", variant.as_str());
        }
        attrs.merged(self.attrs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_get_modified_copies() {
        let attrs = AttrMap::from([("class", "x")]);
        let ctx = RenderContext::new(&attrs);
        let child = ctx
            .with_flag(StateFlags::INSIDE_MATRIX)
            .with_variant(MathVariant::Bold)
            .without_attrs();
        assert!(child.state().flags.contains(StateFlags::INSIDE_MATRIX));
        assert!(child.attrs().is_empty());
        assert_eq!(ctx.state(), State::default());
        assert_eq!(ctx.attrs().get("class"), Some("x"));
    }

    #[test]
    fn variant_beats_default() {
        let attrs = AttrMap::from([("id", "a")]);
        let ctx = RenderContext::new(&attrs);
        let leaf = ctx.leaf_attrs(Some(MathVariant::Normal));
        assert_eq!(
            leaf.iter().collect::<Vec<_>>(),
            [("mathvariant", "normal"), ("id", "a")]
        );
        let leaf = ctx
            .with_variant(MathVariant::BoldItalic)
            .leaf_attrs(Some(MathVariant::Normal));
        assert_eq!(leaf.get("mathvariant"), Some("bold-italic"));
        assert_eq!(ctx.without_attrs().leaf_attrs(None), AttrMap::new());
    }
}
