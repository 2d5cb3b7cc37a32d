//! Convert TeX math formulas to canonical TeX and to Presentation MathML.
//!
//! # Usage
//!
//! The main struct of this library is [`TexConverter`]. Create an instance with a
//! [`TexConfig`] and then call one of the conversion functions.
//!
//! ```rust
//! use texvc::{AttrMap, MathDisplay, TexConfig, TexConverter};
//!
//! let converter = TexConverter::new(TexConfig::default());
//! let latex = r"\frac{1}{2} + \alpha^{2}";
//!
//! let canonical = converter.render_tex(latex).unwrap();
//! assert_eq!(canonical, r"\frac{1}{2}+\alpha ^{2}");
//!
//! let mathml = converter
//!     .render_mathml(latex, MathDisplay::Block, &AttrMap::new())
//!     .unwrap();
//! assert!(mathml.starts_with(r#"<math display="block"><mfrac>"#));
//! ```
//!
//! # Features
//!
//! - `serde`: With this feature, `TexConfig` implements serde's `Deserialize`.
//! - `ariadne`: With this feature, `TexError` can be turned into an `ariadne` report.
//!
mod character_class;
mod chem;
mod commands;
mod context;
mod environments;
mod error;
mod handlers;
mod lexer;
mod node;
mod parser;
mod registry;
mod token;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use texvc_mathml::element;

pub use self::character_class::CharClass;
pub use self::context::{RenderContext, State, StateFlags};
pub use self::environments::Env;
pub use self::error::{ErrorCategory, LexErrKind, RenderError, TexError};
pub use self::lexer::{Lexer, tokenize};
pub use self::node::{Literal, Matrix, TexArray, TexNode};
pub use self::registry::{Direction, Family, FracStyle, Handler, MacroSpec, Registry, TableSpec};
pub use self::token::{Span, TokSpan, Token};
pub use texvc_mathml::attribute::{AttrMap, MathVariant};

use self::parser::Parser;

const MATHML_NAMESPACE: &str = "http://www.w3.org/1998/Math/MathML";

/// Display mode for the formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MathDisplay {
    /// For inline formulas, like those in `$...$` in LaTeX.
    #[default]
    Inline,
    /// For block formulas, like those in `$$...$$` in LaTeX.
    Block,
}

/// The two outputs of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputForm {
    /// The canonical TeX text.
    Tex,
    /// A `<math>` element.
    #[default]
    MathML,
}

/// Configuration object for the conversion.
///
/// # Example usage
///
/// ```rust
/// use texvc::TexConfig;
///
/// let config = TexConfig {
///     use_mhchem: true,
///     math_attributes: vec![("class".to_string(), "formula".to_string())],
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct TexConfig {
    /// If `true`, chemistry notation with `\ce{...}` is allowed.
    pub use_mhchem: bool,
    /// If `true`, include `xmlns="http://www.w3.org/1998/Math/MathML"` in the `<math>` tag.
    pub xml_namespace: bool,
    /// If `true`, wrap the MathML output in `<semantics>` with an
    /// `<annotation encoding="application/x-tex">` child holding the canonical TeX.
    pub annotation: bool,
    /// Attributes that are added to every `<math>` element, in order.
    #[cfg_attr(feature = "serde", serde(with = "tuple_vec_map"))]
    pub math_attributes: Vec<(String, String)>,
}

/// A converter from TeX formulas to canonical TeX and MathML.
#[derive(Debug, Default)]
pub struct TexConverter {
    config: TexConfig,
    math_attributes: AttrMap,
}

impl TexConverter {
    pub fn new(config: TexConfig) -> Self {
        let math_attributes = AttrMap::from(config.math_attributes.clone());
        Self {
            config,
            math_attributes,
        }
    }

    #[inline]
    pub fn config(&self) -> &TexConfig {
        &self.config
    }

    /// Parse a formula into its syntax tree.
    pub fn parse(&self, latex: &str) -> Result<TexNode, Box<TexError>> {
        Parser::new(tokenize(latex), self.config.use_mhchem).parse()
    }

    /// Convert a formula to its canonical TeX text.
    ///
    /// ```rust
    /// use texvc::{TexConfig, TexConverter};
    ///
    /// let converter = TexConverter::new(TexConfig::default());
    /// assert_eq!(converter.render_tex(r"x_i^2").unwrap(), "x_{i}^{2}");
    /// ```
    pub fn render_tex(&self, latex: &str) -> Result<String, Box<TexError>> {
        Ok(self.parse(latex)?.render())
    }

    /// Convert a formula to a `<math>` element.
    ///
    /// `attrs` are passed to the rendering of the formula's top-level nodes; each handler puts
    /// them on the element it designates.
    pub fn render_mathml(
        &self,
        latex: &str,
        display: MathDisplay,
        attrs: &AttrMap,
    ) -> Result<String, Box<TexError>> {
        log::trace!("converting {latex:?} ({display:?})");
        let ast = self.parse(latex)?;
        let content = ast
            .render_mml(RenderContext::new(attrs))
            .map_err(|err| Box::new(err.into_tex_error(latex)))?;

        let mut math_attrs = AttrMap::new();
        if self.config.xml_namespace {
            math_attrs.insert("xmlns", MATHML_NAMESPACE);
        }
        if matches!(display, MathDisplay::Block) {
            math_attrs.insert("display", "block");
        }
        let math_attrs = math_attrs.merged(&self.math_attributes);

        let content = if self.config.annotation {
            element::semantics(
                &element::mrow(&content, &AttrMap::new()),
                "application/x-tex",
                &ast.render(),
            )
        } else {
            content
        };
        Ok(element::math(&content, &math_attrs))
    }

    /// Convert a formula to the selected output form.
    ///
    /// `display` and `attrs` only matter for [`OutputForm::MathML`].
    pub fn convert(
        &self,
        latex: &str,
        form: OutputForm,
        display: MathDisplay,
        attrs: &AttrMap,
    ) -> Result<String, Box<TexError>> {
        match form {
            OutputForm::Tex => self.render_tex(latex),
            OutputForm::MathML => self.render_mathml(latex, display, attrs),
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;

    use super::*;

    fn mathml(latex: &str) -> String {
        TexConverter::default()
            .render_mathml(latex, MathDisplay::Inline, &AttrMap::new())
            .unwrap()
    }

    #[test]
    fn namespace_and_display() {
        let converter = TexConverter::new(TexConfig {
            xml_namespace: true,
            math_attributes: vec![("class".to_string(), "tex".to_string())],
            ..Default::default()
        });
        let output = converter
            .render_mathml("x", MathDisplay::Block, &AttrMap::new())
            .unwrap();
        assert_snapshot!(output, @r#"<math xmlns="http://www.w3.org/1998/Math/MathML" display="block" class="tex"><mi>x</mi></math>"#);
    }

    #[test]
    fn annotation_holds_canonical_text() {
        let converter = TexConverter::new(TexConfig {
            annotation: true,
            ..Default::default()
        });
        let output = converter
            .render_mathml("a<b", MathDisplay::Inline, &AttrMap::new())
            .unwrap();
        assert_snapshot!(output, @r#"<math><semantics><mrow><mi>a</mi><mo>&lt;</mo><mi>b</mi></mrow><annotation encoding="application/x-tex">a&lt;b</annotation></semantics></math>"#);
    }

    #[test]
    fn empty_formula() {
        assert_eq!(mathml(""), "<math><mi></mi></math>");
    }

    #[test]
    fn convert_selects_output() {
        let converter = TexConverter::default();
        let none = AttrMap::new();
        assert_eq!(
            converter
                .convert(r"\sin x", OutputForm::Tex, MathDisplay::Inline, &none)
                .unwrap(),
            r"\sin x"
        );
        assert_eq!(
            converter
                .convert(r"\sin x", OutputForm::MathML, MathDisplay::Inline, &none)
                .unwrap(),
            "<math><mi>sin</mi><mi>x</mi></math>"
        );
    }

    #[test]
    fn mhchem_is_opt_in() {
        let none = AttrMap::new();
        let err = TexConverter::default()
            .render_mathml(r"\ce{H2O}", MathDisplay::Inline, &none)
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Syntax);
        let converter = TexConverter::new(TexConfig {
            use_mhchem: true,
            ..Default::default()
        });
        assert!(
            converter
                .render_mathml(r"\ce{H2O}", MathDisplay::Inline, &none)
                .is_ok()
        );
    }

    #[test]
    fn unknown_macro_gets_span() {
        let err = TexConverter::default()
            .render_mathml(r"x + \foo", MathDisplay::Inline, &AttrMap::new())
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::UnknownMacro);
        assert_eq!(err.macro_name(), Some(r"\foo"));
        assert_eq!(err.0, 4..8);
    }

    #[test]
    fn converter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TexConverter>();
    }
}
