//! The table of everything the MathML renderer knows about.
//!
//! Each macro name maps to a handler function plus the static data that handler needs, such as
//! the code point of an operator or the notation of an enclosure.

use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;
use texvc_mathml::attribute::MathVariant;
use texvc_mathml::table::ColumnAlign;

use crate::chem;
use crate::context::RenderContext;
use crate::environments::Env;
use crate::error::RenderError;
use crate::handlers;
use crate::node::TexNode;

/// Renders `node`, whose macro or environment name is `name`, using the data in `spec`.
pub type Handler =
    fn(&TexNode, RenderContext<'_>, &str, &MacroSpec) -> Result<String, RenderError>;

/// Whether a mark goes above or below its base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Over,
    Under,
}

impl Direction {
    /// Decodes a family id like `overbrace` or `underset`.
    #[inline]
    pub fn decode(id: &str) -> Self {
        if id.starts_with('o') {
            Direction::Over
        } else {
            Direction::Under
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FracStyle {
    /// Keep whatever style the surroundings have.
    Inherit,
    Display,
    Text,
    /// A fraction without a bar, in parentheses.
    Binom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub open: Option<char>,
    pub close: Option<char>,
    pub align: ColumnAlign,
    /// Whether the table is set in script size.
    pub small: bool,
}

impl TableSpec {
    const fn fenced(open: Option<char>, close: Option<char>) -> Self {
        TableSpec {
            open,
            close,
            align: ColumnAlign::Centered,
            small: false,
        }
    }
}

/// The handler-specific data of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Plain,
    Accent { stretchy: bool },
    Stack(Direction),
    Notation(&'static str),
    Variant(MathVariant),
    Text(Option<MathVariant>),
    Table(TableSpec),
    Frac(FracStyle),
    Space(&'static str),
}

#[derive(Clone, Copy)]
pub struct MacroSpec {
    pub handler: Handler,
    pub codepoint: Option<char>,
    pub family: Family,
}

impl MacroSpec {
    #[inline]
    pub const fn new(handler: Handler, codepoint: Option<char>, family: Family) -> Self {
        MacroSpec {
            handler,
            codepoint,
            family,
        }
    }
}

impl fmt::Debug for MacroSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MacroSpec")
            .field("codepoint", &self.codepoint)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::builtin);

/// Maps macro and environment names to their rendering.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    macros: FxHashMap<&'static str, MacroSpec>,
    environments: FxHashMap<Env, MacroSpec>,
}

impl Registry {
    /// The shared built-in registry. It is built on first use.
    #[inline]
    pub fn global() -> &'static Registry {
        &REGISTRY
    }

    /// Builds a fresh copy of the built-in registry, which can then be extended.
    pub fn builtin() -> Self {
        let mut registry = Registry::default();
        let mut add = |name: &'static str, handler: Handler, codepoint, family| {
            registry.insert(name, MacroSpec::new(handler, codepoint, family));
        };

        for &(name, ch) in IDENTIFIERS {
            add(name, handlers::identifier, Some(ch), Family::Plain);
        }
        for &(name, ch) in OPERATORS {
            add(name, handlers::operator, Some(ch), Family::Plain);
        }
        for &name in FUNCTIONS {
            add(name, handlers::function, None, Family::Plain);
        }
        for &(name, width) in SPACES {
            add(name, handlers::space, None, Family::Space(width));
        }
        for &(name, ch, stretchy) in ACCENTS {
            add(name, handlers::accent, Some(ch), Family::Accent { stretchy });
        }
        for &(name, ch) in MARKS {
            let direction = Direction::decode(name.trim_start_matches('\\'));
            add(name, handlers::underover, Some(ch), Family::Stack(direction));
        }
        for &(name, notation) in NOTATIONS {
            add(name, handlers::cancel, None, Family::Notation(notation));
        }
        for &(name, variant) in FONTS {
            add(name, handlers::mathfont, None, Family::Variant(variant));
        }
        for &(name, variant) in TEXT_BOXES {
            add(name, handlers::text, None, Family::Text(variant));
        }
        for &(name, style) in FRACTIONS {
            add(name, handlers::frac, None, Family::Frac(style));
        }
        for &(name, id) in STACKS {
            add(name, handlers::stack, None, Family::Stack(Direction::decode(id)));
        }
        let bold = Family::Variant(MathVariant::BoldItalic);
        add(r"\boldsymbol", handlers::boldsymbol, None, bold);
        add(r"\bm", handlers::boldsymbol, None, bold);
        add(r"\sqrt", handlers::sqrt, None, Family::Plain);
        add(r"\operatorname", handlers::operatorname, None, Family::Plain);
        add(r"\operatorname*", handlers::operatorname, None, Family::Plain);
        add(r"\left", handlers::delimiter, None, Family::Plain);
        add(r"\right", handlers::delimiter, None, Family::Plain);
        add(r"\ce", chem::chem, None, Family::Plain);

        for &(env, table) in TABLES {
            registry.environments.insert(
                env,
                MacroSpec::new(handlers::array, None, Family::Table(table)),
            );
        }

        log::debug!(
            "built macro registry with {} macros and {} environments",
            registry.macros.len(),
            registry.environments.len()
        );
        registry
    }

    /// Adds or replaces the entry for a macro name (including the backslash).
    pub fn insert(&mut self, name: &'static str, spec: MacroSpec) {
        self.macros.insert(name, spec);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&MacroSpec> {
        self.macros.get(name)
    }

    #[inline]
    pub fn environment(&self, env: Env) -> Option<&MacroSpec> {
        self.environments.get(&env)
    }

    /// The number of macro entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.macros.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// If `node` is an over/under composition like `\overbrace{x}`, the side its mark is on.
    pub fn stacking_direction(&self, node: &TexNode) -> Option<Direction> {
        let TexNode::Fun1nb { name, .. } = node else {
            return None;
        };
        match self.get(name)?.family {
            Family::Stack(direction) => Some(direction),
            _ => None,
        }
    }
}

static IDENTIFIERS: &[(&str, char)] = &[
    (r"\alpha", 'α'),
    (r"\beta", 'β'),
    (r"\gamma", 'γ'),
    (r"\delta", 'δ'),
    (r"\epsilon", 'ϵ'),
    (r"\varepsilon", 'ε'),
    (r"\zeta", 'ζ'),
    (r"\eta", 'η'),
    (r"\theta", 'θ'),
    (r"\vartheta", 'ϑ'),
    (r"\iota", 'ι'),
    (r"\kappa", 'κ'),
    (r"\lambda", 'λ'),
    (r"\mu", 'μ'),
    (r"\nu", 'ν'),
    (r"\xi", 'ξ'),
    (r"\pi", 'π'),
    (r"\varpi", 'ϖ'),
    (r"\rho", 'ρ'),
    (r"\varrho", 'ϱ'),
    (r"\sigma", 'σ'),
    (r"\varsigma", 'ς'),
    (r"\tau", 'τ'),
    (r"\upsilon", 'υ'),
    (r"\phi", 'ϕ'),
    (r"\varphi", 'φ'),
    (r"\chi", 'χ'),
    (r"\psi", 'ψ'),
    (r"\omega", 'ω'),
    (r"\Gamma", 'Γ'),
    (r"\Delta", 'Δ'),
    (r"\Theta", 'Θ'),
    (r"\Lambda", 'Λ'),
    (r"\Xi", 'Ξ'),
    (r"\Pi", 'Π'),
    (r"\Sigma", 'Σ'),
    (r"\Upsilon", 'Υ'),
    (r"\Phi", 'Φ'),
    (r"\Psi", 'Ψ'),
    (r"\Omega", 'Ω'),
    (r"\infty", '∞'),
    (r"\partial", '∂'),
    (r"\nabla", '∇'),
    (r"\emptyset", '∅'),
    (r"\varnothing", '⌀'),
    (r"\hbar", 'ℏ'),
    (r"\ell", 'ℓ'),
    (r"\aleph", 'ℵ'),
    (r"\Re", 'ℜ'),
    (r"\Im", 'ℑ'),
    (r"\wp", '℘'),
    (r"\imath", 'ı'),
    (r"\jmath", 'ȷ'),
];

static OPERATORS: &[(&str, char)] = &[
    // Binary operators
    (r"\pm", '±'),
    (r"\mp", '∓'),
    (r"\times", '×'),
    (r"\div", '÷'),
    (r"\cdot", '⋅'),
    (r"\ast", '∗'),
    (r"\star", '⋆'),
    (r"\circ", '∘'),
    (r"\bullet", '∙'),
    (r"\cap", '∩'),
    (r"\cup", '∪'),
    (r"\setminus", '∖'),
    (r"\wedge", '∧'),
    (r"\land", '∧'),
    (r"\vee", '∨'),
    (r"\lor", '∨'),
    (r"\oplus", '⊕'),
    (r"\ominus", '⊖'),
    (r"\otimes", '⊗'),
    (r"\oslash", '⊘'),
    (r"\odot", '⊙'),
    // Relations
    (r"\leq", '≤'),
    (r"\le", '≤'),
    (r"\geq", '≥'),
    (r"\ge", '≥'),
    (r"\neq", '≠'),
    (r"\ne", '≠'),
    (r"\ll", '≪'),
    (r"\gg", '≫'),
    (r"\approx", '≈'),
    (r"\sim", '∼'),
    (r"\simeq", '≃'),
    (r"\cong", '≅'),
    (r"\equiv", '≡'),
    (r"\propto", '∝'),
    (r"\in", '∈'),
    (r"\notin", '∉'),
    (r"\ni", '∋'),
    (r"\subset", '⊂'),
    (r"\supset", '⊃'),
    (r"\subseteq", '⊆'),
    (r"\supseteq", '⊇'),
    (r"\mid", '∣'),
    (r"\parallel", '∥'),
    (r"\perp", '⊥'),
    // Arrows
    (r"\to", '→'),
    (r"\rightarrow", '→'),
    (r"\leftarrow", '←'),
    (r"\gets", '←'),
    (r"\leftrightarrow", '↔'),
    (r"\Rightarrow", '⇒'),
    (r"\Leftarrow", '⇐'),
    (r"\Leftrightarrow", '⇔'),
    (r"\implies", '⟹'),
    (r"\iff", '⟺'),
    (r"\mapsto", '↦'),
    (r"\uparrow", '↑'),
    (r"\downarrow", '↓'),
    // Large operators
    (r"\sum", '∑'),
    (r"\prod", '∏'),
    (r"\coprod", '∐'),
    (r"\int", '∫'),
    (r"\iint", '∬'),
    (r"\iiint", '∭'),
    (r"\oint", '∮'),
    (r"\bigcup", '⋃'),
    (r"\bigcap", '⋂'),
    (r"\bigoplus", '⨁'),
    (r"\bigotimes", '⨂'),
    // Logic
    (r"\forall", '∀'),
    (r"\exists", '∃'),
    (r"\neg", '¬'),
    (r"\lnot", '¬'),
    // Delimiters and punctuation
    (r"\{", '{'),
    (r"\}", '}'),
    (r"\|", '‖'),
    (r"\lbrace", '{'),
    (r"\rbrace", '}'),
    (r"\langle", '⟨'),
    (r"\rangle", '⟩'),
    (r"\lfloor", '⌊'),
    (r"\rfloor", '⌋'),
    (r"\lceil", '⌈'),
    (r"\rceil", '⌉'),
    (r"\vert", '|'),
    (r"\Vert", '‖'),
    (r"\backslash", '∖'),
    (r"\ldots", '…'),
    (r"\cdots", '⋯'),
    (r"\vdots", '⋮'),
    (r"\ddots", '⋱'),
    (r"\dots", '…'),
    (r"\%", '%'),
    (r"\$", '$'),
    (r"\&", '&'),
    (r"\#", '#'),
    (r"\_", '_'),
    (r"\prime", '′'),
];

static FUNCTIONS: &[&str] = &[
    r"\sin", r"\cos", r"\tan", r"\cot", r"\sec", r"\csc", r"\arcsin", r"\arccos", r"\arctan",
    r"\sinh", r"\cosh", r"\tanh", r"\coth", r"\exp", r"\log", r"\ln", r"\lg", r"\det", r"\dim",
    r"\ker", r"\deg", r"\arg", r"\gcd", r"\hom", r"\lim", r"\liminf", r"\limsup", r"\max",
    r"\min", r"\sup", r"\inf", r"\Pr",
];

static SPACES: &[(&str, &str)] = &[
    (r"\,", "0.167em"),
    (r"\:", "0.222em"),
    (r"\>", "0.222em"),
    (r"\;", "0.278em"),
    (r"\!", "-0.167em"),
    (r"\ ", "0.333em"),
    (r"\quad", "1em"),
    (r"\qquad", "2em"),
];

static ACCENTS: &[(&str, char, bool)] = &[
    (r"\hat", '^', false),
    (r"\widehat", '^', true),
    (r"\tilde", '~', false),
    (r"\widetilde", '~', true),
    (r"\bar", '¯', false),
    (r"\vec", '→', false),
    (r"\dot", '˙', false),
    (r"\ddot", '¨', false),
    (r"\acute", '´', false),
    (r"\grave", '`', false),
    (r"\breve", '˘', false),
    (r"\check", 'ˇ', false),
    (r"\mathring", '˚', false),
];

static MARKS: &[(&str, char)] = &[
    (r"\overline", '‾'),
    (r"\underline", '_'),
    (r"\overbrace", '⏞'),
    (r"\underbrace", '⏟'),
    (r"\overleftarrow", '←'),
    (r"\overrightarrow", '→'),
    (r"\overleftrightarrow", '↔'),
    (r"\underleftarrow", '←'),
    (r"\underrightarrow", '→'),
    (r"\underleftrightarrow", '↔'),
];

static NOTATIONS: &[(&str, &str)] = &[
    (r"\cancel", "updiagonalstrike"),
    (r"\bcancel", "downdiagonalstrike"),
    (r"\xcancel", "updiagonalstrike downdiagonalstrike"),
    (r"\sout", "horizontalstrike"),
];

static FONTS: &[(&str, MathVariant)] = &[
    (r"\mathrm", MathVariant::Normal),
    (r"\mathbf", MathVariant::Bold),
    (r"\mathit", MathVariant::Italic),
    (r"\mathbb", MathVariant::DoubleStruck),
    (r"\mathcal", MathVariant::Script),
    (r"\mathfrak", MathVariant::Fraktur),
    (r"\mathsf", MathVariant::SansSerif),
    (r"\mathtt", MathVariant::Monospace),
];

static TEXT_BOXES: &[(&str, Option<MathVariant>)] = &[
    (r"\text", None),
    (r"\mbox", None),
    (r"\hbox", None),
    (r"\textrm", Some(MathVariant::Normal)),
];

static FRACTIONS: &[(&str, FracStyle)] = &[
    (r"\frac", FracStyle::Inherit),
    (r"\dfrac", FracStyle::Display),
    (r"\tfrac", FracStyle::Text),
    (r"\binom", FracStyle::Binom),
];

static STACKS: &[(&str, &str)] = &[
    (r"\overset", "over"),
    (r"\underset", "under"),
    (r"\stackrel", "over"),
];

static TABLES: &[(Env, TableSpec)] = &[
    (Env::Matrix, TableSpec::fenced(None, None)),
    (Env::PMatrix, TableSpec::fenced(Some('('), Some(')'))),
    (Env::BMatrix, TableSpec::fenced(Some('['), Some(']'))),
    (Env::Bmatrix, TableSpec::fenced(Some('{'), Some('}'))),
    (Env::VMatrix, TableSpec::fenced(Some('|'), Some('|'))),
    (Env::Vmatrix, TableSpec::fenced(Some('‖'), Some('‖'))),
    (
        Env::SmallMatrix,
        TableSpec {
            small: true,
            ..TableSpec::fenced(None, None)
        },
    ),
    (
        Env::Cases,
        TableSpec {
            align: ColumnAlign::Left,
            ..TableSpec::fenced(Some('{'), None)
        },
    ),
    (
        Env::Aligned,
        TableSpec {
            align: ColumnAlign::RightLeft,
            ..TableSpec::fenced(None, None)
        },
    ),
];
