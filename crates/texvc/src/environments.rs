static ENVIRONMENTS: phf::Map<&'static str, Env> = phf::phf_map! {
    "matrix" => Env::Matrix,
    "pmatrix" => Env::PMatrix,
    "bmatrix" => Env::BMatrix,
    "Bmatrix" => Env::Bmatrix,
    "vmatrix" => Env::VMatrix,
    "Vmatrix" => Env::Vmatrix,
    "smallmatrix" => Env::SmallMatrix,
    "cases" => Env::Cases,
    "aligned" => Env::Aligned,
};

/// The table-like environments that can appear in a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Env {
    Matrix,
    /// `pmatrix`, parentheses.
    PMatrix,
    /// `bmatrix`, square brackets.
    BMatrix,
    /// `Bmatrix`, curly braces.
    Bmatrix,
    /// `vmatrix`, single bars.
    VMatrix,
    /// `Vmatrix`, double bars.
    Vmatrix,
    SmallMatrix,
    Cases,
    Aligned,
}

impl Env {
    pub fn from_str(s: &str) -> Option<Self> {
        ENVIRONMENTS.get(s).copied()
    }

    pub fn as_str(self) -> &'static str {
        ENVIRONMENTS
            .entries()
            .find_map(|(k, v)| if *v == self { Some(*k) } else { None })
            .unwrap_or("unknown")
    }

    /// All environments, in no particular order.
    pub fn all() -> impl Iterator<Item = Env> {
        ENVIRONMENTS.values().copied()
    }
}
