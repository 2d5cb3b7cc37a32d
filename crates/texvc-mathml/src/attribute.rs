use strum_macros::IntoStaticStr;

/// `mathvariant` attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum MathVariant {
    Normal,
    Bold,
    Italic,
    BoldItalic,
    DoubleStruck,
    Script,
    Fraktur,
    SansSerif,
    Monospace,
}

impl MathVariant {
    #[inline]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// An ordered list of attribute name/value pairs.
///
/// Insertion order is kept, so the rendered markup is byte-stable. Inserting a name that is
/// already present replaces the value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttrMap(Vec<(String, String)>);

impl AttrMap {
    #[inline]
    pub const fn new() -> Self {
        AttrMap(Vec::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find_map(|(n, v)| if n == name { Some(v.as_str()) } else { None })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns a copy of `self` with the entries of `overrides` merged in.
    ///
    /// Names present in both keep the position from `self` and the value from `overrides`.
    pub fn merged(&self, overrides: &AttrMap) -> AttrMap {
        let mut out = self.clone();
        for (name, value) in overrides.iter() {
            out.insert(name, value);
        }
        out
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttrMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = AttrMap::new();
        for (name, value) in iter {
            map.insert(name, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for AttrMap {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<Vec<(String, String)>> for AttrMap {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}
