//! String builders for Presentation MathML.
//!
//! Every element family has one function which takes already-rendered child fragments and an
//! [`AttrMap`](attribute::AttrMap), and returns the finished element as a `String`. Attribute
//! values are always escaped, so caller-supplied attributes can never break out of the markup.
//!
//! # Example
//!
//! ```rust
//! use texvc_mathml::attribute::AttrMap;
//! use texvc_mathml::element::{mi, mn, msup};
//!
//! let attrs = AttrMap::from([("class", "x\"y")]);
//! let base = mi("x", &attrs);
//! let output = msup(&base, &mn("2", &AttrMap::new()), &AttrMap::new());
//! assert_eq!(
//!     output,
//!     "<msup><mi class=\"x&quot;y\">x</mi><mn>2</mn></msup>"
//! );
//! ```
pub mod attribute;
pub mod element;
mod escape;
pub mod table;

pub use escape::{escape_attribute_value, escape_text};
