//! Markup escaping for values written into `.resx` `<value>` elements.

use std::borrow::Cow;

/// Escapes `&`, `<`, `>`, `"` and `'` into their XML entity forms.
///
/// Not idempotent: `&amp;` becomes `&amp;amp;`. Apply exactly once per value.
pub fn escape_markup(raw: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(raw)
}
