//! Turns literal template strings into regex sources that tolerate arbitrary
//! interpolated content at each `{N}` / `{N:fmt}` placeholder.
//!
//! A template such as `虚拟机 {0} 创建成功` becomes `虚拟机 \{.*?\} 创建成功`,
//! which matches the interpolated form `$"虚拟机 {vmName} 创建成功"` found in
//! C# sources without knowing what expression sits inside the braces.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{(\d+)(?::.*?)?\}").unwrap();
}

/// Matches a literal `{`, any content (non-greedy, possibly empty) and `}`.
pub const INTERPOLATION_WILDCARD: &str = r"\{.*?\}";

/// Builds the regex source for a template.
///
/// Literal spans are escaped; every placeholder is replaced by
/// [`INTERPOLATION_WILDCARD`]. A template without placeholders yields the
/// escaped literal.
pub fn template_pattern(template: &str) -> String {
    PLACEHOLDER_REGEX
        .split(template)
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(INTERPOLATION_WILDCARD)
}

/// Builds the regex source for a C#-style string literal of `template`:
/// an optional `$` interpolation marker, the opening quote, the template
/// pattern and the closing quote.
pub fn code_literal_pattern(template: &str) -> String {
    format!(r#"\$?"{}""#, template_pattern(template))
}

/// Returns the number of distinct positional arguments a template refers to,
/// i.e. the highest placeholder index plus one.
pub fn placeholder_arity(template: &str) -> usize {
    PLACEHOLDER_REGEX
        .captures_iter(template)
        .filter_map(|caps| caps.get(1)?.as_str().parse::<usize>().ok())
        .map(|index| index + 1)
        .max()
        .unwrap_or(0)
}
