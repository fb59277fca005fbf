//! Rewrites string literals in code and markup files into resource references.
//!
//! Code files (C#) are matched with a regex per entry so that interpolated
//! strings such as `$"VM {name} created"` are found for the template
//! `VM {0} created`. Markup files (XAML) only get literal, quoted
//! substitutions; attribute values there are never interpolated.

use std::{borrow::Cow, path::Path};

use lazy_static::lazy_static;
use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    pattern::code_literal_pattern,
    read_options::{ReadOptions, read_text, write_text},
    types::{Args, Mapping, MappingEntry},
};

lazy_static! {
    static ref ELEMENT_NAME_REGEX: Regex = Regex::new(r"<([\w.:]+)").unwrap();
}

/// The two source categories with different substitution grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Code,
    Markup,
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileKind::Code => write!(f, "code"),
            FileKind::Markup => write!(f, "markup"),
        }
    }
}

/// Text emitted in place of matched literals.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReplaceRules {
    /// Class path prefixed to keys in code, e.g. `Properties.Resources`.
    pub code_reference: String,
    /// Formatting call used for entries with arguments.
    pub format_function: String,
    /// XML namespace prefix bound to the resources namespace in markup.
    pub markup_prefix: String,
    /// Resource class name referenced from markup.
    pub markup_class: String,
    /// CLR namespace containing the resource class.
    pub clr_namespace: String,
}

impl Default for ReplaceRules {
    fn default() -> Self {
        ReplaceRules {
            code_reference: "Properties.Resources".to_string(),
            format_function: "string.Format".to_string(),
            markup_prefix: "properties".to_string(),
            markup_class: "Resources".to_string(),
            clr_namespace: "ExHyperV.Properties".to_string(),
        }
    }
}

impl ReplaceRules {
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [
            ("code_reference", &self.code_reference),
            ("format_function", &self.format_function),
            ("markup_prefix", &self.markup_prefix),
            ("markup_class", &self.markup_class),
            ("clr_namespace", &self.clr_namespace),
        ] {
            if value.trim().is_empty() {
                return Err(Error::validation_error(format!("rule `{}` is empty", name)));
            }
        }
        Ok(())
    }

    /// `Properties.Resources.KEY`
    pub fn code_reference_for(&self, key: &str) -> String {
        format!("{}.{}", self.code_reference, key)
    }

    /// `string.Format(Properties.Resources.KEY, a, b)`
    pub fn format_call(&self, key: &str, args: &Args) -> String {
        let reference = self.code_reference_for(key);
        let joined = args.joined();
        if joined.trim().is_empty() {
            format!("{}({})", self.format_function, reference)
        } else {
            format!("{}({}, {})", self.format_function, reference, joined)
        }
    }

    /// `{x:Static properties:Resources.KEY}`
    pub fn markup_reference_for(&self, key: &str) -> String {
        format!(
            "{{x:Static {}:{}.{}}}",
            self.markup_prefix, self.markup_class, key
        )
    }

    /// `clr-namespace:ExHyperV.Properties`; its presence means the namespace is declared.
    pub fn namespace_marker(&self) -> String {
        format!("clr-namespace:{}", self.clr_namespace)
    }

    /// `xmlns:properties="clr-namespace:ExHyperV.Properties"`
    pub fn namespace_declaration(&self) -> String {
        format!("xmlns:{}=\"{}\"", self.markup_prefix, self.namespace_marker())
    }
}

/// Declares the resources namespace on the first element of a markup
/// document unless the namespace is already mentioned anywhere.
///
/// Content without any element is returned unchanged.
pub fn inject_namespace<'a>(content: &'a str, rules: &ReplaceRules) -> Cow<'a, str> {
    if content.contains(&rules.namespace_marker()) {
        return Cow::Borrowed(content);
    }
    let Some(name) = ELEMENT_NAME_REGEX.captures(content).and_then(|c| c.get(1)) else {
        return Cow::Borrowed(content);
    };
    let tag_end = name.end();
    Cow::Owned(format!(
        "{} {}{}",
        &content[..tag_end],
        rules.namespace_declaration(),
        &content[tag_end..]
    ))
}

/// One mapping entry, prepared for both file kinds.
#[derive(Debug)]
struct CompiledEntry {
    key: String,
    code_pattern: Regex,
    code_replacement: String,
    markup_targets: [(String, String); 2],
}

impl CompiledEntry {
    fn compile(entry: &MappingEntry, rules: &ReplaceRules) -> Result<Option<Self>, Error> {
        let Some(key) = entry.key() else {
            return Ok(None);
        };
        let original = entry.normalized_original();
        if original.is_empty() {
            return Ok(None);
        }

        let code_pattern = Regex::new(&code_literal_pattern(&original))?;
        let code_replacement = if entry.is_format {
            rules.format_call(key, &entry.args)
        } else {
            rules.code_reference_for(key)
        };
        let reference = rules.markup_reference_for(key);

        Ok(Some(CompiledEntry {
            key: key.to_string(),
            code_pattern,
            code_replacement,
            markup_targets: [
                (format!("\"{}\"", original), format!("\"{}\"", reference)),
                (format!("'{}'", original), format!("'{}'", reference)),
            ],
        }))
    }

    fn apply(&self, content: &str, kind: FileKind) -> String {
        match kind {
            FileKind::Code => self
                .code_pattern
                .replace_all(content, NoExpand(&self.code_replacement))
                .into_owned(),
            FileKind::Markup => {
                let [(double, double_ref), (single, single_ref)] = &self.markup_targets;
                content.replace(double, double_ref).replace(single, single_ref)
            }
        }
    }
}

/// Applies every usable mapping entry, longest original first.
#[derive(Debug)]
pub struct Replacer {
    rules: ReplaceRules,
    entries: Vec<CompiledEntry>,
}

impl Replacer {
    /// Compiles the mapping. Entries with an empty key or an empty
    /// normalized original are dropped here and never touch any file.
    pub fn new(mapping: &Mapping, rules: ReplaceRules) -> Result<Self, Error> {
        rules.validate()?;
        let mut entries = Vec::new();
        for entry in mapping.ordered() {
            if let Some(compiled) = CompiledEntry::compile(entry, &rules)? {
                entries.push(compiled);
            }
        }
        tracing::debug!(
            usable = entries.len(),
            total = mapping.len(),
            "compiled replacement entries"
        );
        Ok(Replacer { rules, entries })
    }

    /// Keys in application order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs all substitutions over `content`. Changed markup also gets the
    /// namespace declaration.
    pub fn apply(&self, content: &str, kind: FileKind) -> String {
        let mut current = content.to_string();
        for entry in &self.entries {
            current = entry.apply(&current, kind);
        }
        if kind == FileKind::Markup && current != content {
            if let Cow::Owned(injected) = inject_namespace(&current, &self.rules) {
                current = injected;
            }
        }
        current
    }

    /// Reads, rewrites and (unless `dry_run`) writes back one file.
    ///
    /// Returns whether the content changed. Unchanged files are never written.
    pub fn process_file<P: AsRef<Path>>(
        &self,
        path: P,
        kind: FileKind,
        options: &ReadOptions,
        dry_run: bool,
    ) -> Result<bool, Error> {
        let path = path.as_ref();
        let content = read_text(path, options)?;
        let rewritten = self.apply(&content, kind);
        if rewritten == content {
            return Ok(false);
        }
        if !dry_run {
            write_text(path, &rewritten)?;
        }
        tracing::debug!(path = %path.display(), %kind, dry_run, "rewrote file");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn replacer(json: &str) -> Replacer {
        Replacer::new(&Mapping::from_json_str(json).unwrap(), ReplaceRules::default()).unwrap()
    }

    #[test]
    fn test_rules_render_default_references() {
        let rules = ReplaceRules::default();
        assert_eq!(rules.code_reference_for("Key"), "Properties.Resources.Key");
        assert_eq!(
            rules.format_call("Key", &Args::List(vec!["a".into(), "b".into()])),
            "string.Format(Properties.Resources.Key, a, b)"
        );
        assert_eq!(
            rules.format_call("Key", &Args::default()),
            "string.Format(Properties.Resources.Key)"
        );
        assert_eq!(
            rules.markup_reference_for("Key"),
            "{x:Static properties:Resources.Key}"
        );
        assert_eq!(
            rules.namespace_declaration(),
            "xmlns:properties=\"clr-namespace:ExHyperV.Properties\""
        );
    }

    #[test]
    fn test_rules_validate_rejects_empty() {
        let rules = ReplaceRules {
            code_reference: " ".to_string(),
            ..Default::default()
        };
        assert!(matches!(rules.validate(), Err(Error::Validation(_))));
        assert!(Replacer::new(&Mapping::default(), rules).is_err());
    }

    #[test]
    fn test_code_format_entry() {
        let r = replacer(
            r#"[{"NewKey": "Msg_VmCreated", "Original": "\"VM {0} created\"", "IsFormat": true, "Args": ["vmName"]}]"#,
        );
        assert_eq!(
            r.apply(r#"Console.WriteLine($"VM {vmName} created");"#, FileKind::Code),
            "Console.WriteLine(string.Format(Properties.Resources.Msg_VmCreated, vmName));"
        );
    }

    #[test]
    fn test_code_plain_entry_replaces_every_occurrence() {
        let r = replacer(r#"[{"NewKey": "Lbl_Ready", "Original": "\"Ready\""}]"#);
        assert_eq!(
            r.apply(r#"a = "Ready"; b = $"Ready";"#, FileKind::Code),
            "a = Properties.Resources.Lbl_Ready; b = Properties.Resources.Lbl_Ready;"
        );
    }

    #[test]
    fn test_code_requires_enclosing_quotes() {
        let r = replacer(r#"[{"NewKey": "Lbl_Ready", "Original": "Ready"}]"#);
        let source = r#"var s = "Not Ready yet"; // Ready"#;
        assert_eq!(r.apply(source, FileKind::Code), source);
    }

    #[test]
    fn test_replacement_text_is_literal() {
        let r = replacer(
            r#"[{"NewKey": "Msg", "Original": "\"Cost {0}\"", "IsFormat": true, "Args": ["$price"]}]"#,
        );
        assert_eq!(
            r.apply(r#"x = $"Cost {price}";"#, FileKind::Code),
            "x = string.Format(Properties.Resources.Msg, $price);"
        );
    }

    #[test]
    fn test_longer_original_applied_first() {
        let r = replacer(
            r#"[
                {"NewKey": "Msg_Copy", "Original": "\"Copy {0}\"", "IsFormat": true, "Args": ["file"]},
                {"NewKey": "Msg_CopyTo", "Original": "\"Copy {0} to {1}\"", "IsFormat": true, "Args": ["src", "dst"]}
            ]"#,
        );
        assert_eq!(r.keys().collect::<Vec<_>>(), vec!["Msg_CopyTo", "Msg_Copy"]);
        let source = indoc! {r#"
            Log($"Copy {src} to {dst}");
            Log($"Copy {file}");
        "#};
        let expected = indoc! {r#"
            Log(string.Format(Properties.Resources.Msg_CopyTo, src, dst));
            Log(string.Format(Properties.Resources.Msg_Copy, file));
        "#};
        assert_eq!(r.apply(source, FileKind::Code), expected);
    }

    #[test]
    fn test_unusable_entries_are_dropped() {
        let r = replacer(
            r#"[
                {"NewKey": "", "Original": "\"Ready\""},
                {"Original": "\"Ready\""},
                {"NewKey": "Empty", "Original": "\"\""},
                {"NewKey": "Blank", "Original": "   "}
            ]"#,
        );
        assert!(r.is_empty());
        let source = r#"x = "Ready"; y = "";"#;
        assert_eq!(r.apply(source, FileKind::Code), source);
        assert_eq!(r.apply(source, FileKind::Markup), source);
    }

    #[test]
    fn test_markup_double_and_single_quotes() {
        let r = replacer(r#"[{"NewKey": "Lbl_Name", "Original": "\"Name\""}]"#);
        let source = indoc! {r#"
            <Page xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation">
                <TextBlock Text="Name" ToolTip='Name'/>
            </Page>
        "#};
        let expected = indoc! {r#"
            <Page xmlns:properties="clr-namespace:ExHyperV.Properties" xmlns="http://schemas.microsoft.com/winfx/2006/xaml/presentation">
                <TextBlock Text="{x:Static properties:Resources.Lbl_Name}" ToolTip='{x:Static properties:Resources.Lbl_Name}'/>
            </Page>
        "#};
        assert_eq!(r.apply(source, FileKind::Markup), expected);
    }

    #[test]
    fn test_markup_has_no_placeholder_tolerance() {
        let r = replacer(r#"[{"NewKey": "Msg", "Original": "\"VM {0} created\""}]"#);
        let source = r#"<TextBlock Text="VM {Binding Name} created"/>"#;
        assert_eq!(r.apply(source, FileKind::Markup), source);
        let exact = r#"<TextBlock Text="VM {0} created"/>"#;
        assert!(r.apply(exact, FileKind::Markup).contains("Resources.Msg"));
    }

    #[test]
    fn test_unchanged_markup_gets_no_namespace() {
        let r = replacer(r#"[{"NewKey": "Lbl_Name", "Original": "\"Name\""}]"#);
        let source = r#"<Page><TextBlock Text="Other"/></Page>"#;
        assert_eq!(r.apply(source, FileKind::Markup), source);
    }

    #[test]
    fn test_code_files_never_get_namespace() {
        let r = replacer(r#"[{"NewKey": "Lbl_Name", "Original": "\"Name\""}]"#);
        assert_eq!(
            r.apply(r#"<Page Title="Name"/>"#, FileKind::Code),
            r#"<Page Title=Properties.Resources.Lbl_Name/>"#
        );
    }

    #[test]
    fn test_inject_namespace_after_first_element_name() {
        let rules = ReplaceRules::default();
        let content = "<?xml version=\"1.0\"?>\n<!-- c -->\n<ui:FluentWindow x:Class=\"A\">\n<Grid/>";
        assert_eq!(
            inject_namespace(content, &rules),
            "<?xml version=\"1.0\"?>\n<!-- c -->\n<ui:FluentWindow xmlns:properties=\"clr-namespace:ExHyperV.Properties\" x:Class=\"A\">\n<Grid/>"
        );
    }

    #[test]
    fn test_inject_namespace_dotted_element() {
        let rules = ReplaceRules::default();
        assert_eq!(
            inject_namespace("<Window.Resources/>", &rules),
            "<Window.Resources xmlns:properties=\"clr-namespace:ExHyperV.Properties\"/>"
        );
    }

    #[test]
    fn test_inject_namespace_is_idempotent() {
        let rules = ReplaceRules::default();
        let once = inject_namespace("<Page>\n</Page>", &rules).into_owned();
        let twice = inject_namespace(&once, &rules);
        assert!(matches!(twice, Cow::Borrowed(_)));
        assert_eq!(twice, once);
        assert_eq!(once.matches("xmlns:properties=").count(), 1);
    }

    #[test]
    fn test_inject_namespace_detects_any_mention() {
        let rules = ReplaceRules::default();
        let content = "<Page xmlns:p=\"clr-namespace:ExHyperV.Properties\"/>";
        assert!(matches!(inject_namespace(content, &rules), Cow::Borrowed(_)));
    }

    #[test]
    fn test_inject_namespace_without_element() {
        let rules = ReplaceRules::default();
        assert_eq!(inject_namespace("plain text", &rules), "plain text");
    }

    #[test]
    fn test_custom_rules() {
        let rules = ReplaceRules {
            code_reference: "Strings".to_string(),
            format_function: "String.Format".to_string(),
            markup_prefix: "res".to_string(),
            markup_class: "Strings".to_string(),
            clr_namespace: "App.Localization".to_string(),
        };
        let mapping =
            Mapping::from_json_str(r#"[{"NewKey": "Hi", "Original": "\"Hello\""}]"#).unwrap();
        let r = Replacer::new(&mapping, rules).unwrap();
        assert_eq!(r.apply(r#"x = "Hello";"#, FileKind::Code), "x = Strings.Hi;");
        assert_eq!(
            r.apply(r#"<Page Title="Hello"/>"#, FileKind::Markup),
            r#"<Page xmlns:res="clr-namespace:App.Localization" Title="{x:Static res:Strings.Hi}"/>"#
        );
    }

    #[test]
    fn test_process_file_writes_only_on_change() {
        let dir = tempfile::TempDir::new().unwrap();
        let changed = dir.path().join("A.cs");
        let untouched = dir.path().join("B.cs");
        std::fs::write(&changed, "\u{FEFF}x = \"Ready\";").unwrap();
        std::fs::write(&untouched, "\u{FEFF}x = 1;").unwrap();

        let r = replacer(r#"[{"NewKey": "Lbl_Ready", "Original": "\"Ready\""}]"#);
        let options = ReadOptions::new();
        assert!(r.process_file(&changed, FileKind::Code, &options, false).unwrap());
        assert!(!r.process_file(&untouched, FileKind::Code, &options, false).unwrap());

        assert_eq!(
            std::fs::read_to_string(&changed).unwrap(),
            "x = Properties.Resources.Lbl_Ready;"
        );
        assert_eq!(std::fs::read_to_string(&untouched).unwrap(), "\u{FEFF}x = 1;");
    }

    #[test]
    fn test_process_file_dry_run() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "x = \"Ready\";").unwrap();

        let r = replacer(r#"[{"NewKey": "Lbl_Ready", "Original": "\"Ready\""}]"#);
        assert!(r.process_file(&path, FileKind::Code, &ReadOptions::new(), true).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x = \"Ready\";");
    }

    #[test]
    fn test_process_file_missing_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let r = replacer(r#"[{"NewKey": "Lbl_Ready", "Original": "\"Ready\""}]"#);
        let err = r
            .process_file(dir.path().join("nope.cs"), FileKind::Code, &ReadOptions::new(), false)
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
