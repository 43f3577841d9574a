//! Import specifier discovery.
//!
//! A lexical scan, not a parser: it finds the string literal of every
//! static `import`/`export ... from`, dynamic `import()` and `require()`.
//! Comments, string and template literals and member accesses such as
//! `obj.import(...)` are matched as tokens of their own and skipped, so text
//! inside them never counts as an import.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Alternatives are tried in order at each position. Only the import forms
/// carry capture groups: one for a double-quoted and one for a single-quoted
/// specifier.
const IMPORT_PATTERN: &str = concat!(
    // comments
    r"//[^\n]*",
    r"|(?s:/\*.*?\*/)",
    // template literals
    r"|`(?:[^`\\]|\\(?s:.))*`",
    // member access: obj.import(...), obj.require(...), $import
    r"|(?:\.\s*|\$)(?:import|require)\b",
    // import x from '...', export * from '...', import '...'
    r#"|\b(?:import|export)\s*(?:type\s+)?(?:[\w*${}\s,]+?\s*from\s*)?(?:"([^"\r\n]*)"|'([^'\r\n]*)')"#,
    // import('...')
    r#"|\bimport\s*\(\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')\s*\)"#,
    // require('...')
    r#"|\brequire\s*\(\s*(?:"([^"\r\n]*)"|'([^'\r\n]*)')\s*\)"#,
    // any other string literal
    r#"|"(?:[^"\\\r\n]|\\.)*"|'(?:[^'\\\r\n]|\\.)*'"#,
);

static IMPORT_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(IMPORT_PATTERN).ok());

/// Specifiers imported by `source`, in order of first appearance.
///
/// ```
/// use remora::scan::scan_imports;
///
/// let found = scan_imports("import a from './a.js';\n// import './old.js'\nconst b = require('b');");
/// assert_eq!(found, vec!["./a.js", "b"]);
/// ```
pub fn scan_imports(source: &str) -> Vec<String> {
    let Some(re) = IMPORT_RE.as_ref() else {
        tracing::error!("import pattern failed to compile; no imports scanned");
        return Vec::new();
    };
    let mut seen = HashSet::new();
    re.captures_iter(source)
        .filter_map(|caps| caps.iter().skip(1).flatten().next())
        .map(|m| m.as_str().trim().to_string())
        .filter(|specifier| !specifier.is_empty() && seen.insert(specifier.clone()))
        .collect()
}
