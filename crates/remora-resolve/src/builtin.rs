use std::collections::HashSet;

use once_cell::sync::Lazy;

static NODE_BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "assert",
        "async_hooks",
        "buffer",
        "child_process",
        "cluster",
        "console",
        "constants",
        "crypto",
        "dgram",
        "diagnostics_channel",
        "dns",
        "domain",
        "events",
        "fs",
        "http",
        "http2",
        "https",
        "inspector",
        "module",
        "net",
        "os",
        "path",
        "perf_hooks",
        "process",
        "punycode",
        "querystring",
        "readline",
        "repl",
        "stream",
        "string_decoder",
        "sys",
        "timers",
        "tls",
        "trace_events",
        "tty",
        "url",
        "util",
        "v8",
        "vm",
        "wasi",
        "worker_threads",
        "zlib",
    ]
    .into_iter()
    .collect()
});

/// Whether `specifier` names a platform built-in module.
///
/// Any `node:` prefixed name counts, as do sub-paths of built-ins such as
/// `fs/promises`.
///
/// ```
/// use remora_resolve::is_builtin;
///
/// assert!(is_builtin("fs"));
/// assert!(is_builtin("node:test"));
/// assert!(is_builtin("stream/web"));
/// assert!(!is_builtin("react"));
/// ```
pub fn is_builtin(specifier: &str) -> bool {
    if specifier.starts_with("node:") {
        return true;
    }
    let root = specifier.split('/').next().unwrap_or(specifier);
    NODE_BUILTINS.contains(root)
}
