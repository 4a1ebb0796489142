use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

static FIELD_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([%fFuUdDnNickvm])").expect("valid field code pattern"));

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DesktopEntry {
    /// File name without the `.desktop` suffix.
    pub id: String,
    pub path: PathBuf,
    pub name: String,
    /// Raw `Exec=` value.
    pub exec: String,
    pub argv: Vec<String>,
    pub icon: Option<String>,
    pub terminal: bool,
}

/// Parse the `[Desktop Entry]` group of a desktop file.
///
/// Returns `None` for anything that is not a visible application with a
/// usable `Exec=` line.
pub fn parse_desktop_entry(content: &str, path: &Path) -> Option<DesktopEntry> {
    let mut keys: HashMap<&str, &str> = HashMap::new();
    let mut in_desktop_entry = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            in_desktop_entry = line == "[Desktop Entry]";
            continue;
        }

        if !in_desktop_entry {
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            keys.entry(key.trim()).or_insert(value.trim());
        }
    }

    if keys.get("Type").is_some_and(|kind| *kind != "Application") {
        return None;
    }
    if is_true(keys.get("NoDisplay")) || is_true(keys.get("Hidden")) {
        return None;
    }

    let name = keys.get("Name").filter(|n| !n.is_empty())?.to_string();
    let exec = keys.get("Exec")?.to_string();
    let argv = exec_argv(&exec);
    if argv.first().is_none_or(|program| program.is_empty()) {
        return None;
    }

    let id = path
        .file_name()?
        .to_string_lossy()
        .trim_end_matches(".desktop")
        .to_string();

    Some(DesktopEntry {
        id,
        path: path.to_path_buf(),
        name,
        exec,
        argv,
        icon: keys
            .get("Icon")
            .filter(|icon| !icon.is_empty())
            .map(|icon| icon.to_string()),
        terminal: is_true(keys.get("Terminal")),
    })
}

fn is_true(value: Option<&&str>) -> bool {
    value.is_some_and(|v| v.eq_ignore_ascii_case("true"))
}

pub fn read_desktop_entry(path: &Path) -> Option<DesktopEntry> {
    let bytes = fs::read(path).ok()?;
    parse_desktop_entry(&String::from_utf8_lossy(&bytes), path)
}

/// Launch argv for an `Exec=` value. Arguments that are only a field code are
/// dropped, codes embedded in other arguments are removed and `%%` becomes `%`.
pub fn exec_argv(raw: &str) -> Vec<String> {
    tokenize(raw)
        .into_iter()
        .filter(|token| !is_field_code(token))
        .map(|token| {
            FIELD_CODE
                .replace_all(&token, |caps: &regex::Captures| {
                    if &caps[1] == "%" { "%" } else { "" }
                })
                .into_owned()
        })
        .collect()
}

fn is_field_code(token: &str) -> bool {
    token.len() == 2
        && token.starts_with('%')
        && !token.ends_with('%')
        && FIELD_CODE.is_match(token)
}

/// Split a command line into argv, honoring quotes and backslash escapes.
pub fn split_exec(exec: &str) -> Vec<String> {
    tokenize(exec)
        .into_iter()
        .map(|token| token.replace("%%", "%"))
        .collect()
}

fn tokenize(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;
    let mut chars = exec.chars();

    while let Some(ch) = chars.next() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') | (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_token = true;
            }
            (Some(_), c) => current.push(c),
            (None, '"') | (None, '\'') => {
                quote = Some(ch);
                in_token = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_token {
                    args.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if in_token {
        args.push(current);
    }
    args
}

/// Desktop files directly inside `dir`, sorted by path.
pub fn list_desktop_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("desktop"))
        .collect();
    files.sort();
    files
}
