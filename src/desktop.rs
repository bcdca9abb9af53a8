//! Rendering and recognising the `.desktop` files that back a web app.

use std::fmt::Write as FmtWrite;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::detect::Platform;

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Name=(.+)$").expect("valid regex"));
static EXEC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Exec=(.+)$").expect("valid regex"));

/// Marker that identifies entries launching a browser in app mode.
pub const APP_FLAG: &str = "--app=";

/// Characters that force an `Exec` argument into double quotes.
const RESERVED: &[char] = &[
    ' ', '\t', '\n', '"', '\'', '\\', '>', '<', '~', '|', '&', ';', '$', '*', '?', '#', '(', ')',
    '`',
];

/// A web app launcher entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopEntry {
    pub name: String,
    pub url: String,
    pub icon: PathBuf,
    pub browser: String,
    pub platform: Option<Platform>,
}

impl DesktopEntry {
    /// The `Exec=` command line, before string escaping.
    pub fn exec(&self) -> String {
        let mut exec = format!("{} --new-window", exec_arg(&self.browser));
        if let Some(platform) = self.platform {
            let _ = write!(exec, " --ozone-platform={}", platform);
        }
        for arg in [
            format!("{}{}", APP_FLAG, self.url),
            format!("--name={}", self.name),
            format!("--class={}", self.name),
        ] {
            let _ = write!(exec, " {}", exec_arg(&arg));
        }
        exec
    }

    /// Generate the .desktop file content.
    pub fn render(&self) -> String {
        let mut content = String::new();
        let _ = writeln!(content, "[Desktop Entry]");
        let _ = writeln!(content, "Version=1.0");
        let _ = writeln!(content, "Name={}", escape_value(&self.name));
        let _ = writeln!(content, "Comment={}", escape_value(&self.name));
        let _ = writeln!(content, "Exec={}", escape_value(&self.exec()));
        let _ = writeln!(content, "Terminal=false");
        let _ = writeln!(content, "Type=Application");
        let _ = writeln!(content, "Icon={}", escape_value(&self.icon.display().to_string()));
        let _ = writeln!(content, "StartupNotify=true");
        content
    }
}

/// Escapes `%` field codes and quotes the argument if it holds reserved characters.
fn exec_arg(arg: &str) -> String {
    let arg = arg.replace('%', "%%");
    if !arg.contains(RESERVED) {
        return arg;
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '`' | '$' | '\\') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\")
}

fn unescape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Splits an unescaped `Exec` value into arguments, honouring double quotes.
fn split_exec(exec: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_arg = false;
    let mut quoted = false;
    let mut chars = exec.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                quoted = !quoted;
                in_arg = true;
            }
            '\\' if quoted => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            c if c.is_whitespace() && !quoted => {
                if in_arg {
                    args.push(std::mem::take(&mut current));
                    in_arg = false;
                }
            }
            c => {
                current.push(c);
                in_arg = true;
            }
        }
    }
    if in_arg {
        args.push(current);
    }
    args
}

/// Name and target URL pulled out of an existing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    pub name: String,
    pub url: String,
}

/// Returns `None` for entries that do not launch a URL in app mode, or
/// that lack a `Name=` line.
pub fn parse_entry(content: &str) -> Option<ParsedEntry> {
    if !content.contains(APP_FLAG) {
        return None;
    }
    let name = unescape_value(NAME_RE.captures(content)?.get(1)?.as_str().trim());
    let exec = unescape_value(EXEC_RE.captures(content)?.get(1)?.as_str().trim());
    let url = split_exec(&exec)
        .into_iter()
        .find_map(|arg| arg.strip_prefix(APP_FLAG).map(|url| url.replace("%%", "%")))?;
    if name.is_empty() || url.is_empty() {
        return None;
    }
    Some(ParsedEntry { name, url })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(platform: Option<Platform>) -> DesktopEntry {
        DesktopEntry {
            name: "myapp".into(),
            url: "https://example.com".into(),
            icon: PathBuf::from("/home/u/.local/share/applications/icons/myapp.png"),
            browser: "chromium".into(),
            platform,
        }
    }

    #[test]
    fn exec_line_with_platform() {
        assert_eq!(
            entry(Some(Platform::X11)).exec(),
            "chromium --new-window --ozone-platform=x11 --app=https://example.com --name=myapp --class=myapp"
        );
    }

    #[test]
    fn exec_line_without_platform() {
        assert_eq!(
            entry(None).exec(),
            "chromium --new-window --app=https://example.com --name=myapp --class=myapp"
        );
    }

    #[test]
    fn render_keeps_key_order() {
        let rendered = entry(Some(Platform::Wayland)).render();
        let keys: Vec<&str> = rendered
            .lines()
            .skip(1)
            .filter_map(|l| l.split_once('=').map(|(k, _)| k))
            .collect();
        assert_eq!(
            keys,
            [
                "Version",
                "Name",
                "Comment",
                "Exec",
                "Terminal",
                "Type",
                "Icon",
                "StartupNotify"
            ]
        );
        assert!(rendered.starts_with("[Desktop Entry]\n"));
        assert!(rendered.contains("Icon=/home/u/.local/share/applications/icons/myapp.png\n"));
    }

    #[test]
    fn parses_rendered_entry() {
        let parsed = parse_entry(&entry(Some(Platform::X11)).render()).unwrap();
        assert_eq!(parsed.name, "myapp");
        assert_eq!(parsed.url, "https://example.com");
    }

    #[test]
    fn ignores_regular_applications() {
        let firefox = "[Desktop Entry]\nName=Firefox\nExec=firefox %u\nType=Application\n";
        assert_eq!(parse_entry(firefox), None);
    }

    #[test]
    fn skips_entries_without_name() {
        let nameless = "[Desktop Entry]\nExec=chromium --app=https://a.example\n";
        assert_eq!(parse_entry(nameless), None);
    }

    #[test]
    fn names_with_spaces_are_quoted() {
        let mut spaced = entry(Some(Platform::X11));
        spaced.name = "My App".into();
        assert_eq!(
            spaced.exec(),
            r#"chromium --new-window --ozone-platform=x11 --app=https://example.com "--name=My App" "--class=My App""#
        );
        let parsed = parse_entry(&spaced.render()).unwrap();
        assert_eq!(parsed.name, "My App");
        assert_eq!(parsed.url, "https://example.com");
    }

    #[test]
    fn percent_signs_are_not_field_codes() {
        let mut search = entry(None);
        search.url = "https://example.com/search?q=%20rust".into();
        assert_eq!(
            search.exec(),
            r#"chromium --new-window "--app=https://example.com/search?q=%%20rust" --name=myapp --class=myapp"#
        );
        let parsed = parse_entry(&search.render()).unwrap();
        assert_eq!(parsed.url, "https://example.com/search?q=%20rust");
    }

    #[test]
    fn backslashes_survive_string_escaping() {
        let mut odd = entry(None);
        odd.name = r#"a\b"c"#.into();
        let rendered = odd.render();
        assert!(rendered.contains("Name=a\\\\b\"c\n"));
        assert!(rendered.contains(r#""--name=a\\\\b\\"c""#));
        assert_eq!(parse_entry(&rendered).unwrap().name, r#"a\b"c"#);
    }

    #[test]
    fn splits_quoted_arguments() {
        assert_eq!(
            split_exec(r#"brave  "--name=a b" --app=x"#),
            ["brave", "--name=a b", "--app=x"]
        );
    }
}
