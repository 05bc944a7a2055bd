use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

// The regex crate has no backreferences; the alternation keeps an opening
// quote paired with an optional matching closing quote.
static TYPE_LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^type:\s*(?:'([A-Za-z0-9_]+)'?|"([A-Za-z0-9_]+)"?|([A-Za-z0-9_]+))\s*$"#)
        .expect("type line pattern is valid")
});

/// Detects the declared extension type from manifest contents.
pub trait ManifestTypeDetector: Send + Sync {
    fn detect_type(&self, reader: &mut dyn BufRead) -> Option<String>;

    /// Opens `path`, reads until a type is found, and closes it again.
    fn detect_file(&self, path: &Path) -> Option<String> {
        let file = File::open(path).ok()?;
        let mut reader = BufReader::new(file);
        self.detect_type(&mut reader)
    }
}

/// Line scanner for `type: <word>`; the first matching line wins.
#[derive(Debug, Default, Clone, Copy)]
pub struct TypeLineDetector;

impl TypeLineDetector {
    pub fn new() -> Self {
        Self
    }

    pub fn match_line(line: &str) -> Option<&str> {
        let captures = TYPE_LINE_PATTERN.captures(line)?;
        (1..=3)
            .find_map(|i| captures.get(i))
            .map(|m| m.as_str())
    }
}

impl ManifestTypeDetector for TypeLineDetector {
    // Lines are split as bytes so a stray non-UTF-8 byte only spoils its own line.
    fn detect_type(&self, reader: &mut dyn BufRead) -> Option<String> {
        reader.split(b'\n').map_while(Result::ok).find_map(|line| {
            let line = String::from_utf8_lossy(&line);
            Self::match_line(&line).map(str::to_string)
        })
    }
}
