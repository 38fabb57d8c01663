//! Output buffer for LLIR text: indentation, labels, fresh label names.

use rustc_hash::FxHashMap;

pub struct Writer {
    buf: String,
    level: usize,
    start: bool,
    labels: FxHashMap<String, u32>,
    /// The label whose instructions are currently being written. Phi arms
    /// record this to name the flow edge they arrived on.
    pub current_label: String,
}

impl Writer {
    pub fn new() -> Self {
        Writer {
            buf: String::new(),
            level: 0,
            start: true,
            labels: FxHashMap::default(),
            current_label: String::new(),
        }
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    pub fn dedent(&mut self) {
        debug_assert!(self.level > 0);
        self.level = self.level.saturating_sub(1);
    }

    pub fn newline(&mut self) {
        self.buf.push('\n');
        self.start = true;
    }

    pub fn write(&mut self, data: &str) {
        if self.start {
            for _ in 0..self.level {
                self.buf.push('\t');
            }
        }
        self.buf.push_str(data);
        self.start = false;
    }

    pub fn writeline(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.write(line);
        self.newline();
    }

    /// Open a labeled region: `Lname:` with an optional annotation hint.
    pub fn label(&mut self, name: &str, hint: Option<&str>) {
        self.dedent();
        match hint {
            Some(h) => self.writeline(&format!("{name}: ; {h}")),
            None => self.writeline(&format!("{name}:")),
        }
        self.indent();
        self.current_label = name.to_string();
    }

    /// A fresh label with the given prefix (`T0`, `T1`, ...).
    pub fn getlabel(&mut self, prefix: &str) -> String {
        let n = self.labels.entry(prefix.to_string()).or_insert(0);
        let label = format!("{prefix}{n}");
        *n += 1;
        label
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}
