//! Printers: coloured text, pass/fail flags, JSON envelopes and tables.

use owo_colors::OwoColorize;
use serde::Serialize;
use unicode_width::UnicodeWidthStr;

pub struct TextPrinter {
    pub color: bool,
}

impl TextPrinter {
    pub fn print(&self, text: &str) {
        println!("{}", text);
    }

    pub fn heading(&self, text: &str) {
        if self.color {
            println!("{}", text.cyan());
        } else {
            println!("{}", text);
        }
    }

    /// Render a 0/1 check flag as PASS/FAIL.
    pub fn flag(&self, flag: u8) -> String {
        match (flag, self.color) {
            (1, true) => format!("{}", "PASS".green()),
            (1, false) => "PASS".to_string(),
            (_, true) => format!("{}", "FAIL".red()),
            (_, false) => "FAIL".to_string(),
        }
    }

    /// Print flags numbered by position, starting at 1.
    pub fn flags(&self, label: &str, flags: &[u8]) {
        let ids: Vec<u32> = (1..).take(flags.len()).collect();
        self.flags_for(label, &ids, flags);
    }

    /// Print each flag against the id it belongs to (a crate number, say).
    pub fn flags_for(&self, label: &str, ids: &[u32], flags: &[u8]) {
        for line in self.flag_lines(label, ids, flags) {
            println!("{}", line);
        }
    }

    fn flag_lines(&self, label: &str, ids: &[u32], flags: &[u8]) -> Vec<String> {
        ids.iter()
            .zip(flags)
            .map(|(id, f)| format!("{} {}: {}", label, id, self.flag(*f)))
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct JsonOut<T> {
    pub ok: bool,
    pub data: T,
}

pub fn print_json<T: Serialize>(data: T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&JsonOut { ok: true, data })?);
    Ok(())
}

/// Lay rows out in left-aligned columns two spaces apart.
pub fn render_table(rows: &[Vec<String>]) -> String {
    let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; cols];
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(UnicodeWidthStr::width(cell.as_str()));
        }
    }

    let mut out = String::new();
    for row in rows {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            if i > 0 {
                line.push_str("  ");
            }
            line.push_str(cell);
            let pad = widths[i] - UnicodeWidthStr::width(cell.as_str());
            line.push_str(&" ".repeat(pad));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_render_table_pads_columns() {
        let rows = vec![row(&["setting", "QIE 1"]), row(&["CalMode", "0"]), row(&["TimingThresholdDAC", "0x3f"])];
        let want = "setting             QIE 1\nCalMode             0\nTimingThresholdDAC  0x3f\n";
        assert_eq!(render_table(&rows), want);
    }

    #[test]
    fn test_render_table_counts_display_width() {
        let rows = vec![row(&["温度", "x"]), row(&["ab", "y"])];
        assert_eq!(render_table(&rows), "温度  x\nab    y\n");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_table(&[]), "");
    }

    #[test]
    fn test_flag_plain() {
        let p = TextPrinter { color: false };
        assert_eq!(p.flag(1), "PASS");
        assert_eq!(p.flag(0), "FAIL");
    }

    #[test]
    fn test_flag_lines_use_given_ids() {
        let p = TextPrinter { color: false };
        assert_eq!(
            p.flag_lines("crate", &[2, 4], &[0, 1]),
            vec!["crate 2: FAIL", "crate 4: PASS"]
        );
    }
}
