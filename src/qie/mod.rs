//! QIE shift-register dump: read every setting of every QIE on one card and lay
//! the answers out as a settings-by-QIE table.

use std::fmt;

use serde::Serialize;

use crate::{
    error::Result,
    ngccm::{Ngccm, ParsedOutput},
    printer::render_table,
};

pub const QIE_SETTINGS: [&str; 17] = [
    "CalMode",
    "CapID0pedestal",
    "CapID1pedestal",
    "CapID2pedestal",
    "CapID3pedestal",
    "ChargeInjectDAC",
    "DiscOn",
    "FixRange",
    "IdcBias",
    "IsetpBias",
    "Lvds",
    "PedestalDAC",
    "RangeSet",
    "TGain",
    "TimingIref",
    "TimingThresholdDAC",
    "Trim",
];

pub const DEFAULT_QIES: [u32; 4] = [1, 2, 3, 4];

/// Shown in place of a setting the tool did not answer.
const MISSING: &str = "?";

pub fn qie_command(fe_crate: u32, slot: u32, qie: u32, setting: &str) -> String {
    format!("get HF{fe_crate}-{slot}-QIE{qie}_{setting}")
}

/// Every (QIE, setting) read, QIE-major.
pub fn qie_commands(fe_crate: u32, slot: u32, qies: &[u32]) -> Vec<String> {
    qies.iter()
        .flat_map(|q| QIE_SETTINGS.iter().map(move |s| qie_command(fe_crate, slot, *q, s)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QieTable {
    pub qies: Vec<u32>,
    /// One row per entry of [`QIE_SETTINGS`], one column per QIE.
    pub values: Vec<Vec<String>>,
}

impl QieTable {
    pub fn from_results(fe_crate: u32, slot: u32, qies: &[u32], parsed: &ParsedOutput) -> Self {
        let values = QIE_SETTINGS
            .iter()
            .map(|setting| {
                qies.iter()
                    .map(|q| {
                        let cmd = qie_command(fe_crate, slot, *q, setting);
                        parsed.result_for(&cmd).unwrap_or(MISSING).to_string()
                    })
                    .collect::<Vec<String>>()
            })
            .collect();
        Self { qies: qies.to_vec(), values }
    }

    pub fn value(&self, setting: &str, qie: u32) -> Option<&str> {
        let row = QIE_SETTINGS.iter().position(|s| *s == setting)?;
        let col = self.qies.iter().position(|q| *q == qie)?;
        self.values.get(row)?.get(col).map(String::as_str)
    }

    /// Header row followed by one row per setting.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut header = vec!["setting".to_string()];
        header.extend(self.qies.iter().map(|q| format!("QIE {q}")));

        let mut rows = vec![header];
        for (setting, values) in QIE_SETTINGS.iter().zip(&self.values) {
            let mut row = vec![setting.to_string()];
            row.extend(values.iter().cloned());
            rows.push(row);
        }
        rows
    }
}

impl fmt::Display for QieTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_table(&self.rows()))
    }
}

/// Read the shift-register settings of `qies` on one card in a single session.
pub async fn get_qie_shift_reg(ngccm: &Ngccm, fe_crate: u32, slot: u32, qies: &[u32]) -> Result<QieTable> {
    tracing::info!(fe_crate, slot, ?qies, "dumping QIE shift registers");
    let parsed = ngccm
        .send_commands_parsed(qie_commands(fe_crate, slot, qies))
        .await?;
    Ok(QieTable::from_results(fe_crate, slot, qies, &parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ngccm::CommandResult;

    fn answer(cmd: String, result: &str) -> CommandResult {
        CommandResult { cmd, result: result.into(), times: (0.0, 0.0) }
    }

    #[test]
    fn test_commands_are_qie_major() {
        let cmds = qie_commands(1, 2, &[1, 2]);
        assert_eq!(cmds.len(), 2 * QIE_SETTINGS.len());
        assert_eq!(cmds[0], "get HF1-2-QIE1_CalMode");
        assert_eq!(cmds[16], "get HF1-2-QIE1_Trim");
        assert_eq!(cmds[17], "get HF1-2-QIE2_CalMode");
    }

    #[test]
    fn test_reassembles_per_qie() {
        let parsed = ParsedOutput {
            output: vec![
                answer(qie_command(1, 2, 1, "CalMode"), "0"),
                answer(qie_command(1, 2, 10, "CalMode"), "1"),
                answer(qie_command(1, 2, 1, "Trim"), "2"),
            ],
            log: String::new(),
        };
        let table = QieTable::from_results(1, 2, &[1, 10], &parsed);
        assert_eq!(table.value("CalMode", 1), Some("0"));
        assert_eq!(table.value("CalMode", 10), Some("1"));
        assert_eq!(table.value("Trim", 1), Some("2"));
        assert_eq!(table.value("Trim", 10), Some(MISSING));
        assert_eq!(table.value("Nope", 1), None);
        assert_eq!(table.value("Trim", 3), None);
    }

    #[test]
    fn test_rows_have_header_and_one_row_per_setting() {
        let table = QieTable::from_results(1, 2, &DEFAULT_QIES, &ParsedOutput::default());
        let rows = table.rows();
        assert_eq!(rows.len(), 1 + QIE_SETTINGS.len());
        assert_eq!(rows[0], vec!["setting", "QIE 1", "QIE 2", "QIE 3", "QIE 4"]);
        assert_eq!(rows[1], vec!["CalMode", "?", "?", "?", "?"]);
        assert!(table.to_string().starts_with("setting"));
    }
}
