//! Test-stand description: which crates hang off which ngCCM port, and how to
//! read the front-end temperatures.

use serde::Serialize;

use crate::{config::Config, ngccm::Ngccm};

/// Reading reported when a temperature could not be obtained.
pub const TEMP_UNKNOWN: f64 = -1.0;

/// The kind of hardware a test stand polls. Each kind has its own temperature
/// limit and its own set of health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    /// Beam halo monitor stand.
    Bhm,
    /// Any front-end crate stand.
    FrontEnd,
}

impl DeviceCategory {
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("bhm") {
            Self::Bhm
        } else {
            Self::FrontEnd
        }
    }

    /// Exclusive upper bound for a passing temperature, in degrees Celsius.
    pub fn temp_limit(self) -> f64 {
        match self {
            Self::Bhm => 30.5,
            Self::FrontEnd => 37.0,
        }
    }

    /// Whether the health check reads the mezzanine firmware versions.
    pub fn checks_versions(self) -> bool {
        matches!(self, Self::FrontEnd)
    }
}

#[derive(Debug, Clone)]
pub struct Teststand {
    pub name: String,
    pub fe_crates: Vec<u32>,
    pub temp_slots: Vec<u32>,
    pub ngccm: Ngccm,
}

impl Teststand {
    pub fn new(name: impl Into<String>, ngccm: Ngccm, fe_crates: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            fe_crates,
            temp_slots: vec![1],
            ngccm,
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self {
            name: cfg.get("TESTSTAND_NAME").unwrap_or_else(|| "hf".into()),
            fe_crates: cfg.get_list("FE_CRATES"),
            temp_slots: cfg.get_list("TEMP_SLOTS"),
            ngccm: Ngccm::from_config(cfg),
        }
    }

    pub fn with_temp_slots(mut self, slots: Vec<u32>) -> Self {
        self.temp_slots = slots;
        self
    }

    pub fn ngccm_port(&self) -> u16 {
        self.ngccm.port()
    }

    pub fn category(&self) -> DeviceCategory {
        DeviceCategory::from_name(&self.name)
    }

    pub fn temp_commands(&self) -> Vec<String> {
        self.fe_crates
            .iter()
            .flat_map(|c| self.temp_slots.iter().map(move |s| temp_command(*c, *s)))
            .collect()
    }

    /// Read every configured front-end temperature. Unreadable sensors report
    /// [`TEMP_UNKNOWN`]; the result always has at least one entry.
    pub async fn get_temps(&self) -> Vec<f64> {
        let cmds = self.temp_commands();
        if cmds.is_empty() {
            tracing::warn!(teststand = %self.name, "no temperature sensors configured");
            return vec![TEMP_UNKNOWN];
        }

        let parsed = match self.ngccm.send_commands_parsed(cmds.clone()).await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "could not read temperatures");
                return vec![TEMP_UNKNOWN; cmds.len()];
            }
        };

        cmds.iter()
            .map(|cmd| {
                let temp = parsed.result_for(cmd).and_then(parse_temp);
                if temp.is_none() {
                    tracing::warn!(cmd = %cmd, result = ?parsed.result_for(cmd), "bad temperature reading");
                }
                temp.unwrap_or(TEMP_UNKNOWN)
            })
            .collect()
    }
}

pub fn temp_command(fe_crate: u32, slot: u32) -> String {
    format!("get HF{fe_crate}-{slot}-B_SHT_temp_f")
}

fn parse_temp(result: &str) -> Option<f64> {
    if result.contains("ERROR") {
        return None;
    }
    // Some firmware appends the unit, e.g. "26.4 C".
    result.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_name() {
        assert_eq!(DeviceCategory::from_name("bhm"), DeviceCategory::Bhm);
        assert_eq!(DeviceCategory::from_name("BHM"), DeviceCategory::Bhm);
        assert_eq!(DeviceCategory::from_name("hf"), DeviceCategory::FrontEnd);
        assert_eq!(DeviceCategory::from_name("904"), DeviceCategory::FrontEnd);
    }

    #[test]
    fn test_category_policies_differ() {
        assert_eq!(DeviceCategory::Bhm.temp_limit(), 30.5);
        assert_eq!(DeviceCategory::FrontEnd.temp_limit(), 37.0);
        assert!(!DeviceCategory::Bhm.checks_versions());
        assert!(DeviceCategory::FrontEnd.checks_versions());
    }

    #[test]
    fn test_temp_commands_cross_crates_and_slots() {
        let ts = Teststand::new("hf", Ngccm::new(64000), vec![1, 2]).with_temp_slots(vec![1, 3]);
        assert_eq!(
            ts.temp_commands(),
            vec![
                "get HF1-1-B_SHT_temp_f",
                "get HF1-3-B_SHT_temp_f",
                "get HF2-1-B_SHT_temp_f",
                "get HF2-3-B_SHT_temp_f",
            ]
        );
    }

    #[test]
    fn test_parse_temp() {
        assert_eq!(parse_temp("26.4"), Some(26.4));
        assert_eq!(parse_temp("26.4 C"), Some(26.4));
        assert_eq!(parse_temp("ERROR!!"), None);
        assert_eq!(parse_temp(""), None);
        assert_eq!(parse_temp("hot"), None);
    }

    #[tokio::test]
    async fn test_no_sensors_reports_unknown() {
        let ts = Teststand::new("hf", Ngccm::new(64000), vec![]);
        assert_eq!(ts.get_temps().await, vec![TEMP_UNKNOWN]);
    }
}
