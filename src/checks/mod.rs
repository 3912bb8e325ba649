//! Health checks for the ngCCMs and FE crate backplanes.
//!
//! Checks never fail. Each one reports a list of 0/1 flags, one per thing it
//! looked at, and degrades to a 0 (plus a log line) when something is missing.

use serde::Serialize;

use crate::{
    ngccm::patterns,
    teststand::{DeviceCategory, Teststand, TEMP_UNKNOWN},
};

pub mod version;

pub use version::{decode_mezz_version, get_info, NgccmInfo};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Status {
    pub status: Vec<u8>,
    pub temp: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BkpStatus {
    pub status: Vec<u8>,
    pub log: String,
}

/// 1 if `temp` is a real reading below the category's limit.
pub fn temp_flag(category: DeviceCategory, temp: f64) -> u8 {
    u8::from(temp != TEMP_UNKNOWN && temp < category.temp_limit())
}

/// The backplane reports power-bad; the check reports pass. 0 bad means 1 pass.
pub fn power_ok_flag(pwr_bad: u8) -> u8 {
    pwr_bad.wrapping_add(1) % 2
}

/// Check that every FE crate's firmware version is readable (front-end stands
/// only) and that the first temperature is within limits.
pub async fn get_status(ts: &Teststand) -> Status {
    let category = ts.category();
    tracing::info!(teststand = %ts.name, ?category, "checking ngCCM status");
    let mut status = Vec::new();

    if category.checks_versions() {
        for fe_crate in &ts.fe_crates {
            let info = get_info(&ts.ngccm, *fe_crate).await;
            status.push(u8::from(info.is_known()));
        }
    }

    let temp = ts.get_temps().await.first().copied().unwrap_or(TEMP_UNKNOWN);
    let flag = temp_flag(category, temp);
    if flag == 0 {
        tracing::warn!(temp, limit = category.temp_limit(), "temperature check failed");
    }
    status.push(flag);

    Status { status, temp }
}

pub fn bkp_setup_commands(fe_crate: u32) -> Vec<String> {
    vec![
        format!("put HF{fe_crate}-bkp_pwr_enable 1"),
        format!("put HF{fe_crate}-bkp_reset 1"),
        format!("put HF{fe_crate}-bkp_reset 0"),
    ]
}

pub fn bkp_pwr_bad_command(fe_crate: u32) -> String {
    format!("get HF{fe_crate}-bkp_pwr_bad")
}

/// Enable and reset each FE crate backplane, then check its power-bad flag.
pub async fn get_status_bkp(ts: &Teststand) -> BkpStatus {
    tracing::info!(teststand = %ts.name, crates = ?ts.fe_crates, "checking backplane power");
    let mut out = BkpStatus::default();

    for fe_crate in &ts.fe_crates {
        let flag = check_bkp_crate(ts, *fe_crate, &mut out.log).await;
        out.status.push(flag);
    }
    out
}

async fn check_bkp_crate(ts: &Teststand, fe_crate: u32, log: &mut String) -> u8 {
    match ts.ngccm.send_commands_fast(bkp_setup_commands(fe_crate)).await {
        Ok(raw) => log.push_str(&raw.output),
        Err(e) => {
            tracing::warn!(fe_crate, error = %e, "backplane enable/reset failed");
            log.push_str(&format!("ERROR: Could not enable and reset the backplane of crate {fe_crate}: {e}\n"));
            return 0;
        }
    }

    let cmd = bkp_pwr_bad_command(fe_crate);
    let output = match ts.ngccm.send_commands_fast(cmd.as_str()).await {
        Ok(raw) => raw.output,
        Err(e) => {
            tracing::warn!(fe_crate, error = %e, "backplane power query failed");
            log.push_str(&format!("ERROR: Could not run \"{cmd}\": {e}\n"));
            return 0;
        }
    };
    log.push_str(&output);

    match patterns::extract_bit(&cmd, &output) {
        Ok(Some(bad)) => power_ok_flag(bad),
        Ok(None) | Err(_) => {
            tracing::warn!(fe_crate, "no power-bad result in output");
            log.push_str(&format!("ERROR: Could not find the result of \"{cmd}\" in the output."));
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_flag_by_category() {
        assert_eq!(temp_flag(DeviceCategory::Bhm, 30.0), 1);
        assert_eq!(temp_flag(DeviceCategory::Bhm, 30.5), 0);
        assert_eq!(temp_flag(DeviceCategory::Bhm, 33.0), 0);
        assert_eq!(temp_flag(DeviceCategory::FrontEnd, 33.0), 1);
        assert_eq!(temp_flag(DeviceCategory::FrontEnd, 37.0), 0);
    }

    #[test]
    fn test_temp_flag_rejects_unknown() {
        assert_eq!(temp_flag(DeviceCategory::Bhm, TEMP_UNKNOWN), 0);
        assert_eq!(temp_flag(DeviceCategory::FrontEnd, TEMP_UNKNOWN), 0);
    }

    #[test]
    fn test_power_ok_flag_inverts() {
        assert_eq!(power_ok_flag(0), 1);
        assert_eq!(power_ok_flag(1), 0);
    }

    #[test]
    fn test_bkp_commands() {
        assert_eq!(
            bkp_setup_commands(2),
            vec!["put HF2-bkp_pwr_enable 1", "put HF2-bkp_reset 1", "put HF2-bkp_reset 0"]
        );
        assert_eq!(bkp_pwr_bad_command(2), "get HF2-bkp_pwr_bad");
    }
}
