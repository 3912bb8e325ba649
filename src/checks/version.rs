//! Mezzanine firmware version query.

use serde::Serialize;

use crate::ngccm::Ngccm;

/// Version reported when the register could not be read.
pub const VERSION_UNKNOWN: (i32, i32) = (-1, -1);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NgccmInfo {
    pub version_fw_mez_major: i32,
    pub version_fw_mez_minor: i32,
    pub version_fw_mez: String,
    pub version_sw: String,
    pub log: String,
}

impl NgccmInfo {
    pub fn from_versions((major, minor): (i32, i32), log: String) -> Self {
        Self {
            version_fw_mez_major: major,
            version_fw_mez_minor: minor,
            version_fw_mez: format!("{major:02}.{minor:02}"),
            version_sw: "?".to_string(),
            log: log.trim().to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.version_fw_mez_major != VERSION_UNKNOWN.0
    }
}

pub fn version_command(fe_crate: u32) -> String {
    format!("get HF{fe_crate}-mezz_reg4")
}

/// Split a hex register value into (major, minor): the low byte is the major
/// version, the byte above it the minor version.
pub fn decode_mezz_version(result: &str) -> Option<(i32, i32)> {
    let hex = result.trim();
    let hex = hex
        .strip_prefix("0x")
        .or_else(|| hex.strip_prefix("0X"))
        .unwrap_or(hex);
    if hex.is_empty() || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    // Only the low 16 bits carry the version.
    let low = &hex[hex.len().saturating_sub(4)..];
    let value = u16::from_str_radix(low, 16).ok()?;
    Some(((value & 0xff) as i32, (value >> 8) as i32))
}

/// Read the mezzanine firmware version of one FE crate's ngCCM.
pub async fn get_info(ngccm: &Ngccm, fe_crate: u32) -> NgccmInfo {
    let command = version_command(fe_crate);
    let result = match ngccm.send_commands_parsed(command.as_str()).await {
        Ok(parsed) => parsed.result_for(&command).unwrap_or_default().to_string(),
        Err(e) => format!("ERROR: {e}"),
    };

    let decoded = if result.contains("ERROR") {
        None
    } else {
        decode_mezz_version(&result)
    };

    match decoded {
        Some(versions) => {
            tracing::debug!(fe_crate, major = versions.0, minor = versions.1, "read mezzanine firmware version");
            NgccmInfo::from_versions(versions, String::new())
        }
        None => {
            tracing::warn!(fe_crate, result = %result, "failed to find FW versions");
            let log = format!(
                ">> ERROR: Failed to find FW versions. The command result follows:\n{command} -> {result}"
            );
            NgccmInfo::from_versions(VERSION_UNKNOWN, log)
        }
    }
}
