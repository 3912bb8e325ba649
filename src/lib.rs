//! # ngccmctl
//!
//! Scripted control and status polling of ngCCM controllers in a detector test
//! stand, by driving the vendor `ngccm` command-line tool and scraping its text
//! answers.
//!
//! ```rust,ignore
//! use ngccmctl::{checks, config::Config, teststand::Teststand};
//!
//! let ts = Teststand::from_config(&Config::load());
//! let info = checks::get_info(&ts.ngccm, 1).await;
//! println!("mezzanine FW {}", info.version_fw_mez);
//! ```

pub mod checks;
pub mod config;
pub mod error;
pub mod logging;
pub mod ngccm;
pub mod printer;
pub mod process;
pub mod qie;
pub mod teststand;

pub use error::NgccmError;
pub use ngccm::{CommandList, CommandResult, Ngccm, ParsedOutput, RawOutput};
pub use teststand::Teststand;
