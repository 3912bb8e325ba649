mod cli;

use std::process::ExitCode;

use anyhow::Result;
use is_terminal::IsTerminal;
use ngccmctl::{
    checks,
    config::Config,
    logging,
    printer::{print_json, render_table, TextPrinter},
    qie,
    teststand::Teststand,
};

use cli::{Commands, SendMode};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();
    logging::init(args.verbose);

    // Running without a command is almost always a mistake; point at the docs.
    let Some(command) = args.command else {
        eprintln!("Hang on.");
        eprintln!(
            "What you just ran is \"ngccmctl\" without a command. See `ngccmctl --help` or the documentation for more information."
        );
        return Ok(ExitCode::FAILURE);
    };

    let mut cfg = Config::load();
    if let Some(port) = args.port {
        cfg.set("NGCCM_PORT", port.to_string());
    }
    let ts = Teststand::from_config(&cfg);
    let printer = TextPrinter { color: std::io::stdout().is_terminal() };

    match command {
        Commands::Send { cmds, mode } => match mode {
            SendMode::Raw | SendMode::Fast => {
                let out = if mode == SendMode::Raw {
                    ts.ngccm.send_commands(cmds).await?
                } else {
                    ts.ngccm.send_commands_fast(cmds).await?
                };
                if args.json {
                    print_json(&out)?;
                } else {
                    printer.heading(&out.log);
                    printer.print(&out.output);
                }
            }
            SendMode::Parsed => {
                let out = ts.ngccm.send_commands_parsed(cmds).await?;
                if args.json {
                    print_json(&out)?;
                } else {
                    printer.heading(&out.log);
                    let rows: Vec<Vec<String>> = out
                        .output
                        .iter()
                        .map(|r| vec![r.cmd.clone(), "->".to_string(), r.result.clone()])
                        .collect();
                    print!("{}", render_table(&rows));
                }
            }
        },
        Commands::Info { fe_crate } => {
            let info = checks::get_info(&ts.ngccm, fe_crate).await;
            let known = info.is_known();
            if args.json {
                print_json(&info)?;
            } else {
                printer.print(&format!("ngCCM (crate {}) mezzanine FW: {}", fe_crate, info.version_fw_mez));
                printer.print(&format!("software version: {}", info.version_sw));
                if !info.log.is_empty() {
                    eprintln!("{}", info.log);
                }
            }
            if !known {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Status => {
            let status = checks::get_status(&ts).await;
            let passed = status.status.iter().all(|f| *f == 1);
            if args.json {
                print_json(&status)?;
            } else {
                printer.heading(&format!("ngCCM status for test stand \"{}\"", ts.name));
                printer.flags("check", &status.status);
                printer.print(&format!("temperature: {}", status.temp));
            }
            if !passed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::StatusBkp => {
            let status = checks::get_status_bkp(&ts).await;
            let passed = status.status.iter().all(|f| *f == 1);
            if args.json {
                print_json(&status)?;
            } else {
                printer.heading(&format!("Backplane power for crates {:?}", ts.fe_crates));
                printer.flags_for("crate", &ts.fe_crates, &status.status);
                tracing::debug!(log = %status.log, "backplane check transcript");
            }
            if !passed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::QieDump { fe_crate, slot, qies } => {
            let qies = if qies.is_empty() { qie::DEFAULT_QIES.to_vec() } else { qies };
            let table = qie::get_qie_shift_reg(&ts.ngccm, fe_crate, slot, &qies).await?;
            if args.json {
                print_json(&table)?;
            } else {
                print!("{}", table);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
