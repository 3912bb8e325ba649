use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "ngccmctl", about = "Control and poll ngCCMs through the ngccm tool", version)]
pub struct Cli {
    /// ngccm control port (overrides NGCCM_PORT).
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Output machine-readable JSON.
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Send commands to the ngccm tool.
    Send {
        /// Commands, one per argument (e.g. "get HF1-mezz_reg4").
        #[arg(value_name = "CMD", required = true)]
        cmds: Vec<String>,

        /// How to talk to the tool.
        #[arg(long, value_enum, default_value_t = SendMode::Parsed)]
        mode: SendMode,
    },
    /// Read the mezzanine firmware version of an FE crate's ngCCM.
    Info {
        #[arg(long = "crate")]
        fe_crate: u32,
    },
    /// Check firmware readability and temperature of the test stand.
    Status,
    /// Enable, reset and check the power of every FE crate backplane.
    StatusBkp,
    /// Dump the QIE shift-register settings of one card.
    QieDump {
        #[arg(long = "crate")]
        fe_crate: u32,

        #[arg(long)]
        slot: u32,

        /// QIE to read; repeat for several. Defaults to 1-4.
        #[arg(long = "qie", action = ArgAction::Append)]
        qies: Vec<u32>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SendMode {
    /// Interactive, return the raw answer text.
    Raw,
    /// Interactive, return each answer paired with its command.
    Parsed,
    /// Pipe everything at once; fast, but answers may be missing.
    Fast,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
