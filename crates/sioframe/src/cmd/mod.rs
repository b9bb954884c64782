use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use sioframe_parser::{PacketType, DEFAULT_MAX_ATTACHMENTS};
use sioframe_transport::DEFAULT_MAX_PAYLOAD;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode one packet and print (or write) its frames.
    Encode(EncodeArgs),
    /// Decode packets from a frame stream or a single TEXT frame.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PacketTypeArg {
    Connect,
    Disconnect,
    Event,
    Ack,
    Error,
}

impl From<PacketTypeArg> for PacketType {
    fn from(arg: PacketTypeArg) -> Self {
        match arg {
            PacketTypeArg::Connect => PacketType::Connect,
            PacketTypeArg::Disconnect => PacketType::Disconnect,
            PacketTypeArg::Event => PacketType::Event,
            PacketTypeArg::Ack => PacketType::Ack,
            PacketTypeArg::Error => PacketType::Error,
        }
    }
}

#[derive(Args, Debug)]
pub struct LimitArgs {
    /// Maximum attachments per packet.
    #[arg(long, default_value_t = DEFAULT_MAX_ATTACHMENTS)]
    pub max_attachments: usize,
    /// Maximum frame payload size in bytes (frame streams only).
    #[arg(long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Packet type.
    #[arg(long = "type", value_enum, default_value = "event")]
    pub packet_type: PacketTypeArg,
    /// Namespace, e.g. /chat. Empty or "/" is the default namespace.
    #[arg(long, default_value = "")]
    pub namespace: String,
    /// Acknowledgement id.
    #[arg(long)]
    pub id: Option<u64>,
    /// Event name (event packets only).
    #[arg(long)]
    pub event: Option<String>,
    /// Arguments as a JSON array. Objects of the form
    /// {"type":"Buffer","data":[..]} become BINARY attachments.
    #[arg(long, value_name = "JSON")]
    pub args: Option<String>,
    /// Write the frames to this file as a frame stream instead of printing them.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    #[command(flatten)]
    pub limits: LimitArgs,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame stream file to decode.
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    pub input: Option<PathBuf>,
    /// A single TEXT frame payload.
    #[arg(long)]
    pub text: Option<String>,
    /// BINARY frame payload file following --text (repeatable, in order).
    #[arg(long, value_name = "FILE", requires = "text")]
    pub attachment: Vec<PathBuf>,
    #[command(flatten)]
    pub limits: LimitArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
