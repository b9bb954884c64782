mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "sioframe", version, about = "Event packet codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encode_subcommand() {
        let cli = Cli::try_parse_from([
            "sioframe",
            "encode",
            "--type",
            "ack",
            "--namespace",
            "/chat",
            "--id",
            "13",
            "--args",
            "[\"ok\"]",
        ])
        .expect("encode args should parse");

        assert!(matches!(cli.command, Command::Encode(_)));
    }

    #[test]
    fn decode_needs_input_or_text() {
        let err = Cli::try_parse_from(["sioframe", "decode"]).expect_err("missing input should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn decode_rejects_input_with_text() {
        let err = Cli::try_parse_from(["sioframe", "decode", "frames.bin", "--text", "0"])
            .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn attachments_require_text() {
        let err = Cli::try_parse_from(["sioframe", "decode", "frames.bin", "--attachment", "a.bin"])
            .expect_err("attachment without text should fail");
        assert!(matches!(
            err.kind(),
            clap::error::ErrorKind::MissingRequiredArgument | clap::error::ErrorKind::ArgumentConflict
        ));
    }
}
