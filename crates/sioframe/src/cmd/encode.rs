use std::fs::File;
use std::io::BufWriter;

use sioframe_parser::{CodecConfig, Encoder, Header, Packet, Value};
use sioframe_transport::{FrameConfig, FrameQueue, FrameWriter};
use tracing::info;

use crate::cmd::EncodeArgs;
use crate::exit::{codec_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frames, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let packet = build_packet(&args)?;
    let config = CodecConfig {
        max_attachments: args.limits.max_attachments,
    };

    match &args.out {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            let writer = FrameWriter::with_config(
                BufWriter::new(file),
                FrameConfig {
                    max_payload_size: args.limits.max_payload,
                },
            );
            Encoder::with_config(writer, config)
                .write_packet(&packet)
                .map_err(|err| codec_error("encode failed", err))?;
            info!(path = %path.display(), "wrote frame stream");
        }
        None => {
            let mut encoder = Encoder::with_config(FrameQueue::new(), config);
            encoder
                .write_packet(&packet)
                .map_err(|err| codec_error("encode failed", err))?;
            print_frames(encoder.get_ref().iter(), format);
        }
    }

    Ok(SUCCESS)
}

fn build_packet(args: &EncodeArgs) -> CliResult<Packet> {
    let mut header = Header::new(args.packet_type.into()).with_namespace(args.namespace.clone());
    if let Some(id) = args.id {
        header = header.with_ack(id);
    }

    Ok(Packet {
        header,
        event: args.event.clone(),
        args: parse_args(args.args.as_deref())?,
    })
}

fn parse_args(json: Option<&str>) -> CliResult<Vec<Value>> {
    let Some(json) = json else {
        return Ok(Vec::new());
    };
    let parsed: serde_json::Value = serde_json::from_str(json)
        .map_err(|err| CliError::new(USAGE, format!("--args is not valid JSON: {err}")))?;
    match Value::from(parsed) {
        Value::Array(values) => Ok(values),
        _ => Err(CliError::new(USAGE, "--args must be a JSON array")),
    }
}
