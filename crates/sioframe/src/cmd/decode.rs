use std::fs::{self, File};
use std::io::BufReader;

use sioframe_parser::{CodecConfig, CodecError, Decoder, Packet};
use sioframe_transport::{FrameConfig, FrameQueue, FrameReader, FrameSource, TransportError};
use tracing::{debug, warn};

use crate::cmd::DecodeArgs;
use crate::exit::{codec_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_packet, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let source = open_source(&args)?;
    let mut decoder = Decoder::with_config(
        source,
        CodecConfig {
            max_attachments: args.limits.max_attachments,
        },
    );

    let mut decoded = 0usize;
    let mut failed = 0usize;
    loop {
        let result = match decoder.decode_header() {
            // End of input at a packet boundary.
            Err(CodecError::Transport(TransportError::ConnectionClosed)) => break,
            Err(err) => Err(err),
            Ok(head) => decoder.decode_args().map(|args| Packet {
                header: head.header,
                event: head.event,
                args,
            }),
        };

        match result {
            Ok(packet) => {
                print_packet(&packet, format);
                decoded += 1;
            }
            Err(err) if err.is_fatal_to_connection() => {
                return Err(codec_error("decode failed", err));
            }
            Err(err) => {
                warn!(error = %err, "skipping malformed packet");
                failed += 1;
            }
        }
    }

    debug!(decoded, failed, "finished decoding");
    if failed > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{failed} of {} packets failed to decode", decoded + failed),
        ));
    }
    Ok(SUCCESS)
}

fn open_source(args: &DecodeArgs) -> CliResult<Box<dyn FrameSource>> {
    if let Some(text) = &args.text {
        let mut queue = FrameQueue::new();
        queue.push_text(text.clone().into_bytes());
        for path in &args.attachment {
            let data = fs::read(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            queue.push_binary(data);
        }
        return Ok(Box::new(queue));
    }

    let path = args
        .input
        .as_ref()
        .ok_or_else(|| CliError::new(crate::exit::USAGE, "either INPUT or --text is required"))?;
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    Ok(Box::new(FrameReader::with_config(
        BufReader::new(file),
        FrameConfig {
            max_payload_size: args.limits.max_payload,
        },
    )))
}
