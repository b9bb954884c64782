use std::fmt::Write as _;
use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use sioframe_parser::{Packet, Value};
use sioframe_transport::Frame;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    index: usize,
    kind: &'a str,
    size: usize,
    payload: String,
}

#[derive(Serialize)]
struct PacketOutput<'a> {
    #[serde(rename = "type")]
    packet_type: &'a str,
    namespace: &'a str,
    id: Option<u64>,
    event: Option<&'a str>,
    args: serde_json::Value,
}

pub fn print_frames<'a>(frames: impl IntoIterator<Item = &'a Frame>, format: OutputFormat) {
    let frames: Vec<&Frame> = frames.into_iter().collect();
    match format {
        OutputFormat::Json => {
            for (index, frame) in frames.iter().enumerate() {
                let out = FrameOutput {
                    index,
                    kind: frame.kind.name(),
                    size: frame.payload.len(),
                    payload: payload_preview(frame),
                };
                print_json(&out);
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "KIND", "SIZE", "PAYLOAD"]);
            for (index, frame) in frames.iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    frame.kind.name().to_string(),
                    frame.payload.len().to_string(),
                    payload_preview(frame),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for (index, frame) in frames.iter().enumerate() {
                println!(
                    "frame={index} kind={} size={} payload={}",
                    frame.kind,
                    frame.payload.len(),
                    payload_preview(frame)
                );
            }
        }
    }
}

pub fn print_packet(packet: &Packet, format: OutputFormat) {
    let header = &packet.header;
    let namespace = display_namespace(header.wire_namespace());
    let args = args_json(&packet.args);

    match format {
        OutputFormat::Json => {
            let out = PacketOutput {
                packet_type: header.packet_type.name(),
                namespace,
                id: header.ack_id(),
                event: packet.event.as_deref(),
                args,
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "NAMESPACE", "ID", "EVENT", "ARGS"])
                .add_row(vec![
                    header.packet_type.to_string(),
                    namespace.to_string(),
                    header.ack_id().map_or_else(|| "-".to_string(), |id| id.to_string()),
                    packet.event.clone().unwrap_or_else(|| "-".to_string()),
                    args.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let mut line = format!("type={} namespace={namespace}", header.packet_type);
            if let Some(id) = header.ack_id() {
                let _ = write!(line, " id={id}");
            }
            if let Some(event) = &packet.event {
                let _ = write!(line, " event={event:?}");
            }
            let _ = write!(line, " args={args}");
            println!("{line}");
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn display_namespace(namespace: &str) -> &str {
    if namespace.is_empty() {
        "/"
    } else {
        namespace
    }
}

fn args_json(args: &[Value]) -> serde_json::Value {
    serde_json::Value::Array(args.iter().map(Value::to_json).collect())
}

fn payload_preview(frame: &Frame) -> String {
    let payload = &frame.payload[..];
    if frame.is_text() {
        if let Ok(text) = std::str::from_utf8(payload) {
            return text.trim_end_matches('\n').to_string();
        }
    }
    hex(payload)
}

fn hex(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        let _ = write!(out, "{byte:02x}");
    }
    out
}
