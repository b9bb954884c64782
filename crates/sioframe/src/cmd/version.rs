use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("sioframe {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!("target_os: {}", std::env::consts::OS);
        println!("target_arch: {}", std::env::consts::ARCH);
        println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
        println!(
            "defaults: max_attachments={}, max_payload={}",
            sioframe_parser::DEFAULT_MAX_ATTACHMENTS,
            sioframe_transport::DEFAULT_MAX_PAYLOAD
        );
    }
    Ok(SUCCESS)
}
