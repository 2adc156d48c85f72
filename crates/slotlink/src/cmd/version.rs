use slotlink_engine::ROUND_MODULUS;
use slotlink_frame::MAX_SLOTS;
use slotlink_transport::DEFAULT_MAX_PAYLOAD;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("slotlink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: slotlink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    // Link-layer constants a deployment has to agree on.
    println!("default_max_payload: {DEFAULT_MAX_PAYLOAD}");
    println!("round_modulus: {ROUND_MODULUS}");
    println!("max_slots: {MAX_SLOTS}");

    Ok(SUCCESS)
}
