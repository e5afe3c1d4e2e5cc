//! Version command

use crate::output::OutputContext;

/// Run the version command.
pub fn run(ctx: &OutputContext) {
    let version = env!("CARGO_PKG_VERSION");
    println!("cw-agent {version}");
    ctx.kv(
        "Platform",
        &format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
    );
}
