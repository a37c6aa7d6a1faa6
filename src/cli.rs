use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Forwarding proxy that preserves origin headers behind edge infrastructure"
)]
pub struct Args {}
