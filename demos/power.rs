// SPDX-License-Identifier: MPL-2.0

//! Test program: Show the power state and sensors of a controller, and
//! optionally request a power action.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example power -- <host> <username> <password> [action]
//! ```
//!
//! # Example
//!
//! ```bash
//! # Read only
//! cargo run --example power -- 192.168.1.120 root calvin
//!
//! # Graceful shutdown
//! cargo run --example power -- 192.168.1.120 root calvin shutdown
//! ```

use std::env;
use idrac_lib::ClientConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() != 4 && args.len() != 5 {
        eprintln!("Usage: {} <host> <username> <password> [action]", args[0]);
        eprintln!();
        eprintln!("Actions: on, off, restart, reset, nmi, shutdown");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  cargo run --example power -- 192.168.1.120 root calvin restart");
        std::process::exit(1);
    }

    let host = &args[1];
    let username = &args[2];
    let password = &args[3];

    println!("Connecting to {host}...");

    let client = ClientConfig::new(host.as_str())
        .with_credentials(username.as_str(), password.as_str())
        .into_client()?;

    client.authenticate().await?;
    println!("Logged in");

    let identity = client.get_system_identity().await?;
    println!("{identity:?}");

    println!("Power state: {}", client.get_power_state().await?);

    let sensors = client.get_sensors().await?;
    for reading in sensors
        .temperatures
        .iter()
        .chain(&sensors.fans)
        .chain(&sensors.voltages)
    {
        println!(
            "  {:<24} {:>8.1} {} ({})",
            reading.name, reading.value, reading.unit, reading.status
        );
    }

    if let Some(action) = args.get(4) {
        client.set_power(action).await?;
        println!("Requested '{action}'");
        println!("Power state: {}", client.get_power_state().await?);
    }

    client.logout().await?;
    println!("Logged out");

    Ok(())
}
