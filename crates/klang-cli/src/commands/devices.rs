//! List audio output devices.

use klang_io::list_output_devices;

#[derive(Debug, clap::Args)]
pub struct DevicesArgs {}

pub fn run(_args: DevicesArgs) -> anyhow::Result<()> {
    let devices = list_output_devices()?;
    if devices.is_empty() {
        println!("no audio output devices found");
        return Ok(());
    }
    println!("output devices:");
    for device in devices {
        println!("  {}  ({} Hz)", device.name, device.default_sample_rate);
    }
    Ok(())
}
