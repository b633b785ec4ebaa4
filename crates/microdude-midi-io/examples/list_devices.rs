use microdude_midi_io::{Backend, MidirBackend};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let backend = MidirBackend::new();

    println!("=== MIDI Devices (input + output) ===");
    match backend.list_devices() {
        Ok(devices) if devices.is_empty() => println!("  (none found)"),
        Ok(devices) => {
            for (i, name) in devices.iter().enumerate() {
                println!("  [{}] {}", i, name);
            }
        }
        Err(e) => eprintln!("  cannot enumerate devices: {}", e),
    }
}
