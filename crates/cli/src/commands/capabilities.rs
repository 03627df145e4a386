//! `toolstream capabilities` — List registered capability providers.

use toolstream_core::capability::CapabilityRegistry;

pub async fn run() -> anyhow::Result<()> {
    let registry = toolstream_capabilities::default_registry();
    print_registry(&registry);
    Ok(())
}

fn print_registry(registry: &CapabilityRegistry) {
    println!();
    for provider in registry.providers() {
        println!("  Provider: {}", provider.id());
        for capability in provider.capabilities() {
            println!("    {:<12} {}", capability.name(), capability.description());
        }
        println!();
    }
}
