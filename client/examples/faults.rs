//! Runs the smoke check against the in-memory service, once healthy and once
//! for each injected fault, and prints how each run ends.
//!
//! Run with: cargo run --example faults

use keyring_smoke::{
    Keyring, SmokeCheck,
    memory::{Fault, Service},
};

#[tokio::main]
async fn main() {
    let services = [
        ("healthy", Service::new()),
        ("unreachable", Service::unreachable()),
        ("no default collection", Service::empty()),
        (
            "unlock dismissed",
            Service::new().lock_default_collection().dismiss_prompts(),
        ),
        ("create rejected", Service::new().with_fault(Fault::RejectCreate)),
        ("access revoked", Service::new().with_fault(Fault::RevokeSecrets)),
        (
            "corrupted payload",
            Service::new().with_fault(Fault::ReplacePayload(vec![0xc3, 0x28])),
        ),
        (
            "tampered payload",
            Service::new().with_fault(Fault::ReplacePayload(b"password-000".to_vec())),
        ),
    ];

    let check = SmokeCheck::default();
    for (name, service) in services {
        match check.run(async { Keyring::memory(&service) }).await {
            Ok(report) => println!("{name}: resolved_item_password: {}", report.password),
            Err(err) => println!("{name}: exit {} at {}: {err}", err.exit_code(), err.stage()),
        }
    }
}
