//! Host metadata attached to error telemetry.

use deskrelay_core::{HostMetadata, Platform};
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, RefreshKind, System};

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Only memory and CPU identity are sampled; the process table is never read.
fn metadata_refresh() -> RefreshKind {
    RefreshKind::new()
        .with_memory(MemoryRefreshKind::new().with_ram())
        .with_cpu(CpuRefreshKind::new())
}

/// Gather host metadata. Unavailable values fall back to `"unknown"` / `0`.
pub fn collect_host_metadata() -> HostMetadata {
    let sys = System::new_with_specifics(metadata_refresh());

    let cpu_model = sys
        .cpus()
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .filter(|brand| !brand.is_empty())
        .unwrap_or_else(|| "unknown".to_string());

    HostMetadata {
        hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
        platform: Platform::current().ui_name().to_string(),
        architecture: std::env::consts::ARCH.to_string(),
        cpu_model,
        total_memory_gb: to_gb(sys.total_memory()),
        free_memory_gb: to_gb(sys.free_memory()),
        uptime_hours: to_hours(System::uptime()),
        username: std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string()),
        runtime_version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

/// Bytes to GiB, rounded to two decimals.
fn to_gb(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_GB * 100.0).round() / 100.0
}

/// Seconds to hours, rounded to two decimals.
fn to_hours(seconds: u64) -> f64 {
    (seconds as f64 / 3600.0 * 100.0).round() / 100.0
}
