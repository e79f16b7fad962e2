//! Host resource probes.

use sysinfo::System;

use crate::error::SamplerError;

/// Source of host resource readings, as percentages.
pub trait ResourceProbe: Send + Sync + 'static {
    /// One-minute load average divided by core count, × 100.
    fn cpu_percent(&self) -> Result<f64, SamplerError>;

    /// `(total - free) / total`, × 100.
    fn memory_percent(&self) -> Result<f64, SamplerError>;
}

/// Reads the local host through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HostProbe;

impl ResourceProbe for HostProbe {
    fn cpu_percent(&self) -> Result<f64, SamplerError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SamplerError::Unsupported);
        }
        let load = System::load_average().one;
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Ok(round2(load / cores as f64 * 100.0))
    }

    fn memory_percent(&self) -> Result<f64, SamplerError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(SamplerError::Unsupported);
        }
        let mut system = System::new();
        system.refresh_memory();
        let total = system.total_memory();
        let free = system.free_memory();
        if total == 0 {
            return Err(SamplerError::Probe("total memory reported as zero".into()));
        }
        Ok(round2((total - free.min(total)) as f64 / total as f64 * 100.0))
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(12.3456), 12.35);
        assert_eq!(round2(0.004), 0.0);
        assert_eq!(round2(100.0), 100.0);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_host_probe_reads_linux() {
        let probe = HostProbe;
        let cpu = probe.cpu_percent().unwrap();
        let memory = probe.memory_percent().unwrap();
        assert!(cpu >= 0.0);
        assert!((0.0..=100.0).contains(&memory));
    }
}
