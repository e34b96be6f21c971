//! Accelerator devices as reported by the GPU query tool.

/// One GPU, indexed in the query tool's native enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Device {
    pub index: usize,
    /// Total memory in MiB; `None` when the tool reported a non-numeric value.
    pub memory_mib: Option<u64>,
}

/// A device line whose memory value could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableMemory {
    pub index: usize,
    pub raw: String,
}

/// Parse `nvidia-smi --query-gpu=memory.total --format=csv,noheader,nounits`.
///
/// Each non-empty line is one device; indices are assigned 0..N-1 in line
/// order. Values are taken verbatim: anything that is not an unsigned integer
/// (e.g. `[N/A]`) yields `memory_mib: None` and an `UnreadableMemory` entry.
#[must_use]
pub fn parse_memory_report(stdout: &str) -> (Vec<Device>, Vec<UnreadableMemory>) {
    let mut devices = Vec::new();
    let mut unreadable = Vec::new();
    for (index, line) in stdout.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
        let memory_mib = line.parse::<u64>().ok();
        if memory_mib.is_none() {
            unreadable.push(UnreadableMemory {
                index,
                raw: line.to_string(),
            });
        }
        devices.push(Device { index, memory_mib });
    }
    (devices, unreadable)
}
