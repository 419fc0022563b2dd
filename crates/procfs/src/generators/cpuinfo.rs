//! /proc/cpuinfo 生成器

use alloc::format;
use alloc::vec::Vec;
use vfs::FsError;

use super::ContentGenerator;
use crate::context::ProcContext;

/// `/proc/cpuinfo` 内容生成器。
pub struct CpuInfoGenerator;

impl ContentGenerator for CpuInfoGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        let cpu = ctx.ops().cpu_info();
        let content = format!(
            "vendor_id\t: {}\n\
             model name\t: {}\n\
             cpu cores\t: {}\n\
             siblings\t: {}\n\
             cpu MHz\t\t: {}.000\n",
            cpu.vendor, cpu.brand, cpu.physical_cores, cpu.logical_cpus, cpu.frequency_mhz,
        );
        Ok(content.into_bytes())
    }
}
