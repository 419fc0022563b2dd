//! /proc/loadavg 生成器

use alloc::format;
use alloc::vec::Vec;
use vfs::FsError;

use super::ContentGenerator;
use crate::config::LOAD_SCALE;
use crate::context::ProcContext;

/// `/proc/loadavg` 内容生成器。
pub struct LoadAvgGenerator;

impl ContentGenerator for LoadAvgGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        let load = ctx.ops().load_average();
        let [one, five, fifteen] = load.loads;

        let content = format!(
            "{}.{:02} {}.{:02} {}.{:02} {}/{}\n",
            one / LOAD_SCALE,
            one % LOAD_SCALE,
            five / LOAD_SCALE,
            five % LOAD_SCALE,
            fifteen / LOAD_SCALE,
            fifteen % LOAD_SCALE,
            load.running,
            load.total,
        );
        Ok(content.into_bytes())
    }
}
