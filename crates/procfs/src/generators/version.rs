//! /proc/version 生成器

use alloc::format;
use alloc::vec::Vec;
use vfs::FsError;

use super::ContentGenerator;
use crate::context::ProcContext;

/// `/proc/version` 内容生成器。
pub struct VersionGenerator;

impl ContentGenerator for VersionGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        Ok(format!("{}\n", ctx.ops().kernel_version()).into_bytes())
    }
}
