//! /proc/partitions 生成器

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;
use vfs::FsError;

use super::ContentGenerator;
use crate::context::ProcContext;

/// `/proc/partitions` 内容生成器。
pub struct PartitionsGenerator;

impl ContentGenerator for PartitionsGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        let mut content = String::from("major minor  #blocks  name\n\n");
        for part in ctx.ops().partitions() {
            let _ = writeln!(
                content,
                "{:4} {:7} {:10} {}",
                part.major, part.minor, part.blocks, part.name
            );
        }
        Ok(content.into_bytes())
    }
}
