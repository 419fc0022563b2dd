//! 目录项记录布局
//!
//! `read_directory` 向调用者缓冲区写出的每条记录：
//!
//! ```text
//! offset  size  field
//! 0       8     d_ino     64 位唯一标识
//! 8       2     d_reclen  整条记录长度（含填充）
//! 10      2     d_namlen  名字长度（不含结尾 NUL）
//! 12      1     d_type    DT_* 类型标签
//! 13      n     d_name    名字字节 + NUL，整条记录向上对齐到 4 字节
//! ```
//!
//! 所有字段按本机字节序存放。

use core::mem::size_of;

pub const DT_DIR: u8 = 4;
pub const DT_REG: u8 = 8;
pub const DT_LNK: u8 = 10;

/// 固定头部长度
pub const DIRENT_HEADER_LEN: usize = size_of::<u64>() + 2 * size_of::<u16>() + size_of::<u8>();

/// 记录对齐
pub const DIRENT_ALIGN: usize = 4;

/// 名字最大长度
pub const DIRENT_MAX_NAMLEN: usize = 255;

/// 名字长度为 `name_len` 的记录总长度
pub const fn dirent_record_len(name_len: usize) -> usize {
    (DIRENT_HEADER_LEN + name_len + 1 + DIRENT_ALIGN - 1) & !(DIRENT_ALIGN - 1)
}

/// 一条解码后的目录项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dirent<'a> {
    pub ino: u64,
    pub d_type: u8,
    pub name: &'a [u8],
}

impl Dirent<'_> {
    /// 记录长度
    pub fn record_len(&self) -> usize {
        dirent_record_len(self.name.len())
    }

    /// 把记录写到 `buf` 开头，返回写入字节数；放不下或名字过长时返回 `None`。
    pub fn encode(&self, buf: &mut [u8]) -> Option<usize> {
        if self.name.len() > DIRENT_MAX_NAMLEN {
            return None;
        }
        let reclen = self.record_len();
        let record = buf.get_mut(..reclen)?;
        record.fill(0);
        record[0..8].copy_from_slice(&self.ino.to_ne_bytes());
        record[8..10].copy_from_slice(&(reclen as u16).to_ne_bytes());
        record[10..12].copy_from_slice(&(self.name.len() as u16).to_ne_bytes());
        record[12] = self.d_type;
        record[DIRENT_HEADER_LEN..DIRENT_HEADER_LEN + self.name.len()].copy_from_slice(self.name);
        Some(reclen)
    }
}

/// 依次解码缓冲区中的记录；遇到截断或损坏的记录时停止。
pub struct DirentIter<'a> {
    buf: &'a [u8],
}

impl<'a> DirentIter<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }
}

impl<'a> Iterator for DirentIter<'a> {
    type Item = Dirent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let header = self.buf.get(..DIRENT_HEADER_LEN)?;
        let ino = u64::from_ne_bytes(header[0..8].try_into().ok()?);
        let reclen = u16::from_ne_bytes(header[8..10].try_into().ok()?) as usize;
        let namlen = u16::from_ne_bytes(header[10..12].try_into().ok()?) as usize;
        let d_type = header[12];
        if reclen != dirent_record_len(namlen) || reclen > self.buf.len() {
            return None;
        }
        let name = &self.buf[DIRENT_HEADER_LEN..DIRENT_HEADER_LEN + namlen];
        self.buf = &self.buf[reclen..];
        Some(Dirent { ino, d_type, name })
    }
}
