//! 与用户空间共用定义和声明
//!
//! 包含凭证、时间和目录项记录的布局，确保内核和用户空间的一致性

#![no_std]
// uapi 中的常量逐项补 `///` 噪声较大。
#![allow(missing_docs)]

pub mod cred;
pub mod fs;
pub mod time;
