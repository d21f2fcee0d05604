//! 定长 Int32 字段编解码
//!
//! 所有表的底层都是一段扁平字节缓冲区，字段按 4 字节有符号整数存放，
//! 字节序由 [`FieldOrder`] 决定。偏移量的合法性由调用方（`FieldBuffer`）保证。

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use crate::common::FIELD_LEN;

/// 字段字节序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldOrder {
    /// 网络序，与原始数据集的行记录一致
    #[default]
    Big,
    Little,
}

impl FieldOrder {
    /// 读取 `offset` 处的 Int32
    #[inline]
    pub fn read_i32(self, buf: &[u8], offset: usize) -> i32 {
        let bytes = &buf[offset..offset + FIELD_LEN];
        match self {
            Self::Big    => BigEndian::read_i32(bytes),
            Self::Little => LittleEndian::read_i32(bytes),
        }
    }

    /// 覆盖写 `offset` 处的 Int32
    #[inline]
    pub fn write_i32(self, buf: &mut [u8], offset: usize, value: i32) {
        let bytes = &mut buf[offset..offset + FIELD_LEN];
        match self {
            Self::Big    => BigEndian::write_i32(bytes, value),
            Self::Little => LittleEndian::write_i32(bytes, value),
        }
    }

    /// 将一行值编码为定长记录（loader 侧使用）
    pub fn encode_record(self, values: &[i32]) -> Vec<u8> {
        let mut out = vec![0u8; values.len() * FIELD_LEN];
        match self {
            Self::Big    => BigEndian::write_i32_into(values, &mut out),
            Self::Little => LittleEndian::write_i32_into(values, &mut out),
        }
        out
    }

    /// 按字段顺序解码一条定长记录；尾部不足 4 字节的部分被忽略
    pub fn decode_record(self, record: &[u8]) -> impl Iterator<Item = i32> + '_ {
        record
            .chunks_exact(FIELD_LEN)
            .map(move |chunk| self.read_i32(chunk, 0))
    }
}
