//! # 磁盘存储层
//!
//! 模拟磁盘就是一段定长的字节区域，按固定大小切分成**块**。
//! [`DiskStore`] 只提供字节级的读写，结构的解释交给上层。
//!
//! 越界访问说明上层算错了地址，直接 panic。

#![no_std]

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

/// 块内指针（下一块编号、索引项）的宽度
pub const WORD_SIZE: usize = 4;

#[derive(Debug)]
pub struct DiskStore {
    /// 磁盘内容
    data: Vec<u8>,
    /// 块大小（字节）
    block_size: usize,
}

impl DiskStore {
    /// 创建全零的磁盘，`bytes`必须是`block_size`的整数倍。
    pub fn new(bytes: usize, block_size: usize) -> Self {
        assert!(block_size > 0, "block size must not be zero");
        assert_eq!(bytes % block_size, 0, "disk size must be block aligned");
        log::trace!("disk store: {bytes} bytes, block_size={block_size}");

        Self {
            data: vec![0; bytes],
            block_size,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// 总块数
    #[inline]
    pub fn blocks(&self) -> usize {
        self.data.len() / self.block_size
    }

    /// 读出`[offset, offset + len)`处的字节
    pub fn read(&self, offset: usize, len: usize) -> Vec<u8> {
        self.range(offset, len).to_vec()
    }

    /// 从`offset`处读出数据填满`buf`
    pub fn read_into(&self, offset: usize, buf: &mut [u8]) {
        buf.copy_from_slice(self.range(offset, buf.len()));
    }

    pub fn write(&mut self, offset: usize, buf: &[u8]) {
        self.range_mut(offset, buf.len()).copy_from_slice(buf);
    }

    pub fn fill(&mut self, offset: usize, len: usize, byte: u8) {
        self.range_mut(offset, len).fill(byte);
    }

    /// 整盘清零
    pub fn wipe(&mut self) {
        self.data.fill(0);
    }

    /// 读取小端序的字
    pub fn read_u32(&self, offset: usize) -> u32 {
        let mut word = [0; WORD_SIZE];
        self.read_into(offset, &mut word);
        u32::from_le_bytes(word)
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.write(offset, &value.to_le_bytes());
    }
}

/* 块级访问 */
impl DiskStore {
    /// 块在磁盘上的起始字节
    #[inline]
    pub fn block_offset(&self, block_id: usize) -> usize {
        block_id * self.block_size
    }

    pub fn read_block(&self, block_id: usize) -> Vec<u8> {
        self.read(self.block_offset(block_id), self.block_size)
    }

    /// `buf`不足一块时只覆盖块的开头部分
    pub fn write_block(&mut self, block_id: usize, buf: &[u8]) {
        assert!(buf.len() <= self.block_size, "buffer exceeds one block");
        self.write(self.block_offset(block_id), buf);
    }

    pub fn zero_block(&mut self, block_id: usize) {
        self.fill(self.block_offset(block_id), self.block_size, 0);
    }

    /// 块的最后一个字，链接分配用它存放下一块的编号
    #[inline]
    pub fn tail_word_offset(&self, block_id: usize) -> usize {
        self.block_offset(block_id) + self.block_size - WORD_SIZE
    }
}

impl DiskStore {
    fn range(&self, offset: usize, len: usize) -> &[u8] {
        let end = self.checked_end(offset, len);
        &self.data[offset..end]
    }

    fn range_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        let end = self.checked_end(offset, len);
        &mut self.data[offset..end]
    }

    fn checked_end(&self, offset: usize, len: usize) -> usize {
        match offset.checked_add(len) {
            Some(end) if end <= self.data.len() => end,
            _ => panic!(
                "disk access out of bounds: offset={offset} len={len} disk={}",
                self.data.len()
            ),
        }
    }
}
