//! 内存模拟通道
//!
//! 用于测试和离线回放：接收队列由测试预先填充，发送的字节被记录下来。

use crate::{ByteChannel, ChannelError};
use std::collections::VecDeque;

/// 模拟字节通道
#[derive(Debug, Default)]
pub struct MockChannel {
    /// 接收队列（对端 → 本端）
    rx: VecDeque<u8>,
    /// 已发送字节（本端 → 对端）
    tx: Vec<u8>,
    /// `begin()` 设置的波特率
    baud_rate: Option<u32>,
    /// 是否要求先调用 `begin()`
    require_begin: bool,
}

impl MockChannel {
    /// 创建空通道
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建预填充接收数据的通道
    pub fn with_rx(bytes: &[u8]) -> Self {
        let mut ch = Self::new();
        ch.push_rx(bytes);
        ch
    }

    /// 未调用 `begin()` 前所有读写都返回 `NotStarted`
    pub fn require_begin(mut self) -> Self {
        self.require_begin = true;
        self
    }

    /// 追加接收数据（模拟对端发送）
    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// 取走已发送的字节
    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// 查看已发送的字节
    pub fn tx(&self) -> &[u8] {
        &self.tx
    }

    /// 剩余接收字节数
    pub fn rx_len(&self) -> usize {
        self.rx.len()
    }

    /// `begin()` 设置的波特率
    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    fn check_started(&self) -> Result<(), ChannelError> {
        if self.require_begin && self.baud_rate.is_none() {
            return Err(ChannelError::NotStarted);
        }
        Ok(())
    }
}

impl ByteChannel for MockChannel {
    fn begin(&mut self, baud_rate: u32) -> Result<(), ChannelError> {
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn available(&mut self) -> Result<usize, ChannelError> {
        self.check_started()?;
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<u8, ChannelError> {
        self.check_started()?;
        self.rx.pop_front().ok_or(ChannelError::Empty)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ChannelError> {
        self.check_started()?;
        self.tx.push(byte);
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ChannelError> {
        self.check_started()?;
        self.tx.extend_from_slice(bytes);
        Ok(())
    }
}
