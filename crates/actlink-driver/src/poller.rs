//! 轮询式帧收发器
//!
//! 单线程、非阻塞：调用方在主循环里反复调用 [`FramePoller::poll`]，
//! 每次最多返回一帧。没有后台线程，也没有内部队列。

use crate::config::{LinkConfig, TransportMode};
use crate::error::DriverError;
use crate::metrics::LinkMetrics;
use crate::resync::{FRAME_BYTES, Resynchronizer};
use actlink_protocol::text::{LINE_TERMINATOR, decode_line, encode_line};
use actlink_protocol::{
    DecodeError, Message, ParsedFrame, ValidationMode, decode, decode_with, from_wire, strip_crc,
    to_wire,
};
use actlink_serial::ByteChannel;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// 帧收发器
///
/// # 示例
///
/// ```
/// use actlink_driver::{FramePoller, LinkConfig};
/// use actlink_protocol::encode;
/// use actlink_serial::MockChannel;
///
/// let word = encode(10, &[200, 5, 37]);
/// let channel = MockChannel::with_rx(&word.to_be_bytes());
///
/// let mut poller = FramePoller::new(channel, LinkConfig::default()).unwrap();
/// poller.begin().unwrap();
///
/// let frame = poller.poll().unwrap().unwrap();
/// assert_eq!(frame.field(1), 200);
/// ```
pub struct FramePoller<C: ByteChannel> {
    channel: C,
    config: LinkConfig,
    resync: Resynchronizer,
    /// 文本模式的行缓冲
    line: SmallVec<[u8; 16]>,
    /// 当前行已超长，丢弃到下一个换行符
    discarding: bool,
    metrics: Arc<LinkMetrics>,
}

impl<C: ByteChannel> std::fmt::Debug for FramePoller<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramePoller")
            .field("config", &self.config)
            .field("line_len", &self.line.len())
            .field("discarding", &self.discarding)
            .finish()
    }
}

impl<C: ByteChannel> FramePoller<C> {
    /// 创建收发器（会先校验配置）
    pub fn new(channel: C, config: LinkConfig) -> Result<Self, DriverError> {
        config.validate()?;
        Ok(Self {
            channel,
            resync: Resynchronizer::new(config.resync_budget),
            config,
            line: SmallVec::new(),
            discarding: false,
            metrics: Arc::new(LinkMetrics::new()),
        })
    }

    /// 以配置的波特率启动底层通道
    pub fn begin(&mut self) -> Result<(), DriverError> {
        self.channel.begin(self.config.baud_rate)?;
        debug!(
            baud_rate = self.config.baud_rate,
            transport = ?self.config.transport,
            validation = ?self.config.validation,
            "link started"
        );
        Ok(())
    }

    /// 轮询一帧
    ///
    /// - `Ok(None)`：数据不足，稍后再试
    /// - `Err(DriverError::Decode(_))`：当前帧被丢弃，链路可继续使用
    pub fn poll(&mut self) -> Result<Option<ParsedFrame>, DriverError> {
        Ok(self.poll_with_word()?.map(|(_, frame)| frame))
    }

    /// 同 [`poll`](Self::poll)，同时返回收到的原始 64 位帧
    ///
    /// 保留位模式下原始帧的 CRC 字段为 0，与 [`ParsedFrame::to_word`] 重新编码的结果不同。
    pub fn poll_with_word(&mut self) -> Result<Option<(u64, ParsedFrame)>, DriverError> {
        let result = match self.config.transport {
            TransportMode::RawResync => self.poll_resync(),
            TransportMode::RawAligned => self.poll_aligned(),
            TransportMode::Text => self.poll_text(),
        };

        if let Ok(Some((word, frame))) = &result {
            LinkMetrics::add(&self.metrics.frames_ok, 1);
            trace!(
                format = frame.format,
                word = %format_args!("0x{word:016X}"),
                "frame received"
            );
        }
        result
    }

    /// 轮询并解析为消息
    ///
    /// 未知格式返回 `Protocol(UnknownFormat)`。
    pub fn poll_message(&mut self) -> Result<Option<Message>, DriverError> {
        match self.poll()? {
            Some(frame) => Ok(Some(Message::try_from(&frame)?)),
            None => Ok(None),
        }
    }

    fn poll_resync(&mut self) -> Result<Option<(u64, ParsedFrame)>, DriverError> {
        match self.resync.poll_word(&mut self.channel, &self.metrics)? {
            Some(word) => Ok(Some((word, decode(word)?))),
            None => Ok(None),
        }
    }

    fn poll_aligned(&mut self) -> Result<Option<(u64, ParsedFrame)>, DriverError> {
        if self.channel.available()? < FRAME_BYTES {
            return Ok(None);
        }

        let mut window = [0u8; FRAME_BYTES];
        for byte in window.iter_mut() {
            *byte = self.channel.read_byte()?;
        }
        let word = from_wire(window);

        match decode_with(word, self.config.validation) {
            Ok(frame) => Ok(Some((word, frame))),
            Err(e) => {
                self.record_rejection(&e);
                let flushed = self.channel.clear_input()?;
                LinkMetrics::add(&self.metrics.bytes_flushed, flushed as u64);
                debug!(error = %e, flushed, "aligned frame rejected");
                Err(e.into())
            },
        }
    }

    fn poll_text(&mut self) -> Result<Option<(u64, ParsedFrame)>, DriverError> {
        while self.channel.available()? > 0 {
            let byte = self.channel.read_byte()?;

            if byte != LINE_TERMINATOR {
                if self.discarding {
                    LinkMetrics::add(&self.metrics.bytes_flushed, 1);
                } else if self.line.len() >= self.config.max_line_len {
                    warn!(max = self.config.max_line_len, "text line too long, discarding");
                    LinkMetrics::add(&self.metrics.bytes_flushed, self.line.len() as u64 + 1);
                    self.line.clear();
                    self.discarding = true;
                } else {
                    self.line.push(byte);
                }
                continue;
            }

            if self.discarding {
                self.discarding = false;
                let e = DecodeError::MalformedTextFrame { len: 0 };
                self.record_rejection(&e);
                return Err(e.into());
            }

            let line = std::mem::take(&mut self.line);
            let text = match std::str::from_utf8(&line) {
                Ok(text) => text,
                Err(_) => {
                    let e = DecodeError::MalformedTextFrame { len: 0 };
                    self.record_rejection(&e);
                    return Err(e.into());
                },
            };
            // 空行（例如 "\r\n" 中多余的部分）直接跳过
            if text.trim().is_empty() {
                continue;
            }

            let frame = decode_line(text).and_then(|word| {
                decode_with(word, self.config.validation).map(|frame| (word, frame))
            });
            return match frame {
                Ok(received) => Ok(Some(received)),
                Err(e) => {
                    self.record_rejection(&e);
                    debug!(error = %e, line = text, "text frame rejected");
                    Err(e.into())
                },
            };
        }
        Ok(None)
    }

    fn record_rejection(&self, error: &DecodeError) {
        let counter = match error {
            DecodeError::ChecksumMismatch { .. } => &self.metrics.checksum_failures,
            DecodeError::ReservedBitsSet { .. } => &self.metrics.reserved_bit_failures,
            DecodeError::MalformedTextFrame { .. } => &self.metrics.malformed_text,
            DecodeError::ResyncExhausted { .. } => &self.metrics.resync_exhausted,
        };
        LinkMetrics::add(counter, 1);
    }

    /// 发送一帧（按当前传输方式编码）
    pub fn send(&mut self, word: u64) -> Result<(), DriverError> {
        match self.config.transport {
            TransportMode::RawResync | TransportMode::RawAligned => {
                self.channel.write_all(&to_wire(word))?;
            },
            TransportMode::Text => {
                let mut line = encode_line(word).into_bytes();
                line.push(LINE_TERMINATOR);
                self.channel.write_all(&line)?;
            },
        }
        self.channel.flush()?;
        LinkMetrics::add(&self.metrics.frames_sent, 1);
        trace!(word = %format_args!("0x{word:016X}"), "frame sent");
        Ok(())
    }

    /// 编码并发送一条消息
    ///
    /// 旧版保留位模式下 CRC 字段清零。
    pub fn send_message(&mut self, message: &Message) -> Result<(), DriverError> {
        let word = match self.config.validation {
            ValidationMode::Crc6 => message.to_frame(),
            ValidationMode::ReservedBits => strip_crc(message.to_frame()),
        };
        self.send(word)
    }

    /// 丢弃所有已缓冲的接收数据（含未完成的文本行）
    pub fn clear_input(&mut self) -> Result<usize, DriverError> {
        let pending = self.line.len();
        self.line.clear();
        self.discarding = false;
        let flushed = self.channel.clear_input()? + pending;
        LinkMetrics::add(&self.metrics.bytes_flushed, flushed as u64);
        Ok(flushed)
    }

    /// 共享的链路指标
    pub fn metrics(&self) -> Arc<LinkMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// 底层通道（测试中用于注入数据）
    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}
