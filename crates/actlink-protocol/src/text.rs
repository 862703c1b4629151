//! base64 文本行传输
//!
//! 每帧 8 字节（大端）编码为 12 个可打印字符，外加 `\n` 结尾。
//! 解码只接受恰好 8 字节的结果。

use crate::DecodeError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// 一行文本帧的字符数（不含换行）
pub const TEXT_FRAME_LEN: usize = 12;

/// 行结束符
pub const LINE_TERMINATOR: u8 = b'\n';

/// 编码一帧为 base64 文本（不含换行）
///
/// ```
/// use actlink_protocol::text::encode_line;
///
/// assert_eq!(encode_line(0x2B20_1494_0000_0036), "KyAUlAAAADY=");
/// ```
pub fn encode_line(word: u64) -> String {
    STANDARD.encode(word.to_be_bytes())
}

/// 解码一行 base64 文本
///
/// 首尾空白（含 `\r\n`）会被去掉。base64 非法时按长度 0 处理。
pub fn decode_line(line: &str) -> Result<u64, DecodeError> {
    let bytes = STANDARD
        .decode(line.trim())
        .map_err(|_| DecodeError::MalformedTextFrame { len: 0 })?;

    let bytes: [u8; 8] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::MalformedTextFrame { len: bytes.len() })?;

    Ok(u64::from_be_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_line_length() {
        for word in [0, u64::MAX, 0xFEBF_FE00_0190_01C8] {
            assert_eq!(encode_line(word).len(), TEXT_FRAME_LEN);
        }
    }

    #[test]
    fn test_decode_line() {
        assert_eq!(decode_line("KyAUlAAAADY="), Ok(0x2B20_1494_0000_0036));
        assert_eq!(decode_line("/r/+AAGQAcg=\r\n"), Ok(0xFEBF_FE00_0190_01C8));
        assert_eq!(decode_line("AAAAAAAAAAA="), Ok(0));
    }

    #[test]
    fn test_decode_line_wrong_length() {
        // 7 字节
        assert_eq!(
            decode_line("MTIzNDU2Nw=="),
            Err(DecodeError::MalformedTextFrame { len: 7 })
        );
        // 9 字节
        assert_eq!(
            decode_line("MTIzNDU2Nzg5"),
            Err(DecodeError::MalformedTextFrame { len: 9 })
        );
        assert_eq!(decode_line(""), Err(DecodeError::MalformedTextFrame { len: 0 }));
    }

    #[test]
    fn test_decode_line_invalid_base64() {
        assert_eq!(
            decode_line("not*base64!!"),
            Err(DecodeError::MalformedTextFrame { len: 0 })
        );
    }
}
