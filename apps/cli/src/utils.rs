//! 输入解析与输出格式化

use actlink_sdk::protocol::{Message, ParsedFrame, layout::FieldLayout};
use anyhow::{Context, Result, bail};
use serde_json::{Value, json};

/// 解析 64 位帧（十六进制，可带 `0x` 前缀和 `_` 分隔）
pub fn parse_word(text: &str) -> Result<u64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("0x")
        .trim_start_matches("0X")
        .chars()
        .filter(|&c| c != '_')
        .collect();
    if cleaned.is_empty() || cleaned.len() > 16 {
        bail!("expected 1 to 16 hex digits, got {text:?}");
    }
    u64::from_str_radix(&cleaned, 16).with_context(|| format!("invalid hex word {text:?}"))
}

/// 解析十六进制字节转储（忽略空白和 `#` 注释行）
pub fn parse_hex_dump(text: &str) -> Result<Vec<u8>> {
    let digits: String = text
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(|line| line.chars())
        .filter(|c| !c.is_whitespace())
        .collect();
    hex::decode(&digits).context("invalid hex dump")
}

/// 帧的 JSON 表示（带类型化消息，无法识别时为 null）
///
/// `word` 是收到的原始帧，原样输出。
pub fn frame_json(word: u64, frame: &ParsedFrame) -> Value {
    let count = FieldLayout::for_format(frame.format).field_count();
    let message = Message::try_from(frame)
        .ok()
        .and_then(|m| serde_json::to_value(m).ok())
        .unwrap_or(Value::Null);
    json!({
        "word": format!("0x{word:016X}"),
        "format": frame.format,
        "fields": &frame.fields[..count],
        "message": message,
    })
}

/// 单行可读输出
pub fn frame_line(frame: &ParsedFrame) -> String {
    let count = FieldLayout::for_format(frame.format).field_count();
    let fields: Vec<String> = frame.fields[..count].iter().map(u16::to_string).collect();
    let kind = match Message::try_from(frame) {
        Ok(m) => format!("{m:?}"),
        Err(_) => "unknown".to_string(),
    };
    format!("format {:>2} [{}] {}", frame.format, fields.join(", "), kind)
}
