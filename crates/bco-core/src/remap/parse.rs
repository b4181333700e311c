// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Line grammar of the remap table.

use super::{FlagSettings, RemapError, SoundSettings};
use crate::mesh::FloorType;

/// One parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Declaration {
    Flag {
        line: usize,
        floor_type: FloorType,
        settings: FlagSettings,
    },
    Name {
        line: usize,
        name: String,
        floor_type: FloorType,
        extra_flag: Option<u8>,
        extra_settings: Option<u32>,
    },
}

pub(super) fn parse_declarations(text: &str) -> Result<Vec<Declaration>, RemapError> {
    let mut out = Vec::new();
    for (ix, raw) in text.lines().enumerate() {
        let line = ix + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        out.push(parse_line(line, content)?);
    }
    Ok(out)
}

fn parse_line(line: usize, content: &str) -> Result<Declaration, RemapError> {
    let syntax = |message: &str| RemapError::Syntax {
        line,
        message: message.to_owned(),
    };

    let (key, value) = content
        .split_once('=')
        .ok_or_else(|| syntax("expected `key = value`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(syntax("missing key before `=`"));
    }

    let (head, tuple) = match value.find('(') {
        Some(open) => {
            let inner = value[open + 1..]
                .trim_end()
                .strip_suffix(')')
                .ok_or_else(|| syntax("sound tuple must end the line with `)`"))?;
            (&value[..open], Some(inner))
        }
        None => (value, None),
    };
    let mut fields: Vec<&str> = head.split(',').map(str::trim).collect();
    if tuple.is_some() && fields.last() == Some(&"") {
        fields.pop();
    }
    if fields.iter().any(|f| f.is_empty()) {
        return Err(syntax("empty field"));
    }

    if has_hex_prefix(key) {
        let floor_type = FloorType(number(line, key, "floor type flag")?);
        let (extra_settings, extra_flag) = match fields.as_slice() {
            [settings] => (number(line, settings, "settings")?, 0),
            [settings, extra] => (
                number(line, settings, "settings")?,
                number(line, extra, "extra byte")?,
            ),
            _ => return Err(syntax("flag takes `settings[, extraByte]`")),
        };
        let sound = tuple.map(|t| sound_tuple(line, t)).transpose()?;
        Ok(Declaration::Flag {
            line,
            floor_type,
            settings: FlagSettings {
                extra_settings,
                extra_flag,
                sound,
            },
        })
    } else {
        if tuple.is_some() {
            return Err(syntax("sound tuple belongs on a bare flag line"));
        }
        let (floor, extra, settings) = match fields.as_slice() {
            [floor] => (floor, None, None),
            [floor, extra] => (floor, Some(extra), None),
            [floor, extra, settings] => (floor, Some(extra), Some(settings)),
            _ => return Err(syntax("name takes `floorType[, extraByte[, extraSetting]]`")),
        };
        Ok(Declaration::Name {
            line,
            name: key.to_owned(),
            floor_type: FloorType(number(line, floor, "floor type")?),
            extra_flag: extra.map(|e| number(line, e, "extra byte")).transpose()?,
            extra_settings: settings
                .map(|s| number(line, s, "extra setting"))
                .transpose()?,
        })
    }
}

fn sound_tuple(line: usize, inner: &str) -> Result<SoundSettings, RemapError> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let [sound, a, b] = parts.as_slice() else {
        return Err(RemapError::Syntax {
            line,
            message: "sound tuple takes `(soundId, settingA, settingB)`".to_owned(),
        });
    };
    Ok(SoundSettings {
        sound_id: sound_id(line, sound)?,
        setting_a: number(line, a, "sound setting A")?,
        setting_b: number(line, b, "sound setting B")?,
    })
}

pub(super) fn has_hex_prefix(text: &str) -> bool {
    text.starts_with("0x") || text.starts_with("0X")
}

fn unsigned(text: &str) -> Option<u64> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

fn number<T: TryFrom<u64>>(line: usize, text: &str, what: &str) -> Result<T, RemapError> {
    unsigned(text)
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| RemapError::Syntax {
            line,
            message: format!("invalid {what} `{text}`"),
        })
}

/// Sound ids may be negative; hex values are taken as a 16-bit pattern.
fn sound_id(line: usize, text: &str) -> Result<i16, RemapError> {
    let value = match text.strip_prefix('-') {
        Some(magnitude) => unsigned(magnitude)
            .and_then(|m| i64::try_from(m).ok())
            .and_then(|m| i16::try_from(-m).ok()),
        None => unsigned(text)
            .and_then(|v| u16::try_from(v).ok())
            .map(|v| v as i16),
    };
    value.ok_or_else(|| RemapError::Syntax {
        line,
        message: format!("invalid sound id `{text}`"),
    })
}
