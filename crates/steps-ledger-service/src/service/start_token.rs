//! /start 令牌解析
//!
//! 机器人 /start 命令可携带一个负载，用于邀请归因或流量来源统计：
//! - `ref_<邀请人TelegramID>_<来源标签>` 邀请令牌，标签可选且本身可含下划线
//! - 其他非空令牌视为落地来源标签，不含邀请人
//! - 空令牌不产生任何归因

/// 解析后的 /start 令牌
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartToken {
    /// 邀请令牌：携带邀请人 Telegram ID 和可选来源标签
    Referral {
        inviter_telegram_id: i64,
        source: Option<String>,
    },
    /// 落地来源标签，不含邀请人
    Landing { source: String },
    /// 空令牌
    Empty,
}

impl StartToken {
    /// 解析 /start 负载
    ///
    /// 邀请人 ID 无法解析为整数时整体降级为落地来源，
    /// 绝不因令牌格式问题导致注册失败
    pub fn parse(raw: &str) -> Self {
        let token = raw.trim();
        if token.is_empty() {
            return Self::Empty;
        }

        if let Some(rest) = token.strip_prefix("ref_") {
            // 只按第一个下划线切分，标签部分可以继续包含下划线
            let (id_part, label) = match rest.split_once('_') {
                Some((id, label)) => (id, Some(label)),
                None => (rest, None),
            };

            if let Ok(inviter_telegram_id) = id_part.parse::<i64>() {
                let source = label
                    .filter(|label| !label.is_empty())
                    .map(|label| label.to_string());
                return Self::Referral {
                    inviter_telegram_id,
                    source,
                };
            }
        }

        Self::Landing {
            source: token.to_string(),
        }
    }
}
