//! 邀请归因服务
//!
//! 首次注册时根据 /start 令牌建立一次性邀请关系：
//! - 自邀请直接拒绝
//! - 邀请人不存在时降级为仅记录落地来源
//! - 唯一约束冲突视为幂等空操作（并发重复 /start）
//!
//! 归因失败不中断注册主流程，由注册服务记录日志后继续

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::error::{LedgerError, Result};
use crate::models::{Referral, User};
use crate::repository::{ReferralRepository, UserRepository};
use crate::service::start_token::StartToken;

/// 归因结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributionOutcome {
    /// 建立了新的邀请关系
    Attributed { referral_id: i64, inviter_id: i64 },
    /// 用户已有邀请关系，本次为幂等空操作
    AlreadyAttributed,
    /// 仅记录了落地来源（令牌不含邀请人，或邀请人不存在）
    LandingOnly,
    /// 空令牌，未做任何归因
    Skipped,
}

/// 邀请归因服务
///
/// 邀请关系的唯一性由 referrals.user_id 上的唯一约束保证，
/// 落地来源只在尚未设置时写入，重复调用不会覆盖已有归因
pub struct ReferralService {
    users: UserRepository,
    pool: PgPool,
}

impl ReferralService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// 对新注册用户执行归因
    #[instrument(skip(self, user), fields(user_id = user.id, telegram_id = user.telegram_id))]
    pub async fn attribute(&self, user: &User, token: &StartToken) -> Result<AttributionOutcome> {
        match token {
            StartToken::Empty => Ok(AttributionOutcome::Skipped),
            StartToken::Landing { source } => self.record_landing_source(user, source).await,
            StartToken::Referral {
                inviter_telegram_id,
                source,
            } => {
                self.attribute_referral(user, *inviter_telegram_id, source.as_deref())
                    .await
            }
        }
    }

    /// 记录落地来源
    ///
    /// 已有来源时不覆盖
    async fn record_landing_source(&self, user: &User, source: &str) -> Result<AttributionOutcome> {
        let mut tx = self.pool.begin().await?;
        let written =
            UserRepository::set_landing_source_if_absent_in_tx(&mut tx, user.id, source).await?;
        tx.commit().await?;

        if written {
            info!(source = %source, "已记录落地来源");
        }

        Ok(AttributionOutcome::LandingOnly)
    }

    /// 建立邀请关系
    async fn attribute_referral(
        &self,
        user: &User,
        inviter_telegram_id: i64,
        source: Option<&str>,
    ) -> Result<AttributionOutcome> {
        // 1. 自邀请直接拒绝
        if inviter_telegram_id == user.telegram_id {
            return Err(LedgerError::SelfReferral(user.telegram_id));
        }

        // 2. 查找邀请人，不存在则降级为落地来源
        let Some(inviter) = self.users.get_by_telegram_id(inviter_telegram_id).await? else {
            warn!(inviter_telegram_id, "邀请人不存在，降级为落地来源");
            if let Some(source) = source {
                return self.record_landing_source(user, source).await;
            }
            return Ok(AttributionOutcome::LandingOnly);
        };

        // 3. 写入邀请记录，唯一约束冲突视为幂等空操作
        let referral = Referral {
            id: 0,
            user_id: user.id,
            inviter_id: inviter.id,
            referral_source: source.map(str::to_string),
            reward_points: 0,
            created_at: Utc::now(),
        };

        let mut tx = self.pool.begin().await?;
        match ReferralRepository::create_in_tx(&mut tx, &referral).await {
            Ok(referral_id) => {
                tx.commit().await?;
                info!(
                    referral_id,
                    inviter_id = inviter.id,
                    source = ?referral.referral_source,
                    "邀请归因成功"
                );
                Ok(AttributionOutcome::Attributed {
                    referral_id,
                    inviter_id: inviter.id,
                })
            }
            Err(LedgerError::ReferralAlreadyAttributed(_)) => {
                info!("用户已有邀请关系，跳过重复归因");
                Ok(AttributionOutcome::AlreadyAttributed)
            }
            Err(e) => Err(e),
        }
    }
}
