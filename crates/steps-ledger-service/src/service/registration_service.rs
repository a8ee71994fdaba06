//! 注册服务
//!
//! 处理 /start 注册流程，包括：
//! - 按 Telegram ID 查找或创建用户
//! - 已注册用户的用户名刷新
//! - 首次注册时的邀请归因（委托邀请归因服务）
//! - 联系方式更新
//!
//! ## 注册流程
//!
//! 1. 解析令牌 -> 2. 查找/创建用户 -> 3. 归因（仅新用户，失败不影响注册）
//!
//! 并发的重复 /start 依赖 users.telegram_id 唯一约束兜底：
//! 冲突方转为"已存在"分支返回，不视为错误

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::error::{LedgerError, Result};
use crate::models::{User, UserRole};
use crate::repository::UserRepository;
use crate::service::dto::{StartOutcome, StartRequest, UpdateContactRequest, UserProfileDto};
use crate::service::referral_service::ReferralService;
use crate::service::start_token::StartToken;

/// 注册服务
pub struct RegistrationService {
    users: UserRepository,
    referrals: ReferralService,
}

impl RegistrationService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            referrals: ReferralService::new(pool),
        }
    }

    /// 处理 /start
    ///
    /// 注册必须成功，归因失败只记录警告日志
    #[instrument(skip(self, request), fields(telegram_id = request.telegram_id))]
    pub async fn start(&self, request: StartRequest) -> Result<StartOutcome> {
        let token = StartToken::parse(request.token.as_deref().unwrap_or(""));

        // 1. 查找或创建用户
        let (mut user, created) = self.register_or_refresh(&request).await?;

        // 2. 仅首次注册执行归因
        if created {
            if let Err(e) = self.referrals.attribute(&user, &token).await {
                warn!(error = %e, "邀请归因失败，注册继续");
            }

            // 归因可能写入落地来源，回读一次保证返回最新资料
            if let Some(fresh) = self.users.get_by_id(user.id).await? {
                user = fresh;
            }
        }

        info!(user_id = user.id, created, "注册处理完成");

        Ok(StartOutcome {
            user: user.into(),
            created,
        })
    }

    /// 更新联系方式
    ///
    /// 只覆盖传入的字段，格式校验失败返回校验错误
    #[instrument(skip(self, request))]
    pub async fn update_contact(
        &self,
        telegram_id: i64,
        request: UpdateContactRequest,
    ) -> Result<UserProfileDto> {
        request.validate()?;

        let user = self
            .users
            .get_by_telegram_id(telegram_id)
            .await?
            .ok_or(LedgerError::UserNotFound(telegram_id))?;

        self.users
            .update_contact(user.id, request.phone.as_deref(), request.email.as_deref())
            .await?;

        let updated = self.users.get_by_id(user.id).await?.ok_or_else(|| {
            LedgerError::Internal(format!("用户更新后读取失败: id={}", user.id))
        })?;

        info!(user_id = updated.id, "联系方式已更新");

        Ok(updated.into())
    }

    /// 查找或创建用户
    async fn register_or_refresh(&self, request: &StartRequest) -> Result<(User, bool)> {
        if let Some(mut user) = self.users.get_by_telegram_id(request.telegram_id).await? {
            // 已注册：用户名有变化时刷新
            if user.username != request.username {
                self.users
                    .update_username(user.id, request.username.as_deref())
                    .await?;
                user.username = request.username.clone();
            }
            return Ok((user, false));
        }

        let new_user = new_user_record(request.telegram_id, request.username.as_deref());

        match self.users.create(&new_user).await {
            Ok(id) => {
                info!(user_id = id, "新用户已注册");
                Ok((User { id, ..new_user }, true))
            }
            Err(LedgerError::Database(e))
                if matches!(&e, sqlx::Error::Database(db) if db.is_unique_violation()) =>
            {
                // 并发 /start 已建档，转为已存在分支
                let user = self
                    .users
                    .get_by_telegram_id(request.telegram_id)
                    .await?
                    .ok_or_else(|| {
                        LedgerError::Internal(format!(
                            "并发注册后用户读取失败: telegram_id={}",
                            request.telegram_id
                        ))
                    })?;
                Ok((user, false))
            }
            Err(e) => Err(e),
        }
    }
}

/// 构造新用户档案
///
/// 零余额、零步数、普通角色、启用状态
fn new_user_record(telegram_id: i64, username: Option<&str>) -> User {
    let now = Utc::now();
    User {
        id: 0,
        telegram_id,
        username: username.map(str::to_string),
        phone: None,
        email: None,
        balance: 0,
        step_count: 0,
        walk_count_stroller: 0,
        walk_count_dog: 0,
        walk_count_stroller_dog: 0,
        landing_source: None,
        family_id: None,
        role: UserRole::User,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_record_defaults() {
        let user = new_user_record(987654, Some("walker"));

        assert_eq!(user.telegram_id, 987654);
        assert_eq!(user.username, Some("walker".to_string()));
        assert_eq!(user.balance, 0);
        assert_eq!(user.step_count, 0);
        assert_eq!(user.total_walk_count(), 0);
        assert_eq!(user.role, UserRole::User);
        assert!(user.is_active);
        assert!(user.landing_source.is_none());
        assert!(user.family_id.is_none());
    }

    #[test]
    fn test_new_user_record_without_username() {
        let user = new_user_record(111, None);
        assert!(user.username.is_none());
    }
}
