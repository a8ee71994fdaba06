//! 促销码服务
//!
//! 兑换通过条件 UPDATE 原子递增 used_count，并发兑换同一个码
//! 永远不会超出使用上限；下单流程在同一事务内复用兑换逻辑

use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};

use crate::error::{LedgerError, Result};
use crate::repository::{PromoRepository, UserRepository};
use crate::service::dto::PromoRedemptionDto;

/// 促销码服务
pub struct PromoService {
    users: UserRepository,
    pool: PgPool,
}

impl PromoService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// 兑换促销码
    ///
    /// 返回分组的折扣比例，供下一次下单使用
    #[instrument(skip(self))]
    pub async fn redeem(&self, telegram_id: i64, code: &str) -> Result<PromoRedemptionDto> {
        // 1. 用户校验
        let user = self
            .users
            .get_by_telegram_id(telegram_id)
            .await?
            .ok_or(LedgerError::UserNotFound(telegram_id))?;

        if !user.is_active {
            return Err(LedgerError::UserInactive(telegram_id));
        }

        // 2. 事务内原子兑换
        let mut tx = self.pool.begin().await?;
        let redemption = Self::redeem_code_in_tx(&mut tx, code).await?;
        tx.commit().await?;

        info!(
            user_id = user.id,
            discount_percent = redemption.discount_percent,
            remaining_uses = redemption.remaining_uses,
            "促销码兑换成功"
        );

        Ok(redemption)
    }

    /// 在事务内兑换促销码
    ///
    /// 条件递增保证 used_count 不超过 max_uses；兑换失败或外层事务
    /// 回滚时递增一并撤销。分组已停用等价于码不可用。
    pub(crate) async fn redeem_code_in_tx(
        tx: &mut PgConnection,
        code: &str,
    ) -> Result<PromoRedemptionDto> {
        match PromoRepository::redeem_in_tx(tx, code).await? {
            Some(promo) => {
                let group = PromoRepository::get_group_in_tx(tx, promo.group_id)
                    .await?
                    .ok_or_else(|| {
                        LedgerError::Internal(format!("促销码分组缺失: group_id={}", promo.group_id))
                    })?;

                if !group.is_active {
                    return Err(LedgerError::PromoCodeExhausted(promo.code));
                }

                Ok(PromoRedemptionDto {
                    code: promo.code.clone(),
                    discount_percent: group.discount_percent,
                    remaining_uses: promo.remaining_uses(),
                })
            }
            None => {
                // 区分码不存在与已用完/停用
                match PromoRepository::get_by_code_in_tx(tx, code).await? {
                    Some(_) => Err(LedgerError::PromoCodeExhausted(code.to_string())),
                    None => Err(LedgerError::PromoCodeNotFound(code.to_string())),
                }
            }
        }
    }
}
