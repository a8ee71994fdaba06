//! 订单服务
//!
//! 处理下单、状态流转和取消退款，包括：
//! - 商品校验与库存扣减（条件 UPDATE，限量商品不会超卖）
//! - 促销码折扣（与下单同一事务，订单失败时兑换一并回滚）
//! - 余额校验与扣减（用户行级锁下完成）
//! - 取消时的补偿流水、余额返还与库存恢复
//!
//! ## 下单流程
//!
//! 1. 请求校验 -> 2. 用户校验 -> 3. 事务内：锁用户行 -> 逐行锁商品、
//!    扣库存、累计总额 -> 促销折扣 -> 余额校验 -> 建单与明细
//!    -> 账本扣分 -> 4. 提交

use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};
use validator::Validate;

use walk_reward_engine::RewardCalculator;

use crate::error::{LedgerError, Result};
use crate::models::{LedgerEntry, Order, OrderItem, OrderStatus};
use crate::repository::{
    CatalogRepository, FamilyRepository, LedgerRepository, OrderRepository, UserRepository,
};
use crate::service::dto::{OrderDetailDto, PlaceOrderRequest, PlacedOrderDto};
use crate::service::promo_service::PromoService;

/// 订单服务
pub struct OrderService {
    users: UserRepository,
    orders: OrderRepository,
    pool: PgPool,
}

impl OrderService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            orders: OrderRepository::new(pool.clone()),
            pool,
        }
    }

    /// 下单
    #[instrument(
        skip(self, request),
        fields(telegram_id = request.telegram_id, lines = request.items.len())
    )]
    pub async fn place_order(&self, request: PlaceOrderRequest) -> Result<PlacedOrderDto> {
        // 1. 请求校验
        request.validate()?;

        // 2. 用户校验
        let user = self
            .users
            .get_by_telegram_id(request.telegram_id)
            .await?
            .ok_or(LedgerError::UserNotFound(request.telegram_id))?;

        if !user.is_active {
            return Err(LedgerError::UserInactive(request.telegram_id));
        }

        // 3. 事务内建单
        let placed = self.execute_place_order(user.id, &request).await?;

        info!(
            user_id = user.id,
            order_id = placed.order_id,
            total_points = placed.total_points,
            discount_percent = placed.discount_percent,
            "订单已创建"
        );

        Ok(placed)
    }

    /// 执行下单事务
    async fn execute_place_order(
        &self,
        user_id: i64,
        request: &PlaceOrderRequest,
    ) -> Result<PlacedOrderDto> {
        let mut tx = self.pool.begin().await?;

        // 3.1 锁定用户行：余额校验与扣减在同一把锁内完成
        let user = UserRepository::get_by_id_for_update(&mut tx, user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(request.telegram_id))?;

        // 3.2 逐行校验商品并扣减库存，快照标题与单价
        let mut gross = 0i64;
        let mut snapshots: Vec<OrderItem> = Vec::with_capacity(request.items.len());

        for line in &request.items {
            let product = CatalogRepository::get_product_for_update(&mut tx, line.product_id)
                .await?
                .ok_or(LedgerError::ProductNotFound(line.product_id))?;

            if !product.is_active {
                return Err(LedgerError::ProductInactive(product.id));
            }

            let decremented =
                CatalogRepository::decrement_stock_in_tx(&mut tx, product.id, line.quantity)
                    .await?;
            if !decremented {
                return Err(LedgerError::ProductOutOfStock(product.id));
            }

            gross += product.price_points * line.quantity as i64;
            snapshots.push(OrderItem {
                id: 0,
                order_id: 0,
                product_id: product.id,
                title: product.title.clone(),
                price_points: product.price_points,
                quantity: line.quantity,
            });
        }

        // 3.3 促销折扣（同一事务，订单失败时兑换回滚）
        let discount_percent = match request.promo_code.as_deref() {
            Some(code) => {
                PromoService::redeem_code_in_tx(&mut tx, code)
                    .await?
                    .discount_percent
            }
            None => 0,
        };
        let payable = discounted_total(gross, discount_percent);

        // 3.4 余额校验
        if user.balance < payable {
            return Err(LedgerError::InsufficientBalance {
                required: payable,
                available: user.balance,
            });
        }

        // 3.5 创建订单与明细
        let now = chrono::Utc::now();
        let order = Order {
            id: 0,
            user_id: user.id,
            status: OrderStatus::New,
            total_points: payable,
            pvz_id: request.pvz_id,
            comment: request.comment.clone(),
            created_at: now,
            updated_at: now,
        };
        let order_id = OrderRepository::create_in_tx(&mut tx, &order).await?;

        for snapshot in &mut snapshots {
            snapshot.order_id = order_id;
            OrderRepository::create_item_in_tx(&mut tx, snapshot).await?;
        }

        // 3.6 账本扣分与余额同步
        if payable > 0 {
            let entry = LedgerEntry::order_debit(user.id, payable);
            LedgerRepository::append_in_tx(&mut tx, &entry).await?;
            UserRepository::increment_balance_in_tx(&mut tx, user.id, -payable).await?;

            if let Some(family_id) = user.family_id {
                FamilyRepository::increment_balance_in_tx(&mut tx, family_id, -payable).await?;
            }
        }

        tx.commit().await?;

        Ok(PlacedOrderDto {
            order_id,
            total_points: payable,
            discount_percent,
            new_balance: user.balance - payable,
        })
    }

    /// 用户取消自己的订单
    ///
    /// 订单不属于该用户时按不存在处理，不泄露他人订单
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, telegram_id: i64, order_id: i64) -> Result<Order> {
        let user = self
            .users
            .get_by_telegram_id(telegram_id)
            .await?
            .ok_or(LedgerError::UserNotFound(telegram_id))?;

        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::get_order_for_update(&mut tx, order_id)
            .await?
            .filter(|order| order.user_id == user.id)
            .ok_or(LedgerError::OrderNotFound(order_id))?;

        let updated = Self::transition_in_tx(&mut tx, order, OrderStatus::Cancelled).await?;
        tx.commit().await?;

        info!(user_id = user.id, order_id, "订单已取消");

        Ok(updated)
    }

    /// 订单状态流转（管理后台）
    ///
    /// 只允许合法迁移；取消时在同一事务内退款并恢复库存
    #[instrument(skip(self))]
    pub async fn update_status(&self, order_id: i64, next: OrderStatus) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let order = OrderRepository::get_order_for_update(&mut tx, order_id)
            .await?
            .ok_or(LedgerError::OrderNotFound(order_id))?;

        let updated = Self::transition_in_tx(&mut tx, order, next).await?;
        tx.commit().await?;

        info!(order_id, status = ?next, "订单状态已更新");

        Ok(updated)
    }

    /// 获取订单详情（含明细行）
    pub async fn get_order_detail(&self, order_id: i64) -> Result<OrderDetailDto> {
        let order = self
            .orders
            .get_order(order_id)
            .await?
            .ok_or(LedgerError::OrderNotFound(order_id))?;
        let items = self.orders.list_items(order_id).await?;

        Ok(OrderDetailDto { order, items })
    }

    /// 列出用户最近的订单
    pub async fn list_user_orders(&self, telegram_id: i64, limit: i64) -> Result<Vec<Order>> {
        let user = self
            .users
            .get_by_telegram_id(telegram_id)
            .await?
            .ok_or(LedgerError::UserNotFound(telegram_id))?;

        self.orders.list_by_user(user.id, limit).await
    }

    /// 执行状态迁移
    async fn transition_in_tx(
        tx: &mut PgConnection,
        order: Order,
        next: OrderStatus,
    ) -> Result<Order> {
        if !order.status.can_transition_to(next) {
            return Err(LedgerError::InvalidOrderStatus {
                order_id: order.id,
                current_status: format!("{:?}", order.status),
            });
        }

        if next == OrderStatus::Cancelled {
            Self::refund_in_tx(tx, &order).await?;
        }

        OrderRepository::update_status_in_tx(tx, order.id, next).await?;

        Ok(Order {
            status: next,
            ..order
        })
    }

    /// 取消退款
    ///
    /// 补偿账本流水、返还余额（含家庭聚合）、恢复限量商品库存
    async fn refund_in_tx(tx: &mut PgConnection, order: &Order) -> Result<()> {
        if order.total_points > 0 {
            let entry = LedgerEntry::order_refund(order.user_id, order.total_points);
            LedgerRepository::append_in_tx(tx, &entry).await?;
            UserRepository::increment_balance_in_tx(tx, order.user_id, order.total_points).await?;

            let user = UserRepository::get_by_id_in_tx(tx, order.user_id).await?;
            if let Some(family_id) = user.and_then(|u| u.family_id) {
                FamilyRepository::increment_balance_in_tx(tx, family_id, order.total_points)
                    .await?;
            }
        }

        let items = OrderRepository::list_items_in_tx(tx, order.id).await?;
        for item in &items {
            CatalogRepository::restore_stock_in_tx(tx, item.product_id, item.quantity).await?;
        }

        Ok(())
    }
}

/// 按折扣比例计算应付总额
///
/// 折扣金额对总额取整（四舍五入），支付额 = 总额 - 折扣金额
fn discounted_total(gross: i64, discount_percent: i32) -> i64 {
    gross - RewardCalculator::percent_share(gross, discount_percent as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discounted_total() {
        assert_eq!(discounted_total(1000, 25), 750);
        assert_eq!(discounted_total(1000, 0), 1000);
        assert_eq!(discounted_total(1000, 100), 0);
        // 9.5 分折扣四舍五入为 10
        assert_eq!(discounted_total(95, 10), 85);
        assert_eq!(discounted_total(0, 50), 0);
    }

    #[test]
    fn test_cancellation_is_terminal() {
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::New));
        assert!(!OrderStatus::Completed.can_transition_to(OrderStatus::Cancelled));
    }
}
