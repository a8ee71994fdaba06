//! 查询服务
//!
//! 只读聚合视图：个人资料、商品目录、账本分页，
//! 以及管理后台导出所需的散步时段与购买汇总

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use sqlx::PgPool;

use crate::error::{LedgerError, Result};
use crate::models::{LedgerEntry, OrderItem, setting_keys};
use crate::repository::{
    CatalogRepository, FamilyRepository, LedgerRepository, OrderRepository, SettingsRepository,
    UserRepository,
};
use crate::service::dto::{CatalogDto, CatalogSectionDto, ProfileDto};

/// 星期名称，下标 0 为周日
const DAY_NAMES: [&str; 7] = ["Вс", "Пн", "Вт", "Ср", "Чт", "Пт", "Сб"];

/// 程序主时区相对 UTC 的固定偏移（UTC+3，不处理夏令时）
const HOME_TIMEZONE_OFFSET_HOURS: i64 = 3;

/// 查询服务
pub struct QueryService {
    users: UserRepository,
    families: FamilyRepository,
    ledger: LedgerRepository,
    orders: OrderRepository,
    catalog: CatalogRepository,
    settings: SettingsRepository,
}

impl QueryService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            families: FamilyRepository::new(pool.clone()),
            ledger: LedgerRepository::new(pool.clone()),
            orders: OrderRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool.clone()),
            settings: SettingsRepository::new(pool),
        }
    }

    /// 个人资料
    ///
    /// 聚合家庭名称和设置中的客服联系方式
    pub async fn profile(&self, telegram_id: i64) -> Result<ProfileDto> {
        let user = self
            .users
            .get_by_telegram_id(telegram_id)
            .await?
            .ok_or(LedgerError::UserNotFound(telegram_id))?;

        let family_name = match user.family_id {
            Some(family_id) => self.families.get(family_id).await?.map(|family| family.name),
            None => None,
        };
        let support_contact = self
            .settings
            .get_value(setting_keys::SUPPORT_CONTACT)
            .await?;

        let total_walks = user.total_walk_count();

        Ok(ProfileDto {
            telegram_id: user.telegram_id,
            username: user.username,
            phone: user.phone,
            email: user.email,
            balance: user.balance,
            step_count: user.step_count,
            total_walks,
            family_name,
            support_contact,
        })
    }

    /// 商品目录
    ///
    /// 启用分类按排序值排列，每个分类带其启用商品
    pub async fn catalog(&self) -> Result<CatalogDto> {
        let categories = self.catalog.list_active_categories().await?;

        let mut sections = Vec::with_capacity(categories.len());
        for category in categories {
            let products = self.catalog.list_active_products(category.id).await?;
            sections.push(CatalogSectionDto {
                category_id: category.id,
                category_name: category.name,
                products,
            });
        }

        Ok(CatalogDto { sections })
    }

    /// 用户账本分页，新到旧
    ///
    /// 返回当前页条目和总条数
    pub async fn ledger_page(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<LedgerEntry>, i64)> {
        let total = self.ledger.count_by_user(user_id).await?;
        if total == 0 {
            return Ok((Vec::new(), 0));
        }

        let offset = (page - 1) * page_size;
        let entries = self.ledger.list_by_user(user_id, page_size, offset).await?;

        Ok((entries, total))
    }

    /// 散步时段汇总（管理后台导出列）
    pub async fn walk_schedule_summary(&self, user_id: i64) -> Result<String> {
        let times = self.ledger.list_walk_entry_times(user_id).await?;
        Ok(summarize_walk_slots(&times))
    }

    /// 购买汇总（管理后台导出列）
    pub async fn purchases_summary(&self, user_id: i64) -> Result<String> {
        let items = self.orders.list_completed_items_by_user(user_id).await?;
        Ok(summarize_purchases(&items))
    }
}

/// 散步时段汇总
///
/// 时间平移到主时区后按（星期, 小时）分桶，取出现次数最多的前三个
/// 时段，格式 "<星期> <小时>:00 (<次数>)"，并列时按首次出现顺序；
/// 无散步记录时返回空串
pub fn summarize_walk_slots(times: &[DateTime<Utc>]) -> String {
    if times.is_empty() {
        return String::new();
    }

    // 按首次出现顺序累计计数，稳定排序即可保持并列时段的先后
    let mut slots: Vec<(String, u32)> = Vec::new();
    for time in times {
        let local = *time + Duration::hours(HOME_TIMEZONE_OFFSET_HOURS);
        let day = DAY_NAMES[local.weekday().num_days_from_sunday() as usize];
        let label = format!("{} {}:00", day, local.hour());

        match slots.iter_mut().find(|(slot, _)| *slot == label) {
            Some((_, count)) => *count += 1,
            None => slots.push((label, 1)),
        }
    }

    slots.sort_by(|a, b| b.1.cmp(&a.1));
    slots.truncate(3);

    slots
        .into_iter()
        .map(|(label, count)| format!("{} ({})", label, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 购买汇总
///
/// "标题×数量" 以 ", " 连接，空标题跳过；无购买时返回空串
pub fn summarize_purchases(items: &[OrderItem]) -> String {
    items
        .iter()
        .filter(|item| !item.title.is_empty())
        .map(|item| format!("{}×{}", item.title, item.quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_summarize_walk_slots_empty() {
        assert_eq!(summarize_walk_slots(&[]), "");
    }

    #[test]
    fn test_summarize_walk_slots_single_entry() {
        // 2026-01-05 15:30 UTC = 18:30 主时区，周一
        let times = vec![utc(2026, 1, 5, 15, 30)];
        assert_eq!(summarize_walk_slots(&times), "Пн 18:00 (1)");
    }

    #[test]
    fn test_summarize_walk_slots_shifts_across_midnight() {
        // 2026-01-04 22:40 UTC（周日）= 01:40 主时区，已是周一
        let times = vec![utc(2026, 1, 4, 22, 40)];
        assert_eq!(summarize_walk_slots(&times), "Пн 1:00 (1)");
    }

    #[test]
    fn test_summarize_walk_slots_top_three_by_count() {
        let times = vec![
            // 3 次周一 18:00
            utc(2026, 1, 5, 15, 5),
            utc(2026, 1, 5, 15, 20),
            utc(2026, 1, 12, 15, 59),
            // 2 次周三 9:00
            utc(2026, 1, 7, 6, 10),
            utc(2026, 1, 7, 6, 45),
            // 各 1 次，取前三后仅保留先出现的周五时段
            utc(2026, 1, 9, 17, 0),
            utc(2026, 1, 10, 7, 30),
        ];

        assert_eq!(
            summarize_walk_slots(&times),
            "Пн 18:00 (3), Ср 9:00 (2), Пт 20:00 (1)"
        );
    }

    #[test]
    fn test_summarize_walk_slots_sunday_label() {
        // 2026-01-04 10:00 UTC = 13:00 主时区，周日
        let times = vec![utc(2026, 1, 4, 10, 0)];
        assert_eq!(summarize_walk_slots(&times), "Вс 13:00 (1)");
    }

    #[test]
    fn test_summarize_purchases() {
        let items = vec![
            OrderItem {
                id: 1,
                order_id: 1,
                product_id: 10,
                title: "Мяч".to_string(),
                price_points: 100,
                quantity: 2,
            },
            OrderItem {
                id: 2,
                order_id: 1,
                product_id: 11,
                title: "Поводок".to_string(),
                price_points: 250,
                quantity: 1,
            },
        ];

        assert_eq!(summarize_purchases(&items), "Мяч×2, Поводок×1");
        assert_eq!(summarize_purchases(&[]), "");
    }

    #[test]
    fn test_summarize_purchases_skips_empty_titles() {
        let items = vec![OrderItem {
            id: 1,
            order_id: 1,
            product_id: 10,
            title: String::new(),
            price_points: 100,
            quantity: 2,
        }];

        assert_eq!(summarize_purchases(&items), "");
    }
}
