//! 管理后台响应 DTO 定义
//!
//! 所有 REST API 的响应体结构。统一响应信封与分页结构
//! 直接复用账本服务的定义，保证两个服务的 API 契约一致。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steps_ledger::{OrderStatus, WalkForm};

pub use steps_ledger::{ApiResponse, PageResponse};

/// 用户列表行 DTO
///
/// 列表页直接展示过滤相关的聚合字段，避免前端二次请求
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAdminDto {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub balance: i64,
    pub step_count: i64,
    pub walk_count_stroller: i32,
    pub walk_count_dog: i32,
    pub walk_count_stroller_dog: i32,
    pub total_walks: i32,
    pub landing_source: Option<String>,
    pub family_id: Option<i64>,
    pub family_name: Option<String>,
    pub has_referral: bool,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// 邀请归因信息
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralInfoDto {
    pub inviter_id: i64,
    pub inviter_username: Option<String>,
    /// 本地化来源标签
    pub source_label: String,
    /// 邀请人从该用户散步中累计获得的分成
    pub reward_points: i64,
}

/// 用户统计 DTO
///
/// 详情页汇总视图：余额、步数、各形式散步次数、
/// 散步时段摘要、购买摘要和邀请关系
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsDto {
    pub user_id: i64,
    pub balance: i64,
    pub step_count: i64,
    pub walk_count_stroller: i32,
    pub walk_count_dog: i32,
    pub walk_count_stroller_dog: i32,
    pub total_walks: i32,
    /// 高频散步时段摘要，如 "Вт 9:00 (4), Сб 18:00 (2)"
    pub walk_schedule: String,
    /// 已完成订单的购买摘要，如 "Корм×2, Игрушка×1"
    pub purchases: String,
    /// 该用户邀请的人数
    pub referral_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<ReferralInfoDto>,
}

/// 邀请归因列表行 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralAdminDto {
    pub id: i64,
    pub user_id: i64,
    pub user_username: Option<String>,
    pub inviter_id: i64,
    pub inviter_username: Option<String>,
    /// 来源原始值，筛选用
    pub source: Option<String>,
    /// 本地化来源标签，展示用
    pub source_label: String,
    pub reward_points: i64,
    pub created_at: DateTime<Utc>,
}

/// 家庭列表行 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyAdminDto {
    pub id: i64,
    pub name: String,
    pub balance: i64,
    pub step_count: i64,
    pub member_count: i64,
    pub created_at: DateTime<Utc>,
}

/// 订单列表行 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAdminDto {
    pub id: i64,
    pub user_id: i64,
    pub username: Option<String>,
    pub telegram_id: i64,
    pub status: OrderStatus,
    pub total_points: i64,
    pub pvz_id: Option<i64>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 基础系数行 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseCoefficientDto {
    pub walk_form: WalkForm,
    pub coefficient: f64,
    pub updated_at: DateTime<Utc>,
}

/// 批量生成促销码结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCodesDto {
    pub group_id: i64,
    pub codes: Vec<String>,
}

/// 各形式散步次数统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalksByFormDto {
    pub stroller: i64,
    pub dog: i64,
    pub stroller_dog: i64,
}

/// 各状态订单数统计
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdersByStatusDto {
    pub new: i64,
    pub processing: i64,
    pub completed: i64,
    pub cancelled: i64,
}

/// 来源计数行
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCountDto {
    pub source_label: String,
    pub count: i64,
}

/// 统计概览
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOverview {
    pub total_users: i64,
    pub active_users: i64,
    pub total_points_issued: i64,
    pub total_points_spent: i64,
    pub walks_by_form: WalksByFormDto,
    pub orders_by_status: OrdersByStatusDto,
    pub referrals_by_source: Vec<SourceCountDto>,
}

/// 创建资源成功响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: i64,
}

impl CreatedResponse {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}
