//! 管理后台请求 DTO 定义
//!
//! 所有 REST API 的请求参数和请求体结构

use serde::{Deserialize, Serialize};
use steps_ledger::{OrderStatus, WalkForm};
use validator::Validate;

/// 分页查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

impl PaginationParams {
    /// 计算数据库查询的 offset
    pub fn offset(&self) -> i64 {
        (self.page - 1).max(0) * self.page_size
    }

    /// 获取限制条数（最大100）
    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, 100)
    }
}

/// 散步次数筛选档位
///
/// 列表页按用户总散步次数分档过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WalkBucket {
    #[serde(rename = "0")]
    None,
    #[serde(rename = "1-5")]
    OneToFive,
    #[serde(rename = "6-20")]
    SixToTwenty,
    #[serde(rename = "21+")]
    TwentyOnePlus,
}

impl WalkBucket {
    /// 档位对应的闭区间 [min, max]，上限 None 表示无上界
    pub fn range(&self) -> (i32, Option<i32>) {
        match self {
            Self::None => (0, Some(0)),
            Self::OneToFive => (1, Some(5)),
            Self::SixToTwenty => (6, Some(20)),
            Self::TwentyOnePlus => (21, None),
        }
    }
}

/// 用户列表查询过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQueryFilter {
    /// 模糊搜索：用户名、电话、邮箱、Telegram ID
    pub search: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
    pub has_family: Option<bool>,
    pub has_referral: Option<bool>,
    pub landing_source: Option<String>,
    pub walks: Option<WalkBucket>,
}

/// 用户状态更新请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserStatusRequest {
    pub is_active: bool,
}

/// 基础系数行
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BaseCoefficientItem {
    pub walk_form: WalkForm,
    #[validate(range(exclusive_min = 0.0, message = "系数必须为正数"))]
    pub coefficient: f64,
}

/// 基础系数表全量替换请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceBaseCoefficientsRequest {
    #[validate(length(min = 1, message = "系数表不能为空"))]
    #[validate(nested)]
    pub items: Vec<BaseCoefficientItem>,
}

/// 创建温度区间请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemperatureBandRequest {
    pub walk_form: WalkForm,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    #[validate(range(exclusive_min = 0.0, message = "系数必须为正数"))]
    pub coefficient: f64,
}

/// 更新温度区间请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTemperatureBandRequest {
    pub walk_form: WalkForm,
    pub min_temp_c: f64,
    pub max_temp_c: f64,
    #[validate(range(exclusive_min = 0.0, message = "系数必须为正数"))]
    pub coefficient: f64,
}

/// 创建家庭请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateFamilyRequest {
    #[validate(length(min = 1, max = 100, message = "家庭名称长度必须在1-100个字符之间"))]
    pub name: String,
}

/// 更新家庭请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFamilyRequest {
    #[validate(length(min = 1, max = 100, message = "家庭名称长度必须在1-100个字符之间"))]
    pub name: Option<String>,
}

/// 邀请归因列表查询过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralQueryFilter {
    /// 来源标签原始值（如 sticker、vk）
    pub source: Option<String>,
    pub inviter_id: Option<i64>,
}

/// 创建商品分类请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "分类名称长度必须在1-100个字符之间"))]
    pub name: String,
    pub sort_order: Option<i32>,
}

/// 更新商品分类请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "分类名称长度必须在1-100个字符之间"))]
    pub name: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// 创建商品请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub category_id: i64,
    #[validate(length(min = 1, max = 200, message = "商品名称长度必须在1-200个字符之间"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "商品价格必须大于0"))]
    pub price_points: i64,
    /// 省略表示不限量
    #[validate(range(min = 0, message = "库存不能为负数"))]
    pub stock: Option<i32>,
}

/// 更新商品请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub category_id: Option<i64>,
    #[validate(length(min = 1, max = 200, message = "商品名称长度必须在1-200个字符之间"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "商品价格必须大于0"))]
    pub price_points: Option<i64>,
    #[validate(range(min = 0, message = "库存不能为负数"))]
    pub stock: Option<i32>,
    pub is_active: Option<bool>,
}

/// 订单列表查询过滤
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderQueryFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<i64>,
}

/// 订单状态更新请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// 创建促销组请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePromoGroupRequest {
    #[validate(length(min = 1, max = 100, message = "促销组名称长度必须在1-100个字符之间"))]
    pub name: String,
    #[validate(range(min = 0, max = 100, message = "折扣百分比必须在0-100之间"))]
    pub discount_percent: i32,
}

/// 更新促销组请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromoGroupRequest {
    #[validate(length(min = 1, max = 100, message = "促销组名称长度必须在1-100个字符之间"))]
    pub name: Option<String>,
    #[validate(range(min = 0, max = 100, message = "折扣百分比必须在0-100之间"))]
    pub discount_percent: Option<i32>,
    pub is_active: Option<bool>,
}

/// 批量生成促销码请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeneratePromoCodesRequest {
    #[validate(range(min = 1, max = 1000, message = "单次生成数量必须在1-1000之间"))]
    pub count: i64,
    #[validate(range(min = 1, message = "使用次数上限必须大于0"))]
    pub max_uses: i32,
}

/// 促销码启用/停用请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePromoCodeStatusRequest {
    pub is_active: bool,
}

/// 设置项更新请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingRequest {
    #[validate(length(min = 1, max = 4096, message = "设置值长度必须在1-4096个字符之间"))]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_params_default() {
        let params = PaginationParams::default();
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, 20);
    }

    #[test]
    fn test_pagination_offset() {
        let params = PaginationParams {
            page: 3,
            page_size: 25,
        };
        assert_eq!(params.offset(), 50);
        assert_eq!(params.limit(), 25);
    }

    #[test]
    fn test_pagination_limit_clamped() {
        let params = PaginationParams {
            page: 1,
            page_size: 500,
        };
        assert_eq!(params.limit(), 100);

        let params = PaginationParams {
            page: 1,
            page_size: 0,
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn test_walk_bucket_deserialization() {
        let bucket: WalkBucket = serde_json::from_str("\"0\"").unwrap();
        assert_eq!(bucket, WalkBucket::None);

        let bucket: WalkBucket = serde_json::from_str("\"1-5\"").unwrap();
        assert_eq!(bucket, WalkBucket::OneToFive);

        let bucket: WalkBucket = serde_json::from_str("\"6-20\"").unwrap();
        assert_eq!(bucket, WalkBucket::SixToTwenty);

        let bucket: WalkBucket = serde_json::from_str("\"21+\"").unwrap();
        assert_eq!(bucket, WalkBucket::TwentyOnePlus);

        assert!(serde_json::from_str::<WalkBucket>("\"5-10\"").is_err());
    }

    #[test]
    fn test_walk_bucket_ranges() {
        assert_eq!(WalkBucket::None.range(), (0, Some(0)));
        assert_eq!(WalkBucket::OneToFive.range(), (1, Some(5)));
        assert_eq!(WalkBucket::SixToTwenty.range(), (6, Some(20)));
        assert_eq!(WalkBucket::TwentyOnePlus.range(), (21, None));
    }

    #[test]
    fn test_generate_promo_codes_validation() {
        let req = GeneratePromoCodesRequest {
            count: 100,
            max_uses: 1,
        };
        assert!(req.validate().is_ok());

        let req = GeneratePromoCodesRequest {
            count: 0,
            max_uses: 1,
        };
        assert!(req.validate().is_err());

        let req = GeneratePromoCodesRequest {
            count: 5000,
            max_uses: 1,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_base_coefficient_item_rejects_non_positive() {
        let item = BaseCoefficientItem {
            walk_form: WalkForm::Dog,
            coefficient: 0.0,
        };
        assert!(item.validate().is_err());

        let item = BaseCoefficientItem {
            walk_form: WalkForm::Dog,
            coefficient: 1.5,
        };
        assert!(item.validate().is_ok());
    }

    #[test]
    fn test_user_query_filter_deserialization() {
        let filter: UserQueryFilter = serde_json::from_str(
            r#"{"search":"ivan","isActive":true,"hasFamily":false,"walks":"6-20"}"#,
        )
        .unwrap();
        assert_eq!(filter.search.as_deref(), Some("ivan"));
        assert_eq!(filter.is_active, Some(true));
        assert_eq!(filter.has_family, Some(false));
        assert_eq!(filter.walks, Some(WalkBucket::SixToTwenty));
        assert!(filter.role.is_none());
    }
}
